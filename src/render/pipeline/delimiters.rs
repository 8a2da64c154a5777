//! 定界符常量与转义处理
//!
//! 定界符是固定的，不可配置；扁平字符串模式、DOM 模式以及任何预先转义
//! 不换行空格的外部工具都必须使用同一组字符。

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::render::error::{RenderError, RenderResult};

/// 数学区域的起始定界符 U+2045
pub const OPEN: char = '⁅';

/// 数学区域的结束定界符 U+2046
pub const CLOSE: char = '⁆';

/// 转义字符，紧跟其后的定界符按字面处理
pub const ESCAPE: char = '\\';

/// 宿主会把 U+00A0 改写成的实体形式
pub const NBSP_ENTITY: &str = "&nbsp;";

/// 与 `encodeURIComponent` 相同的保留字符集
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// 把 `&nbsp;` 还原为 U+00A0
pub fn invert_nbsp(text: &str) -> String {
    text.replace(NBSP_ENTITY, "\u{00A0}")
}

/// 把 `\⁅`、`\⁆` 还原为字面的定界符
pub fn unescape_delimiters(text: &str) -> String {
    text.replace(&format!("{ESCAPE}{OPEN}"), &OPEN.to_string())
        .replace(&format!("{ESCAPE}{CLOSE}"), &CLOSE.to_string())
}

/// 为表达式加上定界符
pub fn delimit(expression: &str) -> String {
    format!("{OPEN}{expression}{CLOSE}")
}

/// 检查文本中是否含有任一定界符
pub fn contains_delimiter(text: &str) -> bool {
    text.contains(OPEN) || text.contains(CLOSE)
}

/// 编码表达式以便存放在占位符属性中
///
/// `<`、`>`、`&` 等字符在序列化时会被转义，编码后原始表达式可以无损取回。
pub fn encode_expression(expression: &str) -> String {
    utf8_percent_encode(expression, URI_COMPONENT).to_string()
}

/// 解码占位符属性中的表达式
pub fn decode_expression(encoded: &str) -> RenderResult<String> {
    percent_decode_str(encoded)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| RenderError::ParseError(format!("占位符表达式不是有效的 UTF-8: {}", e)))
}
