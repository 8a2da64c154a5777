//! HTML 文档元数据处理模块
//!
//! 目前只负责字符编码声明的识别，供文档管道在解析后按声明的编码重新解码。

use markup5ever_rcdom::Handle;

use super::dom::{find_nodes, get_node_attr};

/// 获取文档声明的字符集
///
/// 支持 `<meta charset="...">` 与
/// `<meta http-equiv="content-type" content="text/html; charset=...">` 两种写法。
pub fn get_charset(node: &Handle) -> Option<String> {
    for meta_node in find_nodes(node, vec!["html", "head", "meta"]).iter() {
        if let Some(meta_charset_node_attr_value) = get_node_attr(meta_node, "charset") {
            return Some(meta_charset_node_attr_value);
        }

        if get_node_attr(meta_node, "http-equiv")
            .unwrap_or_default()
            .eq_ignore_ascii_case("content-type")
        {
            if let Some(content) = get_node_attr(meta_node, "content") {
                return Some(parse_content_type_charset(&content));
            }
        }
    }

    None
}

/// 从 content-type 字符串中提取 charset，缺省为 US-ASCII
pub fn parse_content_type_charset(content_type: &str) -> String {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| {
            let (name, value) = param.trim().split_once('=')?;
            name.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim().trim_matches('"').to_string())
        })
        .next()
        .unwrap_or_else(|| "US-ASCII".to_string())
}
