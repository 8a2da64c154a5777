//! 扁平字符串模式的区域提取
//!
//! 在 HTML 源码（例如 Markdeep 处理中的文本）里查找 `⁅…⁆` 区域，
//! 用占位符替换结构性定界符，并把转义的定界符还原为字面字符。
//!
//! 使用显式的逐字符扫描而不是正则：一个定界符是否被转义只取决于原始输入中
//! 紧挨着它的前一个字符，因此紧邻的两个区域 `⁅a⁆⁅b⁆` 会被分别提取。

use super::delimiters::{invert_nbsp, unescape_delimiters, CLOSE, ESCAPE, OPEN};
use super::placeholder::create_placeholder;
use crate::parsers::html::serialize_outer_html;
use crate::render::error::RenderResult;

/// 提取到的一个数学区域
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRegion {
    /// 起始定界符前的字符，位于字符串开头时为 `None`
    pub preceding: Option<char>,
    /// 去掉定界符并还原转义后的表达式
    pub expression: String,
    /// 带定界符的原文，用作占位符的回退文本
    pub source: String,
}

/// 扫描结果中的一段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// 普通文本（转义定界符已还原）
    Text(String),
    /// 数学区域
    Math(ExtractedRegion),
}

/// 标记后的 HTML 源码
#[derive(Debug, Clone, Default)]
pub struct MarkedCode {
    /// 区域被替换为占位符后的源码
    pub code: String,
    /// 按出现顺序排列的区域
    pub regions: Vec<ExtractedRegion>,
}

/// 把文本拆分为普通文本段和数学区域段
pub fn scan_regions(text: &str) -> Vec<Segment> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (open_pos, c) = chars[i];
        let preceding = i.checked_sub(1).map(|j| chars[j].1);

        if c == OPEN && preceding != Some(ESCAPE) {
            if let Some(close_index) = find_close(&chars, i + 1) {
                let close_pos = chars[close_index].0;
                let end = close_pos + CLOSE.len_utf8();

                if open_pos > text_start {
                    segments.push(Segment::Text(unescape_delimiters(&text[text_start..open_pos])));
                }

                let inner = &text[open_pos + OPEN.len_utf8()..close_pos];
                let expression = invert_nbsp(&inner.replace(&format!("{ESCAPE}{CLOSE}"), &CLOSE.to_string()));

                segments.push(Segment::Math(ExtractedRegion {
                    preceding,
                    expression,
                    source: invert_nbsp(&text[open_pos..end]),
                }));

                text_start = end;
                i = close_index + 1;
                continue;
            }
            // 未闭合：保留为字面文本，继续向后扫描
        }

        i += 1;
    }

    if text_start < text.len() {
        segments.push(Segment::Text(unescape_delimiters(&text[text_start..])));
    }

    segments
}

/// 找到第一个未被转义的结束定界符
fn find_close(chars: &[(usize, char)], from: usize) -> Option<usize> {
    (from..chars.len()).find(|&j| chars[j].1 == CLOSE && !(j > from && chars[j - 1].1 == ESCAPE))
}

/// 标记 HTML 源码中的数学区域
pub fn mark_in_html_code(code: &str) -> RenderResult<MarkedCode> {
    mark_in_html_code_with(code, |html| html.to_string())
}

/// 标记 HTML 源码中的数学区域，插入的占位符 HTML 先经过 `protect` 处理
///
/// Markdeep 需要用 `protect` 保护插入的 HTML 不被再次处理，其他场景使用恒等函数即可。
pub fn mark_in_html_code_with<F>(code: &str, protect: F) -> RenderResult<MarkedCode>
where
    F: Fn(&str) -> String,
{
    let mut marked = MarkedCode::default();

    for segment in scan_regions(code) {
        match segment {
            Segment::Text(text) => marked.code.push_str(&text),
            Segment::Math(region) => {
                let placeholder = create_placeholder(&region.expression, &region.source);
                marked.code.push_str(&protect(&serialize_outer_html(&placeholder)?));
                marked.regions.push(region);
            }
        }
    }

    tracing::debug!("扁平字符串模式提取到 {} 个区域", marked.regions.len());

    Ok(marked)
}
