/// 占位符元素的标签名
pub const PLACEHOLDER_TAG: &str = "span";

/// 占位符元素的 class
pub const PLACEHOLDER_CLASS: &str = "unicodemathml-placeholder";

/// 保存原始表达式（百分号编码）的属性名
pub const EXPRESSION_ATTR: &str = "data-unicodemath";

/// 内容不参与扫描的元素
pub const EXCLUDED_ELEMENTS: &[&str] = &["pre", "code", "textarea", "script", "style", "head", "title"];

/// 视为"段落"的父元素（用于 displaystyle 推断）
pub const PARAGRAPH_ELEMENTS: &[&str] = &["p"];

/// 检查元素内容是否应跳过扫描
pub fn is_excluded_element(tag_name: &str) -> bool {
    EXCLUDED_ELEMENTS.contains(&tag_name.to_ascii_lowercase().as_str())
}

/// 检查是否为段落类元素
pub fn is_paragraph_element(tag_name: &str) -> bool {
    PARAGRAPH_ELEMENTS.contains(&tag_name.to_ascii_lowercase().as_str())
}

/// 检查文本是否只包含空白
///
/// 与 JavaScript 的 `trim()` 一致，Unicode 空白（包括 U+00A0）也算空白。
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
