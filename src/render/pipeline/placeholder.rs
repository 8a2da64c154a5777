//! 占位符节点
//!
//! 占位符是一个 `<span class="unicodemathml-placeholder">`，其 `data-unicodemath`
//! 属性保存百分号编码后的原始表达式，文本内容是带定界符的原文（未翻译时的回退显示）。

use markup5ever_rcdom::Handle;

use super::delimiters::{decode_expression, encode_expression};
use crate::parsers::html::{
    append_child, create_element, create_text_node, find_elements_with_class, get_node_attr,
    get_node_name, has_class, EXPRESSION_ATTR, PLACEHOLDER_CLASS, PLACEHOLDER_TAG,
};
use crate::render::error::{RenderError, RenderResult};

/// 创建占位符节点
pub fn create_placeholder(expression: &str, fallback: &str) -> Handle {
    let placeholder = create_element(
        PLACEHOLDER_TAG,
        vec![
            ("class", PLACEHOLDER_CLASS.to_string()),
            (EXPRESSION_ATTR, encode_expression(expression)),
        ],
    );
    append_child(&placeholder, create_text_node(fallback));
    placeholder
}

/// 检查节点是否为占位符
pub fn is_placeholder(node: &Handle) -> bool {
    get_node_name(node) == Some(PLACEHOLDER_TAG) && has_class(node, PLACEHOLDER_CLASS)
}

/// 取回占位符保存的原始表达式
pub fn placeholder_expression(node: &Handle) -> RenderResult<String> {
    let encoded = get_node_attr(node, EXPRESSION_ATTR).ok_or_else(|| {
        RenderError::DocumentError(format!("占位符缺少 {} 属性", EXPRESSION_ATTR))
    })?;
    decode_expression(&encoded)
}

/// 按文档顺序收集根节点下的所有占位符
pub fn find_placeholders(root: &Handle) -> Vec<Handle> {
    find_elements_with_class(root, PLACEHOLDER_TAG, PLACEHOLDER_CLASS)
}
