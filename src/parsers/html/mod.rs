//! HTML解析和处理模块
//!
//! - `utils`: 基础常量和判断函数
//! - `dom`: 基础DOM操作（解析、查找、创建、替换节点）
//! - `metadata`: 文档元数据处理
//! - `serializer`: 序列化功能

pub mod dom;
pub mod metadata;
pub mod serializer;
pub mod utils;

// 重新导出主要的公共 API
pub use dom::{
    append_child, create_element, create_text_node, find_elements_with_class, find_nodes,
    get_node_attr, get_node_name, get_parent_node, get_text_content, has_class, html_to_dom,
    parse_html_fragment, replace_node,
};
pub use metadata::get_charset;
pub use serializer::{serialize_document, serialize_inner_html, serialize_outer_html};
pub use utils::{
    is_blank, is_excluded_element, is_paragraph_element, EXCLUDED_ELEMENTS, EXPRESSION_ATTR,
    PLACEHOLDER_CLASS, PLACEHOLDER_TAG,
};
