//! # 解析器模块
//!
//! 这个模块包含HTML文档解析、DOM操作和序列化的功能，
//! 是区域提取器和渲染引擎共同使用的宿主文档层。

pub mod html;

// Re-export commonly used items for convenience
pub use html::{get_charset, html_to_dom, serialize_document};
