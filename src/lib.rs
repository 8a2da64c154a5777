//! # Mathmark Library
//!
//! 在 HTML 文档中查找 `⁅…⁆` 定界的 UnicodeMath 区域，替换为占位符，
//! 再通过外部翻译器把每个表达式渲染为数学标记。
//!
//! ## 模块组织
//!
//! - `core` - 文档级处理流程（解码、标记、渲染、序列化）
//! - `env` - 类型化的环境变量
//! - `parsers` - HTML 解析与 DOM 操作
//! - `render` - 区域提取和渲染引擎

pub mod core;
pub mod env;
pub mod parsers;
pub mod render;

// Re-export commonly used items for convenience
pub use self::core::*;
pub use parsers::*;
