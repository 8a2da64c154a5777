//! 区域提取流水线
//!
//! - `delimiters`: 定界符常量、转义与表达式编码
//! - `placeholder`: 占位符节点的创建与读取
//! - `marker`: 扁平字符串模式（支持转义）
//! - `scanner`: DOM 树模式（跳过 `pre`/`code` 等元素）

pub mod delimiters;
pub mod marker;
pub mod placeholder;
pub mod scanner;

pub use delimiters::{delimit, CLOSE, ESCAPE, OPEN};
pub use marker::{
    mark_in_html_code, mark_in_html_code_with, scan_regions, ExtractedRegion, MarkedCode, Segment,
};
pub use placeholder::{create_placeholder, find_placeholders, is_placeholder, placeholder_expression};
pub use scanner::{mark_in_dom, RegionScanner, ScanStats};
