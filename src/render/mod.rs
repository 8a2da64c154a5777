//! 渲染模块
//!
//! 查找 `⁅…⁆` 区域、替换为占位符，再把每个占位符交给翻译器渲染：
//! - **pipeline**: 区域提取（扁平字符串模式与 DOM 树模式）
//! - **core**: 翻译器接口、进度报告和渲染引擎
//! - **storage**: 单次渲染内的缓存
//! - **config**: 配置管理
//! - **error**: 错误处理
//! - **batch**: 原始输入翻译
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use mathmark::render::{render_unicodemath, ProcessTranslator, RenderConfig};
//!
//! # async fn example(root: markup5ever_rcdom::Handle) -> Result<(), Box<dyn std::error::Error>> {
//! let translator = ProcessTranslator::new("unicodemathml --json")?;
//! let report = render_unicodemath(&root, translator, RenderConfig::default(), None).await?;
//! println!("渲染了 {} 个表达式", report.processed);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod storage;

use markup5ever_rcdom::Handle;
use tokio::sync::mpsc::UnboundedSender;

pub use batch::{translate_input, InputTranslation, MeasurementTally, TranslatedItem};
pub use config::{ConfigManager, RenderConfig};
pub use self::core::{
    ProcessTranslator, ProgressEvent, RenderEngine, RenderHooks, RenderReport, Translation,
    TranslationDetails, TranslationRequest, Translator, Typesetter,
};
pub use error::{RenderError, RenderResult};
pub use pipeline::{mark_in_dom, mark_in_html_code, mark_in_html_code_with, MarkedCode, ScanStats};

/// 标记并渲染根节点下的所有区域
pub async fn render_unicodemath<T: Translator>(
    root: &Handle,
    translator: T,
    config: RenderConfig,
    progress: Option<UnboundedSender<ProgressEvent>>,
) -> RenderResult<RenderReport> {
    config.validate()?;

    let stats = mark_in_dom(root);
    tracing::debug!("标记了 {} 个区域", stats.placeholders_created);

    RenderEngine::new(translator, config)
        .render_marked(root, progress)
        .await
}

/// 模块版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

