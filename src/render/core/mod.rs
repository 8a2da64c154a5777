//! 渲染系统核心模块
//!
//! - **翻译器接口** (`translator.rs`): 外部翻译器和排版器的调用约定，以及基于子进程的翻译器
//! - **进度报告** (`progress.rs`): 节流后的进度事件
//! - **引擎** (`engine.rs`): 占位符渲染循环
//!
//! ```text
//! RenderEngine (engine.rs)
//!     ├── Translator / Typesetter (translator.rs)
//!     ├── ProgressTracker (progress.rs)
//!     └── RenderCache (storage/cache.rs)
//! ```

pub mod engine;
pub mod progress;
pub mod translator;

pub use engine::{infer_display_mode, RenderEngine, RenderHooks, RenderReport};
pub use progress::{ProgressEvent, ProgressTracker};
pub use translator::{
    ProcessTranslator, Translation, TranslationDetails, TranslationRequest, Translator, Typesetter,
};
