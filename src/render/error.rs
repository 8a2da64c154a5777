//! 渲染模块统一错误处理
//!
//! 提供结构化错误类型和错误处理机制。
//!
//! 注意单个表达式的翻译失败**不是**这里的错误：翻译器通过
//! `TranslationDetails::error` 报告，渲染循环只计数并继续。
//! 这里的错误都会中止当前操作。

use std::fmt;

use thiserror::Error;

use crate::core::MathmarkError;

/// 渲染错误类型
#[derive(Error, Debug, Clone)]
pub enum RenderError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 输入验证错误
    #[error("输入无效: {0}")]
    InvalidInput(String),

    /// 翻译器调用本身失败（不是表达式的翻译错误）
    #[error("翻译器错误: {0}")]
    TranslatorError(String),

    /// 宿主文档操作错误
    #[error("文档操作错误: {0}")]
    DocumentError(String),

    /// IO错误
    #[error("IO错误: {0}")]
    IoError(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerializationError(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl RenderError {
    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RenderError::ConfigError(_) => ErrorSeverity::Critical,
            RenderError::InvalidInput(_) => ErrorSeverity::Info,
            RenderError::TranslatorError(_) => ErrorSeverity::Error,
            RenderError::DocumentError(_) => ErrorSeverity::Error,
            RenderError::IoError(_) => ErrorSeverity::Warning,
            RenderError::ParseError(_) => ErrorSeverity::Error,
            RenderError::SerializationError(_) => ErrorSeverity::Error,
            RenderError::InternalError(_) => ErrorSeverity::Critical,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            RenderError::ConfigError(_) => ErrorCategory::Configuration,
            RenderError::InvalidInput(_) => ErrorCategory::Input,
            RenderError::TranslatorError(_) => ErrorCategory::Translator,
            RenderError::DocumentError(_) => ErrorCategory::Document,
            RenderError::IoError(_) => ErrorCategory::Io,
            RenderError::ParseError(_) => ErrorCategory::Parsing,
            RenderError::SerializationError(_) => ErrorCategory::Serialization,
            RenderError::InternalError(_) => ErrorCategory::Internal,
        }
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(mut self, context: T) -> Self {
        let new_msg = match &self {
            RenderError::ConfigError(msg)
            | RenderError::InvalidInput(msg)
            | RenderError::TranslatorError(msg)
            | RenderError::DocumentError(msg)
            | RenderError::IoError(msg)
            | RenderError::ParseError(msg)
            | RenderError::SerializationError(msg)
            | RenderError::InternalError(msg) => format!("{} (上下文: {})", msg, context),
        };

        match &mut self {
            RenderError::ConfigError(msg)
            | RenderError::InvalidInput(msg)
            | RenderError::TranslatorError(msg)
            | RenderError::DocumentError(msg)
            | RenderError::IoError(msg)
            | RenderError::ParseError(msg)
            | RenderError::SerializationError(msg)
            | RenderError::InternalError(msg) => *msg = new_msg,
        }

        self
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Translator,
    Document,
    Io,
    Parsing,
    Serialization,
    Internal,
}

/// 从MathmarkError转换
impl From<MathmarkError> for RenderError {
    fn from(error: MathmarkError) -> Self {
        RenderError::DocumentError(error.to_string())
    }
}

/// 转换为MathmarkError
impl From<RenderError> for MathmarkError {
    fn from(error: RenderError) -> Self {
        MathmarkError::new(&error.to_string())
    }
}

impl From<std::io::Error> for RenderError {
    fn from(error: std::io::Error) -> Self {
        RenderError::IoError(error.to_string())
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(error: serde_json::Error) -> Self {
        RenderError::SerializationError(format!("JSON序列化错误: {}", error))
    }
}

impl From<toml::de::Error> for RenderError {
    fn from(error: toml::de::Error) -> Self {
        RenderError::ParseError(format!("TOML解析错误: {}", error))
    }
}

impl From<toml::ser::Error> for RenderError {
    fn from(error: toml::ser::Error) -> Self {
        RenderError::SerializationError(format!("TOML序列化错误: {}", error))
    }
}

/// 错误结果类型别名
pub type RenderResult<T> = Result<T, RenderError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 记录并返回错误
    pub fn log_error<T>(error: RenderError) -> RenderResult<T> {
        match error.severity() {
            ErrorSeverity::Info => tracing::info!("渲染信息: {}", error),
            ErrorSeverity::Warning => tracing::warn!("渲染警告: {}", error),
            ErrorSeverity::Error => tracing::error!("渲染错误: {}", error),
            ErrorSeverity::Critical => tracing::error!("渲染严重错误: {}", error),
        }

        Err(error)
    }

    /// 创建配置错误
    pub fn config_error<T: fmt::Display>(msg: T) -> RenderError {
        RenderError::ConfigError(msg.to_string())
    }

    /// 创建翻译器错误
    pub fn translator_error<T: fmt::Display>(msg: T) -> RenderError {
        RenderError::TranslatorError(msg.to_string())
    }
}
