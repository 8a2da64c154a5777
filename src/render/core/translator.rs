//! 翻译器接口
//!
//! 表达式到标记的翻译由外部协作者完成，这里只定义调用约定：
//! 输入表达式和 displaystyle 标志，输出标记片段和诊断信息。
//! 单个表达式翻译失败时翻译器仍返回 `Ok`，并在 `details.error` 中说明，
//! 标记通常是内联的错误提示；只有调用本身失败才返回 `Err`。

use std::collections::BTreeMap;
use std::env;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use markup5ever_rcdom::Handle;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::render::error::helpers::{config_error, translator_error};
use crate::render::error::RenderResult;

/// 一次翻译请求
#[derive(Debug, Clone, Copy)]
pub struct TranslationRequest<'a> {
    pub expression: &'a str,
    pub display_mode: bool,
    pub resolve_control_words: bool,
    pub custom_control_words: Option<&'a BTreeMap<String, String>>,
}

impl<'a> TranslationRequest<'a> {
    pub fn new(expression: &'a str, display_mode: bool) -> Self {
        Self {
            expression,
            display_mode,
            resolve_control_words: false,
            custom_control_words: None,
        }
    }
}

/// 翻译诊断信息
///
/// `intermediates` 和 `measurements` 原样透传给调用者，这里不解释。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationDetails {
    /// 表达式级别的翻译错误
    #[serde(deserialize_with = "deserialize_error")]
    pub error: Option<String>,
    /// 各阶段的中间结果
    pub intermediates: BTreeMap<String, Value>,
    /// 各阶段耗时
    #[serde(deserialize_with = "deserialize_measurements")]
    pub measurements: BTreeMap<String, f64>,
}

/// 翻译器可以用布尔值、字符串或任意 JSON 值报告错误，按真值解释
fn deserialize_error<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let error = match Value::deserialize(deserializer)? {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("translation failed".to_string()),
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        Value::String(message) if message.is_empty() => None,
        Value::String(message) => Some(message),
        other => Some(other.to_string()),
    };

    Ok(error)
}

/// 耗时可以是数字或数字字符串，无法解析的项被丢弃
fn deserialize_measurements<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();

    Ok(raw
        .into_iter()
        .filter_map(|(stage, value)| {
            let measurement = match value {
                Value::Number(number) => number.as_f64(),
                Value::String(text) => text.trim().parse().ok(),
                _ => None,
            }?;
            Some((stage, measurement))
        })
        .collect())
}

/// 翻译结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub markup: String,
    #[serde(default)]
    pub details: TranslationDetails,
}

impl Translation {
    /// 成功的翻译
    pub fn ok(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            details: TranslationDetails::default(),
        }
    }

    /// 表达式翻译失败，`markup` 是内联的错误显示
    pub fn failed(markup: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            details: TranslationDetails {
                error: Some(error.into()),
                ..Default::default()
            },
        }
    }

    pub fn is_error(&self) -> bool {
        self.details.error.is_some()
    }
}

/// 表达式翻译器
pub trait Translator {
    /// 翻译一个表达式
    fn translate(&self, request: &TranslationRequest<'_>) -> RenderResult<Translation>;

    /// 翻译器当前是否可用
    fn is_available(&self) -> bool {
        true
    }
}

impl<T: Translator + ?Sized> Translator for &T {
    fn translate(&self, request: &TranslationRequest<'_>) -> RenderResult<Translation> {
        (**self).translate(request)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

impl<T: Translator + ?Sized> Translator for Box<T> {
    fn translate(&self, request: &TranslationRequest<'_>) -> RenderResult<Translation> {
        (**self).translate(request)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

/// 渲染完成后的排版通知
///
/// 只做通知，不等待结果。
pub trait Typesetter {
    fn typeset(&self, root: &Handle);
}

/// 传给外部翻译器的环境变量
pub const DISPLAY_ENV: &str = "MATHMARK_DISPLAY";
pub const RESOLVE_CONTROL_WORDS_ENV: &str = "MATHMARK_RESOLVE";
pub const CONTROL_WORDS_ENV: &str = "MATHMARK_CONTROL_WORDS";

/// 通过外部进程翻译
///
/// 表达式写入子进程的标准输入，displaystyle 等标志通过环境变量传递，
/// 子进程在标准输出上返回 `{"markup": ..., "details": {...}}` 形式的 JSON。
#[derive(Debug, Clone)]
pub struct ProcessTranslator {
    program: String,
    args: Vec<String>,
}

impl ProcessTranslator {
    /// 从命令行创建，按空白拆分参数
    pub fn new(command_line: &str) -> RenderResult<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| config_error("翻译器命令不能为空"))?;

        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    /// 程序名
    pub fn program(&self) -> &str {
        &self.program
    }

    fn spawn_and_collect(&self, request: &TranslationRequest<'_>) -> RenderResult<Vec<u8>> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .env(DISPLAY_ENV, flag(request.display_mode))
            .env(RESOLVE_CONTROL_WORDS_ENV, flag(request.resolve_control_words))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(words) = request.custom_control_words {
            command.env(CONTROL_WORDS_ENV, serde_json::to_string(words)?);
        }

        let mut child = command
            .spawn()
            .map_err(|e| translator_error(format!("无法启动翻译器 {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(request.expression.as_bytes())
                .map_err(|e| translator_error(format!("写入翻译器输入失败: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| translator_error(format!("等待翻译器失败: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!("翻译器退出异常 ({}): {}", output.status, stderr.trim());
            return Err(translator_error(format!(
                "翻译器退出状态 {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}

impl Translator for ProcessTranslator {
    fn translate(&self, request: &TranslationRequest<'_>) -> RenderResult<Translation> {
        let stdout = self.spawn_and_collect(request)?;

        serde_json::from_slice(&stdout).map_err(|e| {
            translator_error(format!("无法解析翻译器输出: {}", e)).with_context(request.expression)
        })
    }

    fn is_available(&self) -> bool {
        is_executable_on_path(&self.program)
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// 检查程序能否被找到：含路径分隔符时直接检查文件，否则在 `PATH` 中查找
pub fn is_executable_on_path(program: &str) -> bool {
    if program.contains(std::path::MAIN_SEPARATOR) || program.contains('/') {
        return Path::new(program).is_file();
    }

    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}
