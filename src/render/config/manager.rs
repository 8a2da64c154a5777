//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::render::error::{RenderError, RenderResult};

/// 渲染配置
///
/// 以显式值的形式传入提取器和渲染引擎，不存在进程级的全局配置。
/// 前置/后置回调不可序列化，单独放在 `RenderHooks` 中。
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// 渲染期间发送节流后的进度通知
    pub show_progress: bool,
    /// 原样转交给翻译器，这里不解释
    pub resolve_control_words: bool,
    /// 原样转交给翻译器的自定义控制词
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_control_words: Option<BTreeMap<String, String>>,
    /// 两次进度通知之间的最小间隔
    pub progress_interval_ms: u64,

    // 输入翻译（playground）相关
    pub split_input: bool,
    pub display_style: bool,

    /// 外部翻译器命令行
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translator_command: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            resolve_control_words: false,
            custom_control_words: None,
            progress_interval_ms: constants::DEFAULT_PROGRESS_INTERVAL.as_millis() as u64,
            split_input: false,
            display_style: false,
            translator_command: None,
        }
    }
}

impl RenderConfig {
    /// 验证配置
    pub fn validate(&self) -> RenderResult<()> {
        if self.progress_interval_ms > constants::MAX_PROGRESS_INTERVAL_MS {
            return Err(RenderError::ConfigError(format!(
                "进度通知间隔不能超过 {} 毫秒",
                constants::MAX_PROGRESS_INTERVAL_MS
            )));
        }

        if let Some(command) = &self.translator_command {
            if command.trim().is_empty() {
                return Err(RenderError::ConfigError("翻译器命令不能为空".to_string()));
            }
        }

        if let Some(words) = &self.custom_control_words {
            if words.keys().any(|word| word.is_empty()) {
                return Err(RenderError::ConfigError("自定义控制词不能为空".to_string()));
            }
        }

        Ok(())
    }

    /// 应用环境变量覆盖
    ///
    /// 只有确实设置了的变量才会覆盖；无法解析的值被忽略并记录警告。
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{render, EnvVar};

        match render::ShowProgress::get_if_set() {
            Some(Ok(value)) => self.show_progress = value,
            Some(Err(e)) => tracing::warn!("{}", e),
            None => {}
        }

        match render::ResolveControlWords::get_if_set() {
            Some(Ok(value)) => self.resolve_control_words = value,
            Some(Err(e)) => tracing::warn!("{}", e),
            None => {}
        }

        match render::ProgressIntervalMs::get_if_set() {
            Some(Ok(value)) => self.progress_interval_ms = value,
            Some(Err(e)) => tracing::warn!("{}", e),
            None => {}
        }

        match render::SplitInput::get_if_set() {
            Some(Ok(value)) => self.split_input = value,
            Some(Err(e)) => tracing::warn!("{}", e),
            None => {}
        }

        match render::DisplayStyle::get_if_set() {
            Some(Ok(value)) => self.display_style = value,
            Some(Err(e)) => tracing::warn!("{}", e),
            None => {}
        }

        match render::TranslatorCommand::get_if_set() {
            Some(Ok(command)) => {
                tracing::info!("环境变量覆盖翻译器命令: {}", command);
                self.translator_command = Some(command);
            }
            Some(Err(e)) => tracing::warn!("{}", e),
            None => {}
        }
    }

    /// 进度通知间隔
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}

/// 简化的配置管理器
pub struct ConfigManager {
    config: RenderConfig,
}

impl ConfigManager {
    /// 创建新的配置管理器：配置文件 → 环境变量 → 验证
    pub fn new() -> RenderResult<Self> {
        let mut config = Self::load_config()?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 从指定文件创建配置管理器，同样应用环境变量覆盖
    pub fn from_file(path: &str) -> RenderResult<Self> {
        Self::load_dotenv();

        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 获取配置
    pub fn get_config(&self) -> &RenderConfig {
        &self.config
    }

    /// 取出配置
    pub fn into_config(self) -> RenderConfig {
        self.config
    }

    /// 从文件加载配置
    fn load_config() -> RenderResult<RenderConfig> {
        Self::load_dotenv();

        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                return Self::load_from_file(&expanded_path);
            }
        }

        tracing::debug!("未找到配置文件，使用默认配置");
        Ok(RenderConfig::default())
    }

    /// 从指定文件加载配置
    fn load_from_file(path: &str) -> RenderResult<RenderConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RenderError::ConfigError(format!("读取配置文件失败: {}", e)))?;

        parse_config(path, &content)
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &str) -> RenderResult<()> {
        let config = RenderConfig::default();
        let content = toml::to_string_pretty(&config)?;

        std::fs::write(path, content)
            .map_err(|e| RenderError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}

/// 按扩展名解析配置内容：`.json` 使用 JSON，其余按 TOML 处理
pub fn parse_config(path: &str, content: &str) -> RenderResult<RenderConfig> {
    if path.ends_with(".json") {
        serde_json::from_str(content)
            .map_err(|e| RenderError::ConfigError(format!("解析JSON配置失败: {}", e)))
    } else {
        toml::from_str(content)
            .map_err(|e| RenderError::ConfigError(format!("解析TOML配置失败: {}", e)))
    }
}
