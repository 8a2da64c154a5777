//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问。配置文件中的值会被这里的环境变量覆盖，
//! 命令行参数又会覆盖环境变量。

use std::env;
use std::fmt;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    /// 只在变量确实被设置时返回值，不使用默认值
    fn get_if_set() -> Option<EnvResult<T>> {
        env::var(Self::NAME).ok().map(|value| Self::parse(&value))
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "MATHMARK_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("warn".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 渲染相关环境变量
pub mod render {
    use super::*;

    /// 是否报告进度
    pub struct ShowProgress;
    impl EnvVar<bool> for ShowProgress {
        const NAME: &'static str = "MATHMARK_SHOW_PROGRESS";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Emit throttled progress notifications while rendering";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 是否让翻译器解析控制词
    pub struct ResolveControlWords;
    impl EnvVar<bool> for ResolveControlWords {
        const NAME: &'static str = "MATHMARK_RESOLVE_CONTROL_WORDS";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Ask the translator to resolve \\controlwords before translating";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 进度通知的最小间隔（毫秒）
    pub struct ProgressIntervalMs;
    impl EnvVar<u64> for ProgressIntervalMs {
        const NAME: &'static str = "MATHMARK_PROGRESS_INTERVAL_MS";
        const DEFAULT: Option<u64> = Some(200);
        const DESCRIPTION: &'static str = "Minimum milliseconds between two progress notifications";

        fn parse(value: &str) -> EnvResult<u64> {
            parse_bounded_u64(value, Self::NAME, 0, 60_000)
        }
    }

    /// 输入翻译时是否逐行处理
    pub struct SplitInput;
    impl EnvVar<bool> for SplitInput {
        const NAME: &'static str = "MATHMARK_SPLIT_INPUT";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Translate each input line as a separate expression";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 输入翻译时是否使用 displaystyle
    pub struct DisplayStyle;
    impl EnvVar<bool> for DisplayStyle {
        const NAME: &'static str = "MATHMARK_DISPLAY_STYLE";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Translate raw input in display style";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 外部翻译器命令
    pub struct TranslatorCommand;
    impl EnvVar<String> for TranslatorCommand {
        const NAME: &'static str = "MATHMARK_TRANSLATOR_COMMAND";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Command line of the external UnicodeMath translator";

        fn parse(value: &str) -> EnvResult<String> {
            if value.trim().is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Translator command cannot be empty".to_string(),
                });
            }
            Ok(value.trim().to_string())
        }
    }
}

fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

fn parse_bounded_u64(value: &str, var_name: &str, min: u64, max: u64) -> EnvResult<u64> {
    let num: u64 = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid non-negative number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

/// 生成环境变量文档
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables Documentation\n\n");

    docs.push_str("## Core Configuration\n\n");
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        core::LogLevel::NAME,
        core::LogLevel::DESCRIPTION,
        "warn"
    ));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        core::NoColor::NAME,
        core::NoColor::DESCRIPTION,
        core::NoColor::DEFAULT
    ));

    docs.push_str("\n## Render Configuration\n\n");
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        render::ShowProgress::NAME,
        render::ShowProgress::DESCRIPTION,
        render::ShowProgress::DEFAULT
    ));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        render::ResolveControlWords::NAME,
        render::ResolveControlWords::DESCRIPTION,
        render::ResolveControlWords::DEFAULT
    ));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        render::ProgressIntervalMs::NAME,
        render::ProgressIntervalMs::DESCRIPTION,
        render::ProgressIntervalMs::DEFAULT
    ));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        render::SplitInput::NAME,
        render::SplitInput::DESCRIPTION,
        render::SplitInput::DEFAULT
    ));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        render::DisplayStyle::NAME,
        render::DisplayStyle::DESCRIPTION,
        render::DisplayStyle::DEFAULT
    ));
    docs.push_str(&format!(
        "- `{}`: {} (default: {:?})\n",
        render::TranslatorCommand::NAME,
        render::TranslatorCommand::DESCRIPTION,
        render::TranslatorCommand::DEFAULT
    ));

    docs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_parsing() {
        assert_eq!(parse_bool("true", "T").unwrap(), true);
        assert_eq!(parse_bool("On", "T").unwrap(), true);
        assert_eq!(parse_bool("0", "T").unwrap(), false);
        assert_eq!(parse_bool("disabled", "T").unwrap(), false);
        assert!(parse_bool("maybe", "T").is_err());
    }

    #[test]
    fn test_numeric_validation() {
        assert_eq!(parse_bounded_u64("200", "T", 0, 1000).unwrap(), 200);
        assert!(parse_bounded_u64("-1", "T", 0, 1000).is_err());
        assert!(parse_bounded_u64("5000", "T", 0, 1000).is_err());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(core::LogLevel::parse("DEBUG").unwrap(), "debug");
        assert!(core::LogLevel::parse("verbose").is_err());
    }

    #[test]
    fn test_translator_command_rejects_blank() {
        assert!(render::TranslatorCommand::parse("   ").is_err());
        assert_eq!(
            render::TranslatorCommand::parse(" umml --json ").unwrap(),
            "umml --json"
        );
    }

    #[test]
    fn test_env_docs_lists_render_variables() {
        let docs = generate_env_docs();
        assert!(docs.contains("MATHMARK_SHOW_PROGRESS"));
        assert!(docs.contains("MATHMARK_TRANSLATOR_COMMAND"));
    }
}
