//! 渲染配置管理模块
//!
//! 提供简化的配置管理，支持配置文件、环境变量和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, RenderConfig};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    /// 进度通知的默认最小间隔
    pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

    /// 进度通知间隔的上限（毫秒）
    pub const MAX_PROGRESS_INTERVAL_MS: u64 = 60_000;

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "mathmark.toml",
        ".mathmark.toml",
        "mathmark.json",
        "~/.config/mathmark/config.toml",
        "/etc/mathmark/config.toml",
    ];

    /// 生成示例配置时使用的文件名
    pub const EXAMPLE_CONFIG_FILE: &str = "mathmark.toml";
}

/// 便利函数
pub fn config_file_exists() -> bool {
    constants::CONFIG_PATHS
        .iter()
        .any(|path| std::path::Path::new(shellexpand::tilde(path).as_ref()).exists())
}

/// 加载配置，失败时回退到默认配置
pub fn load_render_config() -> RenderConfig {
    if !config_file_exists() {
        tracing::debug!("未找到配置文件，使用默认值和环境变量");
    }

    match ConfigManager::new() {
        Ok(manager) => manager.into_config(),
        Err(e) => {
            tracing::warn!("配置加载失败，使用默认配置: {}", e);
            RenderConfig::default()
        }
    }
}
