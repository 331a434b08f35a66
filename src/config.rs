use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 程序配置
///
/// 加载顺序：默认值 → TOML 配置文件（可选）→ 环境变量
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 后端 REST API 地址
    pub api_base_url: String,
    /// 单次请求超时（毫秒）
    pub request_timeout_ms: u64,
    /// 考试状态刷新间隔（毫秒）
    pub tick_interval_ms: u64,
    /// 跳过所有确认提示
    pub assume_yes: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            request_timeout_ms: 10_000,
            tick_interval_ms: 1_000,
            assume_yes: false,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 默认值 + 环境变量
    pub fn from_env() -> Self {
        Self::default().apply_env(env_var)
    }

    /// 读取配置文件（如果有），再用环境变量覆盖
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::from_env());
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        let config = toml::from_str::<Config>(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))?;

        Ok(config.apply_env(env_var))
    }

    /// 用环境变量覆盖已有配置，无法解析的值保持原样
    pub fn apply_env(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_base_url: lookup("LAB_API_BASE_URL").unwrap_or(self.api_base_url),
            request_timeout_ms: parsed(&lookup, "LAB_REQUEST_TIMEOUT_MS")
                .unwrap_or(self.request_timeout_ms),
            tick_interval_ms: parsed(&lookup, "LAB_TICK_INTERVAL_MS")
                .unwrap_or(self.tick_interval_ms),
            assume_yes: parsed(&lookup, "LAB_ASSUME_YES").unwrap_or(self.assume_yes),
            verbose_logging: parsed(&lookup, "VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.parse().ok())
}
