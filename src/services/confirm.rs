//! 确认提示
//!
//! 删除、启动/停止、切换自动模式前需要用户确认。

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::config::Config;

/// 确认提示能力
pub trait Confirm: Send + Sync {
    /// 用户同意时返回 `true`
    fn confirm(&self, prompt: &str) -> bool;
}

/// 不询问，全部同意（`--yes`）
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// 在终端询问 `[y/N]`，读取失败视为拒绝
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// 根据配置选择确认方式
pub fn from_config(config: &Config) -> Arc<dyn Confirm> {
    if config.assume_yes {
        Arc::new(AssumeYes)
    } else {
        Arc::new(TerminalConfirm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("nope"));
    }

    #[test]
    fn test_assume_yes_from_config() {
        let config = Config {
            assume_yes: true,
            ..Config::default()
        };
        assert!(from_config(&config).confirm("Are you sure you want to delete this exam?"));
    }
}
