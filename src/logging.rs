//! 诊断日志
//!
//! 面向用户的进度与报告走stdout；这里的tracing输出只写stderr，由 `RUST_LOG` 控制。

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// 未设置 `RUST_LOG` 时使用的过滤规则
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "mealplan_rs=info,warn" } else { "warn" }
}

/// 初始化tracing订阅者，进程内只应调用一次
///
/// ```bash
/// RUST_LOG=mealplan_rs=debug mealplan-rs "San Diego"
/// ```
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "warn");
        assert!(default_directive(true).contains("mealplan_rs=info"));
    }
}
