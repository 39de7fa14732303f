use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::EnvConfig;

/// 日志配置
pub struct LoggingConfig;

impl LoggingConfig {
    /// 初始化日志系统
    ///
    /// 支持通过环境变量配置：
    /// - RUST_LOG: 设置日志级别（error, warn, info, debug, trace）
    /// - BRAINFLOW_DEBUG: 启用详细调试输出
    ///
    /// 使用示例：
    /// ```no_run
    /// use brainflow::utils::LoggingConfig;
    ///
    /// fn main() {
    ///     LoggingConfig::init();
    /// }
    /// ```
    pub fn init() {
        let is_debug = Self::is_debug();

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(Self::fallback_filter(is_debug)));

        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(is_debug)
            .with_file(is_debug)
            .with_line_number(is_debug)
            .with_thread_ids(is_debug);

        // 测试或嵌入方可能已经装好了订阅者
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();

        if is_debug {
            tracing::debug!("调试模式已启用");
        }
    }

    /// 初始化日志系统（带自定义过滤器）
    pub fn init_with_filter(filter: &str) {
        let _ = tracing_subscriber::registry()
            .with(EnvFilter::new(filter))
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init();
    }

    /// 检查是否启用调试模式
    pub fn is_debug() -> bool {
        EnvConfig::is_debug_mode()
    }

    fn fallback_filter(is_debug: bool) -> &'static str {
        if is_debug {
            "brainflow=debug,info"
        } else {
            "brainflow=info,warn"
        }
    }
}
