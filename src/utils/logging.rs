//! 日志工具模块

use tracing_subscriber::EnvFilter;

/// 初始化全局日志
///
/// 默认 info 级别，可用 RUST_LOG 覆盖
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
