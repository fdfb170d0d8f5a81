use anyhow::Result;
use tracing::warn;

use xkcd_vk_publisher::utils::logging;
use xkcd_vk_publisher::{App, AppError, Config};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // 初始化日志
    logging::init();

    // 加载配置，缺失的必填项在这里直接失败
    let config = Config::from_env()?;

    // 初始化应用
    let app = App::initialize(config)?;

    // 只兜住已知的两类失败：远端业务错误和传输错误，
    // 配置错误和其他意外错误继续向上抛
    if let Err(err) = app.run().await {
        match err {
            AppError::Api(api_err) => warn!("⚠️ 本次发布未完成: {}", api_err),
            other => return Err(other.into()),
        }
    }

    Ok(())
}
