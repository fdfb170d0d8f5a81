//! 发布流程 - 流程层
//!
//! 核心职责：定义"一张图片发上群墙"的固定四步流程
//!
//! 流程顺序：
//! 1. 获取上传服务器
//! 2. 上传图片
//! 3. 登记群墙照片
//! 4. 带附件发帖

use std::path::Path;

use tracing::info;

use crate::clients::VkClient;
use crate::error::AppResult;

/// 把本地图片作为照片附件发到群墙
///
/// 每一步的输出都是下一步的输入，任何一步失败即整体失败
pub async fn publish_picture(
    vk: &VkClient,
    picture_path: &Path,
    message: &str,
    from_group: bool,
) -> AppResult<()> {
    info!("🔗 获取上传服务器...");
    let upload_url = vk.get_wall_upload_server().await?;

    info!("⬆️ 上传图片: {}", picture_path.display());
    let uploaded = vk.upload_photo(&upload_url, picture_path).await?;

    let saved = vk.save_wall_photo(&uploaded).await?;
    let attachments = saved
        .iter()
        .map(|photo| photo.attachment_ref())
        .collect::<Vec<_>>()
        .join(",");

    info!("📝 发帖，附件: {}", attachments);
    vk.wall_post(&attachments, message, from_group).await?;

    Ok(())
}
