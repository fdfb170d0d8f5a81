//! 图片下载与临时文件管理

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{AppError, AppResult, FileError};

/// 下载图片到本地
///
/// # 参数
/// - `http`: HTTP 客户端
/// - `url`: 图片地址
/// - `picture_name`: 文件名，缺省时取 URL 最后一段
/// - `image_dir`: 存放目录，不存在时自动创建
///
/// # 返回
/// 返回本地文件路径
pub async fn download_picture(
    http: &reqwest::Client,
    url: &str,
    picture_name: Option<&str>,
    image_dir: &str,
) -> AppResult<PathBuf> {
    let response = http
        .get(url)
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .map_err(|e| AppError::api_request_failed(url, e))?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::api_request_failed(url, e))?;

    let dir = Path::new(image_dir);
    if !image_dir.is_empty() {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            AppError::File(FileError::CreateDirFailed {
                path: image_dir.to_string(),
                source: Box::new(e),
            })
        })?;
    }

    let name = picture_name.unwrap_or_else(|| picture_name_from_url(url));
    let picture_path = dir.join(name);

    tokio::fs::write(&picture_path, &bytes).await.map_err(|e| {
        AppError::File(FileError::WriteFailed {
            path: picture_path.display().to_string(),
            source: Box::new(e),
        })
    })?;

    debug!("图片已保存: {}", picture_path.display());

    Ok(picture_path)
}

/// 从 URL 中取出文件名
pub fn picture_name_from_url(url: &str) -> &str {
    url.rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("comic.png")
}

/// 临时图片文件的作用域守卫
///
/// 值被丢弃时删除对应文件，发布成功失败都不例外
#[derive(Debug)]
pub struct TempImage {
    path: PathBuf,
}

impl TempImage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempImage {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("已清理临时图片: {}", self.path.display()),
            Err(e) => warn!("⚠️ 清理临时图片失败 ({}): {}", self.path.display(), e),
        }
    }
}
