//! VK API 客户端
//!
//! 封装把照片发上群墙所需的四个调用：
//! photos.getWallUploadServer → 上传 → photos.saveWallPhoto → wall.post

use std::path::Path;

use reqwest::multipart;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::{Config, VK_API_VERSION};
use crate::error::{ApiError, AppError, AppResult, FileError};

/// 上传服务器返回的照片凭据，原样作为登记照片的参数
#[derive(Clone, Debug, Deserialize)]
pub struct UploadedPhoto {
    pub server: i64,
    pub photo: String,
    pub hash: String,
}

/// 已登记到群墙相册的照片
#[derive(Clone, Debug, Deserialize)]
pub struct SavedPhoto {
    pub owner_id: i64,
    pub id: i64,
}

impl SavedPhoto {
    /// wall.post 使用的附件引用，形如 `photo{owner_id}_{id}`
    pub fn attachment_ref(&self) -> String {
        format!("photo{}_{}", self.owner_id, self.id)
    }
}

/// VK API 客户端
pub struct VkClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    group_id: String,
}

impl VkClient {
    /// 创建新的 VK 客户端
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: config.vk_api_base_url.clone(),
            access_token: config.access_token.clone(),
            group_id: config.group_id.clone(),
        }
    }

    /// 获取群墙照片的上传地址
    pub async fn get_wall_upload_server(&self) -> AppResult<String> {
        let endpoint = self.method_url("photos.getWallUploadServer");

        let response = self
            .http
            .get(&endpoint)
            .query(&[
                ("group_id", self.group_id.as_str()),
                ("access_token", self.access_token.as_str()),
                ("v", VK_API_VERSION),
            ])
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint.as_str(), e))?;

        let payload = self.parse_response(&endpoint, response).await?;

        payload
            .get("upload_url")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(AppError::Api(ApiError::EmptyResponse { endpoint }))
    }

    /// 把本地图片文件上传到指定地址
    ///
    /// 上传接口返回的是裸 JSON，没有 response/error 包装
    pub async fn upload_photo(
        &self,
        upload_url: &str,
        file_path: &Path,
    ) -> AppResult<UploadedPhoto> {
        let bytes = tokio::fs::read(file_path).await.map_err(|e| {
            AppError::File(FileError::ReadFailed {
                path: file_path.display().to_string(),
                source: Box::new(e),
            })
        })?;

        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo.png".to_string());

        let form = multipart::Form::new()
            .part("photo", multipart::Part::bytes(bytes).file_name(file_name));

        let response = self
            .http
            .post(upload_url)
            .multipart(form)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| AppError::api_request_failed(upload_url, e))?;

        let uploaded: UploadedPhoto = response
            .json()
            .await
            .map_err(|e| AppError::json_parse_failed(e))?;

        debug!("照片上传完成: server={}", uploaded.server);

        Ok(uploaded)
    }

    /// 把上传好的照片登记到群墙相册
    pub async fn save_wall_photo(&self, uploaded: &UploadedPhoto) -> AppResult<Vec<SavedPhoto>> {
        let endpoint = self.method_url("photos.saveWallPhoto");
        let server = uploaded.server.to_string();

        let response = self
            .http
            .post(&endpoint)
            .query(&[
                ("server", server.as_str()),
                ("photo", uploaded.photo.as_str()),
                ("hash", uploaded.hash.as_str()),
                ("group_id", self.group_id.as_str()),
                ("access_token", self.access_token.as_str()),
                ("v", VK_API_VERSION),
            ])
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint.as_str(), e))?;

        let payload = self.parse_response(&endpoint, response).await?;
        let photos: Vec<SavedPhoto> = serde_json::from_value(payload)?;

        if photos.is_empty() {
            return Err(AppError::Api(ApiError::EmptyResponse { endpoint }));
        }

        Ok(photos)
    }

    /// 以照片附件的形式在群墙发帖
    pub async fn wall_post(
        &self,
        attachments: &str,
        message: &str,
        from_group: bool,
    ) -> AppResult<()> {
        let endpoint = self.method_url("wall.post");
        let owner_id = format!("-{}", self.group_id);
        let from_group = if from_group { "1" } else { "0" };

        let params = [
            ("owner_id", owner_id.as_str()),
            ("from_group", from_group),
            ("attachments", attachments),
            ("message", message),
            ("access_token", self.access_token.as_str()),
            ("v", VK_API_VERSION),
        ];

        let response = self
            .http
            .post(&endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint.as_str(), e))?;

        self.parse_response(&endpoint, response).await?;

        Ok(())
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// 校验 VK 响应并取出 response 载荷
    ///
    /// HTTP 状态码非 2xx → 传输错误；
    /// 响应体带 error 字段 → 业务错误，附带远端的错误码和错误信息；
    /// 既无 error 也无 response → 空结果
    async fn parse_response(
        &self,
        endpoint: &str,
        response: reqwest::Response,
    ) -> AppResult<Value> {
        let response = response
            .error_for_status()
            .map_err(|e| AppError::api_request_failed(endpoint, e))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::json_parse_failed(e))?;

        if let Some(error) = body.get("error") {
            return Err(AppError::Api(ApiError::BadResponse {
                endpoint: endpoint.to_string(),
                code: error.get("error_code").and_then(Value::as_u64),
                message: error
                    .get("error_msg")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }));
        }

        body.get("response")
            .cloned()
            .ok_or_else(|| {
                AppError::Api(ApiError::EmptyResponse {
                    endpoint: endpoint.to_string(),
                })
            })
    }
}
