//! xkcd API 客户端
//!
//! 负责抓取漫画元数据：期号、图片地址、标题

use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// 单期漫画的元数据
#[derive(Clone, Debug, Deserialize)]
pub struct Comic {
    /// 期号
    pub num: u32,
    /// 图片地址
    pub img: String,
    /// 标题
    pub title: String,
}

/// xkcd API 客户端
pub struct XkcdClient {
    http: reqwest::Client,
    base_url: String,
}

impl XkcdClient {
    /// 创建新的 xkcd 客户端
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: config.xkcd_api_base_url.clone(),
        }
    }

    /// 获取最新一期漫画的元数据
    pub async fn latest_comic(&self) -> AppResult<Comic> {
        self.fetch_info(format!("{}/info.0.json", self.base_url))
            .await
    }

    /// 按期号获取漫画的元数据
    pub async fn comic_by_issue(&self, issue: u32) -> AppResult<Comic> {
        self.fetch_info(format!("{}/{}/info.0.json", self.base_url, issue))
            .await
    }

    async fn fetch_info(&self, url: String) -> AppResult<Comic> {
        debug!("请求漫画元数据: {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| AppError::api_request_failed(url.as_str(), e))?;

        let comic: Comic = response
            .json()
            .await
            .map_err(|e| AppError::json_parse_failed(e))?;

        Ok(comic)
    }
}
