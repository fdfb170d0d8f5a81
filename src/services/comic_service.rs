//! 漫画获取能力
//!
//! 只负责"拿到一期可发布的漫画"：元数据加本地图片

use tracing::info;

use crate::clients::XkcdClient;
use crate::config::Config;
use crate::error::AppResult;
use crate::services::image_fetcher::{self, TempImage};

/// 已下载、待发布的一期漫画
#[derive(Debug)]
pub struct FetchedComic {
    /// 期号
    pub issue: u32,
    /// 本地图片，随本结构一起清理
    pub picture: TempImage,
    /// 标题，发帖时作为配文
    pub title: String,
}

/// 漫画获取服务
pub struct ComicService {
    xkcd: XkcdClient,
    http: reqwest::Client,
    image_dir: String,
}

impl ComicService {
    /// 创建新的漫画获取服务
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        Self {
            xkcd: XkcdClient::new(config, http.clone()),
            http,
            image_dir: config.image_dir.clone(),
        }
    }

    /// 查询最新一期的期号，不下载图片
    pub async fn latest_issue(&self) -> AppResult<u32> {
        let comic = self.xkcd.latest_comic().await?;
        Ok(comic.num)
    }

    /// 按期号抓取漫画并下载图片
    pub async fn fetch_comic(&self, issue: u32) -> AppResult<FetchedComic> {
        let comic = self.xkcd.comic_by_issue(issue).await?;

        info!("📥 下载第 {} 期《{}》: {}", comic.num, comic.title, comic.img);

        let path =
            image_fetcher::download_picture(&self.http, &comic.img, None, &self.image_dir).await?;

        Ok(FetchedComic {
            issue: comic.num,
            picture: TempImage::new(path),
            title: comic.title,
        })
    }
}
