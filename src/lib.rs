//! # xkcd VK Publisher
//!
//! 随机抓一期 xkcd 漫画并发布到 VK 群墙的小工具
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 裸 API 调用，持有 base_url 和凭据
//! - `XkcdClient` - 漫画元数据
//! - `VkClient` - 上墙的四个调用
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `ComicService` - 拿到一期可发布的漫画
//! - `image_fetcher` - 下载图片，临时文件守卫
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/publish_flow` - 固定的四步发布流程
//!
//! ### ④ 编排层（Orchestration）
//! - `app` - 抽期号、串流程、兜底清理

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::{random_issue, App};
pub use clients::{Comic, SavedPhoto, UploadedPhoto, VkClient, XkcdClient};
pub use config::Config;
pub use error::{ApiError, AppError, AppResult, ConfigError, FileError};
pub use services::{ComicService, FetchedComic, TempImage};
