use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::clients::VkClient;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::ComicService;
use crate::workflow;

/// 应用主结构
pub struct App {
    config: Config,
    comics: ComicService,
    vk: VkClient,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Other(format!("HTTP 客户端初始化失败: {}", e)))?;

        let comics = ComicService::new(&config, http.clone());
        let vk = VkClient::new(&config, http);

        Ok(Self { config, comics, vk })
    }

    /// 运行一次完整的"抽取并发布"流程
    pub async fn run(&self) -> AppResult<()> {
        let mut rng = StdRng::from_entropy();
        self.run_with_rng(&mut rng).await
    }

    /// 用指定随机源运行，便于固定抽取结果
    pub async fn run_with_rng<R: Rng>(&self, rng: &mut R) -> AppResult<()> {
        log_startup(&self.config);

        let latest = self.comics.latest_issue().await?;
        let issue = random_issue(rng, latest);
        info!("🎲 共 {} 期，抽中第 {} 期", latest, issue);

        let comic = self.comics.fetch_comic(issue).await?;

        // comic 里的临时图片在本函数返回时删除，发布成败都一样
        let result = workflow::publish_picture(
            &self.vk,
            comic.picture.path(),
            &comic.title,
            self.config.post_from_group,
        )
        .await;

        if result.is_ok() {
            log_published(&comic.title);
        }

        result
    }
}

/// 在 [1, latest] 中等概率抽一期，latest 为 0 时退化为第 1 期
pub fn random_issue<R: Rng>(rng: &mut R, latest: u32) -> u32 {
    rng.gen_range(1..=latest.max(1))
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 随机漫画发布模式");
    info!("📌 目标群组: {}", config.group_id);
    info!("{}", "=".repeat(60));
}

fn log_published(title: &str) {
    info!("✅ 漫画《{}》已发布到群墙", title);
}
