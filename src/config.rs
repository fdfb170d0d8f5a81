use crate::error::{AppError, AppResult, ConfigError};

/// VK API 版本号，所有方法调用都带上
pub const VK_API_VERSION: &str = "5.102";

const DEFAULT_VK_API_BASE_URL: &str = "https://api.vk.com/method";
const DEFAULT_XKCD_API_BASE_URL: &str = "https://xkcd.com";
const DEFAULT_IMAGE_DIR: &str = "comics";

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// VK 访问令牌
    pub access_token: String,
    /// 目标群组 ID（不带负号）
    pub group_id: String,
    /// 是否以群组名义发帖
    pub post_from_group: bool,
    /// VK API 基础地址
    pub vk_api_base_url: String,
    /// xkcd API 基础地址
    pub xkcd_api_base_url: String,
    /// 漫画图片临时存放目录
    pub image_dir: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 必填项缺失或取值非法时立即返回配置错误，不触碰网络
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            access_token: require_env("VK_ACCESS_TOKEN")?,
            group_id: require_env("VK_GROUP_ID")?,
            post_from_group: flag_env("VK_POST_FROM_GROUP")?,
            vk_api_base_url: std::env::var("VK_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_VK_API_BASE_URL.to_string()),
            xkcd_api_base_url: std::env::var("XKCD_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_XKCD_API_BASE_URL.to_string()),
            image_dir: std::env::var("IMAGE_DIR").unwrap_or_else(|_| DEFAULT_IMAGE_DIR.to_string()),
        })
    }
}

/// 读取必填环境变量，缺失或为空白都视为未配置
fn require_env(var_name: &str) -> AppResult<String> {
    match std::env::var(var_name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::env_var_not_found(var_name)),
    }
}

/// 读取开关型环境变量，未设置时默认关闭
fn flag_env(var_name: &str) -> AppResult<bool> {
    match std::env::var(var_name) {
        Err(_) => Ok(false),
        Ok(value) => match value.trim() {
            "1" | "true" => Ok(true),
            "0" | "false" | "" => Ok(false),
            other => Err(AppError::Config(ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value: other.to_string(),
                expected_type: "bool".to_string(),
            })),
        },
    }
}
