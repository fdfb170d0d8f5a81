use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use xkcd_vk_publisher::services::image_fetcher::download_picture;
use xkcd_vk_publisher::{
    random_issue, ApiError, App, AppError, Config, ConfigError, VkClient, XkcdClient,
};

/// 构造指向 mock 服务器的配置
fn test_config(xkcd_uri: &str, vk_uri: &str, image_dir: &str) -> Config {
    Config {
        access_token: "test-token".to_string(),
        group_id: "111222".to_string(),
        post_from_group: true,
        vk_api_base_url: format!("{}/method", vk_uri),
        xkcd_api_base_url: xkcd_uri.to_string(),
        image_dir: image_dir.to_string(),
    }
}

/// 每个测试独享的临时目录
fn unique_image_dir(tag: &str) -> String {
    std::env::temp_dir()
        .join(format!("xkcd_vk_publisher_{}_{}", tag, std::process::id()))
        .display()
        .to_string()
}

/// 挂好整套 xkcd mock：最新期、任意期号、图片内容
async fn mount_xkcd_mocks(server: &MockServer, latest: u32, issue: u32, image_body: &[u8]) {
    Mock::given(method("GET"))
        .and(path("/info.0.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "num": latest,
            "img": format!("{}/comics/latest.png", server.uri()),
            "title": "Latest"
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/\d+/info\.0\.json$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "num": issue,
            "img": format!("{}/comics/issue_{}.png", server.uri(), issue),
            "title": "Test Comic"
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/comics/issue_{}.png", issue)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(image_body.to_vec()))
        .mount(server)
        .await;
}

/// 挂好整套 VK mock，wall.post 的应答由调用方指定
///
/// 每一步的匹配条件都要求带上上一步应答里的数据，
/// 串联断了 mock 就不命中，对应的 expect(1) 会失败
async fn mount_vk_mocks(server: &MockServer, wall_post_response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/method/photos.getWallUploadServer"))
        .and(query_param("group_id", "111222"))
        .and(query_param("access_token", "test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": { "upload_url": format!("{}/upload/photo-42", server.uri()) }
        })))
        .expect(1)
        .named("photos.getWallUploadServer")
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/upload/photo-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "server": 885022,
            "photo": "photo-blob",
            "hash": "abc123hash"
        })))
        .expect(1)
        .named("upload")
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/method/photos.saveWallPhoto"))
        .and(query_param("server", "885022"))
        .and(query_param("photo", "photo-blob"))
        .and(query_param("hash", "abc123hash"))
        .and(query_param("group_id", "111222"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": [{ "owner_id": -111222, "id": 777 }]
        })))
        .expect(1)
        .named("photos.saveWallPhoto")
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/method/wall.post"))
        .and(body_string_contains("attachments=photo-111222_777"))
        .and(body_string_contains("owner_id=-111222"))
        .and(body_string_contains("from_group=1"))
        .respond_with(wall_post_response)
        .expect(1)
        .named("wall.post")
        .mount(server)
        .await;
}

#[test]
fn random_issue_stays_in_range() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let issue = random_issue(&mut rng, 10);
        assert!((1..=10).contains(&issue), "抽取结果 {} 越界", issue);
    }

    // 上下边界：latest 为 1 时只能抽到第 1 期
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        assert_eq!(random_issue(&mut rng, 1), 1);
    }

    // 退化情况：latest 为 0 也不会崩
    let mut rng = StdRng::seed_from_u64(7);
    assert_eq!(random_issue(&mut rng, 0), 1);
}

#[test]
fn config_from_env_requires_token_and_group() {
    // 环境变量是进程级的，相关断言集中在一个测试里串行执行
    std::env::remove_var("VK_ACCESS_TOKEN");
    std::env::remove_var("VK_GROUP_ID");
    std::env::remove_var("VK_POST_FROM_GROUP");

    let err = Config::from_env().expect_err("缺少必填项应当报错");
    assert!(matches!(
        err,
        AppError::Config(ConfigError::EnvVarNotFound { .. })
    ));

    std::env::set_var("VK_ACCESS_TOKEN", "token");
    match Config::from_env().expect_err("缺少群组 ID 应当报错") {
        AppError::Config(ConfigError::EnvVarNotFound { var_name }) => {
            assert_eq!(var_name, "VK_GROUP_ID")
        }
        other => panic!("意外的错误类型: {}", other),
    }

    std::env::set_var("VK_GROUP_ID", "111222");
    let config = Config::from_env().expect("必填项齐全应当成功");
    assert_eq!(config.access_token, "token");
    assert_eq!(config.group_id, "111222");
    assert!(!config.post_from_group);

    std::env::set_var("VK_POST_FROM_GROUP", "1");
    assert!(Config::from_env().unwrap().post_from_group);

    std::env::set_var("VK_POST_FROM_GROUP", "maybe");
    let err = Config::from_env().expect_err("非法开关值应当报错");
    assert!(matches!(
        err,
        AppError::Config(ConfigError::EnvVarParseFailed { .. })
    ));

    std::env::remove_var("VK_ACCESS_TOKEN");
    std::env::remove_var("VK_GROUP_ID");
    std::env::remove_var("VK_POST_FROM_GROUP");
}

#[tokio::test]
async fn download_picture_writes_url_named_file() {
    let server = MockServer::start().await;
    let body = b"\x89PNG fake image data".to_vec();

    Mock::given(method("GET"))
        .and(path("/comics/5.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let image_dir = unique_image_dir("download");
    let url = format!("{}/comics/5.png", server.uri());
    let picture_path = download_picture(&reqwest::Client::new(), &url, None, &image_dir)
        .await
        .expect("下载应当成功");

    assert!(picture_path.to_string_lossy().ends_with("5.png"));
    assert_eq!(std::fs::read(&picture_path).unwrap(), body);

    std::fs::remove_dir_all(&image_dir).ok();
}

#[tokio::test]
async fn http_failure_is_a_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/404/info.0.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = test_config(&server.uri(), "http://vk.invalid", "unused");
    let xkcd = XkcdClient::new(&config, reqwest::Client::new());

    let err = xkcd.comic_by_issue(404).await.expect_err("404 应当报错");
    assert!(matches!(
        err,
        AppError::Api(ApiError::RequestFailed { .. })
    ));
}

#[tokio::test]
async fn vk_error_envelope_becomes_bad_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/method/photos.getWallUploadServer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": { "error_code": 5, "error_msg": "User authorization failed" }
        })))
        .mount(&server)
        .await;

    let config = test_config("http://xkcd.invalid", &server.uri(), "unused");
    let vk = VkClient::new(&config, reqwest::Client::new());

    match vk
        .get_wall_upload_server()
        .await
        .expect_err("应当返回业务错误")
    {
        AppError::Api(ApiError::BadResponse { code, message, .. }) => {
            assert_eq!(code, Some(5));
            assert_eq!(message.as_deref(), Some("User authorization failed"));
        }
        other => panic!("意外的错误类型: {}", other),
    }
}

#[tokio::test]
async fn publish_flow_runs_in_order_and_cleans_up() {
    let xkcd_server = MockServer::start().await;
    let vk_server = MockServer::start().await;
    let image_dir = unique_image_dir("e2e_ok");

    mount_xkcd_mocks(&xkcd_server, 10, 7, b"fake png bytes").await;
    mount_vk_mocks(
        &vk_server,
        ResponseTemplate::new(200).set_body_json(json!({ "response": { "post_id": 1 } })),
    )
    .await;

    let config = test_config(&xkcd_server.uri(), &vk_server.uri(), &image_dir);
    let app = App::initialize(config).expect("初始化应当成功");

    let mut rng = StdRng::seed_from_u64(7);
    app.run_with_rng(&mut rng).await.expect("发布流程应当成功");

    // 四个调用按固定顺序各发生一次
    let requests = vk_server.received_requests().await.unwrap();
    let paths: Vec<_> = requests
        .iter()
        .map(|request| request.url.path().to_string())
        .collect();
    assert_eq!(
        paths,
        vec![
            "/method/photos.getWallUploadServer",
            "/upload/photo-42",
            "/method/photos.saveWallPhoto",
            "/method/wall.post",
        ]
    );

    // 临时图片已删除
    assert!(!Path::new(&image_dir).join("issue_7.png").exists());

    std::fs::remove_dir_all(&image_dir).ok();
}

#[tokio::test]
async fn publish_flow_cleans_up_when_wall_post_fails() {
    let xkcd_server = MockServer::start().await;
    let vk_server = MockServer::start().await;
    let image_dir = unique_image_dir("e2e_err");

    mount_xkcd_mocks(&xkcd_server, 10, 7, b"fake png bytes").await;
    mount_vk_mocks(
        &vk_server,
        ResponseTemplate::new(200).set_body_json(json!({
            "error": { "error_code": 214, "error_msg": "Access to adding post denied" }
        })),
    )
    .await;

    let config = test_config(&xkcd_server.uri(), &vk_server.uri(), &image_dir);
    let app = App::initialize(config).expect("初始化应当成功");

    let mut rng = StdRng::seed_from_u64(7);
    match app
        .run_with_rng(&mut rng)
        .await
        .expect_err("发帖被拒应当报错")
    {
        AppError::Api(ApiError::BadResponse { code, .. }) => assert_eq!(code, Some(214)),
        other => panic!("意外的错误类型: {}", other),
    }

    // 发布失败时临时图片同样被删除
    assert!(!Path::new(&image_dir).join("issue_7.png").exists());

    std::fs::remove_dir_all(&image_dir).ok();
}
