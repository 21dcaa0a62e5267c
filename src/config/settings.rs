// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// 论坛根地址
pub const DEFAULT_FORUM_BASE_URL: &str = "https://forums.studentdoctor.net";

/// 各学年的学校字母索引帖
pub const DEFAULT_DIRECTORY_URLS: [(&str, &str); 4] = [
    (
        "2021-2022",
        "https://forums.studentdoctor.net/threads/2021-2022-alphabetical-listing-of-schools.1440875/",
    ),
    (
        "2020-2021",
        "https://forums.studentdoctor.net/threads/2020-2021-alphabetical-listing-of-schools.1406109/",
    ),
    (
        "2019-2020",
        "https://forums.studentdoctor.net/threads/2019-2020-alphabetical-listing-of-schools.1374208/",
    ),
    (
        "2018-2019",
        "https://forums.studentdoctor.net/threads/2018-2019-all-school-discussions-alphabetical-list.1350681/",
    ),
];

/// 应用程序配置设置
///
/// 包含服务器、论坛、爬取和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 论坛配置
    pub forum: ForumSettings,
    /// 爬取配置
    pub crawl: CrawlSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 论坛配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ForumSettings {
    /// 论坛根地址，用于补全相对链接
    pub base_url: String,
    /// 学年标签 -> 字母索引帖URL
    #[serde(default)]
    pub directory_urls: HashMap<String, String>,
}

impl Default for ForumSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FORUM_BASE_URL.to_string(),
            directory_urls: default_directory_urls(),
        }
    }
}

/// 爬取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSettings {
    /// 同时爬取的学校数
    pub school_concurrency: usize,
    /// ALL 模式下单个学校同时抓取的页面数
    pub page_concurrency: usize,
    /// 单次请求超时时间（秒）
    pub request_timeout_secs: u64,
    /// 最大重试次数
    pub max_retries: u32,
    /// 初始退避时间（毫秒）
    pub initial_backoff_ms: u64,
    /// 最大退避时间（毫秒）
    pub max_backoff_ms: u64,
    /// 单次查询允许的最大学校数
    pub max_requested_schools: usize,
    /// 请求使用的 User-Agent
    pub user_agent: String,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            school_concurrency: 4,
            page_concurrency: 4,
            request_timeout_secs: 30,
            max_retries: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 10_000,
            max_requested_schools: 10,
            user_agent: "Mozilla/5.0 (compatible; threadsift/0.1)".to_string(),
        }
    }
}

impl CrawlSettings {
    /// 单次请求超时
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 导出器监听地址
    pub listen_addr: String,
}

/// 默认的学年索引表
pub fn default_directory_urls() -> HashMap<String, String> {
    DEFAULT_DIRECTORY_URLS
        .iter()
        .map(|(year, url)| (year.to_string(), url.to_string()))
        .collect()
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从配置文件和环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let crawl = CrawlSettings::default();
        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Forum
            .set_default("forum.base_url", DEFAULT_FORUM_BASE_URL)?
            .set_default("forum.directory_urls", default_directory_urls())?
            // Crawl
            .set_default("crawl.school_concurrency", crawl.school_concurrency as u64)?
            .set_default("crawl.page_concurrency", crawl.page_concurrency as u64)?
            .set_default("crawl.request_timeout_secs", crawl.request_timeout_secs)?
            .set_default("crawl.max_retries", crawl.max_retries as u64)?
            .set_default("crawl.initial_backoff_ms", crawl.initial_backoff_ms)?
            .set_default("crawl.max_backoff_ms", crawl.max_backoff_ms)?
            .set_default(
                "crawl.max_requested_schools",
                crawl.max_requested_schools as u64,
            )?
            .set_default("crawl.user_agent", crawl.user_agent)?
            // Metrics
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("THREADSIFT").separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
