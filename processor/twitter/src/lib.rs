//! Twitter 推文富化规则
//!
//! 从消息中提取推文 ID，用 OAuth 1.0a 签名请求 statuses/show 接口，
//! 输出作者、相对时间和正文。
//!
//! # 模块结构
//!
//! - [`auth`] - OAuth 1.0a 签名
//! - [`models`] - 接口响应结构
//! - [`utils`] - 文本清理与格式化

use chrono::Utc;
use regex::Regex;
use std::sync::OnceLock;

use common::{EnrichmentRule, FetchRequest, ProcessorError, ProcessorResultType};

pub mod auth;
pub mod models;
pub mod utils;

pub use auth::{Credentials, Signer};
pub use models::Status;

static TWITTER_REGEX: OnceLock<Regex> = OnceLock::new();

const API_BASE_URL: &str = "https://api.twitter.com";

/// 推文富化规则
pub struct TwitterRule {
    signer: Signer,
    expand_urls: bool,
    api_base: String,
}

impl TwitterRule {
    const PATTERN: &'static str = r"(?:^|[/.\s])(?:twitter|x)\.com/\S+?/status/(\d+)";

    pub fn new(credentials: Credentials, expand_urls: bool) -> Self {
        Self {
            signer: Signer::new(credentials),
            expand_urls,
            api_base: API_BASE_URL.to_string(),
        }
    }

    /// 替换接口地址（测试用）
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn status_url(&self, id: &str) -> String {
        format!("{}/1.1/statuses/show/{}.json", self.api_base, id)
    }
}

impl EnrichmentRule for TwitterRule {
    fn pattern(&self) -> &'static str {
        Self::PATTERN
    }

    fn regex(&self) -> &Regex {
        TWITTER_REGEX
            .get_or_init(|| Regex::new(Self::PATTERN).expect("Invalid Twitter regex pattern"))
    }

    fn identifier(&self, captures: &regex::Captures<'_>) -> Option<String> {
        // 统一成十进制形式，超出 u64 的视为无效
        let raw = captures.get(1)?.as_str();
        match raw.parse::<u64>() {
            Ok(id) => Some(id.to_string()),
            Err(e) => {
                log::debug!("Ignoring status id {}: {}", raw, e);
                None
            }
        }
    }

    fn request(&self, id: &str) -> Result<FetchRequest, ProcessorError> {
        let url = self.status_url(id);
        let authorization = self
            .signer
            .authorization_header("GET", &url)
            .map_err(|e| ProcessorError::with_source("签名请求失败", e.to_string()))?;

        Ok(FetchRequest::get(url).with_authorization(authorization))
    }

    fn render(&self, body: &str, _message: &str) -> ProcessorResultType {
        let status: Status = serde_json::from_str(body)
            .map_err(|e| ProcessorError::with_source("无法解析推文数据", e.to_string()))?;

        Ok(Some(utils::build_status_line(
            &status,
            self.expand_urls,
            Utc::now(),
        )))
    }

    fn name(&self) -> &'static str {
        "Twitter"
    }
}
