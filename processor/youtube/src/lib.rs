//! YouTube 视频富化规则
//!
//! 通过 oEmbed 接口获取视频标题和频道名，不需要鉴权。

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use common::{
    EnrichmentRule, FetchRequest, ProcessorError, ProcessorResultType, RichText, Role,
};

static YOUTUBE_REGEX: OnceLock<Regex> = OnceLock::new();

const OEMBED_BASE_URL: &str = "https://www.youtube.com";

/// oEmbed 接口响应
#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: String,
    author_name: String,
}

/// YouTube 链接富化规则
pub struct YoutubeRule {
    oembed_base: String,
}

impl YoutubeRule {
    const PATTERN: &'static str = r"(?:^|[/.\s])(?:youtube\.com/watch\?v=|youtube\.com/embed/|youtu\.be/)([a-zA-Z0-9_-]+)";

    pub fn new() -> Self {
        Self {
            oembed_base: OEMBED_BASE_URL.to_string(),
        }
    }

    /// 替换接口地址（测试用）
    pub fn with_oembed_base(mut self, oembed_base: impl Into<String>) -> Self {
        self.oembed_base = oembed_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn oembed_url(&self, id: &str) -> String {
        format!("{}/oembed?format=json&url=youtu.be/{}", self.oembed_base, id)
    }
}

impl Default for YoutubeRule {
    fn default() -> Self {
        Self::new()
    }
}

impl EnrichmentRule for YoutubeRule {
    fn pattern(&self) -> &'static str {
        Self::PATTERN
    }

    fn regex(&self) -> &Regex {
        YOUTUBE_REGEX
            .get_or_init(|| Regex::new(Self::PATTERN).expect("Invalid YouTube regex pattern"))
    }

    fn identifier(&self, captures: &regex::Captures<'_>) -> Option<String> {
        captures.get(1).map(|m| m.as_str().to_string())
    }

    fn request(&self, id: &str) -> Result<FetchRequest, ProcessorError> {
        Ok(FetchRequest::get(self.oembed_url(id)))
    }

    fn render(&self, body: &str, message: &str) -> ProcessorResultType {
        let data: OEmbedResponse = serde_json::from_str(body)
            .map_err(|e| ProcessorError::with_source("无法解析视频信息", e.to_string()))?;

        // 原消息里已经写了标题，就不再重复发送
        if message.contains(&data.title) {
            log::debug!("Message already contains video title '{}'", data.title);
            return Ok(None);
        }

        Ok(Some(
            RichText::new()
                .push(Role::Content, data.title)
                .push(Role::Plain, " by ")
                .push(Role::Author, data.author_name),
        ))
    }

    fn name(&self) -> &'static str {
        "YouTube"
    }
}
