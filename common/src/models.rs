/// 文本片段在消息中扮演的角色，具体样式由发送端决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Plain,
    /// 作者 / 频道名
    Author,
    /// 正文 / 标题
    Content,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub role: Role,
    pub text: String,
}

/// 带角色标记的一行输出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichText {
    segments: Vec<Segment>,
}

impl RichText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, role: Role, text: impl Into<String>) -> Self {
        self.segments.push(Segment {
            role,
            text: text.into(),
        });
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// 去掉样式后的纯文本
    pub fn plain(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// 渲染为 Telegram HTML，所有文本都会被转义
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for segment in &self.segments {
            let escaped = html_escape::encode_text(&segment.text);
            match segment.role {
                Role::Plain => html.push_str(&escaped),
                Role::Author => html.push_str(&format!("<b>{}</b>", escaped)),
                Role::Content => html.push_str(&format!("<i>{}</i>", escaped)),
            }
        }
        html
    }
}

/// 一次抓取请求，构造后不可修改；方法固定为 GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    url: String,
    authorization: Option<String>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            authorization: None,
        }
    }

    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    pub fn method(&self) -> &'static str {
        "GET"
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }
}

/// 统一的处理器错误类型
#[derive(Debug, Clone)]
pub struct ProcessorError {
    pub message: String,
    pub source: Option<String>,
}

impl std::fmt::Display for ProcessorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {}", self.message, source),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ProcessorError {}

impl ProcessorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

impl From<anyhow::Error> for ProcessorError {
    fn from(error: anyhow::Error) -> Self {
        ProcessorError::new(error.to_string())
    }
}

/// `Ok(None)` 表示规则主动放弃输出
pub type ProcessorResultType = Result<Option<RichText>, ProcessorError>;

/// 统一的富化规则 trait
///
/// 每种引用（推文、视频……）实现一个规则，控制器只通过这个 trait 调用它们，
/// 新增规则不需要改动控制器。
pub trait EnrichmentRule: Send + Sync {
    /// 获取正则表达式模式字符串
    fn pattern(&self) -> &'static str;

    /// 获取匹配的正则表达式（用于详细匹配）
    fn regex(&self) -> &regex::Regex;

    /// 从一次匹配的捕获组中取出引用标识
    fn identifier(&self, captures: &regex::Captures<'_>) -> Option<String>;

    /// 为标识构造抓取请求（需要时在这里签名）
    fn request(&self, id: &str) -> Result<FetchRequest, ProcessorError>;

    /// 解码响应并生成输出
    /// message: 触发本次富化的原始消息文本
    fn render(&self, body: &str, message: &str) -> ProcessorResultType;

    /// 获取规则名称
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rich_text_plain_and_html() {
        let text = RichText::new()
            .push(Role::Author, "Tom & Jerry")
            .push(Role::Plain, " 3m: ")
            .push(Role::Content, "<hello>");

        assert_eq!(text.plain(), "Tom & Jerry 3m: <hello>");
        assert_eq!(
            text.to_html(),
            "<b>Tom &amp; Jerry</b> 3m: <i>&lt;hello&gt;</i>"
        );
        assert_eq!(text.segments().len(), 3);
    }

    #[test]
    fn test_fetch_request_builder() {
        let request = FetchRequest::get("https://example.com/a.json");
        assert_eq!(request.method(), "GET");
        assert_eq!(request.authorization(), None);

        let signed = request.clone().with_authorization("OAuth x=\"y\"");
        assert_eq!(signed.url(), "https://example.com/a.json");
        assert_eq!(signed.authorization(), Some("OAuth x=\"y\""));
        assert_ne!(request, signed);
    }

    #[test]
    fn test_processor_error_display() {
        assert_eq!(ProcessorError::new("失败").to_string(), "失败");
        assert_eq!(
            ProcessorError::with_source("失败", "原因").to_string(),
            "失败: 原因"
        );
    }
}
