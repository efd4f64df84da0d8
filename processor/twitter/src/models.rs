use serde::Deserialize;

/// statuses/show 接口响应
#[derive(Debug, Deserialize)]
pub struct Status {
    pub text: String,
    pub created_at: String,
    pub user: StatusUser,
    #[serde(default)]
    pub entities: Option<StatusEntities>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUser {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusEntities {
    #[serde(default)]
    pub urls: Vec<UrlEntity>,
}

/// 正文中的短链接及其展开形式
#[derive(Debug, Deserialize)]
pub struct UrlEntity {
    pub url: String,
    pub expanded_url: Option<String>,
}
