use chrono::{DateTime, Utc};
use common::{RichText, Role};

use crate::models::Status;

/// created_at 的固定格式，例如 `Wed Oct 10 20:19:24 +0000 2018`
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// 解析创建时间，失败时返回 None
pub fn parse_created_at(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value, CREATED_AT_FORMAT)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// 将时间渲染为相对于 now 的简短描述，如 `3m`、`2h`、`5d`
pub fn relative_time(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - date).num_seconds().max(0);

    match seconds {
        s if s < 60 => format!("{}s", s),
        s if s < 60 * 60 => format!("{}m", s / 60),
        s if s < 24 * 60 * 60 => format!("{}h", s / (60 * 60)),
        s if s < 365 * 24 * 60 * 60 => format!("{}d", s / (24 * 60 * 60)),
        s => format!("{}y", s / (365 * 24 * 60 * 60)),
    }
}

/// 解码 HTML 实体并把换行压成空格
pub fn clean_text(text: &str) -> String {
    html_escape::decode_html_entities(text)
        .replace(['\r', '\n'], " ")
        .trim()
        .to_string()
}

/// 将正文中的短链接替换为展开后的链接
pub fn expand_urls(text: &str, status: &Status) -> String {
    let Some(entities) = &status.entities else {
        return text.to_string();
    };

    entities.urls.iter().fold(text.to_string(), |text, entity| {
        let Some(expanded) = &entity.expanded_url else {
            return text;
        };
        let short = html_escape::decode_html_entities(&entity.url);
        if short.is_empty() {
            return text;
        }
        text.replace(&*short, &html_escape::decode_html_entities(expanded))
    })
}

/// 构建推文的输出行：作者、相对时间、正文
pub fn build_status_line(status: &Status, expand: bool, now: DateTime<Utc>) -> RichText {
    let mut text = clean_text(&status.text);
    if expand {
        text = expand_urls(&text, status);
    }

    let date = parse_created_at(&status.created_at).unwrap_or_else(|| {
        log::debug!(
            "Unparsable created_at '{}', falling back to now",
            status.created_at
        );
        now
    });

    RichText::new()
        .push(Role::Author, status.user.name.as_str())
        .push(Role::Plain, format!(" {}: ", relative_time(date, now)))
        .push(Role::Content, text)
}
