//! 共用工具函数库
//!
//! 这个模块包含了整个workspace中各个富化规则共用的类型和工具：
//! 规则 trait、最近记录缓存、异步抓取器。
use std::time::Duration;

pub mod cache;
pub mod fetch;
pub mod models;
pub use cache::RecencyCache;
pub use fetch::{FetchError, FetchResult, Fetcher};
pub use models::*;

pub const GENERAL_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// 获取环境变量的值
pub fn get_env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// 按出现顺序惰性地提取消息中属于该规则的所有引用标识
///
/// 同一标识出现多次会被返回多次，去重交给缓存处理。
pub fn extract_identifiers<'t>(
    rule: &'t dyn EnrichmentRule,
    text: &'t str,
) -> impl Iterator<Item = String> + 't {
    rule.regex()
        .captures_iter(text)
        .filter_map(move |captures| rule.identifier(&captures))
}
