//! 链接富化流水线
//!
//! 对每条入站消息：提取引用 → 查重 → 构造（签名）请求 → 异步抓取 → 格式化 → 发送。
//! 查重和写入缓存在派发请求之前同步完成，抓取结果通过通道交给唯一的发送端。

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use regex::RegexSet;
use tokio::sync::mpsc::UnboundedSender;

use common::{EnrichmentRule, FetchRequest, Fetcher, RecencyCache, RichText, extract_identifiers};

/// 入站聊天消息
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub recipient: String,
    pub sender: String,
    pub text: String,
}

/// 待发送的富化结果
#[derive(Debug, Clone)]
pub struct Outbound {
    pub recipient: String,
    pub text: RichText,
}

/// 规则及其独占的最近记录缓存
struct RuleSlot {
    rule: Arc<dyn EnrichmentRule>,
    seen: Mutex<RecencyCache<String>>,
}

impl RuleSlot {
    /// 原子地检查并记录，返回是否为新标识
    fn remember(&self, id: &str) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remember(id.to_string())
    }

    fn contains(&self, id: &str) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(&id.to_string())
    }
}

pub struct Pipeline {
    channels: HashSet<String>,
    slots: Vec<RuleSlot>,
    regex_set: RegexSet,
    fetcher: Fetcher,
    outbound: UnboundedSender<Outbound>,
}

impl Pipeline {
    pub fn new(
        channels: impl IntoIterator<Item = String>,
        window: usize,
        rules: Vec<Arc<dyn EnrichmentRule>>,
        fetcher: Fetcher,
        outbound: UnboundedSender<Outbound>,
    ) -> Result<Self> {
        let patterns: Vec<&str> = rules.iter().map(|rule| rule.pattern()).collect();
        let regex_set = RegexSet::new(&patterns)?;

        let slots = rules
            .into_iter()
            .map(|rule| RuleSlot {
                rule,
                seen: Mutex::new(RecencyCache::new(window)),
            })
            .collect();

        Ok(Self {
            channels: channels.into_iter().collect(),
            slots,
            regex_set,
            fetcher,
            outbound,
        })
    }

    /// 从候选名称中找出第一个已启用的聊天
    pub fn enabled_recipient<'a>(&self, candidates: &'a [String]) -> Option<&'a String> {
        candidates.iter().find(|name| self.channels.contains(*name))
    }

    /// 某规则的缓存中是否记录了该标识
    #[allow(dead_code)]
    pub fn is_seen(&self, rule_name: &str, id: &str) -> bool {
        self.slots
            .iter()
            .filter(|slot| slot.rule.name() == rule_name)
            .any(|slot| slot.contains(id))
    }

    /// 处理一条消息，返回本次派发的抓取数量
    ///
    /// 不等待任何网络请求；结果稍后出现在出站通道里，顺序不保证。
    pub fn handle(&self, event: &ChatEvent) -> usize {
        if !self.channels.contains(&event.recipient) {
            return 0;
        }

        // 使用 RegexSet 快速检查是否有任何匹配
        if !self.regex_set.is_match(&event.text) {
            return 0;
        }

        let message: Arc<str> = Arc::from(event.text.as_str());
        let mut dispatched = 0;

        // 只对匹配的规则进行详细匹配
        for index in self.regex_set.matches(&event.text).into_iter() {
            let slot = &self.slots[index];

            for id in extract_identifiers(&*slot.rule, &event.text) {
                if !slot.remember(&id) {
                    log::debug!("Skipping recently seen {} reference {}", slot.rule.name(), id);
                    continue;
                }

                log::info!(
                    "Processing {} reference {} from {} in {}",
                    slot.rule.name(),
                    id,
                    event.sender,
                    event.recipient
                );

                match slot.rule.request(&id) {
                    Ok(request) => {
                        self.dispatch(slot, id, request, &event.recipient, Arc::clone(&message));
                        dispatched += 1;
                    }
                    Err(e) => {
                        log::warn!(
                            "Failed to build {} request for {}: {}",
                            slot.rule.name(),
                            id,
                            e
                        );
                    }
                }
            }
        }

        dispatched
    }

    fn dispatch(
        &self,
        slot: &RuleSlot,
        id: String,
        request: FetchRequest,
        recipient: &str,
        message: Arc<str>,
    ) {
        let rule = Arc::clone(&slot.rule);
        let outbound = self.outbound.clone();
        let recipient = recipient.to_string();

        self.fetcher.dispatch(request, move |result| {
            // 失败只记录日志，标识仍保留在缓存中，不重试
            let body = match result {
                Ok(body) => body,
                Err(e) => {
                    log::warn!("Failed to fetch {} reference {}: {}", rule.name(), id, e);
                    return;
                }
            };

            match rule.render(&body, &message) {
                Ok(Some(text)) => {
                    if outbound.send(Outbound { recipient, text }).is_err() {
                        log::warn!(
                            "Outbound channel closed, dropping {} enrichment for {}",
                            rule.name(),
                            id
                        );
                    }
                }
                Ok(None) => {
                    log::debug!("{} enrichment for {} suppressed", rule.name(), id);
                }
                Err(e) => {
                    log::warn!("Failed to process {} reference {}: {}", rule.name(), id, e);
                }
            }
        });
    }
}
