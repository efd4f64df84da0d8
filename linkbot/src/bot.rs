use teloxide::prelude::*;
use teloxide::types::{Message, ParseMode, Recipient};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::pipeline::Outbound;

/// 配置里的聊天名称：数字视为聊天 ID，其余视为 @username
pub fn to_recipient(name: &str) -> Recipient {
    match name.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(name.to_string()),
    }
}

/// 一条消息所在聊天可能出现在配置里的名字，聊天 ID 优先
pub fn recipient_names(msg: &Message) -> Vec<String> {
    let mut names = vec![msg.chat.id.to_string()];
    if let Some(username) = msg.chat.username() {
        names.push(format!("@{}", username));
    }
    names
}

pub fn sender_name(msg: &Message) -> String {
    msg.from
        .as_ref()
        .map(|user| user.full_name())
        .unwrap_or_default()
}

// 简单的发送文本
pub async fn send_text(bot: &Bot, recipient: &str, text: String) -> ResponseResult<Message> {
    log::debug!("send_text: {}\n\t{}", recipient, text);
    bot.send_message(to_recipient(recipient), text)
        .parse_mode(ParseMode::Html)
        .await
}

/// 唯一的发送端：依次发送流水线产生的富化结果
///
/// 发送失败只记录日志，不重试。
pub async fn forward_outbound(bot: Bot, mut outbound: UnboundedReceiver<Outbound>) {
    while let Some(message) = outbound.recv().await {
        if let Err(e) = send_text(&bot, &message.recipient, message.text.to_html()).await {
            log::error!("Failed to send message to chat {}: {}", message.recipient, e);
        }
    }
    log::info!("Outbound channel closed, sender stopped");
}
