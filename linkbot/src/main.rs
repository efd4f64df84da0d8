use common::{EnrichmentRule, Fetcher};
use dotenv::dotenv;
use std::sync::Arc;
use teloxide::Bot;
use teloxide::types::Message;
use tokio::sync::mpsc::{self, UnboundedSender};

use processor_twitter::TwitterRule;
use processor_youtube::YoutubeRule;

mod bot;
mod config;
mod pipeline;

use config::{Config, DEFAULT_CONFIG_PATH};
use pipeline::{ChatEvent, Outbound, Pipeline};

fn init_rules(config: &Config) -> Vec<Arc<dyn EnrichmentRule>> {
    vec![
        Arc::new(TwitterRule::new(
            config.credentials(),
            config.twitter.expand_urls,
        )),
        Arc::new(YoutubeRule::new()),
    ]
}

fn build_pipeline(config: &Config, outbound: UnboundedSender<Outbound>) -> anyhow::Result<Pipeline> {
    let fetcher = Fetcher::new(config.fetch_timeout())?;
    Pipeline::new(
        config.channels.iter().cloned(),
        config.dont_repeat_last_count,
        init_rules(config),
        fetcher,
        outbound,
    )
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path =
        common::get_env_var("LINKBOT_CONFIG").unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load {}: {:#}", config_path, e);
            std::process::exit(1);
        }
    };

    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let pipeline = match build_pipeline(&config, outbound_tx) {
        Ok(pipeline) => Arc::new(pipeline),
        Err(e) => {
            log::error!("Failed to start link pipeline: {:#}", e);
            std::process::exit(1);
        }
    };

    let bot = Bot::from_env();
    tokio::spawn(bot::forward_outbound(bot.clone(), outbound_rx));

    log::info!(
        "Bot started. Watching {} chats for links...",
        config.channels.len()
    );

    teloxide::repl(bot, move |msg: Message| {
        let pipeline = Arc::clone(&pipeline);
        async move {
            if let Some(text) = msg.text() {
                let names = bot::recipient_names(&msg);
                if let Some(recipient) = pipeline.enabled_recipient(&names) {
                    pipeline.handle(&ChatEvent {
                        recipient: recipient.clone(),
                        sender: bot::sender_name(&msg),
                        text: text.to_string(),
                    });
                }
            }
            Ok(())
        }
    })
    .await;
}
