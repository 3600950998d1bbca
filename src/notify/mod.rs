// =============================================================================
// Notifier — message delivery
// =============================================================================
//
// With BOT_TOKEN and CHAT_ID configured, messages go to Telegram; otherwise
// they are printed to stdout.  Delivery failures are logged and never abort
// a run.

pub mod format;
pub mod telegram;

use anyhow::Result;
use tracing::{info, warn};

use crate::runtime_config::DataSources;
use telegram::TelegramClient;

pub enum Notifier {
    Telegram(TelegramClient),
    Stdout,
}

impl Notifier {
    /// Build from `BOT_TOKEN` / `CHAT_ID` as returned by `lookup`.
    pub fn from_lookup(
        sources: &DataSources,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let token = lookup("BOT_TOKEN").filter(|v| !v.trim().is_empty());
        let chat_id = lookup("CHAT_ID").filter(|v| !v.trim().is_empty());

        match (token, chat_id) {
            (Some(token), Some(chat_id)) => {
                info!("telegram delivery enabled");
                Ok(Self::Telegram(TelegramClient::new(
                    sources.telegram_api_base.clone(),
                    token.trim(),
                    chat_id.trim(),
                    sources.request_timeout(),
                )?))
            }
            _ => {
                warn!("BOT_TOKEN / CHAT_ID not set, printing messages to stdout");
                Ok(Self::Stdout)
            }
        }
    }

    /// Deliver one message.  Returns whether it was delivered.
    pub async fn send(&self, text: &str) -> bool {
        match self {
            Self::Telegram(client) => match client.send_message(text).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "telegram delivery failed");
                    false
                }
            },
            Self::Stdout => {
                println!("{text}\n");
                true
            }
        }
    }
}
