use async_trait::async_trait;
use teloxide::payloads::SendMessageSetters;
use teloxide::requests::Requester;
use teloxide::types::{ChatId, ParseMode};
use teloxide::Bot;
use tracing::{info, warn};

use common::{Alert, Delivery, Error, Notifier, Result};

use crate::chart::ChartLinks;
use crate::message::format_alert;

/// Live alert delivery through a Telegram bot to one or more chats.
pub struct TelegramNotifier {
    bot: Bot,
    chat_ids: Vec<ChatId>,
    charts: ChartLinks,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_ids: &[i64], charts: ChartLinks) -> Self {
        info!(chats = chat_ids.len(), exchange = charts.exchange(), "TelegramNotifier initialized");
        Self {
            bot: Bot::new(token),
            chat_ids: chat_ids.iter().copied().map(ChatId).collect(),
            charts,
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    /// Sent when at least one chat accepted the message. A chart link that
    /// fails verification skips the alert before anything is sent.
    async fn deliver(&self, alert: &Alert) -> Result<Delivery> {
        let Some(chart_url) = self.charts.resolve(&alert.pair).await else {
            return Ok(Delivery::Skipped {
                reason: format!("no {} chart for {}", self.charts.exchange(), alert.pair),
            });
        };
        let text = format_alert(alert, &chart_url, self.charts.exchange());

        let mut delivered = 0;
        for &chat_id in &self.chat_ids {
            match self
                .bot
                .send_message(chat_id, text.clone())
                .parse_mode(ParseMode::Html)
                .await
            {
                Ok(_) => delivered += 1,
                Err(e) => warn!(chat_id = ?chat_id, error = %e, "Failed to send Telegram alert"),
            }
        }

        if delivered == 0 {
            return Err(Error::Notify(format!(
                "{} {} alert reached none of {} chats",
                alert.pair,
                alert.action,
                self.chat_ids.len()
            )));
        }
        info!(pair = %alert.pair, action = %alert.action, chats = delivered, "Alert sent");
        Ok(Delivery::Sent)
    }
}
