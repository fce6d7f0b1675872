use crate::telegram::{TelegramClient, Update};
use seatwatch_backend::CommandHandler;
use seatwatch_common::SubscriberId;
use std::sync::Arc;
use std::time::Duration;

/// Pause after a failed getUpdates before polling again
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// A text message addressed to the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub subscriber: SubscriberId,
    pub first_name: String,
    pub text: String,
}

impl Inbound {
    /// Non-text updates (stickers, edits, joins) are ignored
    pub fn from_update(update: &Update) -> Option<Self> {
        let message = update.message.as_ref()?;
        let text = message.text.as_ref()?;
        Some(Self {
            subscriber: SubscriberId(message.chat.id),
            first_name: message.first_name().to_string(),
            text: text.clone(),
        })
    }
}

/// Telegram long-polling loop feeding the command handler
pub struct TelegramBot {
    client: Arc<TelegramClient>,
    handler: CommandHandler,
}

impl TelegramBot {
    pub fn new(client: Arc<TelegramClient>, handler: CommandHandler) -> Self {
        Self { client, handler }
    }

    /// Poll forever. Each message is handled on its own task so a slow
    /// upstream query never blocks other chats.
    pub async fn run(&self) -> anyhow::Result<()> {
        if let Err(e) = self.client.drop_pending_updates().await {
            tracing::warn!("Failed to drop pending updates: {}", e);
        }
        tracing::info!("Telegram polling started");

        let mut offset = 0;
        loop {
            let updates = match self.client.get_updates(offset).await {
                Ok(updates) => updates,
                Err(e) => {
                    tracing::warn!("getUpdates failed: {}", e);
                    tokio::time::sleep(RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                if let Some(inbound) = Inbound::from_update(&update) {
                    self.dispatch(inbound);
                }
            }
        }
    }

    fn dispatch(&self, inbound: Inbound) {
        let client = self.client.clone();
        let handler = self.handler.clone();

        tokio::spawn(async move {
            tracing::debug!("Message from {}: {}", inbound.subscriber, inbound.text);
            let reply = handler
                .handle(inbound.subscriber, &inbound.first_name, &inbound.text)
                .await;
            if let Err(e) = client.send_markdown(inbound.subscriber.0, &reply).await {
                tracing::warn!("Failed to reply to {}: {}", inbound.subscriber, e);
            }
        });
    }
}
