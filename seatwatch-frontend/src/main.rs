use anyhow::Context;
use seatwatch_backend::engine::{Notifier, spawn_delivery};
use seatwatch_backend::obs::{ObsClient, ProgramCatalog};
use seatwatch_backend::{CommandHandler, WatchEngine, render};
use seatwatch_frontend::bot::TelegramBot;
use seatwatch_frontend::telegram::TelegramClient;
use seatwatch_frontend::{config, health, logging};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let source = config::read_config("config.toml")?;
    let bot_config = config::CONFIG.get().context("configuration not loaded")?;
    let _logging_guard = logging::init_logging(
        &bot_config.log_dir,
        "seatwatch",
        &bot_config.log_level,
        bot_config.log_retention_days,
    )?;

    tracing::info!("Seatwatch started ({:?}).", source);

    let token = bot_config.telegram_token()?;

    let obs = ObsClient::new(bot_config.obs.clone())?;
    let catalog = ProgramCatalog::load(obs.http(), obs.endpoints()).await;
    tracing::info!("Program catalog ready: {} programs ({:?})", catalog.len(), catalog.origin());

    let poll_timeout = Duration::from_secs(bot_config.telegram.poll_timeout_secs);
    let telegram = Arc::new(TelegramClient::new(&bot_config.telegram.api_url, token, poll_timeout)?);

    let (notifier, notifications) = Notifier::channel();
    let registration_url = bot_config.obs.registration_url.clone();
    let delivery = spawn_delivery(notifications, telegram.clone(), move |notification| {
        render::seat_opened(notification, &registration_url)
    });

    let engine = WatchEngine::new(Arc::new(catalog), Arc::new(obs), notifier);
    let handler = CommandHandler::new(engine.clone(), bot_config.obs.registration_url.clone());

    if bot_config.health.enable {
        let state = health::HealthState::new(engine.clone());
        tokio::spawn(async move {
            if let Err(e) = health::serve(&bot_config.health, state).await {
                tracing::error!("Health server error: {}", e);
            }
        });
    }

    let bot = TelegramBot::new(telegram, handler);
    tokio::select! {
        result = bot.run() => {
            if let Err(e) = &result {
                tracing::error!("Telegram polling stopped: {}", e);
            }
            result?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("Shutdown signal received.");
        }
    }

    engine.shutdown().await;
    delivery.abort();
    tracing::info!("Seatwatch stopped.");

    Ok(())
}
