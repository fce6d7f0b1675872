//! Routes chat messages to the watch engine and renders the replies.

use regex::Regex;
use seatwatch_common::{ParseTargetError, SectionTarget, SubscriberId, WatchKey};
use std::sync::LazyLock;

use crate::engine::{ImmediateResult, Missing, WatchEngine, WatchError};
use crate::render;

static COMMAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*/([A-Za-z]+)(?:@\S+)?\s*(.*?)\s*$").expect("valid command regex"));

/// A parsed chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Status,
    /// `/cancel` (all) or `/cancel PROG_CRN` (one)
    Cancel(Option<SectionTarget>),
    Stop,
    Watch(SectionTarget),
    /// Neither a known command nor a `PROG_CRN` pair
    Invalid {
        input: String,
        reason: Option<ParseTargetError>,
    },
}

/// Parse message text into a [`Command`]
pub fn parse_command(text: &str) -> Command {
    let text = text.trim();

    if let Some(caps) = COMMAND_RE.captures(text) {
        let command = caps.get(1).map_or("", |m| m.as_str()).to_lowercase();
        let args = caps.get(2).map_or("", |m| m.as_str());

        return match command.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "status" => Command::Status,
            "stop" => Command::Stop,
            "cancel" if args.is_empty() => Command::Cancel(None),
            "cancel" => match args.parse() {
                Ok(target) => Command::Cancel(Some(target)),
                Err(reason) => Command::Invalid { input: text.to_string(), reason: Some(reason) },
            },
            _ => Command::Invalid { input: text.to_string(), reason: None },
        };
    }

    match text.parse::<SectionTarget>() {
        Ok(target) => Command::Watch(target),
        Err(ParseTargetError::MissingSeparator) if !text.contains('_') => {
            Command::Invalid { input: text.to_string(), reason: None }
        }
        Err(reason) => Command::Invalid { input: text.to_string(), reason: Some(reason) },
    }
}

/// Turns one inbound message into one reply
#[derive(Clone)]
pub struct CommandHandler {
    engine: WatchEngine,
    registration_url: String,
}

impl CommandHandler {
    pub fn new(engine: WatchEngine, registration_url: impl Into<String>) -> Self {
        Self {
            engine,
            registration_url: registration_url.into(),
        }
    }

    pub fn engine(&self) -> &WatchEngine {
        &self.engine
    }

    /// Handle a message from `subscriber` and return the reply text
    pub async fn handle(&self, subscriber: SubscriberId, first_name: &str, text: &str) -> String {
        let command = parse_command(text);
        tracing::debug!("{} ({}) -> {:?}", subscriber, first_name, command);

        let catalog = self.engine.catalog().as_ref();
        match command {
            Command::Start => render::welcome(first_name, catalog),
            Command::Help => render::help(catalog),
            Command::Status => {
                let entries = self.engine.watches(subscriber).await;
                if entries.is_empty() {
                    render::no_watches()
                } else {
                    render::status_list(&entries)
                }
            }
            Command::Cancel(None) => render::cancelled(&self.engine.cancel_all(subscriber).await),
            Command::Cancel(Some(target)) => {
                let key = WatchKey { subscriber, target };
                let existed = self.engine.cancel_one(&key).await;
                render::cancelled_one(&key.target, existed)
            }
            Command::Stop => render::stopped(first_name, &self.engine.cancel_all(subscriber).await),
            Command::Watch(target) => self.watch(subscriber, target).await,
            Command::Invalid { input, reason } => render::invalid_format(&input, reason.as_ref()),
        }
    }

    async fn watch(&self, subscriber: SubscriberId, target: SectionTarget) -> String {
        tracing::info!("{} requested {}", subscriber, target);

        match self.engine.submit(subscriber, &target.program, &target.section).await {
            Ok(ImmediateResult::NotFound(Missing::Program)) => {
                render::program_not_found(&target.program, self.engine.catalog().as_ref())
            }
            Ok(ImmediateResult::NotFound(Missing::Section)) => render::section_not_found(&target),
            Ok(ImmediateResult::Available(status)) => {
                render::available(&target, &status, &self.registration_url)
            }
            Ok(ImmediateResult::WatchStarted(status)) => render::watch_started(&target, &status),
            Ok(ImmediateResult::AlreadyWatched(status)) => render::already_watched(&target, &status),
            Err(WatchError::Upstream(e)) => render::upstream_error(&e),
            Err(e @ WatchError::Invariant(_)) => {
                tracing::error!("Submit of {} for {} failed: {}", target, subscriber, e);
                render::internal_error()
            }
        }
    }
}
