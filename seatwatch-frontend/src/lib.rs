pub mod bot;
pub mod config;
pub mod health;
pub mod logging;
pub mod telegram;
