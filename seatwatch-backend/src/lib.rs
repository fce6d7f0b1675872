pub mod engine;
pub mod handler;
pub mod obs;
pub mod render;
pub mod source;

pub use engine::{ImmediateResult, Missing, WatchEngine, WatchError};
pub use handler::CommandHandler;
pub use source::{CatalogResolver, QueryError, SeatSource};
