///! Types shared between the watch backend and the chat frontend.

mod types;

pub use types::{ParseTargetError, SeatStatus, SectionTarget, SubscriberId, WatchKey};
