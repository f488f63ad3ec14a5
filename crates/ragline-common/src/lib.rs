pub mod errors;
pub mod events;
pub mod id;

pub use errors::{ConfigError, RaglineError};
pub use events::{CallbackEvent, Event, EventBus, EventKind};
pub use id::{new_correlation_id, new_id, EventId};

pub type Result<T> = std::result::Result<T, RaglineError>;
