//! Domain layer with core entities, errors and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// User-facing notifications.
pub mod notification;
/// Port definitions.
pub mod ports;

pub use entities::{MetadataRecord, RequestStatus};
pub use errors::{CacheError, FetchError};
pub use notification::{Notification, NotificationLevel};
