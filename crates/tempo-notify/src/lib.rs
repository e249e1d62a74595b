//! Real-time notification delivery.
//!
//! [`Notification`] models the payload shapes, [`SessionRegistry`] tracks
//! the one live session each user may have, and
//! [`NotificationDispatcher`] performs fire-and-forget delivery. Nothing
//! in this crate persists or retries; a missed delivery is an expected
//! outcome, not a fault.

pub mod dispatcher;
pub mod payload;
pub mod registry;

pub use dispatcher::{Delivery, NotificationDispatcher};
pub use payload::{Notification, NotificationKind, OutboundFrame};
pub use registry::{ClientSession, InMemorySessionRegistry, SessionRegistry};
