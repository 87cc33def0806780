//! Notification dispatch: turns a detected referendum into webhook
//! deliveries.

pub mod dispatcher;
pub mod message;

pub use dispatcher::{DispatchReport, Dispatcher};
