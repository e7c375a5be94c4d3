//! Data models
//!
//! Wire types shared with the backend. Field names follow the realtime
//! database schema the web client already writes (`name`, `colorname`,
//! `referenceNumber`, ...), so records stay readable by existing tooling.

pub mod cart;
pub mod catalog;
pub mod order;
pub mod session;

// Re-exports
pub use cart::*;
pub use catalog::*;
pub use order::*;
pub use session::*;
