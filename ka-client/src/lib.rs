//! KA Client - ordering client core for the KA retail backend
//!
//! - [`catalog`]: remote catalog → local redb cache, with staleness check and
//!   cache fallback
//! - [`cart`]: the cart engine (add / edit / delete with cascade removal)
//! - [`order`]: reference-number allocation and order submission
//! - [`session`]: email / OTP login and the persisted user session
//! - [`ordering`]: a session-scoped façade tying catalog and cart together
//!
//! Remote access goes through the [`remote::RemoteStore`] trait (realtime
//! database REST API, or an in-memory store for tests) and the
//! [`rpc::AuthApi`] trait.

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod logger;
pub mod order;
pub mod ordering;
pub mod remote;
pub mod rpc;
pub mod session;

pub use cart::{Cart, CartError, LineChange, SummaryRow};
pub use catalog::{CatalogCache, CatalogError, CatalogLoad, CatalogManager, CatalogSource};
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use order::{OrderError, OrderService};
pub use ordering::{OrderingError, OrderingSession};
pub use remote::{MemoryStore, RealtimeStore, RemoteStore, StorePaths};
pub use rpc::{AuthApi, RpcClient};
pub use session::{SessionError, SessionStatus, SessionStore};

// Re-export shared types for convenience
pub use shared::{AppError, CartLine, CatalogItem, ErrorCode, Order, SkuRow, UserSession};
