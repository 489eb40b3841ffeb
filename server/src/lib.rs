//! Contact API behind the portfolio site.
//!
//! Accepts contact form submissions, validates them, stores them through an
//! injected [`store::ContactStore`], and tells the site owner about them on a
//! best-effort basis through [`notify::Dispatcher`].

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod store;

pub use api::{router, AppState, ListingAccess};
pub use config::Cli;
pub use error::{ApiError, NotifyError, StoreError};
pub use notify::{Dispatcher, LogNotifier, Notifier, RelayNotifier};
pub use store::{ContactStore, JsonFileStore, MemoryStore};
