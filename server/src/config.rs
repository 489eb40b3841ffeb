//! Command line and environment configuration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use crate::api::{AppState, ListingAccess, DEFAULT_RESUME_URL};
use crate::error::StoreError;
use crate::notify::{Dispatcher, LogNotifier, RelayNotifier};
use crate::store::{ContactStore, JsonFileStore, MemoryStore};

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "folio_server=info,tower_http=info";

#[derive(Debug, Clone, Parser)]
#[command(name = "folio-server", about = "Portfolio contact API server")]
pub struct Cli {
    /// Address to bind.
    #[arg(long, env = "FOLIO_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// HTTP port to listen on.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Persist submissions to this JSON file. In-memory when unset.
    #[arg(long, env = "FOLIO_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Form-to-email relay endpoint (e.g. "https://formspree.io/f/<form-id>").
    #[arg(long, env = "FOLIO_RELAY_URL")]
    pub relay_url: Option<String>,

    /// Per-notifier timeout in seconds.
    #[arg(long, env = "FOLIO_NOTIFY_TIMEOUT_SECS", default_value_t = 10)]
    pub notify_timeout_secs: u64,

    /// Bearer token required to list submissions. Listing is open when unset.
    #[arg(long, env = "FOLIO_ADMIN_TOKEN", hide_env_values = true)]
    pub admin_token: Option<String>,

    /// Target of the resume descriptor.
    #[arg(long, env = "FOLIO_RESUME_URL", default_value = DEFAULT_RESUME_URL)]
    pub resume_url: String,

    /// Directory holding the built page shell, served for non-API paths.
    #[arg(long, env = "FOLIO_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
}

impl Cli {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn listing_access(&self) -> ListingAccess {
        match self.admin_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => ListingAccess::Token(token.to_string()),
            _ => ListingAccess::Open,
        }
    }

    pub fn dispatcher(&self) -> Dispatcher {
        let dispatcher =
            Dispatcher::new(Duration::from_secs(self.notify_timeout_secs)).with(LogNotifier);
        match &self.relay_url {
            Some(url) => dispatcher.with(RelayNotifier::new(url.clone())),
            None => dispatcher,
        }
    }

    pub async fn open_store(&self) -> Result<Arc<dyn ContactStore>, StoreError> {
        Ok(match &self.data_file {
            Some(path) => Arc::new(JsonFileStore::open(path.clone()).await?),
            None => {
                info!("no data file configured, submissions are kept in memory only");
                Arc::new(MemoryStore::new())
            }
        })
    }

    /// Assemble the shared handler state from this configuration.
    pub async fn build_state(&self) -> Result<AppState, StoreError> {
        let store = self.open_store().await?;
        let dispatcher = self.dispatcher();
        info!(notifiers = ?dispatcher.notifier_names(), "notification dispatcher ready");

        let listing = self.listing_access();
        if listing == ListingAccess::Open {
            warn!("GET /api/contacts is open to anyone; set FOLIO_ADMIN_TOKEN to restrict it");
        }

        let mut state = AppState::new(store, dispatcher)
            .with_listing(listing)
            .with_resume_url(self.resume_url.clone());
        if let Some(dir) = &self.static_dir {
            state = state.with_static_dir(dir.clone());
        }
        Ok(state)
    }
}
