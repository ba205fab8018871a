//! Vinyl Vault client core: remote store and catalog clients, the list state
//! controller, and the derived views and CSV export built on top of it.

pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod export;
pub mod state;
pub mod store;
pub mod views;

pub use catalog::{CatalogClient, MissingCatalog, RemoteCatalog};
pub use config::{load_settings, Settings};
pub use controller::{LoadState, MutationOutcome, VaultController};
pub use error::VaultError;
pub use events::{MutationKind, VaultEvent};
pub use export::{export_list, ExportFile};
pub use state::VaultState;
pub use store::{RemoteStore, StoreClient};
