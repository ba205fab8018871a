use shared::error::ApiError;
use thiserror::Error;

use crate::events::MutationKind;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("failed to load lists from the remote store: {0}")]
    Load(#[source] ApiError),
    #[error("{}: {source}", .kind.failure_notice())]
    Mutation {
        kind: MutationKind,
        #[source]
        source: ApiError,
    },
    #[error("lists are not loaded")]
    NotLoaded,
}

impl VaultError {
    /// Text suitable for a blocking alert.
    pub fn notice(&self) -> String {
        match self {
            VaultError::Load(_) => crate::events::LOAD_FAILURE_NOTICE.to_string(),
            VaultError::NotLoaded => crate::events::NOT_LOADED_NOTICE.to_string(),
            VaultError::Mutation { kind, .. } => kind.failure_notice().to_string(),
        }
    }
}
