use serde::{Deserialize, Serialize};

use crate::domain::{Priority, Record, RecordId};

/// Write envelope posted to the remote store: `{"action": ..., "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreRequest {
    AddToWishlist(Record),
    DeleteFromInventory { id: RecordId },
    MoveToInventory(Record),
    UpdatePriority { id: RecordId, priority: Priority },
}

impl StoreRequest {
    pub fn action(&self) -> &'static str {
        match self {
            StoreRequest::AddToWishlist(_) => "ADD_TO_WISHLIST",
            StoreRequest::DeleteFromInventory { .. } => "DELETE_FROM_INVENTORY",
            StoreRequest::MoveToInventory(_) => "MOVE_TO_INVENTORY",
            StoreRequest::UpdatePriority { .. } => "UPDATE_PRIORITY",
        }
    }

    pub fn record_id(&self) -> RecordId {
        match self {
            StoreRequest::AddToWishlist(record) | StoreRequest::MoveToInventory(record) => {
                record.id
            }
            StoreRequest::DeleteFromInventory { id } | StoreRequest::UpdatePriority { id, .. } => {
                *id
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Success,
    Error,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreResponse {
    pub status: StoreStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StoreResponse {
    pub fn success() -> Self {
        Self {
            status: StoreStatus::Success,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: StoreStatus::Error,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StoreStatus::Success
    }
}
