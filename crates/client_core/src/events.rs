//! Controller events and the user-facing notices attached to them.

use shared::domain::RecordId;

pub const LOAD_FAILURE_NOTICE: &str =
    "Could not connect to the Vinyl Vault database. Please check the store endpoint and try again.";

pub const NOT_LOADED_NOTICE: &str =
    "Your collection has not been loaded yet. Load it before making changes.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    DeleteFromInventory,
    AddToWishlist,
    MoveToInventory,
    UpdatePriority,
}

impl MutationKind {
    pub fn label(self) -> &'static str {
        match self {
            MutationKind::DeleteFromInventory => "delete_from_inventory",
            MutationKind::AddToWishlist => "add_to_wishlist",
            MutationKind::MoveToInventory => "move_to_inventory",
            MutationKind::UpdatePriority => "update_priority",
        }
    }

    /// Alert shown to the user after the change has been rolled back.
    pub fn failure_notice(self) -> &'static str {
        match self {
            MutationKind::DeleteFromInventory => "Failed to delete record. Please try again.",
            MutationKind::AddToWishlist => "Failed to add record to wishlist. Please try again.",
            MutationKind::MoveToInventory => "Failed to move record to inventory. Please try again.",
            MutationKind::UpdatePriority => "Failed to update priority. Please try again.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEvent {
    Loaded {
        inventory: usize,
        wishlist: usize,
    },
    LoadFailed(String),
    MutationApplied {
        kind: MutationKind,
        record_id: RecordId,
    },
    MutationRolledBack {
        kind: MutationKind,
        record_id: RecordId,
        notice: String,
    },
}
