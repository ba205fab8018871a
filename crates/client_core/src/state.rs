//! In-memory lists and the pure transitions the controller applies to them.
//!
//! Every mutating operation is planned here as a [`Mutation`]: the state to show
//! right away, the [`Undo`] step that reverses it if the store refuses the
//! write, and the request to send. Planning never touches the network.
//!
//! Undo steps are keyed by record id rather than copying whole lists, so
//! reverting one failed write leaves other writes made meanwhile in place.

use shared::{
    domain::{ListKind, Priority, Record, RecordId},
    protocol::StoreRequest,
};

use crate::events::MutationKind;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VaultState {
    pub inventory: Vec<Record>,
    pub wishlist: Vec<Record>,
}

/// Reverses one planned mutation. `index` is the record's position before the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Undo {
    /// Put a removed record back into `kind`.
    Reinsert {
        kind: ListKind,
        index: usize,
        record: Record,
    },
    /// Take an added record out of `kind`.
    Remove { kind: ListKind, id: RecordId },
    /// Return a moved record from the inventory to the wishlist.
    MoveBack { index: usize, record: Record },
    SetPriority {
        id: RecordId,
        previous: Option<Priority>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub kind: MutationKind,
    pub next: VaultState,
    pub rollback: Undo,
    pub request: StoreRequest,
}

/// Stable sort by artist, ignoring case.
pub fn sort_by_artist(records: &mut [Record]) {
    records.sort_by_cached_key(|record| record.artist.to_lowercase());
}

// New entries go in front so they precede equal-artist records after the stable sort.
fn insert_sorted(list: &[Record], record: Record) -> Vec<Record> {
    let mut next = Vec::with_capacity(list.len() + 1);
    next.push(record);
    next.extend(list.iter().cloned());
    sort_by_artist(&mut next);
    next
}

// Restores the old position when it is still valid; the stable sort repairs it otherwise.
fn reinsert(list: &mut Vec<Record>, index: usize, record: Record) {
    if list.iter().any(|r| r.id == record.id) {
        return;
    }
    list.insert(index.min(list.len()), record);
    sort_by_artist(list);
}

impl VaultState {
    pub fn from_lists(mut inventory: Vec<Record>, mut wishlist: Vec<Record>) -> Self {
        sort_by_artist(&mut inventory);
        sort_by_artist(&mut wishlist);
        Self {
            inventory,
            wishlist,
        }
    }

    pub fn list(&self, kind: ListKind) -> &[Record] {
        match kind {
            ListKind::Inventory => &self.inventory,
            ListKind::Wishlist => &self.wishlist,
        }
    }

    /// Which list currently holds `id`, if any.
    pub fn location(&self, id: RecordId) -> Option<ListKind> {
        if self.inventory.iter().any(|r| r.id == id) {
            Some(ListKind::Inventory)
        } else if self.wishlist.iter().any(|r| r.id == id) {
            Some(ListKind::Wishlist)
        } else {
            None
        }
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.location(id).is_some()
    }

    pub fn find(&self, id: RecordId) -> Option<&Record> {
        self.inventory
            .iter()
            .chain(self.wishlist.iter())
            .find(|r| r.id == id)
    }

    fn list_mut(&mut self, kind: ListKind) -> &mut Vec<Record> {
        match kind {
            ListKind::Inventory => &mut self.inventory,
            ListKind::Wishlist => &mut self.wishlist,
        }
    }

    /// Applies an undo step to whatever the lists hold now.
    pub fn restore(&mut self, undo: Undo) {
        match undo {
            Undo::Reinsert {
                kind,
                index,
                record,
            } => reinsert(self.list_mut(kind), index, record),
            Undo::Remove { kind, id } => self.list_mut(kind).retain(|r| r.id != id),
            Undo::MoveBack { index, record } => {
                self.inventory.retain(|r| r.id != record.id);
                reinsert(&mut self.wishlist, index, record);
            }
            Undo::SetPriority { id, previous } => {
                if let Some(entry) = self.wishlist.iter_mut().find(|r| r.id == id) {
                    entry.priority = previous;
                }
            }
        }
    }

    pub fn delete_from_inventory(&self, id: RecordId) -> Option<Mutation> {
        let index = self.inventory.iter().position(|r| r.id == id)?;
        let inventory = self
            .inventory
            .iter()
            .filter(|r| r.id != id)
            .cloned()
            .collect();

        Some(Mutation {
            kind: MutationKind::DeleteFromInventory,
            next: VaultState {
                inventory,
                wishlist: self.wishlist.clone(),
            },
            rollback: Undo::Reinsert {
                kind: ListKind::Inventory,
                index,
                record: self.inventory[index].clone(),
            },
            request: StoreRequest::DeleteFromInventory { id },
        })
    }

    /// `None` when the id already lives in either list.
    pub fn add_to_wishlist(&self, mut record: Record, priority: Priority) -> Option<Mutation> {
        if self.contains(record.id) {
            return None;
        }
        record.priority = Some(priority);
        let id = record.id;

        Some(Mutation {
            kind: MutationKind::AddToWishlist,
            next: VaultState {
                inventory: self.inventory.clone(),
                wishlist: insert_sorted(&self.wishlist, record.clone()),
            },
            rollback: Undo::Remove {
                kind: ListKind::Wishlist,
                id,
            },
            request: StoreRequest::AddToWishlist(record),
        })
    }

    /// Moves a wishlist entry into the inventory; the inventory copy drops its priority.
    pub fn move_to_inventory(&self, id: RecordId) -> Option<Mutation> {
        let index = self.wishlist.iter().position(|r| r.id == id)?;
        if self.inventory.iter().any(|r| r.id == id) {
            return None;
        }
        let original = self.wishlist[index].clone();
        let record = Record {
            priority: None,
            ..original.clone()
        };

        let wishlist = self
            .wishlist
            .iter()
            .filter(|r| r.id != id)
            .cloned()
            .collect();

        Some(Mutation {
            kind: MutationKind::MoveToInventory,
            next: VaultState {
                inventory: insert_sorted(&self.inventory, record.clone()),
                wishlist,
            },
            rollback: Undo::MoveBack {
                index,
                record: original,
            },
            request: StoreRequest::MoveToInventory(record),
        })
    }

    pub fn update_priority(&self, id: RecordId, priority: Priority) -> Option<Mutation> {
        let current = self.wishlist.iter().find(|r| r.id == id)?;
        if current.priority == Some(priority) {
            return None;
        }

        let wishlist = self
            .wishlist
            .iter()
            .map(|r| {
                if r.id == id {
                    Record {
                        priority: Some(priority),
                        ..r.clone()
                    }
                } else {
                    r.clone()
                }
            })
            .collect();

        Some(Mutation {
            kind: MutationKind::UpdatePriority,
            next: VaultState {
                inventory: self.inventory.clone(),
                wishlist,
            },
            rollback: Undo::SetPriority {
                id,
                previous: current.priority,
            },
            request: StoreRequest::UpdatePriority { id, priority },
        })
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
