//! Application state controller: owns both lists and drives optimistic writes.

use std::sync::Arc;

use futures::future::try_join;
use shared::domain::{ListKind, Priority, Record, RecordId};
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info, warn};

use crate::{
    error::VaultError,
    events::{VaultEvent, LOAD_FAILURE_NOTICE},
    export::{export_list, ExportFile},
    state::{Mutation, VaultState},
    store::RemoteStore,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Applied locally and confirmed by the store.
    Applied,
    /// Nothing to do (duplicate add, unknown id, unchanged priority).
    Skipped,
}

struct ControllerState {
    load: LoadState,
    lists: VaultState,
}

pub struct VaultController {
    store: Arc<dyn RemoteStore>,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<VaultEvent>,
}

impl VaultController {
    pub fn new(store: Arc<dyn RemoteStore>) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            store,
            inner: Mutex::new(ControllerState {
                load: LoadState::Pending,
                lists: VaultState::default(),
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<VaultEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: VaultEvent) {
        // No subscriber is fine.
        let _ = self.events.send(event);
    }

    /// Fetches both lists together; either failure fails the whole load.
    pub async fn load(&self) -> Result<(), VaultError> {
        {
            let mut guard = self.inner.lock().await;
            guard.load = LoadState::Pending;
        }

        let fetched = try_join(
            self.store.list(ListKind::Inventory),
            self.store.list(ListKind::Wishlist),
        )
        .await;

        let mut guard = self.inner.lock().await;
        match fetched {
            Ok((inventory, wishlist)) => {
                guard.lists = VaultState::from_lists(inventory, wishlist);
                guard.load = LoadState::Ready;
                info!(
                    inventory = guard.lists.inventory.len(),
                    wishlist = guard.lists.wishlist.len(),
                    "loaded lists from store"
                );
                self.emit(VaultEvent::Loaded {
                    inventory: guard.lists.inventory.len(),
                    wishlist: guard.lists.wishlist.len(),
                });
                Ok(())
            }
            Err(err) => {
                error!("failed to load lists from store: {err}");
                guard.lists = VaultState::default();
                guard.load = LoadState::Failed(LOAD_FAILURE_NOTICE.to_string());
                self.emit(VaultEvent::LoadFailed(LOAD_FAILURE_NOTICE.to_string()));
                Err(VaultError::Load(err))
            }
        }
    }

    pub async fn load_state(&self) -> LoadState {
        self.inner.lock().await.load.clone()
    }

    pub async fn snapshot(&self) -> VaultState {
        self.inner.lock().await.lists.clone()
    }

    pub async fn records(&self, kind: ListKind) -> Vec<Record> {
        self.inner.lock().await.lists.list(kind).to_vec()
    }

    pub async fn find(&self, id: RecordId) -> Option<Record> {
        self.inner.lock().await.lists.find(id).cloned()
    }

    pub async fn is_in_collection(&self, id: RecordId) -> bool {
        self.inner.lock().await.lists.contains(id)
    }

    pub async fn delete_from_inventory(&self, id: RecordId) -> Result<MutationOutcome, VaultError> {
        self.run_mutation(|lists| lists.delete_from_inventory(id))
            .await
    }

    pub async fn add_to_wishlist(
        &self,
        record: Record,
        priority: Priority,
    ) -> Result<MutationOutcome, VaultError> {
        self.run_mutation(|lists| lists.add_to_wishlist(record, priority))
            .await
    }

    pub async fn move_to_inventory(&self, id: RecordId) -> Result<MutationOutcome, VaultError> {
        self.run_mutation(|lists| lists.move_to_inventory(id))
            .await
    }

    pub async fn update_priority(
        &self,
        id: RecordId,
        priority: Priority,
    ) -> Result<MutationOutcome, VaultError> {
        self.run_mutation(|lists| lists.update_priority(id, priority))
            .await
    }

    pub async fn export(&self, kind: ListKind) -> ExportFile {
        let guard = self.inner.lock().await;
        export_list(kind, guard.lists.list(kind))
    }

    async fn run_mutation<F>(&self, plan: F) -> Result<MutationOutcome, VaultError>
    where
        F: FnOnce(&VaultState) -> Option<Mutation>,
    {
        let (kind, rollback, request) = {
            let mut guard = self.inner.lock().await;
            if guard.load != LoadState::Ready {
                return Err(VaultError::NotLoaded);
            }
            let Some(Mutation {
                kind,
                next,
                rollback,
                request,
            }) = plan(&guard.lists)
            else {
                return Ok(MutationOutcome::Skipped);
            };
            guard.lists = next;
            (kind, rollback, request)
        };

        let record_id = request.record_id();
        let result = match self.store.mutate(&request).await {
            Ok(response) if response.is_success() => Ok(()),
            Ok(response) => Err(shared::error::ApiError::rejected(
                response
                    .message
                    .unwrap_or_else(|| "store reported a failure".to_string()),
            )),
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => {
                info!(action = kind.label(), record_id = record_id.0, "store confirmed mutation");
                self.emit(VaultEvent::MutationApplied { kind, record_id });
                Ok(MutationOutcome::Applied)
            }
            Err(source) => {
                {
                    let mut guard = self.inner.lock().await;
                    guard.lists.restore(rollback);
                }
                warn!(
                    action = kind.label(),
                    record_id = record_id.0,
                    "store write failed, rolled back: {source}"
                );
                self.emit(VaultEvent::MutationRolledBack {
                    kind,
                    record_id,
                    notice: kind.failure_notice().to_string(),
                });
                Err(VaultError::Mutation { kind, source })
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
