use std::sync::Arc;

use service::crud::{seed, CrudService, Record, RecordId, Variant};
use service::errors::ServiceError;
use service::storage::memory_map_store::MemoryMapStore;

use crate::errors::{ApiError, ErrorStyle};

/// Router state for one variant: which tier is being served plus its
/// handler set.
#[derive(Clone)]
pub struct CrudState<K> {
    pub variant: Variant,
    pub crud: Arc<CrudService<K>>,
}

pub type ItemsState = CrudState<i64>;
pub type UsersState = CrudState<String>;

impl<K: RecordId> CrudState<K> {
    pub fn new(variant: Variant, store: Arc<MemoryMapStore<K, Record>>) -> Self {
        Self { variant, crud: Arc::new(CrudService::for_variant(variant, store)) }
    }

    /// State backed by an empty store.
    pub fn fresh(variant: Variant) -> Self {
        Self::new(variant, MemoryMapStore::new())
    }

    pub fn style(&self) -> ErrorStyle {
        ErrorStyle::for_variant(self.variant)
    }

    /// Translate a service fault with this variant's error style.
    pub fn reject(&self, err: ServiceError) -> ApiError {
        ApiError::from_service(err, self.style())
    }
}

/// Whatever the configured variant needs to serve.
#[derive(Clone)]
pub enum ServerState {
    Items(ItemsState),
    Users(UsersState),
}

impl ServerState {
    /// Build the state for `variant`; the stricter users tiers optionally
    /// start with the demo users.
    pub fn for_variant(variant: Variant, seed_demo_records: bool) -> Self {
        match variant.resource() {
            service::crud::Resource::Items => ServerState::Items(ItemsState::fresh(variant)),
            service::crud::Resource::Users => {
                let rows = if seed_demo_records { seed::demo_users_for(variant) } else { Vec::new() };
                ServerState::Users(UsersState::new(variant, MemoryMapStore::with_entries(rows)))
            }
        }
    }

    pub fn variant(&self) -> Variant {
        match self {
            ServerState::Items(s) => s.variant,
            ServerState::Users(s) => s.variant,
        }
    }
}
