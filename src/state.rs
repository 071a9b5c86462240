use std::sync::Arc;

use sqlx::PgPool;

use crate::database::memory::MemoryStore;
use crate::database::postgres::PgStore;
use crate::database::store::{
    AdminStore, CustomerStore, PotentialCustomerStore, PromotionStore, RefreshTokenStore,
};
use crate::services::{AuthService, IntakeService, PromotionService};

/// Shared application state: workflow services over an injected record
/// store. There is no ambient model registry; everything reachable from a
/// handler goes through here.
#[derive(Clone)]
pub struct AppState {
    pub intake: Arc<IntakeService>,
    pub promotion: Arc<PromotionService>,
    pub auth: Arc<AuthService>,
    pool: Option<PgPool>,
}

impl AppState {
    /// Production wiring over Postgres.
    pub fn postgres(pool: PgPool) -> Self {
        Self::from_store(Arc::new(PgStore::new(pool.clone())), Some(pool))
    }

    /// In-memory wiring for tests and local development without a database.
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::new()), None)
    }

    fn from_store<S>(store: Arc<S>, pool: Option<PgPool>) -> Self
    where
        S: PotentialCustomerStore
            + CustomerStore
            + PromotionStore
            + AdminStore
            + RefreshTokenStore
            + 'static,
    {
        Self {
            intake: Arc::new(IntakeService::new(store.clone())),
            promotion: Arc::new(PromotionService::new(
                store.clone(),
                store.clone(),
                store.clone(),
            )),
            auth: Arc::new(AuthService::new(store.clone(), store)),
            pool,
        }
    }

    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }
}
