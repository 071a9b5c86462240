use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{
    Admin, Customer, NewAdmin, NewCustomer, NewPotentialCustomer, PotentialCustomer, RefreshToken,
};

/// Errors from the record stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("duplicate value for unique column {0}")]
    Duplicate(&'static str),

    #[error("row status changed underneath the operation")]
    ConditionFailed,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[async_trait]
pub trait PotentialCustomerStore: Send + Sync {
    async fn insert(&self, rec: NewPotentialCustomer) -> Result<PotentialCustomer, StoreError>;

    async fn find(&self, id: i64) -> Result<Option<PotentialCustomer>, StoreError>;

    async fn find_by_member_id(&self, member_id: &str)
        -> Result<Option<PotentialCustomer>, StoreError>;

    async fn list(&self) -> Result<Vec<PotentialCustomer>, StoreError>;

    /// Persist the full record by primary key. Fails with `NotFound` if the
    /// row no longer exists.
    async fn update(&self, rec: &PotentialCustomer) -> Result<PotentialCustomer, StoreError>;

    /// Returns true if a row was deleted.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn insert(&self, rec: NewCustomer) -> Result<Customer, StoreError>;

    async fn find(&self, id: i64) -> Result<Option<Customer>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Customer>, StoreError>;
}

/// Cross-entity unit of work for promotion: delete the staging row and create
/// the customer row in one transaction. The delete is conditional on the
/// status value the caller read beforehand, so a concurrent promotion that
/// already consumed the row surfaces as `ConditionFailed` (row still present,
/// different status) or `NotFound` (row gone). A username collision with an
/// existing customer surfaces as `Duplicate("username")` and rolls back.
#[async_trait]
pub trait PromotionStore: Send + Sync {
    async fn promote(
        &self,
        staging_id: i64,
        expected_status: &str,
        new_customer: NewCustomer,
    ) -> Result<Customer, StoreError>;
}

#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn insert(&self, rec: NewAdmin) -> Result<Admin, StoreError>;

    async fn find(&self, id: i64) -> Result<Option<Admin>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Admin>, StoreError>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn insert(&self, token: &str, admin_id: i64) -> Result<RefreshToken, StoreError>;

    async fn find(&self, token: &str) -> Result<Option<RefreshToken>, StoreError>;

    /// Returns true if a row was deleted.
    async fn delete(&self, token: &str) -> Result<bool, StoreError>;
}
