use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::database::models::{
    Admin, Customer, NewAdmin, NewCustomer, NewPotentialCustomer, PotentialCustomer, RefreshToken,
};
use crate::database::store::{
    AdminStore, CustomerStore, PotentialCustomerStore, PromotionStore, RefreshTokenStore,
    StoreError,
};

#[derive(Default)]
struct Inner {
    next_id: i64,
    potential_customers: HashMap<i64, PotentialCustomer>,
    customers: HashMap<i64, Customer>,
    admins: HashMap<i64, Admin>,
    refresh_tokens: HashMap<String, RefreshToken>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory record store. Backs the test suite and local development
/// without Postgres. All entity maps share one mutex so the promotion unit
/// of work is atomic, matching the transactional contract of `PgStore`.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_customer_locked(
        inner: &mut Inner,
        rec: NewCustomer,
    ) -> Result<Customer, StoreError> {
        if inner.customers.values().any(|c| c.username == rec.username) {
            return Err(StoreError::Duplicate("username"));
        }
        let now = Utc::now();
        let customer = Customer {
            customer_id: inner.next_id(),
            username: rec.username,
            password_hash: rec.password_hash,
            member_id: rec.member_id,
            medicaid_id: rec.medicaid_id,
            name: rec.name,
            phone: rec.phone,
            address: rec.address,
            delivery_note: rec.delivery_note,
            preferred_delivery_time: rec.preferred_delivery_time,
            alternate_contact_name: rec.alternate_contact_name,
            alternate_contact_phone: rec.alternate_contact_phone,
            alternate_contact_address: rec.alternate_contact_address,
            allergies: rec.allergies,
            member_dob: rec.member_dob,
            status: rec.status,
            coordinator_id: None,
            insurance_id: None,
            created_at: now,
            updated_at: now,
        };
        inner.customers.insert(customer.customer_id, customer.clone());
        Ok(customer)
    }
}

#[async_trait]
impl PotentialCustomerStore for MemoryStore {
    async fn insert(&self, rec: NewPotentialCustomer) -> Result<PotentialCustomer, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .potential_customers
            .values()
            .any(|p| p.member_id == rec.member_id)
        {
            return Err(StoreError::Duplicate("member_id"));
        }
        let now = Utc::now();
        let staged = PotentialCustomer {
            potential_customer_id: inner.next_id(),
            member_id: rec.member_id,
            name: rec.name,
            medicaid_id: rec.medicaid_id,
            phone: rec.phone,
            address: rec.address,
            delivery_note: None,
            preferred_delivery_time: None,
            alternate_contact_name: None,
            alternate_contact_phone: None,
            alternate_contact_address: None,
            allergies: None,
            member_dob: rec.member_dob,
            status: PotentialCustomer::STATUS_NEW.to_string(),
            note: rec.note,
            created_at: now,
            updated_at: now,
        };
        inner
            .potential_customers
            .insert(staged.potential_customer_id, staged.clone());
        Ok(staged)
    }

    async fn find(&self, id: i64) -> Result<Option<PotentialCustomer>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.potential_customers.get(&id).cloned())
    }

    async fn find_by_member_id(
        &self,
        member_id: &str,
    ) -> Result<Option<PotentialCustomer>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .potential_customers
            .values()
            .find(|p| p.member_id == member_id)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<PotentialCustomer>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut recs: Vec<_> = inner.potential_customers.values().cloned().collect();
        recs.sort_by_key(|p| p.potential_customer_id);
        Ok(recs)
    }

    async fn update(&self, rec: &PotentialCustomer) -> Result<PotentialCustomer, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner
            .potential_customers
            .contains_key(&rec.potential_customer_id)
        {
            return Err(StoreError::NotFound);
        }
        let mut updated = rec.clone();
        updated.updated_at = Utc::now();
        inner
            .potential_customers
            .insert(updated.potential_customer_id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.potential_customers.remove(&id).is_some())
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn insert(&self, rec: NewCustomer) -> Result<Customer, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Self::insert_customer_locked(&mut inner, rec)
    }

    async fn find(&self, id: i64) -> Result<Option<Customer>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.customers.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Customer>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .customers
            .values()
            .find(|c| c.username == username)
            .cloned())
    }
}

#[async_trait]
impl PromotionStore for MemoryStore {
    async fn promote(
        &self,
        staging_id: i64,
        expected_status: &str,
        new_customer: NewCustomer,
    ) -> Result<Customer, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        match inner.potential_customers.get(&staging_id) {
            None => return Err(StoreError::NotFound),
            Some(staged) if staged.status != expected_status => {
                return Err(StoreError::ConditionFailed)
            }
            Some(_) => {}
        }

        // Insert first; a username collision must leave the staging row intact.
        let customer = Self::insert_customer_locked(&mut inner, new_customer)?;
        inner.potential_customers.remove(&staging_id);
        Ok(customer)
    }
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn insert(&self, rec: NewAdmin) -> Result<Admin, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.admins.values().any(|a| a.username == rec.username) {
            return Err(StoreError::Duplicate("username"));
        }
        let now = Utc::now();
        let admin = Admin {
            admin_id: inner.next_id(),
            username: rec.username,
            password_hash: rec.password_hash,
            email: rec.email,
            phone: None,
            address: None,
            role: rec.role,
            status: None,
            created_at: now,
            updated_at: now,
        };
        inner.admins.insert(admin.admin_id, admin.clone());
        Ok(admin)
    }

    async fn find(&self, id: i64) -> Result<Option<Admin>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.admins.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Admin>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .admins
            .values()
            .find(|a| a.username == username)
            .cloned())
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn insert(&self, token: &str, admin_id: i64) -> Result<RefreshToken, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.refresh_tokens.contains_key(token) {
            return Err(StoreError::Duplicate("token"));
        }
        let rec = RefreshToken {
            token: token.to_string(),
            admin_id,
            created_at: Utc::now(),
        };
        inner.refresh_tokens.insert(rec.token.clone(), rec.clone());
        Ok(rec)
    }

    async fn find(&self, token: &str) -> Result<Option<RefreshToken>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.refresh_tokens.get(token).cloned())
    }

    async fn delete(&self, token: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.refresh_tokens.remove(token).is_some())
    }
}
