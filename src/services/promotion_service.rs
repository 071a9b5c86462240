use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::database::models::{Customer, NewCustomer, PotentialCustomer};
use crate::database::store::{CustomerStore, PotentialCustomerStore, PromotionStore, StoreError};
use crate::services::credentials::{self, CredentialError};
use crate::services::WorkflowError;

/// How many times a promotion may be re-attempted when the customer insert
/// loses the username race despite the pre-check.
const MAX_PROMOTE_ATTEMPTS: usize = 4;

/// Result of a successful promotion. `password` is the one-time plaintext
/// for credential hand-off; it exists nowhere else.
#[derive(Debug, Serialize)]
pub struct PromotionOutcome {
    pub customer: Customer,
    pub username: String,
    pub password: String,
}

/// Finalizes a `GenCreds` staging record into an active customer and removes
/// the staging row, atomically from the caller's perspective.
pub struct PromotionService {
    potentials: Arc<dyn PotentialCustomerStore>,
    customers: Arc<dyn CustomerStore>,
    promotions: Arc<dyn PromotionStore>,
}

impl PromotionService {
    pub fn new(
        potentials: Arc<dyn PotentialCustomerStore>,
        customers: Arc<dyn CustomerStore>,
        promotions: Arc<dyn PromotionStore>,
    ) -> Self {
        Self {
            potentials,
            customers,
            promotions,
        }
    }

    pub async fn promote(&self, id: i64) -> Result<PromotionOutcome, WorkflowError> {
        let staged = self
            .potentials
            .find(id)
            .await?
            .ok_or(WorkflowError::NotFound("potential customer"))?;

        if staged.status == PotentialCustomer::STATUS_NEW {
            return Err(WorkflowError::IncompleteData);
        }

        let first_name = staged.first_name().to_string();

        for _ in 0..MAX_PROMOTE_ATTEMPTS {
            let creds = credentials::issue(&first_name, staged.member_dob, &*self.customers)
                .await
                .map_err(credential_error)?;

            let new_customer =
                NewCustomer::from_staged(&staged, &creds.username, &creds.password_hash);

            match self
                .promotions
                .promote(staged.potential_customer_id, &staged.status, new_customer)
                .await
            {
                Ok(customer) => {
                    info!(
                        staging_id = staged.potential_customer_id,
                        customer_id = customer.customer_id,
                        username = %creds.username,
                        "promoted potential customer"
                    );
                    return Ok(PromotionOutcome {
                        customer,
                        username: creds.username,
                        password: creds.password,
                    });
                }
                // Lost the username race to a concurrent insert; the unique
                // constraint is authoritative, so draw a new candidate.
                Err(StoreError::Duplicate("username")) => {
                    warn!(
                        staging_id = staged.potential_customer_id,
                        username = %creds.username,
                        "username taken at insert time, retrying"
                    );
                    continue;
                }
                Err(StoreError::ConditionFailed) => {
                    return Err(WorkflowError::Conflict(
                        "Potential customer was promoted or modified concurrently".to_string(),
                    ))
                }
                Err(StoreError::NotFound) => {
                    return Err(WorkflowError::NotFound("potential customer"))
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(WorkflowError::Conflict(format!(
            "could not allocate a unique username after {} attempts",
            MAX_PROMOTE_ATTEMPTS
        )))
    }
}

fn credential_error(err: CredentialError) -> WorkflowError {
    match err {
        CredentialError::Exhausted(attempts) => WorkflowError::Conflict(format!(
            "could not allocate a unique username after {} attempts",
            attempts
        )),
        CredentialError::Hash(msg) => WorkflowError::Internal(msg),
        CredentialError::Store(e) => e.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::database::memory::MemoryStore;
    use crate::database::models::NewPotentialCustomer;
    use crate::services::{IntakeForm, IntakeService};

    struct Fixture {
        store: Arc<MemoryStore>,
        intake: IntakeService,
        promotion: PromotionService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        Fixture {
            store: store.clone(),
            intake: IntakeService::new(store.clone()),
            promotion: PromotionService::new(store.clone(), store.clone(), store),
        }
    }

    fn maria() -> NewPotentialCustomer {
        NewPotentialCustomer {
            member_id: "M-1001".to_string(),
            name: "Maria Lopez".to_string(),
            medicaid_id: Some("MC-42".to_string()),
            phone: Some("555-0101".to_string()),
            address: Some("12 Old Street".to_string()),
            member_dob: NaiveDate::from_ymd_opt(1985, 8, 25).unwrap(),
            note: None,
        }
    }

    async fn registered_and_filled(fx: &Fixture) -> i64 {
        let staged = fx.intake.register(maria()).await.unwrap();
        let form = IntakeForm {
            potential_customer_id: staged.potential_customer_id,
            preferred_delivery_time: Some("10:00 AM".to_string()),
            allergies: Some("shellfish".to_string()),
            ..Default::default()
        };
        fx.intake.fill_form(&form).await.unwrap();
        staged.potential_customer_id
    }

    #[tokio::test]
    async fn promoting_new_record_demands_form_first() {
        let fx = fixture();
        let staged = fx.intake.register(maria()).await.unwrap();

        let err = fx
            .promotion
            .promote(staged.potential_customer_id)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::IncompleteData));

        // The staging row is untouched
        let current = PotentialCustomerStore::find(&*fx.store, staged.potential_customer_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.status, PotentialCustomer::STATUS_NEW);
    }

    #[tokio::test]
    async fn promoting_unknown_id_is_not_found() {
        let fx = fixture();
        let err = fx.promotion.promote(4242).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
    }

    #[tokio::test]
    async fn promotion_copies_fields_and_consumes_the_staging_row() {
        let fx = fixture();
        let id = registered_and_filled(&fx).await;

        let outcome = fx.promotion.promote(id).await.unwrap();

        assert_eq!(outcome.customer.name, "Maria Lopez");
        assert_eq!(outcome.customer.member_id, "M-1001");
        assert_eq!(outcome.customer.status, Customer::STATUS_ACTIVE);
        assert_eq!(outcome.customer.allergies.as_deref(), Some("shellfish"));
        assert_eq!(
            outcome.customer.preferred_delivery_time.as_deref(),
            Some("10:00 AM")
        );
        assert!(outcome.username.starts_with("Maria"));
        assert_eq!(outcome.password, "Maria19850825");
        assert_eq!(outcome.customer.username, outcome.username);

        // One-shot: the staging row is gone
        assert!(PotentialCustomerStore::find(&*fx.store, id)
            .await
            .unwrap()
            .is_none());

        // Only the hash was persisted
        let stored = CustomerStore::find(&*fx.store, outcome.customer.customer_id)
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored.password_hash, outcome.password);
        assert!(bcrypt::verify(&outcome.password, &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn second_promotion_of_same_id_fails() {
        let fx = fixture();
        let id = registered_and_filled(&fx).await;

        fx.promotion.promote(id).await.unwrap();
        let err = fx.promotion.promote(id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
    }

    #[tokio::test]
    async fn concurrent_promotions_produce_exactly_one_customer() {
        let fx = fixture();
        let id = registered_and_filled(&fx).await;

        let promo_a = Arc::new(PromotionService::new(
            fx.store.clone(),
            fx.store.clone(),
            fx.store.clone(),
        ));
        let promo_b = Arc::new(PromotionService::new(
            fx.store.clone(),
            fx.store.clone(),
            fx.store.clone(),
        ));

        let a = tokio::spawn({
            let promo = promo_a.clone();
            async move { promo.promote(id).await }
        });
        let b = tokio::spawn({
            let promo = promo_b.clone();
            async move { promo.promote(id).await }
        });

        let results = [a.await.unwrap(), b.await.unwrap()];
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1, "exactly one promotion may succeed");

        let loser = results.iter().find(|r| r.is_err()).unwrap();
        match loser {
            Err(WorkflowError::NotFound(_)) | Err(WorkflowError::Conflict(_)) => {}
            other => panic!("unexpected loser outcome: {:?}", other.as_ref().err()),
        }

        // Exactly one customer row for the member
        let customer = CustomerStore::find_by_username(
            &*fx.store,
            &results
                .iter()
                .find_map(|r| r.as_ref().ok())
                .unwrap()
                .username,
        )
        .await
        .unwrap();
        assert!(customer.is_some());
    }
}
