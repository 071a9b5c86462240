use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::database::models::{NewPotentialCustomer, PotentialCustomer};
use crate::database::store::{PotentialCustomerStore, StoreError};
use crate::services::WorkflowError;

/// Intake form payload. Every field is optional; empty or omitted values
/// leave the stored field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntakeForm {
    pub potential_customer_id: i64,
    pub address: Option<String>,
    pub preferred_delivery_time: Option<String>,
    pub delivery_note: Option<String>,
    pub alternate_contact_name: Option<String>,
    pub alternate_contact_phone: Option<String>,
    pub alternate_contact_address: Option<String>,
    pub allergies: Option<String>,
}

/// Drives the staging record through New -> GenCreds, and out of the table
/// on rejection. Promotion lives in `PromotionService`.
pub struct IntakeService {
    potentials: Arc<dyn PotentialCustomerStore>,
}

impl IntakeService {
    pub fn new(potentials: Arc<dyn PotentialCustomerStore>) -> Self {
        Self { potentials }
    }

    /// Register a new potential customer with status `New`.
    pub async fn register(
        &self,
        rec: NewPotentialCustomer,
    ) -> Result<PotentialCustomer, WorkflowError> {
        match self.potentials.insert(rec).await {
            Ok(staged) => {
                info!(id = staged.potential_customer_id, member_id = %staged.member_id,
                    "registered potential customer");
                Ok(staged)
            }
            Err(StoreError::Duplicate("member_id")) => Err(WorkflowError::Conflict(
                "Potential customer with this member id already exists".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list(&self) -> Result<Vec<PotentialCustomer>, WorkflowError> {
        Ok(self.potentials.list().await?)
    }

    /// New -> GenCreds. Not idempotent by design: a second fill attempt after
    /// the first succeeded is rejected with Conflict and mutates nothing.
    pub async fn fill_form(&self, form: &IntakeForm) -> Result<PotentialCustomer, WorkflowError> {
        let mut rec = self
            .potentials
            .find(form.potential_customer_id)
            .await?
            .ok_or(WorkflowError::NotFound("potential customer"))?;

        if rec.credentials_ready() {
            return Err(WorkflowError::Conflict(
                "Form already filled and credentials generated for this customer".to_string(),
            ));
        }

        apply_field(&mut rec.address, form.address.as_deref());
        apply_field(
            &mut rec.preferred_delivery_time,
            form.preferred_delivery_time.as_deref(),
        );
        apply_field(&mut rec.delivery_note, form.delivery_note.as_deref());
        apply_field(
            &mut rec.alternate_contact_name,
            form.alternate_contact_name.as_deref(),
        );
        apply_field(
            &mut rec.alternate_contact_phone,
            form.alternate_contact_phone.as_deref(),
        );
        apply_field(
            &mut rec.alternate_contact_address,
            form.alternate_contact_address.as_deref(),
        );
        apply_field(&mut rec.allergies, form.allergies.as_deref());
        rec.status = PotentialCustomer::STATUS_GEN_CREDS.to_string();

        let updated = self.potentials.update(&rec).await?;
        info!(id = updated.potential_customer_id, "intake form filled");
        Ok(updated)
    }

    /// Terminal rejection: delete the staging row.
    pub async fn reject(&self, id: i64) -> Result<(), WorkflowError> {
        if self.potentials.delete(id).await? {
            info!(id, "potential customer rejected and removed");
            Ok(())
        } else {
            Err(WorkflowError::NotFound("potential customer"))
        }
    }
}

/// Overwrite only when the provided value is non-empty.
fn apply_field(dst: &mut Option<String>, src: Option<&str>) {
    if let Some(v) = src {
        if !v.is_empty() {
            *dst = Some(v.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::database::memory::MemoryStore;

    fn service() -> (Arc<MemoryStore>, IntakeService) {
        let store = Arc::new(MemoryStore::new());
        let service = IntakeService::new(store.clone());
        (store, service)
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

    #[tokio::test]
    async fn register_rejects_duplicate_member_id() {
        let (_, service) = service();
        service.register(maria()).await.unwrap();

        let err = service.register(maria()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));
    }

    #[tokio::test]
    async fn second_fill_is_a_conflict_and_mutates_nothing() {
        let (store, service) = service();
        let staged = service.register(maria()).await.unwrap();

        let first = IntakeForm {
            potential_customer_id: staged.potential_customer_id,
            address: Some("99 New Avenue".to_string()),
            allergies: Some("peanuts".to_string()),
            ..Default::default()
        };
        let filled = service.fill_form(&first).await.unwrap();
        assert_eq!(filled.status, PotentialCustomer::STATUS_GEN_CREDS);
        assert_eq!(filled.address.as_deref(), Some("99 New Avenue"));

        let second = IntakeForm {
            potential_customer_id: staged.potential_customer_id,
            address: Some("1 Other Road".to_string()),
            ..Default::default()
        };
        let err = service.fill_form(&second).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));

        let current = PotentialCustomerStore::find(&*store, staged.potential_customer_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.address.as_deref(), Some("99 New Avenue"));
        assert_eq!(current.allergies.as_deref(), Some("peanuts"));
    }

    #[tokio::test]
    async fn empty_fields_preserve_stored_values() {
        let (_, service) = service();
        let staged = service.register(maria()).await.unwrap();

        let form = IntakeForm {
            potential_customer_id: staged.potential_customer_id,
            address: Some(String::new()),
            delivery_note: Some("ring the bell".to_string()),
            ..Default::default()
        };
        let filled = service.fill_form(&form).await.unwrap();

        // Empty address preserved the registration value; the note overwrote
        assert_eq!(filled.address.as_deref(), Some("12 Old Street"));
        assert_eq!(filled.delivery_note.as_deref(), Some("ring the bell"));
    }

    #[tokio::test]
    async fn fill_form_unknown_id_is_not_found() {
        let (_, service) = service();
        let form = IntakeForm {
            potential_customer_id: 4242,
            ..Default::default()
        };
        let err = service.fill_form(&form).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
    }

    #[tokio::test]
    async fn reject_removes_the_row() {
        let (store, service) = service();
        let staged = service.register(maria()).await.unwrap();

        service.reject(staged.potential_customer_id).await.unwrap();
        assert!(PotentialCustomerStore::find(&*store, staged.potential_customer_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn reject_unknown_id_is_not_found() {
        let (store, service) = service();
        let staged = service.register(maria()).await.unwrap();

        let err = service.reject(999).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));

        // No mutation happened
        assert!(PotentialCustomerStore::find(&*store, staged.potential_customer_id)
            .await
            .unwrap()
            .is_some());
    }
}
