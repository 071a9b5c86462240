use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::potential_customer::PotentialCustomer;

/// Active customer record. Created only by promotion from a
/// `PotentialCustomer` or by direct administrative creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub customer_id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub member_id: String,
    pub medicaid_id: Option<String>,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub delivery_note: Option<String>,
    pub preferred_delivery_time: Option<String>,
    pub alternate_contact_name: Option<String>,
    pub alternate_contact_phone: Option<String>,
    pub alternate_contact_address: Option<String>,
    pub allergies: Option<String>,
    pub member_dob: NaiveDate,
    pub status: String,
    pub coordinator_id: Option<i64>,
    pub insurance_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub const STATUS_ACTIVE: &'static str = "Active";
}

/// Insert payload for a customer row.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub username: String,
    pub password_hash: String,
    pub member_id: String,
    pub medicaid_id: Option<String>,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub delivery_note: Option<String>,
    pub preferred_delivery_time: Option<String>,
    pub alternate_contact_name: Option<String>,
    pub alternate_contact_phone: Option<String>,
    pub alternate_contact_address: Option<String>,
    pub allergies: Option<String>,
    pub member_dob: NaiveDate,
    pub status: String,
}

impl NewCustomer {
    /// Mirror every intake field from a completed staging record, attaching
    /// the generated username and password hash.
    pub fn from_staged(staged: &PotentialCustomer, username: &str, password_hash: &str) -> Self {
        Self {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            member_id: staged.member_id.clone(),
            medicaid_id: staged.medicaid_id.clone(),
            name: staged.name.clone(),
            phone: staged.phone.clone(),
            address: staged.address.clone(),
            delivery_note: staged.delivery_note.clone(),
            preferred_delivery_time: staged.preferred_delivery_time.clone(),
            alternate_contact_name: staged.alternate_contact_name.clone(),
            alternate_contact_phone: staged.alternate_contact_phone.clone(),
            alternate_contact_address: staged.alternate_contact_address.clone(),
            allergies: staged.allergies.clone(),
            member_dob: staged.member_dob,
            status: Customer::STATUS_ACTIVE.to_string(),
        }
    }
}
