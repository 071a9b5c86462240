use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Staging record for a person awaiting intake completion and credential
/// issuance. Promotion moves the data into `Customer` and deletes this row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PotentialCustomer {
    pub potential_customer_id: i64,
    pub member_id: String,
    pub name: String,
    pub medicaid_id: Option<String>,
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
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PotentialCustomer {
    /// Just registered, intake form not yet filled.
    pub const STATUS_NEW: &'static str = "New";
    /// Intake form completed, ready for credential issuance.
    pub const STATUS_GEN_CREDS: &'static str = "GenCreds";

    pub fn credentials_ready(&self) -> bool {
        self.status == Self::STATUS_GEN_CREDS
    }

    /// First token of the full name, used for credential derivation.
    pub fn first_name(&self) -> &str {
        self.name.split(' ').next().unwrap_or(&self.name)
    }
}

/// Fields accepted when registering a new potential customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPotentialCustomer {
    pub member_id: String,
    pub name: String,
    pub medicaid_id: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub member_dob: NaiveDate,
    pub note: Option<String>,
}
