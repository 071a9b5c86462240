//! Credential issuance for promoted customers.
//!
//! Username = first name plus a random integer in [0, 10000), retried until
//! it collides with no existing customer. Password = first name plus DOB
//! digits, e.g. `Maria` + 1985-08-25 -> `Maria19850825`. The plaintext is
//! surfaced once for out-of-band delivery and persisted only as a bcrypt
//! hash.

use chrono::NaiveDate;
use rand::Rng;
use thiserror::Error;

use crate::config;
use crate::database::store::{CustomerStore, StoreError};

/// An unbounded retry would spin on a busy name space; exhaustion surfaces
/// as an error instead.
pub const MAX_USERNAME_ATTEMPTS: usize = 32;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("could not find a free username after {0} attempts")]
    Exhausted(usize),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Generated credential triple. `password` is the one-time plaintext; only
/// `password_hash` may be persisted.
#[derive(Debug, Clone)]
pub struct CredentialSet {
    pub username: String,
    pub password: String,
    pub password_hash: String,
}

/// Deterministic password from the person's first name and date of birth,
/// with the date separators removed.
pub fn derive_password(first_name: &str, dob: NaiveDate) -> String {
    format!("{}{}", first_name, dob.format("%Y%m%d"))
}

fn candidate_username(first_name: &str) -> String {
    let n: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("{}{}", first_name, n)
}

/// Run bcrypt on the blocking pool; hashing at cost 10+ is too slow for an
/// async worker thread.
pub async fn hash_password(plaintext: String) -> Result<String, CredentialError> {
    let cost = config::config().security.bcrypt_cost;
    tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost))
        .await
        .map_err(|e| CredentialError::Hash(e.to_string()))?
        .map_err(|e| CredentialError::Hash(e.to_string()))
}

pub async fn verify_password(
    plaintext: String,
    hash: String,
) -> Result<bool, CredentialError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &hash))
        .await
        .map_err(|e| CredentialError::Hash(e.to_string()))?
        .map_err(|e| CredentialError::Hash(e.to_string()))
}

/// Produce a credential set whose username is not in use by any customer.
///
/// This pre-check keeps the happy path collision-free; the unique constraint
/// on `customers.username` remains the authoritative guard at insert time.
pub async fn issue(
    first_name: &str,
    dob: NaiveDate,
    customers: &dyn CustomerStore,
) -> Result<CredentialSet, CredentialError> {
    let mut username = None;
    for _ in 0..MAX_USERNAME_ATTEMPTS {
        let candidate = candidate_username(first_name);
        if customers.find_by_username(&candidate).await?.is_none() {
            username = Some(candidate);
            break;
        }
    }
    let username = username.ok_or(CredentialError::Exhausted(MAX_USERNAME_ATTEMPTS))?;

    let password = derive_password(first_name, dob);
    let password_hash = hash_password(password.clone()).await?;

    Ok(CredentialSet {
        username,
        password,
        password_hash,
    })
}
