use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Durable credential used to mint new access tokens without
/// re-authenticating. At most one live row per token value; a token must
/// exist here to be considered valid.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    pub token: String,
    pub admin_id: i64,
    pub created_at: DateTime<Utc>,
}
