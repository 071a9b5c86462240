use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::models::{
    Admin, Customer, NewAdmin, NewCustomer, NewPotentialCustomer, PotentialCustomer, RefreshToken,
};
use crate::database::store::{
    AdminStore, CustomerStore, PotentialCustomerStore, PromotionStore, RefreshTokenStore,
    StoreError,
};

/// Postgres-backed record store. One struct implements every entity store so
/// the promotion unit of work can span both tables in a single transaction.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map Postgres unique violations (SQLSTATE 23505) onto the column they
/// protect; everything else passes through as a backend error.
fn map_unique(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = err {
        if db.code().as_deref() == Some("23505") {
            let constraint = db.constraint().unwrap_or_default();
            if constraint.contains("username") {
                return StoreError::Duplicate("username");
            }
            if constraint.contains("member_id") {
                return StoreError::Duplicate("member_id");
            }
            if constraint.contains("refresh_tokens") {
                return StoreError::Duplicate("token");
            }
            return StoreError::Duplicate("unknown");
        }
    }
    StoreError::Sqlx(err)
}

const INSERT_CUSTOMER: &str = r#"
    INSERT INTO customers (
        username, password_hash, member_id, medicaid_id, name, phone, address,
        delivery_note, preferred_delivery_time, alternate_contact_name,
        alternate_contact_phone, alternate_contact_address, allergies,
        member_dob, status
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
    RETURNING *
"#;

fn bind_new_customer(
    rec: NewCustomer,
) -> sqlx::query::QueryAs<'static, sqlx::Postgres, Customer, sqlx::postgres::PgArguments> {
    sqlx::query_as::<_, Customer>(INSERT_CUSTOMER)
        .bind(rec.username)
        .bind(rec.password_hash)
        .bind(rec.member_id)
        .bind(rec.medicaid_id)
        .bind(rec.name)
        .bind(rec.phone)
        .bind(rec.address)
        .bind(rec.delivery_note)
        .bind(rec.preferred_delivery_time)
        .bind(rec.alternate_contact_name)
        .bind(rec.alternate_contact_phone)
        .bind(rec.alternate_contact_address)
        .bind(rec.allergies)
        .bind(rec.member_dob)
        .bind(rec.status)
}

#[async_trait]
impl PotentialCustomerStore for PgStore {
    async fn insert(&self, rec: NewPotentialCustomer) -> Result<PotentialCustomer, StoreError> {
        sqlx::query_as::<_, PotentialCustomer>(
            r#"
            INSERT INTO potential_customers (
                member_id, name, medicaid_id, phone, address, member_dob, status, note
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(rec.member_id)
        .bind(rec.name)
        .bind(rec.medicaid_id)
        .bind(rec.phone)
        .bind(rec.address)
        .bind(rec.member_dob)
        .bind(PotentialCustomer::STATUS_NEW)
        .bind(rec.note)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique)
    }

    async fn find(&self, id: i64) -> Result<Option<PotentialCustomer>, StoreError> {
        let rec = sqlx::query_as::<_, PotentialCustomer>(
            "SELECT * FROM potential_customers WHERE potential_customer_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rec)
    }

    async fn find_by_member_id(
        &self,
        member_id: &str,
    ) -> Result<Option<PotentialCustomer>, StoreError> {
        let rec = sqlx::query_as::<_, PotentialCustomer>(
            "SELECT * FROM potential_customers WHERE member_id = $1",
        )
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rec)
    }

    async fn list(&self) -> Result<Vec<PotentialCustomer>, StoreError> {
        let recs = sqlx::query_as::<_, PotentialCustomer>(
            "SELECT * FROM potential_customers ORDER BY potential_customer_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(recs)
    }

    async fn update(&self, rec: &PotentialCustomer) -> Result<PotentialCustomer, StoreError> {
        sqlx::query_as::<_, PotentialCustomer>(
            r#"
            UPDATE potential_customers SET
                member_id = $2, name = $3, medicaid_id = $4, phone = $5,
                address = $6, delivery_note = $7, preferred_delivery_time = $8,
                alternate_contact_name = $9, alternate_contact_phone = $10,
                alternate_contact_address = $11, allergies = $12,
                member_dob = $13, status = $14, note = $15, updated_at = now()
            WHERE potential_customer_id = $1
            RETURNING *
            "#,
        )
        .bind(rec.potential_customer_id)
        .bind(&rec.member_id)
        .bind(&rec.name)
        .bind(&rec.medicaid_id)
        .bind(&rec.phone)
        .bind(&rec.address)
        .bind(&rec.delivery_note)
        .bind(&rec.preferred_delivery_time)
        .bind(&rec.alternate_contact_name)
        .bind(&rec.alternate_contact_phone)
        .bind(&rec.alternate_contact_address)
        .bind(&rec.allergies)
        .bind(rec.member_dob)
        .bind(&rec.status)
        .bind(&rec.note)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique)?
        .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM potential_customers WHERE potential_customer_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CustomerStore for PgStore {
    async fn insert(&self, rec: NewCustomer) -> Result<Customer, StoreError> {
        bind_new_customer(rec)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique)
    }

    async fn find(&self, id: i64) -> Result<Option<Customer>, StoreError> {
        let rec = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE customer_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rec)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Customer>, StoreError> {
        let rec = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rec)
    }
}

#[async_trait]
impl PromotionStore for PgStore {
    async fn promote(
        &self,
        staging_id: i64,
        expected_status: &str,
        new_customer: NewCustomer,
    ) -> Result<Customer, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Conditional delete doubles as the compare-and-swap: only one
        // concurrent promotion can consume the staging row.
        let deleted = sqlx::query(
            "DELETE FROM potential_customers
             WHERE potential_customer_id = $1 AND status = $2",
        )
        .bind(staging_id)
        .bind(expected_status)
        .execute(&mut *tx)
        .await?;

        if deleted.rows_affected() == 0 {
            let still_there: Option<(i64,)> = sqlx::query_as(
                "SELECT potential_customer_id FROM potential_customers
                 WHERE potential_customer_id = $1",
            )
            .bind(staging_id)
            .fetch_optional(&mut *tx)
            .await?;

            return Err(if still_there.is_some() {
                StoreError::ConditionFailed
            } else {
                StoreError::NotFound
            });
        }

        let customer = bind_new_customer(new_customer)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_unique)?;

        tx.commit().await?;
        Ok(customer)
    }
}

#[async_trait]
impl AdminStore for PgStore {
    async fn insert(&self, rec: NewAdmin) -> Result<Admin, StoreError> {
        sqlx::query_as::<_, Admin>(
            r#"
            INSERT INTO admins (username, password_hash, email, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(rec.username)
        .bind(rec.password_hash)
        .bind(rec.email)
        .bind(rec.role)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique)
    }

    async fn find(&self, id: i64) -> Result<Option<Admin>, StoreError> {
        let rec = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE admin_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rec)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Admin>, StoreError> {
        let rec = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rec)
    }
}

#[async_trait]
impl RefreshTokenStore for PgStore {
    async fn insert(&self, token: &str, admin_id: i64) -> Result<RefreshToken, StoreError> {
        sqlx::query_as::<_, RefreshToken>(
            "INSERT INTO refresh_tokens (token, admin_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(token)
        .bind(admin_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique)
    }

    async fn find(&self, token: &str) -> Result<Option<RefreshToken>, StoreError> {
        let rec =
            sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE token = $1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;
        Ok(rec)
    }

    async fn delete(&self, token: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
