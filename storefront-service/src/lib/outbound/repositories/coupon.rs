use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::coupon::errors::CouponError;
use crate::domain::coupon::models::Coupon;
use crate::domain::coupon::ports::CouponRepository;
use crate::domain::user::models::UserId;

pub struct PostgresCouponRepository {
    pool: PgPool,
}

impl PostgresCouponRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CouponRow {
    id: Uuid,
    code: String,
    discount_percentage: i16,
    expiration_date: DateTime<Utc>,
    is_active: bool,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<CouponRow> for Coupon {
    type Error = CouponError;

    fn try_from(row: CouponRow) -> Result<Self, Self::Error> {
        let discount_percentage = u8::try_from(row.discount_percentage)
            .ok()
            .filter(|pct| *pct <= 100)
            .ok_or_else(|| {
                CouponError::DatabaseError(format!(
                    "coupon {} has discount {} outside 0-100",
                    row.id, row.discount_percentage
                ))
            })?;

        Ok(Coupon {
            id: row.id,
            code: row.code,
            discount_percentage,
            expiration_date: row.expiration_date,
            is_active: row.is_active,
            user_id: UserId(row.user_id),
            created_at: row.created_at,
        })
    }
}

fn database_error(e: sqlx::Error) -> CouponError {
    CouponError::DatabaseError(e.to_string())
}

#[async_trait]
impl CouponRepository for PostgresCouponRepository {
    async fn find_active_for_user(&self, user_id: &UserId) -> Result<Option<Coupon>, CouponError> {
        let row = sqlx::query_as::<_, CouponRow>(
            r#"
            SELECT id, code, discount_percentage, expiration_date, is_active, user_id, created_at
            FROM coupons
            WHERE user_id = $1 AND is_active
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(Coupon::try_from).transpose()
    }

    async fn find_active_by_code(
        &self,
        user_id: &UserId,
        code: &str,
    ) -> Result<Option<Coupon>, CouponError> {
        let row = sqlx::query_as::<_, CouponRow>(
            r#"
            SELECT id, code, discount_percentage, expiration_date, is_active, user_id, created_at
            FROM coupons
            WHERE user_id = $1 AND code = $2 AND is_active
            "#,
        )
        .bind(user_id.0)
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(Coupon::try_from).transpose()
    }

    async fn replace_for_user(&self, coupon: Coupon) -> Result<Coupon, CouponError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        sqlx::query("DELETE FROM coupons WHERE user_id = $1")
            .bind(coupon.user_id.0)
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;

        sqlx::query(
            r#"
            INSERT INTO coupons (id, code, discount_percentage, expiration_date, is_active, user_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(coupon.id)
        .bind(&coupon.code)
        .bind(i16::from(coupon.discount_percentage))
        .bind(coupon.expiration_date)
        .bind(coupon.is_active)
        .bind(coupon.user_id.0)
        .bind(coupon.created_at)
        .execute(&mut *tx)
        .await
        .map_err(database_error)?;

        tx.commit().await.map_err(database_error)?;

        Ok(coupon)
    }

    async fn deactivate(&self, user_id: &UserId, code: &str) -> Result<(), CouponError> {
        sqlx::query("UPDATE coupons SET is_active = FALSE WHERE user_id = $1 AND code = $2")
            .bind(user_id.0)
            .bind(code)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(())
    }
}
