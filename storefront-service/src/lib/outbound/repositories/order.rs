use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::checkout::errors::CheckoutError;
use crate::domain::checkout::models::Order;
use crate::domain::checkout::models::OrderItem;
use crate::domain::checkout::ports::OrderRepository;
use crate::domain::user::models::UserId;

pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    items: Json<Vec<OrderItem>>,
    total_amount_cents: i64,
    payment_session_id: String,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            user_id: UserId(row.user_id),
            items: row.items.0,
            total_amount_cents: row.total_amount_cents,
            payment_session_id: row.payment_session_id,
            created_at: row.created_at,
        }
    }
}

fn database_error(e: sqlx::Error) -> CheckoutError {
    CheckoutError::DatabaseError(e.to_string())
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create(&self, order: Order) -> Result<Order, CheckoutError> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, items, total_amount_cents, payment_session_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order.id)
        .bind(order.user_id.0)
        .bind(Json(&order.items))
        .bind(order.total_amount_cents)
        .bind(&order.payment_session_id)
        .bind(order.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return CheckoutError::DuplicateOrder(order.payment_session_id.clone());
                }
            }
            database_error(e)
        })?;

        Ok(order)
    }

    async fn find_by_payment_session(
        &self,
        payment_session_id: &str,
    ) -> Result<Option<Order>, CheckoutError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, user_id, items, total_amount_cents, payment_session_id, created_at
            FROM orders
            WHERE payment_session_id = $1
            "#,
        )
        .bind(payment_session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(Order::from))
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Order>, CheckoutError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, user_id, items, total_amount_cents, payment_session_id, created_at
            FROM orders
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(rows.into_iter().map(Order::from).collect())
    }
}
