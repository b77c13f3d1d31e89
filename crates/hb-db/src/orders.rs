//! Order repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hb_core::traits::Id;
use hb_models::Order;
use sqlx::FromRow;

use crate::pool::Database;
use crate::repository::{CreateOrderDto, OrderRepository, RepositoryResult};

/// Order database entity
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub project_id: Option<i64>,
    pub reference_number: Option<String>,
    pub email: String,
    pub hours: f64,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            project_id: row.project_id,
            reference_number: row.reference_number,
            email: row.email,
            hours: row.hours,
            date: row.date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl OrderRepository for Database {
    async fn orders_for_project(&self, project_id: Id) -> RepositoryResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, project_id, reference_number, email, hours, date, created_at, updated_at
            FROM orders
            WHERE project_id = $1
            ORDER BY date ASC, id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn create_order(&self, dto: CreateOrderDto) -> RepositoryResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO orders (project_id, reference_number, email, hours, date,
                                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING id, project_id, reference_number, email, hours, date, created_at, updated_at
            "#,
        )
        .bind(dto.project_id)
        .bind(&dto.reference_number)
        .bind(&dto.email)
        .bind(dto.hours)
        .bind(dto.date)
        .fetch_one(self.pool())
        .await?;

        Ok(row.into())
    }
}
