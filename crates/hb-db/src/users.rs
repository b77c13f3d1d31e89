//! User repository
//!
//! Users and their role assignments (users, user_roles).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hb_core::traits::Id;
use hb_models::{Role, User};
use sqlx::FromRow;
use std::collections::HashMap;

use crate::pool::Database;
use crate::repository::{CreateUserDto, RepositoryError, RepositoryResult, UserRepository};

/// User database entity
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_user(self, roles: Vec<Role>) -> User {
        User {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            roles,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct UserRoleRow {
    user_id: i64,
    role_id: i64,
}

impl Database {
    /// Role sets keyed by user id; unknown role ids are skipped
    async fn roles_for(&self, user_ids: &[Id]) -> RepositoryResult<HashMap<Id, Vec<Role>>> {
        let rows = sqlx::query_as::<_, UserRoleRow>(
            r#"
            SELECT user_id, role_id
            FROM user_roles
            WHERE user_id = ANY($1)
            ORDER BY role_id ASC
            "#,
        )
        .bind(user_ids)
        .fetch_all(self.pool())
        .await?;

        let mut roles: HashMap<Id, Vec<Role>> = HashMap::new();
        for row in rows {
            if let Some(role) = Role::from_id(row.role_id) {
                roles.entry(row.user_id).or_default().push(role);
            } else {
                tracing::warn!(user_id = row.user_id, role_id = row.role_id, "Unknown role id");
            }
        }
        Ok(roles)
    }

    async fn with_roles(&self, rows: Vec<UserRow>) -> RepositoryResult<Vec<User>> {
        let ids: Vec<Id> = rows.iter().map(|r| r.id).collect();
        let mut roles = self.roles_for(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let user_roles = roles.remove(&row.id).unwrap_or_default();
                row.into_user(user_roles)
            })
            .collect())
    }
}

#[async_trait]
impl UserRepository for Database {
    async fn find_user(&self, id: Id) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, first_name, last_name, email, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        match row {
            Some(row) => Ok(self.with_roles(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn all_users(&self) -> RepositoryResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, first_name, last_name, email, created_at, updated_at
            FROM users
            ORDER BY id ASC
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        self.with_roles(rows).await
    }

    #[tracing::instrument(skip(self, dto), fields(email = %dto.email))]
    async fn create_user(&self, dto: CreateUserDto) -> RepositoryResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (first_name, last_name, email, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING id, first_name, last_name, email, created_at, updated_at
            "#,
        )
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email)
        .fetch_one(self.pool())
        .await?;

        let user_id = row.id;
        if let Some(role) = dto.role {
            self.set_role(user_id, role).await?;
        }

        Ok(row.into_user(dto.role.into_iter().collect()))
    }

    #[tracing::instrument(skip(self))]
    async fn set_role(&self, user_id: Id, role: Role) -> RepositoryResult<()> {
        let mut tx = self.pool().begin().await?;

        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(RepositoryError::NotFound(format!("User {}", user_id)));
        }

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(role.id())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
