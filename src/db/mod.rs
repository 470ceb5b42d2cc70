// src/db/mod.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::core::access::LogScope;
use crate::errors::StoreError;
use crate::models::{Role, Session, ShiftLog, Sop, UserRecord};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Pool<Postgres>> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("connected to PostgreSQL, migrations applied");
    Ok(pool)
}

/// Persistence for identities, sessions, shift logs and SOPs. Rule checks
/// happen before these calls; implementations only store and fetch.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    fn backend_tag(&self) -> &'static str;

    // identities & profiles
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;
    async fn insert_user(&self, user: &UserRecord) -> Result<(), StoreError>;
    /// Identity and profile written together; neither exists if either fails.
    async fn insert_user_with_role(&self, user: &UserRecord, role: Role) -> Result<(), StoreError>;
    /// Fails with `NotFound` when the identity has no profile row.
    async fn profile_role(&self, user_id: Uuid) -> Result<Role, StoreError>;
    async fn set_profile_role(&self, user_id: Uuid, role: Role) -> Result<(), StoreError>;

    // sessions
    async fn insert_session(&self, session: &Session) -> Result<(), StoreError>;
    async fn find_session(&self, token: &str) -> Result<Option<Session>, StoreError>;
    async fn delete_session(&self, token: &str) -> Result<bool, StoreError>;
    /// Re-stamps every live session of `user_id` with `role`; returns how many changed.
    async fn update_session_roles(&self, user_id: Uuid, role: Role) -> Result<u64, StoreError>;

    // shift logs
    async fn list_logs(&self, scope: LogScope) -> Result<Vec<ShiftLog>, StoreError>;
    async fn get_log(&self, id: &str) -> Result<Option<ShiftLog>, StoreError>;
    async fn put_log(&self, log: &ShiftLog) -> Result<(), StoreError>;
    async fn delete_log(&self, id: &str) -> Result<bool, StoreError>;

    // SOPs
    async fn list_sops(&self) -> Result<Vec<Sop>, StoreError>;
    async fn get_sop(&self, id: &str) -> Result<Option<Sop>, StoreError>;
    async fn put_sop(&self, sop: &Sop) -> Result<(), StoreError>;
    async fn delete_sop(&self, id: &str) -> Result<bool, StoreError>;
}
