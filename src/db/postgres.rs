// src/db/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{query, query_as, FromRow, Pool, Postgres};
use uuid::Uuid;

use super::Store;
use crate::core::access::LogScope;
use crate::errors::StoreError;
use crate::models::{Checklist, Identity, Role, Session, ShiftLog, Sop, UnitEntry, UserRecord};

pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

// ───────────────────────────────────────
// Row shapes
// ───────────────────────────────────────
#[derive(FromRow)]
struct UserRow {
    user_id: Uuid,
    email: String,
    password_hash: String,
}

#[derive(FromRow)]
struct SessionRow {
    token: String,
    user_id: Uuid,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct ShiftLogRow {
    id: String,
    date: DateTime<Utc>,
    shift: String,
    group_name: String,
    unit_group: String,
    entries: Json<Vec<UnitEntry>>,
    checklist: Json<Checklist>,
    created_by: Option<Uuid>,
    user_email: Option<String>,
}

#[derive(FromRow)]
struct SopRow {
    id: String,
    title: String,
    category: String,
    target_unit: String,
    last_updated: NaiveDate,
    content: String,
    file_url: Option<String>,
    user_email: Option<String>,
    path: Option<String>,
}

fn parse_role(raw: &str) -> Result<Role, StoreError> {
    raw.parse().map_err(StoreError::Corrupt)
}

impl TryFrom<SessionRow> for Session {
    type Error = StoreError;

    fn try_from(r: SessionRow) -> Result<Self, Self::Error> {
        Ok(Session {
            token: r.token,
            identity: Identity { uid: r.user_id, email: r.email },
            role: parse_role(&r.role)?,
            created_at: r.created_at,
        })
    }
}

impl TryFrom<ShiftLogRow> for ShiftLog {
    type Error = StoreError;

    fn try_from(r: ShiftLogRow) -> Result<Self, Self::Error> {
        Ok(ShiftLog {
            id: r.id,
            date: r.date,
            shift: r.shift.parse().map_err(StoreError::Corrupt)?,
            group_name: r.group_name,
            unit_group: r.unit_group.parse().map_err(StoreError::Corrupt)?,
            entries: r.entries.0,
            checklist: r.checklist.0,
            created_by: r.created_by,
            user_email: r.user_email,
        })
    }
}

impl TryFrom<SopRow> for Sop {
    type Error = StoreError;

    fn try_from(r: SopRow) -> Result<Self, Self::Error> {
        Ok(Sop {
            id: r.id,
            title: r.title,
            category: r.category,
            target_unit: r.target_unit.parse().map_err(StoreError::Corrupt)?,
            last_updated: r.last_updated,
            content: r.content,
            file_url: r.file_url,
            user_email: r.user_email,
            path: r.path,
        })
    }
}

fn has_code(e: &sqlx::Error, code: &str) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some(code))
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    has_code(e, "23505")
}

const INSERT_USER: &str =
    r#"INSERT INTO public.users (user_id, email, password_hash) VALUES ($1,$2,$3)"#;

fn user_conflict(e: sqlx::Error, user: &UserRecord) -> StoreError {
    if is_unique_violation(&e) {
        StoreError::Conflict(format!("user {}", user.email))
    } else {
        StoreError::Db(e)
    }
}

const LOG_COLUMNS: &str =
    "id, date, shift, group_name, unit_group, entries, checklist, created_by, user_email";

#[async_trait]
impl Store for PgStore {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = query_as::<_, UserRow>(
            r#"SELECT user_id, email, password_hash FROM public.users WHERE lower(email) = lower($1)"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| UserRecord {
            user_id: r.user_id,
            email: r.email,
            password_hash: r.password_hash,
        }))
    }

    async fn insert_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        query(INSERT_USER)
            .bind(user.user_id)
            .bind(&user.email)
            .bind(&user.password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| user_conflict(e, user))?;
        Ok(())
    }

    async fn insert_user_with_role(&self, user: &UserRecord, role: Role) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        query(INSERT_USER)
            .bind(user.user_id)
            .bind(&user.email)
            .bind(&user.password_hash)
            .execute(&mut *tx)
            .await
            .map_err(|e| user_conflict(e, user))?;
        query(r#"INSERT INTO public.profiles (user_id, role) VALUES ($1,$2)"#)
            .bind(user.user_id)
            .bind(role.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn profile_role(&self, user_id: Uuid) -> Result<Role, StoreError> {
        let role: Option<(String,)> =
            query_as(r#"SELECT role FROM public.profiles WHERE user_id = $1"#)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        match role {
            Some((raw,)) => parse_role(&raw),
            None => Err(StoreError::NotFound(format!("profile {user_id}"))),
        }
    }

    async fn set_profile_role(&self, user_id: Uuid, role: Role) -> Result<(), StoreError> {
        query(
            r#"
            INSERT INTO public.profiles (user_id, role) VALUES ($1,$2)
            ON CONFLICT (user_id) DO UPDATE SET role = EXCLUDED.role
            "#,
        )
        .bind(user_id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // profiles.user_id references users
            if has_code(&e, "23503") {
                StoreError::NotFound(format!("user {user_id}"))
            } else {
                StoreError::Db(e)
            }
        })?;
        Ok(())
    }

    async fn insert_session(&self, s: &Session) -> Result<(), StoreError> {
        query(
            r#"INSERT INTO public.sessions (token, user_id, email, role, created_at) VALUES ($1,$2,$3,$4,$5)"#,
        )
        .bind(&s.token)
        .bind(s.identity.uid)
        .bind(&s.identity.email)
        .bind(s.role.as_str())
        .bind(s.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_session(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let row = query_as::<_, SessionRow>(
            r#"SELECT token, user_id, email, role, created_at FROM public.sessions WHERE token = $1"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Session::try_from).transpose()
    }

    async fn delete_session(&self, token: &str) -> Result<bool, StoreError> {
        let res = query(r#"DELETE FROM public.sessions WHERE token = $1"#)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn update_session_roles(&self, user_id: Uuid, role: Role) -> Result<u64, StoreError> {
        let res = query(r#"UPDATE public.sessions SET role = $2 WHERE user_id = $1 AND role <> $2"#)
            .bind(user_id)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    async fn list_logs(&self, scope: LogScope) -> Result<Vec<ShiftLog>, StoreError> {
        let rows = match scope {
            LogScope::All => query_as::<_, ShiftLogRow>(&format!(
                "SELECT {LOG_COLUMNS} FROM public.shift_logs ORDER BY date DESC, id DESC"
            ))
            .fetch_all(&self.pool)
            .await?,
            LogScope::AuthoredBy(uid) => query_as::<_, ShiftLogRow>(&format!(
                "SELECT {LOG_COLUMNS} FROM public.shift_logs WHERE created_by = $1 ORDER BY date DESC, id DESC"
            ))
            .bind(uid)
            .fetch_all(&self.pool)
            .await?,
        };
        rows.into_iter().map(ShiftLog::try_from).collect()
    }

    async fn get_log(&self, id: &str) -> Result<Option<ShiftLog>, StoreError> {
        let sql = format!("SELECT {LOG_COLUMNS} FROM public.shift_logs WHERE id = $1");
        let row = query_as::<_, ShiftLogRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(ShiftLog::try_from).transpose()
    }

    async fn put_log(&self, log: &ShiftLog) -> Result<(), StoreError> {
        query(
            r#"
            INSERT INTO public.shift_logs
                (id, date, shift, group_name, unit_group, entries, checklist, created_by, user_email)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
            ON CONFLICT (id) DO UPDATE SET
                date = EXCLUDED.date,
                shift = EXCLUDED.shift,
                group_name = EXCLUDED.group_name,
                unit_group = EXCLUDED.unit_group,
                entries = EXCLUDED.entries,
                checklist = EXCLUDED.checklist,
                created_by = EXCLUDED.created_by,
                user_email = EXCLUDED.user_email
            "#,
        )
        .bind(&log.id)
        .bind(log.date)
        .bind(log.shift.as_str())
        .bind(&log.group_name)
        .bind(log.unit_group.as_str())
        .bind(Json(&log.entries))
        .bind(Json(&log.checklist))
        .bind(log.created_by)
        .bind(&log.user_email)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_log(&self, id: &str) -> Result<bool, StoreError> {
        let res = query(r#"DELETE FROM public.shift_logs WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_sops(&self) -> Result<Vec<Sop>, StoreError> {
        let rows = query_as::<_, SopRow>(
            r#"SELECT id, title, category, target_unit, last_updated, content, file_url, user_email, path
               FROM public.sops ORDER BY last_updated DESC, id DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Sop::try_from).collect()
    }

    async fn get_sop(&self, id: &str) -> Result<Option<Sop>, StoreError> {
        let row = query_as::<_, SopRow>(
            r#"SELECT id, title, category, target_unit, last_updated, content, file_url, user_email, path
               FROM public.sops WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Sop::try_from).transpose()
    }

    async fn put_sop(&self, sop: &Sop) -> Result<(), StoreError> {
        query(
            r#"
            INSERT INTO public.sops
                (id, title, category, target_unit, last_updated, content, file_url, user_email, path)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                category = EXCLUDED.category,
                target_unit = EXCLUDED.target_unit,
                last_updated = EXCLUDED.last_updated,
                content = EXCLUDED.content,
                file_url = EXCLUDED.file_url,
                user_email = EXCLUDED.user_email,
                path = EXCLUDED.path
            "#,
        )
        .bind(&sop.id)
        .bind(&sop.title)
        .bind(&sop.category)
        .bind(sop.target_unit.as_str())
        .bind(sop.last_updated)
        .bind(&sop.content)
        .bind(&sop.file_url)
        .bind(&sop.user_email)
        .bind(&sop.path)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_sop(&self, id: &str) -> Result<bool, StoreError> {
        let res = query(r#"DELETE FROM public.sops WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
