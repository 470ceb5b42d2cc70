// src/db/memory.rs
//
// In-process store with the same contract as the PostgreSQL one. Used by
// the test suite and by `STORE_BACKEND=memory` for local runs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::Store;
use crate::core::access::LogScope;
use crate::core::aggregate::sort_newest_first;
use crate::errors::StoreError;
use crate::models::{Role, Session, ShiftLog, Sop, UserRecord};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<UserRecord>>,
    profiles: Mutex<HashMap<Uuid, Role>>,
    sessions: Mutex<HashMap<String, Session>>,
    logs: Mutex<Vec<ShiftLog>>,
    sops: Mutex<Vec<Sop>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn upsert_by<T>(items: &mut Vec<T>, item: T, same: impl Fn(&T) -> bool) {
    match items.iter_mut().find(|existing| same(existing)) {
        Some(slot) => *slot = item,
        None => items.push(item),
    }
}

fn remove_by<T>(items: &mut Vec<T>, same: impl Fn(&T) -> bool) -> bool {
    let before = items.len();
    items.retain(|i| !same(i));
    items.len() != before
}

#[async_trait]
impl Store for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.lock().await;
        Ok(users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(StoreError::Conflict(format!("user {}", user.email)));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn insert_user_with_role(&self, user: &UserRecord, role: Role) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(StoreError::Conflict(format!("user {}", user.email)));
        }
        users.push(user.clone());
        self.profiles.lock().await.insert(user.user_id, role);
        Ok(())
    }

    async fn profile_role(&self, user_id: Uuid) -> Result<Role, StoreError> {
        self.profiles
            .lock()
            .await
            .get(&user_id)
            .copied()
            .ok_or_else(|| StoreError::NotFound(format!("profile {user_id}")))
    }

    async fn set_profile_role(&self, user_id: Uuid, role: Role) -> Result<(), StoreError> {
        if !self.users.lock().await.iter().any(|u| u.user_id == user_id) {
            return Err(StoreError::NotFound(format!("user {user_id}")));
        }
        self.profiles.lock().await.insert(user_id, role);
        Ok(())
    }

    async fn insert_session(&self, session: &Session) -> Result<(), StoreError> {
        self.sessions
            .lock()
            .await
            .insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn find_session(&self, token: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.lock().await.get(token).cloned())
    }

    async fn delete_session(&self, token: &str) -> Result<bool, StoreError> {
        Ok(self.sessions.lock().await.remove(token).is_some())
    }

    async fn update_session_roles(&self, user_id: Uuid, role: Role) -> Result<u64, StoreError> {
        let mut sessions = self.sessions.lock().await;
        let mut changed = 0;
        for s in sessions.values_mut() {
            if s.identity.uid == user_id && s.role != role {
                s.role = role;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn list_logs(&self, scope: LogScope) -> Result<Vec<ShiftLog>, StoreError> {
        let mut visible: Vec<ShiftLog> = self
            .logs
            .lock()
            .await
            .iter()
            .filter(|l| scope.admits(l))
            .cloned()
            .collect();
        sort_newest_first(&mut visible);
        Ok(visible)
    }

    async fn get_log(&self, id: &str) -> Result<Option<ShiftLog>, StoreError> {
        Ok(self.logs.lock().await.iter().find(|l| l.id == id).cloned())
    }

    async fn put_log(&self, log: &ShiftLog) -> Result<(), StoreError> {
        let mut logs = self.logs.lock().await;
        upsert_by(&mut logs, log.clone(), |l| l.id == log.id);
        Ok(())
    }

    async fn delete_log(&self, id: &str) -> Result<bool, StoreError> {
        let mut logs = self.logs.lock().await;
        Ok(remove_by(&mut logs, |l| l.id == id))
    }

    async fn list_sops(&self) -> Result<Vec<Sop>, StoreError> {
        let mut sops = self.sops.lock().await.clone();
        sops.sort_by(|a, b| {
            b.last_updated
                .cmp(&a.last_updated)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(sops)
    }

    async fn get_sop(&self, id: &str) -> Result<Option<Sop>, StoreError> {
        Ok(self.sops.lock().await.iter().find(|s| s.id == id).cloned())
    }

    async fn put_sop(&self, sop: &Sop) -> Result<(), StoreError> {
        let mut sops = self.sops.lock().await;
        upsert_by(&mut sops, sop.clone(), |s| s.id == sop.id);
        Ok(())
    }

    async fn delete_sop(&self, id: &str) -> Result<bool, StoreError> {
        let mut sops = self.sops.lock().await;
        Ok(remove_by(&mut sops, |s| s.id == id))
    }
}
