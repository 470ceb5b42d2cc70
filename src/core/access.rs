// src/core/access.rs
//
// Ownership/admin rules for reads and writes. A session's role picks exactly
// one log scope; handlers never branch on the role themselves.

use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::{Session, ShiftLog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogScope {
    /// Every shift log (administrators).
    All,
    /// Only logs the identity submitted.
    AuthoredBy(Uuid),
}

impl LogScope {
    pub fn for_session(session: &Session) -> Self {
        if session.role.is_admin() {
            LogScope::All
        } else {
            LogScope::AuthoredBy(session.identity.uid)
        }
    }

    pub fn admits(&self, log: &ShiftLog) -> bool {
        match self {
            LogScope::All => true,
            LogScope::AuthoredBy(uid) => log.created_by == Some(*uid),
        }
    }
}

/// Shift reports are filed by operators; administrators only review them.
pub fn ensure_can_create_log(session: &Session) -> Result<(), ApiError> {
    if session.role.is_admin() {
        return Err(ApiError::PermissionDenied);
    }
    Ok(())
}

pub fn ensure_can_delete_log(session: &Session, log: &ShiftLog) -> Result<(), ApiError> {
    if session.role.is_admin() || log.created_by == Some(session.identity.uid) {
        Ok(())
    } else {
        Err(ApiError::PermissionDenied)
    }
}

pub fn ensure_admin(session: &Session) -> Result<(), ApiError> {
    if session.role.is_admin() {
        Ok(())
    } else {
        Err(ApiError::PermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Checklist, Identity, Role, Shift, UnitGroup};
    use chrono::Utc;

    fn session(role: Role) -> Session {
        Session {
            token: "t".into(),
            identity: Identity { uid: Uuid::new_v4(), email: "op@plant.example".into() },
            role,
            created_at: Utc::now(),
        }
    }

    fn log_by(uid: Option<Uuid>) -> ShiftLog {
        ShiftLog {
            id: "1".into(),
            date: Utc::now(),
            shift: Shift::Pagi,
            group_name: "Grup A".into(),
            unit_group: UnitGroup::Unit12,
            entries: vec![],
            checklist: Checklist::new(),
            created_by: uid,
            user_email: None,
        }
    }

    #[test]
    fn role_selects_exactly_one_scope() {
        let op = session(Role::Operator);
        assert_eq!(LogScope::for_session(&op), LogScope::AuthoredBy(op.identity.uid));
        assert_eq!(LogScope::for_session(&session(Role::Admin)), LogScope::All);
    }

    #[test]
    fn authored_scope_hides_other_operators_logs() {
        let op = session(Role::Operator);
        let scope = LogScope::for_session(&op);
        assert!(scope.admits(&log_by(Some(op.identity.uid))));
        assert!(!scope.admits(&log_by(Some(Uuid::new_v4()))));
        assert!(!scope.admits(&log_by(None)));
    }

    #[test]
    fn delete_allowed_for_admin_or_author_only() {
        let op = session(Role::Operator);
        assert!(ensure_can_delete_log(&op, &log_by(Some(op.identity.uid))).is_ok());
        assert!(matches!(
            ensure_can_delete_log(&op, &log_by(Some(Uuid::new_v4()))),
            Err(ApiError::PermissionDenied)
        ));
        assert!(ensure_can_delete_log(&session(Role::Admin), &log_by(None)).is_ok());
    }

    #[test]
    fn admins_do_not_file_reports() {
        assert!(ensure_can_create_log(&session(Role::Operator)).is_ok());
        assert!(ensure_can_create_log(&session(Role::Admin)).is_err());
        assert!(ensure_admin(&session(Role::Operator)).is_err());
    }
}
