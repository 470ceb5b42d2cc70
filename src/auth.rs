// src/auth.rs
//
// Email/password identities, role resolution and bearer-token sessions.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
};
use chrono::Utc;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use uuid::Uuid;

use crate::db::Store;
use crate::errors::{ApiError, StoreError};
use crate::models::{Identity, Role, Session, UserRecord};
use crate::AppState;

/// PBKDF2-HMAC-SHA256 rounds for new hashes; verification uses the count stored in the hash.
pub const PASSWORD_ITERATIONS: u32 = 100_000;

fn derive_hex(password: &str, salt: &str, iterations: u32) -> String {
    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut key);
    key.iter().map(|b| format!("{b:02x}")).collect()
}

/// No early exit on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

/// `salt$iterations$hex(pbkdf2_hmac_sha256)`
pub fn hash_password(password: &str) -> String {
    hash_password_with(password, PASSWORD_ITERATIONS)
}

pub fn hash_password_with(password: &str, iterations: u32) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    let key = derive_hex(password, &salt, iterations);
    format!("{salt}${iterations}${key}")
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(salt), Some(iterations), Some(expected)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    match iterations.parse::<u32>() {
        Ok(n) if n > 0 => constant_time_eq(derive_hex(password, salt, n).as_bytes(), expected.as_bytes()),
        _ => false,
    }
}

/// Profile lookup. A missing profile means least privilege.
pub async fn resolve_role(store: &dyn Store, user_id: Uuid) -> Result<Role, ApiError> {
    match store.profile_role(user_id).await {
        Ok(role) => Ok(role),
        Err(StoreError::NotFound(_)) => {
            tracing::info!(%user_id, "no profile found, treating as operator");
            Ok(Role::Operator)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn sign_in(store: &dyn Store, email: &str, password: &str) -> Result<Session, ApiError> {
    let user = store
        .find_user_by_email(email.trim())
        .await?
        .filter(|u| verify_password(password, &u.password_hash));
    let Some(user) = user else {
        tracing::info!(email = email.trim(), "sign-in rejected");
        return Err(ApiError::InvalidCredentials);
    };

    let role = resolve_role(store, user.user_id).await?;
    let session = Session {
        token: Uuid::new_v4().to_string(),
        identity: Identity { uid: user.user_id, email: user.email },
        role,
        created_at: Utc::now(),
    };
    store.insert_session(&session).await?;
    tracing::info!(uid = %session.identity.uid, role = role.as_str(), "signed in");
    Ok(session)
}

/// Creates an identity with a profile. Used by admin user management and
/// the start-up bootstrap.
pub async fn create_user(
    store: &dyn Store,
    email: &str,
    password: &str,
    role: Role,
) -> Result<Identity, ApiError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::Validation(format!("'{email}' is not an email address")));
    }
    if password.len() < 6 {
        return Err(ApiError::Validation("password must be at least 6 characters".into()));
    }
    let user = UserRecord {
        user_id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: hash_password(password),
    };
    store.insert_user_with_role(&user, role).await?;
    Ok(Identity { uid: user.user_id, email: user.email })
}

/// Makes sure the configured administrator exists; leaves an existing one untouched.
pub async fn ensure_admin(store: &dyn Store, email: &str, password: &str) -> Result<(), ApiError> {
    if store.find_user_by_email(email).await?.is_some() {
        tracing::debug!(email, "bootstrap admin already present");
        return Ok(());
    }
    let identity = create_user(store, email, password, Role::Admin).await?;
    tracing::info!(uid = %identity.uid, email, "bootstrap admin created");
    Ok(())
}

pub async fn session_for_token(store: &dyn Store, token: &str) -> Result<Session, ApiError> {
    store
        .find_session(token)
        .await?
        .ok_or(ApiError::Unauthenticated)
}

pub(crate) fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// The caller's session, from `Authorization: Bearer`.
pub struct CurrentSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthenticated)?;
        let session = session_for_token(state.store.as_ref(), &token).await?;
        Ok(CurrentSession(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[test]
    fn password_hash_round_trips_and_is_salted() {
        let a = hash_password("rahasia1");
        let b = hash_password("rahasia1");
        assert_ne!(a, b);
        assert!(verify_password("rahasia1", &a));
        assert!(!verify_password("rahasia2", &a));
        assert!(!verify_password("rahasia1", "no-salt"));
    }

    #[test]
    fn stored_hash_records_salt_rounds_and_derived_key() {
        let stored = hash_password("operator-pass-1");
        let parts: Vec<&str> = stored.split('$').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1], PASSWORD_ITERATIONS.to_string());
        assert_eq!(parts[2].len(), 64);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn plain_sha256_of_salted_password_does_not_verify() {
        use sha2::Digest;

        let stored = hash_password("operator-pass-1");
        let (salt, _) = stored.split_once('$').unwrap();
        let mut hasher = Sha256::new();
        hasher.update(format!("{salt}:operator-pass-1").as_bytes());
        let single_pass = format!("{:x}", hasher.finalize());

        assert!(!stored.ends_with(&single_pass));
        assert!(!verify_password("operator-pass-1", &format!("{salt}${single_pass}")));
        assert!(!verify_password("operator-pass-1", &format!("{salt}$1${single_pass}")));
    }

    #[test]
    fn verification_uses_the_stored_round_count() {
        let cheap = hash_password_with("rahasia1", 1_000);
        assert!(cheap.contains("$1000$"));
        assert!(verify_password("rahasia1", &cheap));

        let tampered = cheap.replace("$1000$", "$1001$");
        assert!(!verify_password("rahasia1", &tampered));
        assert!(!verify_password("rahasia1", &cheap.replace("$1000$", "$0$")));
    }

    #[test]
    fn key_comparison_requires_equal_length_and_bytes() {
        assert!(constant_time_eq(b"abcd", b"abcd"));
        assert!(!constant_time_eq(b"abcd", b"abce"));
        assert!(!constant_time_eq(b"abcd", b"abc"));
    }

    #[tokio::test]
    async fn sign_in_resolves_role_and_rejects_bad_password() {
        let store = MemoryStore::new();
        create_user(&store, "admin@plant.example", "secret12", Role::Admin)
            .await
            .unwrap();

        let session = sign_in(&store, "Admin@plant.example", "secret12").await.unwrap();
        assert_eq!(session.role, Role::Admin);
        assert!(store.find_session(&session.token).await.unwrap().is_some());

        assert!(matches!(
            sign_in(&store, "admin@plant.example", "wrong").await,
            Err(ApiError::InvalidCredentials)
        ));
        assert!(matches!(
            sign_in(&store, "nobody@plant.example", "secret12").await,
            Err(ApiError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn missing_profile_signs_in_as_operator() {
        let store = MemoryStore::new();
        let user = UserRecord {
            user_id: Uuid::new_v4(),
            email: "op@plant.example".into(),
            password_hash: hash_password("secret12"),
        };
        store.insert_user(&user).await.unwrap();
        let session = sign_in(&store, "op@plant.example", "secret12").await.unwrap();
        assert_eq!(session.role, Role::Operator);
    }

    #[tokio::test]
    async fn bootstrap_admin_is_idempotent() {
        let store = MemoryStore::new();
        ensure_admin(&store, "root@plant.example", "secret12").await.unwrap();
        ensure_admin(&store, "root@plant.example", "other-pass").await.unwrap();
        assert!(sign_in(&store, "root@plant.example", "secret12").await.is_ok());
    }
}
