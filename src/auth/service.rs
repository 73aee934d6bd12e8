use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::models::User;
use crate::db::store::Store;
use crate::error::AuthError;
use crate::Result;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Length of the opaque refresh token.
const REFRESH_TOKEN_LEN: usize = 64;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User email
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
}

/// Tokens and identity returned by a successful login.
#[derive(Debug)]
pub struct LoginTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

pub struct AuthService {
    store: Arc<dyn Store>,
    jwt_secret: String,
    access_token_ttl_minutes: i64,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, jwt_secret: String, access_token_ttl_minutes: i64) -> Self {
        Self {
            store,
            jwt_secret,
            access_token_ttl_minutes,
        }
    }

    /// Registers a new user. The email uniqueness check is check-then-write:
    /// concurrent registrations with the same email can both pass it.
    pub async fn register(&self, email: &str, password: &str) -> Result<User> {
        if self.store.find_user_by_email(email).await?.is_some() {
            return Err(AuthError::DuplicateEmail.into());
        }

        let password_hash = bcrypt::hash(password, BCRYPT_COST)?;
        let user = self.store.create_user(&User::new(email.to_string(), password_hash)).await?;

        info!("Registered new user {}", user.id);
        Ok(user)
    }

    /// Verifies credentials and issues an access/refresh token pair. The
    /// fresh refresh token overwrites the stored one, so any token from an
    /// earlier login stops working.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginTokens> {
        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !bcrypt::verify(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials.into());
        }

        let access_token = self.issue_access_token(&user.email)?;
        let refresh_token = generate_refresh_token();
        self.store.set_refresh_token(user.id, &refresh_token).await?;

        info!("Login successful for user {}", user.id);
        Ok(LoginTokens {
            access_token,
            refresh_token,
            user,
        })
    }

    /// Exchanges a refresh token for a new access token. The refresh token
    /// itself is echoed back unchanged, not rotated.
    pub async fn refresh(&self, refresh_token: &str) -> Result<(String, String)> {
        let user = self
            .store
            .find_user_by_refresh_token(refresh_token)
            .await?
            .ok_or(AuthError::UnknownRefreshToken)?;

        let access_token = self.issue_access_token(&user.email)?;
        Ok((access_token, refresh_token.to_string()))
    }

    pub fn issue_access_token(&self, email: &str) -> Result<String> {
        let now = Utc::now();
        let exp = (now + Duration::minutes(self.access_token_ttl_minutes)).timestamp();
        let claims = Claims {
            sub: email.to_string(),
            exp,
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Signature + expiry check only; no store lookup and no revocation list.
    pub fn validate_access_token(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(data.claims)
    }
}

fn generate_refresh_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::MockStore;
    use crate::error::AppError;
    use mockall::predicate::eq;

    fn service(store: MockStore) -> AuthService {
        AuthService::new(Arc::new(store), "test_secret".to_string(), 60)
    }

    fn stored_user(email: &str, password: &str) -> User {
        let hash = bcrypt::hash(password, 4).unwrap();
        User::new(email.to_string(), hash)
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut store = MockStore::new();
        let existing = stored_user("taken@example.com", "pw");
        store
            .expect_find_user_by_email()
            .with(eq("taken@example.com"))
            .returning(move |_| Ok(Some(existing.clone())));

        let result = service(store).register("taken@example.com", "pw").await;
        assert!(matches!(
            result,
            Err(AppError::AuthError(AuthError::DuplicateEmail))
        ));
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let mut store = MockStore::new();
        store.expect_find_user_by_email().returning(|_| Ok(None));
        store
            .expect_create_user()
            .returning(|user| Ok(user.clone()));

        let user = service(store)
            .register("new@example.com", "password123")
            .await
            .unwrap();

        assert_eq!(user.email, "new@example.com");
        assert_ne!(user.password_hash, "password123");
        assert!(bcrypt::verify("password123", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let mut store = MockStore::new();
        store.expect_find_user_by_email().returning(|_| Ok(None));

        let result = service(store).login("ghost@example.com", "pw").await;
        assert!(matches!(
            result,
            Err(AppError::AuthError(AuthError::InvalidCredentials))
        ));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut store = MockStore::new();
        let user = stored_user("user@example.com", "correct");
        store
            .expect_find_user_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let result = service(store).login("user@example.com", "wrong").await;
        assert!(matches!(
            result,
            Err(AppError::AuthError(AuthError::InvalidCredentials))
        ));
    }

    #[tokio::test]
    async fn test_login_issues_token_pair() {
        let mut store = MockStore::new();
        let user = stored_user("user@example.com", "correct");
        let user_id = user.id;
        store
            .expect_find_user_by_email()
            .returning(move |_| Ok(Some(user.clone())));
        store
            .expect_set_refresh_token()
            .withf(move |id, token| *id == user_id && token.len() == REFRESH_TOKEN_LEN)
            .returning(|_, _| Ok(()));

        let svc = service(store);
        let tokens = svc.login("user@example.com", "correct").await.unwrap();

        let claims = svc.validate_access_token(&tokens.access_token).unwrap();
        assert_eq!(claims.sub, "user@example.com");
        assert_eq!(tokens.refresh_token.len(), REFRESH_TOKEN_LEN);
    }

    #[tokio::test]
    async fn test_refresh_unknown_token() {
        let mut store = MockStore::new();
        store
            .expect_find_user_by_refresh_token()
            .returning(|_| Ok(None));

        let result = service(store).refresh("never-issued").await;
        assert!(matches!(
            result,
            Err(AppError::AuthError(AuthError::UnknownRefreshToken))
        ));
    }

    #[tokio::test]
    async fn test_refresh_echoes_same_token() {
        let mut store = MockStore::new();
        let user = stored_user("user@example.com", "pw");
        store
            .expect_find_user_by_refresh_token()
            .with(eq("opaque-token"))
            .returning(move |_| Ok(Some(user.clone())));

        let svc = service(store);
        let (access, refresh) = svc.refresh("opaque-token").await.unwrap();

        assert_eq!(refresh, "opaque-token");
        let claims = svc.validate_access_token(&access).unwrap();
        assert_eq!(claims.sub, "user@example.com");
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let store = MockStore::new();
        let svc = AuthService::new(Arc::new(store), "test_secret".to_string(), -5);

        let token = svc.issue_access_token("user@example.com").unwrap();
        let result = svc.validate_access_token(&token);
        assert!(matches!(
            result,
            Err(AppError::AuthError(AuthError::TokenExpired))
        ));
    }

    #[tokio::test]
    async fn test_tampered_token_rejected() {
        let store = MockStore::new();
        let svc = service(store);

        let other = AuthService::new(
            Arc::new(MockStore::new()),
            "other_secret".to_string(),
            60,
        );
        let token = other.issue_access_token("user@example.com").unwrap();

        let result = svc.validate_access_token(&token);
        assert!(matches!(
            result,
            Err(AppError::AuthError(AuthError::InvalidToken))
        ));
    }
}
