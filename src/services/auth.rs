use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::domain::{MarketError, NewUser, RepositoryPtr, User};
use crate::infrastructure::auth::{PasswordHasher, TokenService};
use crate::session::SessionInfo;

static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    // ---
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles")
});

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

/// Registration, login and credential verification.
#[derive(Clone)]
pub struct AuthService {
    // ---
    repository: RepositoryPtr,
    hasher: Arc<dyn PasswordHasher>,
    tokens: TokenService,
}

impl AuthService {
    // ---
    pub fn new(
        repository: RepositoryPtr,
        hasher: Arc<dyn PasswordHasher>,
        tokens: TokenService,
    ) -> Self {
        // ---
        Self {
            repository,
            hasher,
            tokens,
        }
    }

    /// Creates an account with a hashed password and empty lists.
    ///
    /// # Errors
    /// `Validation` for blank fields or a malformed email, `Conflict` when
    /// the username or email is already registered.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, MarketError> {
        // ---
        if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(MarketError::validation("All fields are required"));
        }
        if !EMAIL_SHAPE.is_match(email) {
            return Err(MarketError::validation("Invalid email address"));
        }

        let existing = self
            .repository
            .find_user_by_username_or_email(username, email)
            .await
            .map_err(MarketError::from_store)?;
        if existing.is_some() {
            return Err(MarketError::conflict("User already exists"));
        }

        let password_hash = self.hash_password(password).await?;
        let user = self
            .repository
            .create_user(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await
            .map_err(MarketError::from_store)?;

        tracing::info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Verifies an email/password pair and issues a credential.
    ///
    /// # Errors
    /// `InvalidCredentials` for an unknown email or a wrong password; the
    /// two cases are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, MarketError> {
        // ---
        if email.trim().is_empty() || password.is_empty() {
            return Err(MarketError::validation("All fields are required"));
        }

        let user = self
            .repository
            .get_user_by_email(email)
            .await
            .map_err(MarketError::from_store)?
            .ok_or(MarketError::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash).await? {
            tracing::debug!("Password mismatch for {}", user.id);
            return Err(MarketError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id, &user.username)?;
        Ok(LoginOutcome { token, user })
    }

    /// Checks a bearer credential and returns the identity it carries.
    pub fn authenticate(&self, token: &str) -> Result<SessionInfo, MarketError> {
        // ---
        let claims = self.tokens.verify(token)?;
        SessionInfo::try_from(claims)
    }

    // Argon2 blocks for tens of milliseconds; run it on the blocking pool.
    async fn hash_password(&self, password: &str) -> Result<String, MarketError> {
        // ---
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| MarketError::operation(format!("Hashing task failed: {e}")))?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, MarketError> {
        // ---
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| MarketError::operation(format!("Verification task failed: {e}")))
    }
}
