use crate::{
    errors::{AuthError, StoreError},
    forms::Credentials,
    models::user::CurrentUser,
    store::{SessionRepository, UserRepository},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

#[derive(Clone, Debug)]
pub struct AuthService {
    users: UserRepository,
    sessions: SessionRepository,
    idle_timeout: chrono::Duration,
}

impl AuthService {
    pub fn new(
        users: UserRepository,
        sessions: SessionRepository,
        idle_timeout: chrono::Duration,
    ) -> Self {
        Self {
            users,
            sessions,
            idle_timeout,
        }
    }

    #[instrument(
        name = "AuthService: Register",
        skip(self, credentials),
        fields(user_email = %credentials.email)
    )]
    pub async fn register(&self, credentials: &Credentials) -> Result<i64, AuthError> {
        let hash = hash_password(&credentials.password)?;

        let mut tx = self.users.pool().begin().await.map_err(StoreError::from)?;
        let id = UserRepository::create_user(&mut tx, &credentials.email, &hash).await?;
        tx.commit().await.map_err(StoreError::from)?;

        tracing::info!(user_id = id, "User registered");
        Ok(id)
    }

    #[instrument(
        name = "AuthService: Login attempt",
        skip(self, credentials),
        fields(user_email = %credentials.email)
    )]
    pub async fn verify(&self, credentials: &Credentials) -> Result<CurrentUser, AuthError> {
        // 1. Fetch User
        let user = match self.users.find_by_email(&credentials.email).await? {
            Some(u) => u,
            None => {
                // Spend one argon2 hash so the answer takes as long as a wrong password.
                let _ = hash_password(&credentials.password);
                tracing::warn!("Login failed: User not found");
                return Err(AuthError::InvalidCredentials);
            }
        };

        // 2. Parse Hash
        let parsed_hash = PasswordHash::new(&user.pwd).map_err(|e| {
            tracing::error!("Critical: Failed to parse password hash from DB: {:?}", e);
            AuthError::Hashing
        })?;

        // 3. Verify Password
        if Argon2::default()
            .verify_password(credentials.password.expose_secret().as_bytes(), &parsed_hash)
            .is_err()
        {
            tracing::warn!("Login failed: Invalid password provided");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!("User authenticated successfully");
        Ok(CurrentUser::from(&user))
    }

    /// Verifies `credentials` and opens a session, returning its token.
    pub async fn login(&self, credentials: &Credentials) -> Result<String, AuthError> {
        let user = self.verify(credentials).await?;

        let now = Utc::now();
        let purged = self.sessions.purge_expired(now).await?;
        if purged > 0 {
            tracing::debug!(purged, "Dropped expired sessions");
        }

        let token = uuid::Uuid::new_v4().simple().to_string();
        self.sessions
            .create(&token, user.id, now + self.idle_timeout)
            .await?;
        Ok(token)
    }

    /// Identity bound to `token`, sliding its expiry forward. `None` when the
    /// session is unknown or has been idle for longer than the timeout.
    pub async fn resolve(&self, token: &str) -> Result<Option<CurrentUser>, StoreError> {
        let now = Utc::now();
        self.sessions.touch(token, now, now + self.idle_timeout).await
    }

    #[instrument(name = "AuthService: Logout", skip(self, token))]
    pub async fn logout(&self, token: &str) -> Result<(), StoreError> {
        self.sessions.delete(token).await
    }
}

fn hash_password(password: &SecretString) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map_err(|e| {
            tracing::error!("Failed to hash password: {:?}", e);
            AuthError::Hashing
        })?
        .to_string();
    Ok(hash)
}
