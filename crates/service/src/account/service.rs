use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use chrono::Utc;
use models::account::{Account, AccountProfile};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};

use super::domain::{LoginInput, RegisterInput};
use crate::errors::ServiceError;
use crate::storage::record_store::RecordStore;

/// Collection blob holding all registered accounts.
pub const USERS_COLLECTION: &str = "users/user.csv";

/// Account business service independent of web framework
pub struct AccountService {
    store: Arc<RecordStore>,
}

impl AccountService {
    pub fn new(store: Arc<RecordStore>) -> Arc<Self> {
        Arc::new(Self { store })
    }

    /// Register a new account with a salted argon2 password hash.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::account::{domain::RegisterInput, service::AccountService};
    /// use service::storage::{blob_store::memory::MemoryBlobStore, record_store::RecordStore};
    /// let svc = AccountService::new(RecordStore::new(MemoryBlobStore::new()));
    /// let input = RegisterInput { username: "bob".into(), email: "b@x.com".into(), password: "pw123".into() };
    /// let profile = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(profile.username, "bob");
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: RegisterInput) -> Result<AccountProfile, ServiceError> {
        let username = required(&input.username, "username")?.to_string();
        let email = required(&input.email, "email")?.to_string();
        // the secret is hashed exactly as submitted, whitespace included
        required(&input.password, "password")?;

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| ServiceError::Hash(e.to_string()))?
            .to_string();

        let account = Account { username, email, password_hash, created_at: Utc::now() };
        let profile = account.profile();

        self.store
            .mutate(USERS_COLLECTION, move |mut records| {
                for rec in &records {
                    if rec.get("username") == Some(account.username.as_str()) {
                        debug!("duplicate username");
                        return Err(ServiceError::Conflict("Username already exists".into()));
                    }
                    if rec.get("email") == Some(account.email.as_str()) {
                        debug!("duplicate email");
                        return Err(ServiceError::Conflict("Email already exists".into()));
                    }
                }
                records.push(account.to_record());
                Ok(records)
            })
            .await?;

        info!(username = %profile.username, "account_registered");
        Ok(profile)
    }

    /// Verify credentials and return the public projection.
    ///
    /// Password comparison goes through argon2 verification, which is
    /// constant-time in the secret.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn authenticate(&self, input: LoginInput) -> Result<AccountProfile, ServiceError> {
        let username = required(&input.username, "username")?;
        required(&input.password, "password")?;

        let records = self.store.load_required(USERS_COLLECTION, "account collection").await?;
        let rec = records
            .iter()
            .find(|r| r.get("username") == Some(username))
            .ok_or_else(|| ServiceError::InvalidCredentials("User not found".into()))?;
        let account = Account::from_record(rec)?;

        let parsed = PasswordHash::new(&account.password_hash)
            .map_err(|e| ServiceError::Hash(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(ServiceError::InvalidCredentials("Incorrect password".into()));
        }

        info!(username = %account.username, "login_ok");
        Ok(account.profile())
    }
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(format!("{field} is required")));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::blob_store::memory::MemoryBlobStore;

    fn svc() -> Arc<AccountService> {
        AccountService::new(RecordStore::new(MemoryBlobStore::new()))
    }

    fn bob() -> RegisterInput {
        RegisterInput { username: "bob".into(), email: "b@x.com".into(), password: "pw123".into() }
    }

    #[tokio::test]
    async fn register_then_authenticate() -> Result<(), anyhow::Error> {
        let svc = svc();
        let profile = svc.register(bob()).await?;
        assert_eq!(profile.username, "bob");
        assert_eq!(profile.email, "b@x.com");

        let logged_in = svc
            .authenticate(LoginInput { username: "bob".into(), password: "pw123".into() })
            .await?;
        assert_eq!(logged_in, profile);
        Ok(())
    }

    #[tokio::test]
    async fn register_rejects_missing_fields() {
        let svc = svc();
        let mut input = bob();
        input.password = "   ".into();
        match svc.register(input).await {
            Err(ServiceError::Validation(msg)) => assert!(msg.contains("password")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() -> Result<(), anyhow::Error> {
        let svc = svc();
        svc.register(bob()).await?;

        let mut other = bob();
        other.email = "other@x.com".into();
        match svc.register(other).await {
            Err(ServiceError::Conflict(msg)) => assert_eq!(msg, "Username already exists"),
            other => panic!("expected Conflict, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() -> Result<(), anyhow::Error> {
        let svc = svc();
        svc.register(bob()).await?;

        let mut other = bob();
        other.username = "robert".into();
        match svc.register(other).await {
            Err(ServiceError::Conflict(msg)) => assert_eq!(msg, "Email already exists"),
            other => panic!("expected Conflict, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn username_matching_is_case_sensitive() -> Result<(), anyhow::Error> {
        let svc = svc();
        svc.register(bob()).await?;

        let mut other = bob();
        other.username = "Bob".into();
        other.email = "bob2@x.com".into();
        assert!(svc.register(other).await.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() -> Result<(), anyhow::Error> {
        let svc = svc();
        svc.register(bob()).await?;
        match svc
            .authenticate(LoginInput { username: "bob".into(), password: "wrong".into() })
            .await
        {
            Err(ServiceError::InvalidCredentials(msg)) => assert_eq!(msg, "Incorrect password"),
            other => panic!("expected InvalidCredentials, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn unknown_username_is_invalid_credentials() -> Result<(), anyhow::Error> {
        let svc = svc();
        svc.register(bob()).await?;
        match svc
            .authenticate(LoginInput { username: "nobody".into(), password: "pw123".into() })
            .await
        {
            Err(ServiceError::InvalidCredentials(msg)) => assert_eq!(msg, "User not found"),
            other => panic!("expected InvalidCredentials, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn login_against_absent_collection_is_not_found() {
        let svc = svc();
        let result = svc
            .authenticate(LoginInput { username: "bob".into(), password: "pw123".into() })
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn stored_record_never_holds_plaintext() -> Result<(), anyhow::Error> {
        let blobs = MemoryBlobStore::new();
        let store = RecordStore::new(blobs);
        let svc = AccountService::new(Arc::clone(&store));
        svc.register(bob()).await?;

        let records = store.load_collection(USERS_COLLECTION).await?;
        let stored = records[0].get("password").unwrap();
        assert_ne!(stored, "pw123");
        assert!(stored.starts_with("$argon2"));
        Ok(())
    }
}
