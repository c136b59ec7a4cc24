use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::record::Record;

/// A registered user as persisted in the `users` collection.
///
/// `password_hash` is the salted argon2 hash; the plaintext secret is never
/// stored or returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Public projection of an account. The only account view that may cross
/// the service boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub username: String,
    pub email: String,
}

impl Account {
    pub fn profile(&self) -> AccountProfile {
        AccountProfile { username: self.username.clone(), email: self.email.clone() }
    }

    pub fn to_record(&self) -> Record {
        Record::new()
            .with("username", &self.username)
            .with("email", &self.email)
            .with("password", &self.password_hash)
            .with("createdAt", self.created_at.to_rfc3339())
    }

    pub fn from_record(rec: &Record) -> Result<Self, ModelError> {
        let created_at = DateTime::parse_from_rfc3339(rec.require("createdAt")?)
            .map_err(|e| ModelError::Parse(format!("bad createdAt: {e}")))?
            .with_timezone(&Utc);
        Ok(Self {
            username: rec.require("username")?.to_string(),
            email: rec.require("email")?.to_string(),
            password_hash: rec.require("password")?.to_string(),
            created_at,
        })
    }
}
