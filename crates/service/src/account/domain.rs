use serde::{Deserialize, Serialize};

/// Registration input. Fields default to empty so that a structurally
/// incomplete body surfaces as a validation error, not a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}
