//! Account registration and authentication on top of the record store.

pub mod domain;
pub mod service;
