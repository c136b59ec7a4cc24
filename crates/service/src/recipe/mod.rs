//! Recipe CRUD and image intake on top of the record store.

pub mod domain;
pub mod service;
