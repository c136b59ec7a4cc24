//! Service layer providing the record-store core and its two consumers.
//! - `storage` holds the blob store adapter, the tabular codec, and the
//!   generic load-mutate-save record store.
//! - `account` and `recipe` implement the business workflows on top of it.
//! - Collection persistence goes through `RecordStore` alone; the blob
//!   adapter is touched directly only for uploaded image objects.

pub mod account;
pub mod errors;
pub mod recipe;
pub mod storage;
