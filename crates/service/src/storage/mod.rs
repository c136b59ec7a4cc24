//! Storage abstractions for the service layer
//!
//! Everything the services persist goes through [`record_store::RecordStore`],
//! which composes the [`tabular`] codec with a [`blob_store::BlobStore`]
//! adapter. Swapping the backing store never touches service logic.

pub mod blob_store;
pub mod record_store;
pub mod tabular;
