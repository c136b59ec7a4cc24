//! Domain records persisted as rows of a CSV-backed collection.
//! - `Record` is the generic ordered field map every collection row shares.
//! - `Account` and `Recipe` are the typed views with their conversions.
//! - Parsing is lenient on nothing: a malformed stored value is an error.

pub mod account;
pub mod errors;
pub mod recipe;
pub mod record;
