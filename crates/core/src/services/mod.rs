//! Façade services exposed to API surfaces.
//!
//! Each service resolves externally-supplied usernames against the account
//! directory before touching the relationship ledger, and signals failures
//! as [`crate::DirectoryError`] values for the API layer to translate.

pub mod advocates;
pub mod patients;
