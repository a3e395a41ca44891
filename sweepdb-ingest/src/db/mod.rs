//! Catalog queries
//!
//! Every function takes a bare connection so callers decide the transaction
//! boundary: a sync run passes its open transaction, tests pass a pooled
//! connection. All writes are `INSERT ... ON CONFLICT`, keyed on the
//! catalog's unique constraints.

pub mod files;
pub mod hosts;
pub mod measurements;
