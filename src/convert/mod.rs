//! Block conversion pipeline
//!
//! The gateway trait is the capability boundary to the external per-block
//! converter; the batch driver fans conversions out, reduces the results and
//! hands them to the composer.

pub mod batch;
pub mod compose;
pub mod gateway;
pub mod metadata;
