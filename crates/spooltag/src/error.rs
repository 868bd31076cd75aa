//! Error types for spool tag decoding.
//!
//! Almost nothing in this crate is a hard error: format mismatches,
//! truncated buffers and corrupt sub-fields are all signaled as absent
//! results (see the module docs on [`crate::dispatch`]). The only typed
//! failure is a UID string the caller hands us that is not hex at all.

use thiserror::Error;

/// Error parsing a tag UID from its hex representation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UidError {
    #[error("empty tag UID")]
    Empty,

    #[error("tag UID is not valid hex: {uid:?}")]
    InvalidHex { uid: String },
}
