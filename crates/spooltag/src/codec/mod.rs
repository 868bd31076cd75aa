//! Per-format tag codecs.
//!
//! Each submodule owns one wire format and exposes the same surface:
//! a `can_decode` structural probe, a `decode` into that format's
//! record, a `to_spool` projection onto [`crate::model::SpoolFromTag`],
//! and an `encode` for the formats this application writes. The probes
//! and decoders never panic on arbitrary bytes; [`crate::dispatch`]
//! relies on that when it tries them in order.

pub mod bambu;
pub(crate) mod fields;
pub mod openspool;
pub mod opentag;
pub mod printtag;
pub mod spoolease;
