//! FILENAME: core/records/src/lib.rs
//! PURPOSE: Shared record types for the pivot subsystem.
//! CONTEXT: Records arrive from the ingestion layer as flat field-name to
//! scalar mappings. This crate owns that representation together with the
//! numeric coercion and number display rules every consumer must agree on.

pub mod number;
pub mod record;
pub mod value;

pub use number::{format_fixed, format_number, parse_number};
pub use record::Record;
pub use value::FieldValue;
