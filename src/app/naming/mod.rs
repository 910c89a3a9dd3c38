//! Filename generation from naming templates
//!
//! Turns a stored `NamingTemplate` and a job's metadata into a sanitized,
//! filesystem-safe name. Placeholders are a closed enum matched against the
//! template's `{token}` text; anything unrecognized passes through as
//! literal text, and the sanitation pass is idempotent so rendered names can
//! be re-rendered harmlessly.

mod generator;

pub use generator::{render, sanitize_filename, NameFields, Placeholder};
