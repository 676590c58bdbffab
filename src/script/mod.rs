//! Timeline script: wire model, validation issues and the validator.

/// Validation issue report types.
pub mod issue;
/// Wire model as parsed from JSON.
pub mod model;
/// Validator producing [`ValidatedScript`](validate::ValidatedScript).
pub mod validate;
