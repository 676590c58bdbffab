pub mod cancel;
/// Timeline primitives shared by every stage.
pub mod core;
/// Crate error type.
pub mod error;
pub(crate) mod math;
/// Recoverable, non-fatal conditions recorded during composition.
pub mod warning;
