//! Music bed mixing and PCM output.

pub mod mix;
