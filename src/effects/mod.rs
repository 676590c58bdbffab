//! Boundary transitions and the pixel blending that realizes them.

/// Weighted frame blending and alpha compositing.
pub mod composite;
/// Boundary resolution and transition length planning.
pub mod transitions;
