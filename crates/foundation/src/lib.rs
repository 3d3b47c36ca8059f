pub mod ids;
pub mod placement;
pub mod text;

// Foundation crate: small, well-tested primitives only.
pub use ids::*;
pub use placement::*;
pub use text::*;
