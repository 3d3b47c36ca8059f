pub mod bubbles;
pub mod lazy;
pub mod session;

pub use bubbles::*;
pub use lazy::*;
pub use session::*;
