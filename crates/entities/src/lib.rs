pub mod attributes;
pub mod entity;
pub mod links;
pub mod store;

pub use attributes::*;
pub use entity::*;
pub use links::*;
pub use store::*;

#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    #[error("malformed {what}: {source}")]
    Malformed {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
