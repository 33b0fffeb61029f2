#[macro_use]
pub mod macros;

pub mod collections;
pub mod config;
pub mod error;
pub mod registry;
pub mod ty;
pub mod unify;
pub mod value;

// Re-export commonly used items for convenience
pub use tracing;

pub use registry::{TypeRegistry, TypeSystem};
pub use ty::Ty;
pub use value::Value;

pub type Error = crate::error::Error;
pub type Result<T> = crate::error::Result<T>;
