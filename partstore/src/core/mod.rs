pub mod crud_operations;
pub mod traits;

pub use traits::{CRUDResource, MergeIntoActiveModel};
