//! Users module - directory models and repository trait.
//!
//! The referrer/customer directory is an external collaborator; this module
//! only defines the interface the engine consumes (identity, role, company
//! association) plus the customer records created on conversion.

mod users_model;
mod users_traits;

#[cfg(test)]
mod users_model_tests;

// Re-export the public interface
pub use users_model::{Actor, NewCustomer, RoleKind, User, UserRole};
pub use users_traits::UserRepositoryTrait;
