//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.

pub mod constants;
pub mod error;
pub mod nickname;
pub mod password;
pub mod token;
pub mod user;
pub mod validation;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use nickname::generate_nickname;
pub use password::Password;
pub use token::TokenPurpose;
pub use user::{NewUser, ProfileUpdate, User, UserChanges, UserResponse, UserRole};
