//! # Blog Core
//!
//! The domain layer of the blog service.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! the `Post` entity, input validation, list-query construction and the ports
//! that infrastructure must implement.

pub mod domain;
pub mod error;
pub mod ports;
pub mod query;

pub use error::{DomainError, FieldError, RepoError};
