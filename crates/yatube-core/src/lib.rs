//! # Yatube Core
//!
//! The domain layer of Yatube.
//! Entities, validation, access rules and feed pagination live here with zero
//! infrastructure dependencies.

pub mod access;
pub mod domain;
pub mod error;
pub mod feed;
pub mod pagination;
pub mod ports;
pub mod validation;

pub use error::DomainError;
