//! # Yatube Shared
//!
//! Request and response types exchanged over HTTP.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
