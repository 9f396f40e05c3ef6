//! Error handling for the rummy engine.

pub mod domain;

pub use domain::DomainError;
