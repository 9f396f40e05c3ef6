//! Repository layer over local persistence collaborators.

pub mod resume;

pub use resume::{KeyValueStore, ResumeEntry, ResumeRepo};
