//! Core business logic for quill.

pub mod services;

#[cfg(test)]
mod test_support;

pub use services::*;
