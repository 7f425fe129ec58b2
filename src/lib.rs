pub mod config;
pub mod domain;
pub mod error;
pub mod exec;
pub mod failure;
pub mod manifest;
pub mod pipeline;
pub mod settings;
pub mod ui;

pub use error::{ReleaseError, Result};
