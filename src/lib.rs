pub mod changelog;
pub mod config;
pub mod domain;
pub mod error;
pub mod git_ops;
pub mod manifest;
pub mod ui;
pub mod workflow;

pub use error::{ReleaseError, Result};
