//! Domain logic - version extraction and validation, independent of I/O

pub mod validation;
pub mod version;

pub use validation::{validate, Rejection, ValidationOutcome};
pub use version::{
    compute_next_version, extract_latest_version, extract_latest_version_with, Version,
    VersionScan, INITIAL_VERSION,
};
