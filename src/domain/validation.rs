use std::fmt;

use super::version::Version;

/// Reason a candidate version was turned down.
///
/// Displays as the message shown to the user before re-prompting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Candidate is not exactly `X.X.X`
    Format,
    /// Major component below the floor
    MajorTooLow { minimum: u64 },
    /// Minor component below the floor while major equals it
    MinorTooLow { minimum: u64 },
    /// Patch component below the floor while major and minor equal it
    PatchTooLow { minimum: u64 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Format => write!(f, "Your version number must match X.X.X"),
            Rejection::MajorTooLow { minimum } => {
                write!(f, "Your major version must be at least {}.", minimum)
            }
            Rejection::MinorTooLow { minimum } => {
                write!(f, "Your minor version must be at least {}.", minimum)
            }
            Rejection::PatchTooLow { minimum } => {
                write!(f, "Your patch version must be at least {}.", minimum)
            }
        }
    }
}

/// Result of checking a candidate version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted(Version),
    Rejected(Rejection),
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted(_))
    }
}

/// Checks a user-supplied version against the strict format and a floor.
///
/// The floor is compared component by component: a higher major accepts any
/// minor/patch, an equal major with a higher minor accepts any patch.
///
/// Components are read as decimal integers, so leading zeros are accepted
/// and dropped: `01.02.03` is accepted as `1.2.3`, and the tag and changelog
/// show `1.2.3` rather than the typed string.
///
/// # Example
/// ```ignore
/// let min = Version::new(1, 2, 3);
/// assert!(validate("1.3.0", min).is_accepted());
/// assert_eq!(
///     validate("1.2.2", min),
///     ValidationOutcome::Rejected(Rejection::PatchTooLow { minimum: 3 })
/// );
/// ```
pub fn validate(candidate: &str, minimum: Version) -> ValidationOutcome {
    let version = match Version::parse(candidate) {
        Ok(version) => version,
        Err(_) => return ValidationOutcome::Rejected(Rejection::Format),
    };

    if version.major < minimum.major {
        return ValidationOutcome::Rejected(Rejection::MajorTooLow {
            minimum: minimum.major,
        });
    }

    if version.major == minimum.major {
        if version.minor < minimum.minor {
            return ValidationOutcome::Rejected(Rejection::MinorTooLow {
                minimum: minimum.minor,
            });
        }
        if version.minor == minimum.minor && version.patch < minimum.patch {
            return ValidationOutcome::Rejected(Rejection::PatchTooLow {
                minimum: minimum.patch,
            });
        }
    }

    ValidationOutcome::Accepted(version)
}
