use std::fmt::{self, Display, Formatter};

use reqwest::StatusCode;

/// Step of the session protocol an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Renewing,
    Reinitializing,
    Fetching,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => write!(f, "failed to initialize session"),
            Self::Renewing => write!(f, "failed to renew session"),
            Self::Reinitializing => write!(f, "failed to re-initialize session"),
            Self::Fetching => write!(f, "failed to fetch menu"),
        }
    }
}

#[derive(Debug)]
pub enum Error {
    InvalidLocation(String),
    InvalidMealType(String),
    InvalidDate(String),
    /// The HTTP client could not be built.
    Client(reqwest::Error),
    Request { phase: Phase, source: reqwest::Error },
    Status { phase: Phase, status: StatusCode },
    Url(url::ParseError),
}

impl Error {
    pub(crate) fn request(phase: Phase, source: reqwest::Error) -> Self {
        Self::Request { phase, source }
    }

    /// Validation errors are raised before any network activity.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidLocation(_) | Self::InvalidMealType(_) | Self::InvalidDate(_)
        )
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Self::Url(e)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLocation(l) => write!(f, "invalid location: {l}"),
            Self::InvalidMealType(m) => write!(f, "invalid meal type: {m}"),
            Self::InvalidDate(d) => write!(f, "invalid date (expected M/D/YYYY): {d}"),
            Self::Client(e) => write!(f, "HTTP client error: {e}"),
            Self::Request { phase, source } => write!(f, "{phase}: {source}"),
            Self::Status { phase, status } => {
                write!(f, "{phase}: unexpected status code: {}", status.as_u16())
            }
            Self::Url(e) => write!(f, "Url error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Client(e) | Self::Request { source: e, .. } => Some(e),
            Self::Url(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
