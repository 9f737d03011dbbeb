//! Tagged HTTP status codes.
//!
//! Results never take a bare integer where a status is expected; every status
//! flows through [`http_status`] (or [`HttpStatus::new`]). The code is stored
//! unchanged, so range and legality are the caller's responsibility.

use std::fmt;

/// A status code as carried by action results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HttpStatus {
    code: u16,
}

impl HttpStatus {
    pub const OK: HttpStatus = HttpStatus::new(200);
    pub const FOUND: HttpStatus = HttpStatus::new(302);
    pub const NOT_FOUND: HttpStatus = HttpStatus::new(404);
    pub const INTERNAL_SERVER_ERROR: HttpStatus = HttpStatus::new(500);

    /// Wrap a raw status code. No validation is performed.
    pub const fn new(code: u16) -> Self {
        Self { code }
    }

    /// The raw status code.
    pub const fn code(&self) -> u16 {
        self.code
    }
}

/// Factory for [`HttpStatus`].
pub const fn http_status(code: u16) -> HttpStatus {
    HttpStatus::new(code)
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

impl From<axum::http::StatusCode> for HttpStatus {
    fn from(status: axum::http::StatusCode) -> Self {
        Self::new(status.as_u16())
    }
}
