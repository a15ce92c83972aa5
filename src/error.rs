// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in dpiscale return `error::Result<T>`.  Failures
// that happen after the window is up (DPI lookups, malformed change messages)
// are logged and dropped by the caller; only startup failures reach `main()`.

use thiserror::Error;

/// Every error that dpiscale can produce.
#[derive(Debug, Error)]
pub enum ScaleError {
    /// The platform could not supply a monitor or its DPI for a window.
    #[error("{query} failed (error {code:#010x})")]
    PlatformQuery {
        /// The name of the failing query, for display purposes.
        query: &'static str,
        /// The raw HRESULT / Win32 error code, or 0 when the query returned an
        /// unusable value rather than an error.
        code: u32,
    },

    /// A DPI-change message parameter decoded to an implausible DPI.
    #[error("malformed DPI-change parameter {raw:#010x}")]
    MalformedMessageParameter { raw: usize },

    /// A Win32 API call returned a failure code.
    #[error("{function} failed (error {code:#010x})")]
    Win32 {
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

// Convert a windows-crate error (HRESULT) directly into a ScaleError so that
// `?` can be used on `windows::core::Result<T>` throughout the platform module.
#[cfg(windows)]
impl From<windows::core::Error> for ScaleError {
    fn from(e: windows::core::Error) -> Self {
        // HRESULT.0 is i32; reinterpret bits as u32 for display purposes.
        Self::Win32 {
            function: "windows",
            code: e.code().0 as u32,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ScaleError>;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_query_display_names_the_query() {
        let e = ScaleError::PlatformQuery {
            query: "GetDpiForMonitor",
            code: 0x8007_0057,
        };
        assert_eq!(e.to_string(), "GetDpiForMonitor failed (error 0x80070057)");
    }

    #[test]
    fn malformed_parameter_display_shows_raw_value() {
        let e = ScaleError::MalformedMessageParameter { raw: 0x0060_0000 };
        assert_eq!(e.to_string(), "malformed DPI-change parameter 0x00600000");
    }

    #[test]
    fn io_error_keeps_its_source() {
        use std::error::Error as _;
        let e = ScaleError::from(std::io::Error::other("disk gone"));
        assert!(e.source().is_some());
    }
}
