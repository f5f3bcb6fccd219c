use std::fmt;
use std::io;

use serframe_frame::FrameError;
use serframe_source::SourceError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const SOURCE_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERRUPTED: i32 = 130;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn source_error(context: &str, err: SourceError) -> CliError {
    match err {
        SourceError::Open { source, .. } | SourceError::Io(source) => io_error(context, source),
        #[allow(unreachable_patterns)]
        other => CliError::new(SOURCE_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Source(source) => source_error(context, source),
        FrameError::Io(source) => io_error(context, source),
        FrameError::IdleTimeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        FrameError::Cancelled => CliError::new(INTERRUPTED, format!("{context}: {err}")),
        FrameError::InvalidBody { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        other if other.is_recoverable() => {
            CliError::new(DATA_INVALID, format!("{context}: {other}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failures_are_data_invalid() {
        let err = frame_error(
            "check failed",
            FrameError::BadSeparators {
                id: 10,
                slot: 0,
                found: 0,
            },
        );
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("check failed: "));
    }

    #[test]
    fn source_io_maps_through_kind() {
        let err = frame_error(
            "decode failed",
            FrameError::Source(SourceError::Io(io::ErrorKind::PermissionDenied.into())),
        );
        assert_eq!(err.code, PERMISSION_DENIED);
    }

    #[test]
    fn cancelled_is_interrupted() {
        let err = frame_error("decode failed", FrameError::Cancelled);
        assert_eq!(err.code, INTERRUPTED);
    }

    #[test]
    fn bad_body_is_usage() {
        let err = frame_error(
            "encode failed",
            FrameError::InvalidBody {
                len: 3,
                reason: "body length must be a multiple of 4",
            },
        );
        assert_eq!(err.code, USAGE);
    }
}
