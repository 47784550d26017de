use thiserror::Error;

use crate::clock::DeadlineExceeded;
use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::result::FailureKind;

/// Errors that end a compression request.
#[derive(Debug, Error)]
pub enum CompressError {
    #[error("could not read source image: {0}")]
    Decode(#[from] DecodeError),

    #[error("unrecognized image format (declared {0:?})")]
    UnknownFormat(String),

    #[error("could not encode candidate: {0}")]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Timeout(#[from] DeadlineExceeded),

    #[error("no candidate fit within {budget} bytes after {attempts} resolution attempts")]
    Exhausted { budget: usize, attempts: u32 },
}

impl CompressError {
    /// The caller-facing category of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            CompressError::Decode(_) | CompressError::UnknownFormat(_) => {
                FailureKind::DecodeFailure
            }
            CompressError::Encode(_) => FailureKind::EncodeFailure,
            CompressError::Timeout(_) => FailureKind::Timeout,
            CompressError::Exhausted { .. } => FailureKind::Exhausted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::ImageFormat;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            CompressError::from(DecodeError::InvalidFormat).kind(),
            FailureKind::DecodeFailure
        );
        assert_eq!(
            CompressError::UnknownFormat("text/plain".into()).kind(),
            FailureKind::DecodeFailure
        );
        assert_eq!(
            CompressError::from(EncodeError::EmptyOutput(ImageFormat::Png)).kind(),
            FailureKind::EncodeFailure
        );
        assert_eq!(
            CompressError::from(DeadlineExceeded {
                elapsed_ms: 5,
                limit_ms: 1,
                stage: "encode",
            })
            .kind(),
            FailureKind::Timeout
        );
        assert_eq!(
            CompressError::Exhausted {
                budget: 10,
                attempts: 5
            }
            .kind(),
            FailureKind::Exhausted
        );
    }

    #[test]
    fn test_timeout_message_is_transparent() {
        let err = CompressError::from(DeadlineExceeded {
            elapsed_ms: 20_000,
            limit_ms: 20_000,
            stage: "resize",
        });
        assert_eq!(
            err.to_string(),
            "timed out after 20000ms (limit 20000ms) before resize"
        );
    }
}
