use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EloError {
    #[error("malformed match record at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    #[error("invalid outcome label {0:?} (expected H, D or A)")]
    InvalidOutcome(String),

    #[error("nothing to score: trace is empty")]
    EmptyInput,

    #[error("{predictions} predictions but {outcomes} outcomes")]
    LengthMismatch { predictions: usize, outcomes: usize },
}

impl EloError {
    pub fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            index,
            reason: reason.into(),
        }
    }
}
