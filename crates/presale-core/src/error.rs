use thiserror::Error;

/// Validation and contract errors exposed by `presale-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("unix timestamp {value} is out of range")]
    TimestampOutOfRange { value: i64 },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
    #[error("field '{field}' must be greater than zero")]
    NonPositiveValue { field: &'static str },

    #[error("discount factor must be within (0, 1], got {value}")]
    DiscountOutOfRange { value: f64 },
    #[error("percent '{field}' must be within [0, 100], got {value}")]
    PercentOutOfRange { field: &'static str, value: f64 },
    #[error("max percent {max} must not be below start percent {start}")]
    PercentRangeInverted { start: f64, max: f64 },
    #[error("duration must be greater than zero seconds")]
    EmptyDuration,
    #[error("duration of {seconds} seconds runs past the supported calendar range")]
    DurationOutOfRange { seconds: u64 },
    #[error("total units must be greater than zero")]
    EmptySupply,

    #[error("field '{field}' cannot be empty")]
    EmptyField { field: &'static str },

    #[error("wallet address must be base58 encoding of 32 bytes: '{value}'")]
    InvalidAddress { value: String },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
