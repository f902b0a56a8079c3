use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    #[error("unknown {kind} frequency '{value}'")]
    UnknownFrequency { kind: &'static str, value: String },

    #[error("years must be at most {max}, got {years}")]
    YearsOutOfRange { years: i64, max: u32 },

    #[error("projected value overflows over {years} years; lower the rate, amounts or horizon")]
    GrowthOverflow { years: u32 },
}
