mod engine;
mod error;
mod types;

pub use engine::{effective_period_rate, project};
pub use error::ConfigError;
pub use types::{
    CompoundingFrequency, ContributionFrequency, InvestmentConfiguration, ProjectionResult,
    YearlySnapshot,
};
