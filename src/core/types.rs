use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::engine::horizon_is_finite;
use super::error::ConfigError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionFrequency {
    Weekly,
    Biweekly,
    Monthly,
    Annually,
}

impl ContributionFrequency {
    pub const fn periods_per_year(self) -> u32 {
        match self {
            ContributionFrequency::Weekly => 52,
            ContributionFrequency::Biweekly => 26,
            ContributionFrequency::Monthly => 12,
            ContributionFrequency::Annually => 1,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ContributionFrequency::Weekly => "weekly",
            ContributionFrequency::Biweekly => "biweekly",
            ContributionFrequency::Monthly => "monthly",
            ContributionFrequency::Annually => "annually",
        }
    }
}

impl FromStr for ContributionFrequency {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(ContributionFrequency::Weekly),
            "biweekly" | "bi-weekly" | "bi_weekly" | "fortnightly" => {
                Ok(ContributionFrequency::Biweekly)
            }
            "monthly" => Ok(ContributionFrequency::Monthly),
            "annually" | "annual" | "yearly" => Ok(ContributionFrequency::Annually),
            _ => Err(ConfigError::UnknownFrequency {
                kind: "contribution",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ContributionFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompoundingFrequency {
    Daily,
    Monthly,
    Quarterly,
    Annually,
}

impl CompoundingFrequency {
    pub const fn periods_per_year(self) -> u32 {
        match self {
            CompoundingFrequency::Daily => 365,
            CompoundingFrequency::Monthly => 12,
            CompoundingFrequency::Quarterly => 4,
            CompoundingFrequency::Annually => 1,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CompoundingFrequency::Daily => "daily",
            CompoundingFrequency::Monthly => "monthly",
            CompoundingFrequency::Quarterly => "quarterly",
            CompoundingFrequency::Annually => "annually",
        }
    }
}

impl FromStr for CompoundingFrequency {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(CompoundingFrequency::Daily),
            "monthly" => Ok(CompoundingFrequency::Monthly),
            "quarterly" => Ok(CompoundingFrequency::Quarterly),
            "annually" | "annual" | "yearly" => Ok(CompoundingFrequency::Annually),
            _ => Err(ConfigError::UnknownFrequency {
                kind: "compounding",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for CompoundingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentConfiguration {
    initial_principal: f64,
    years: u32,
    annual_interest_rate_percent: f64,
    contribution_amount: f64,
    contribution_frequency: ContributionFrequency,
    compounding_frequency: CompoundingFrequency,
}

impl InvestmentConfiguration {
    pub fn new(
        initial_principal: f64,
        years: i64,
        annual_interest_rate_percent: f64,
        contribution_amount: f64,
        contribution_frequency: ContributionFrequency,
        compounding_frequency: CompoundingFrequency,
    ) -> Result<Self, ConfigError> {
        let years = if years <= 0 {
            1
        } else {
            u32::try_from(years).map_err(|_| ConfigError::YearsOutOfRange {
                years,
                max: u32::MAX,
            })?
        };

        let config = Self {
            initial_principal: non_negative("initialPrincipal", initial_principal)?,
            years,
            annual_interest_rate_percent: non_negative(
                "annualInterestRatePercent",
                annual_interest_rate_percent,
            )?,
            contribution_amount: non_negative("contributionAmount", contribution_amount)?,
            contribution_frequency,
            compounding_frequency,
        };

        if !horizon_is_finite(&config) {
            return Err(ConfigError::GrowthOverflow {
                years: config.years,
            });
        }
        Ok(config)
    }

    pub fn initial_principal(&self) -> f64 {
        self.initial_principal
    }

    pub fn years(&self) -> u32 {
        self.years
    }

    pub fn annual_interest_rate_percent(&self) -> f64 {
        self.annual_interest_rate_percent
    }

    pub fn contribution_amount(&self) -> f64 {
        self.contribution_amount
    }

    pub fn contribution_frequency(&self) -> ContributionFrequency {
        self.contribution_frequency
    }

    pub fn compounding_frequency(&self) -> CompoundingFrequency {
        self.compounding_frequency
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { field });
    }
    // Adding 0.0 turns -0.0 into +0.0.
    Ok(value.max(0.0) + 0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlySnapshot {
    pub year: u32,
    pub total_value: f64,
    pub cumulative_contributions: f64,
    pub cumulative_interest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub schedule: Vec<YearlySnapshot>,
    pub final_value: f64,
    pub total_contributions: f64,
    pub total_interest: f64,
    // 0 on the zero-rate path.
    pub effective_period_rate: f64,
}

impl ProjectionResult {
    pub fn growth_percentage(&self) -> f64 {
        if self.total_contributions > 0.0 {
            self.total_interest / self.total_contributions * 100.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(
        principal: f64,
        years: i64,
        rate: f64,
        contribution: f64,
    ) -> Result<InvestmentConfiguration, ConfigError> {
        InvestmentConfiguration::new(
            principal,
            years,
            rate,
            contribution,
            ContributionFrequency::Monthly,
            CompoundingFrequency::Monthly,
        )
    }

    #[test]
    fn years_below_one_clamp_to_one() {
        assert_eq!(build(1_000.0, 0, 5.0, 100.0).expect("valid").years(), 1);
        assert_eq!(build(1_000.0, -7, 5.0, 100.0).expect("valid").years(), 1);
        assert_eq!(build(1_000.0, 30, 5.0, 100.0).expect("valid").years(), 30);
    }

    #[test]
    fn years_beyond_u32_are_rejected() {
        let err = build(1_000.0, i64::from(u32::MAX) + 1, 5.0, 100.0).expect_err("too many years");
        assert!(matches!(err, ConfigError::YearsOutOfRange { .. }));
    }

    #[test]
    fn negative_amounts_clamp_to_zero() {
        let config = build(-500.0, 5, -3.0, -20.0).expect("valid");
        assert_eq!(config.initial_principal(), 0.0);
        assert_eq!(config.annual_interest_rate_percent(), 0.0);
        assert_eq!(config.contribution_amount(), 0.0);
        assert!(config.annual_interest_rate_percent().is_sign_positive());
    }

    #[test]
    fn non_finite_inputs_are_rejected_with_field_name() {
        let err = build(f64::NAN, 5, 5.0, 100.0).expect_err("nan principal");
        assert_eq!(
            err,
            ConfigError::NonFinite {
                field: "initialPrincipal"
            }
        );

        let err = build(1_000.0, 5, f64::INFINITY, 100.0).expect_err("infinite rate");
        assert!(err.to_string().contains("annualInterestRatePercent"));

        let err = build(1_000.0, 5, 5.0, f64::NEG_INFINITY).expect_err("infinite contribution");
        assert!(err.to_string().contains("contributionAmount"));
    }

    #[test]
    fn overflowing_horizon_is_rejected() {
        let zero_principal = InvestmentConfiguration::new(
            0.0,
            160,
            10_000.0,
            100.0,
            ContributionFrequency::Weekly,
            CompoundingFrequency::Annually,
        )
        .expect_err("growth factor overflows");
        assert_eq!(zero_principal, ConfigError::GrowthOverflow { years: 160 });

        let zero_contribution = InvestmentConfiguration::new(
            1_000.0,
            160,
            10_000.0,
            0.0,
            ContributionFrequency::Weekly,
            CompoundingFrequency::Annually,
        )
        .expect_err("growth factor overflows");
        assert_eq!(zero_contribution, ConfigError::GrowthOverflow { years: 160 });
    }

    #[test]
    fn overflowing_paid_in_capital_is_rejected_at_zero_rate() {
        let err = build(f64::MAX, 10, 0.0, f64::MAX).expect_err("paid-in capital overflows");
        assert!(matches!(err, ConfigError::GrowthOverflow { years: 10 }));
    }

    #[test]
    fn high_rate_short_horizon_is_accepted() {
        let config = InvestmentConfiguration::new(
            0.0,
            20,
            10_000.0,
            100.0,
            ContributionFrequency::Weekly,
            CompoundingFrequency::Annually,
        )
        .expect("101^20 is representable");
        assert_eq!(config.years(), 20);
    }

    #[test]
    fn frequency_tables_match_periods_per_year() {
        assert_eq!(ContributionFrequency::Weekly.periods_per_year(), 52);
        assert_eq!(ContributionFrequency::Biweekly.periods_per_year(), 26);
        assert_eq!(ContributionFrequency::Monthly.periods_per_year(), 12);
        assert_eq!(ContributionFrequency::Annually.periods_per_year(), 1);

        assert_eq!(CompoundingFrequency::Daily.periods_per_year(), 365);
        assert_eq!(CompoundingFrequency::Monthly.periods_per_year(), 12);
        assert_eq!(CompoundingFrequency::Quarterly.periods_per_year(), 4);
        assert_eq!(CompoundingFrequency::Annually.periods_per_year(), 1);
    }

    #[test]
    fn frequencies_parse_common_spellings() {
        assert_eq!(
            "Bi-Weekly".parse::<ContributionFrequency>(),
            Ok(ContributionFrequency::Biweekly)
        );
        assert_eq!(
            " yearly ".parse::<ContributionFrequency>(),
            Ok(ContributionFrequency::Annually)
        );
        assert_eq!(
            "QUARTERLY".parse::<CompoundingFrequency>(),
            Ok(CompoundingFrequency::Quarterly)
        );
    }

    #[test]
    fn unknown_frequency_fails_fast() {
        let err = "hourly".parse::<CompoundingFrequency>().expect_err("closed enum");
        assert_eq!(
            err,
            ConfigError::UnknownFrequency {
                kind: "compounding",
                value: "hourly".to_string()
            }
        );

        // Quarterly contributions are not part of the contribution table.
        assert!("quarterly".parse::<ContributionFrequency>().is_err());
    }

    #[test]
    fn growth_percentage_guards_zero_contributions() {
        let result = ProjectionResult {
            schedule: Vec::new(),
            final_value: 0.0,
            total_contributions: 0.0,
            total_interest: 0.0,
            effective_period_rate: 0.0,
        };
        assert_eq!(result.growth_percentage(), 0.0);

        let result = ProjectionResult {
            total_contributions: 200.0,
            total_interest: 50.0,
            final_value: 250.0,
            ..result
        };
        assert_eq!(result.growth_percentage(), 25.0);
    }
}
