use super::types::{
    CompoundingFrequency, ContributionFrequency, InvestmentConfiguration, ProjectionResult,
    YearlySnapshot,
};

pub fn project(config: &InvestmentConfiguration) -> ProjectionResult {
    let model = GrowthModel::from_config(config);
    // Each snapshot depends only on its year.
    let final_snapshot = model.snapshot(config.years());
    let mut schedule: Vec<YearlySnapshot> = (0..config.years())
        .map(|year| model.snapshot(year))
        .collect();
    schedule.push(final_snapshot);

    ProjectionResult {
        final_value: final_snapshot.total_value,
        total_contributions: final_snapshot.cumulative_contributions,
        total_interest: final_snapshot.cumulative_interest,
        effective_period_rate: model.effective_rate,
        schedule,
    }
}

// One contribution period spans n / c compounding periods.
pub fn effective_period_rate(
    annual_interest_rate_percent: f64,
    compounding: CompoundingFrequency,
    contribution: ContributionFrequency,
) -> f64 {
    let rate = annual_interest_rate_percent / 100.0;
    let n = f64::from(compounding.periods_per_year());
    let c = f64::from(contribution.periods_per_year());
    (1.0 + rate / n).powf(n / c) - 1.0
}

// Values only grow with the year, so a finite horizon snapshot bounds the schedule.
pub(super) fn horizon_is_finite(config: &InvestmentConfiguration) -> bool {
    let last = GrowthModel::from_config(config).snapshot(config.years());
    last.total_value.is_finite()
        && last.cumulative_contributions.is_finite()
        && last.cumulative_interest.is_finite()
}

#[derive(Debug, Clone, Copy)]
enum GrowthRegime {
    Flat,
    Compounding,
}

#[derive(Debug, Clone, Copy)]
struct GrowthModel {
    regime: GrowthRegime,
    initial_principal: f64,
    contribution_amount: f64,
    contributions_per_year: f64,
    effective_rate: f64,
}

impl GrowthModel {
    fn from_config(config: &InvestmentConfiguration) -> Self {
        let rate_percent = config.annual_interest_rate_percent();
        let (regime, effective_rate) = if rate_percent == 0.0 {
            (GrowthRegime::Flat, 0.0)
        } else {
            (
                GrowthRegime::Compounding,
                effective_period_rate(
                    rate_percent,
                    config.compounding_frequency(),
                    config.contribution_frequency(),
                ),
            )
        };

        Self {
            regime,
            initial_principal: config.initial_principal(),
            contribution_amount: config.contribution_amount(),
            contributions_per_year: f64::from(config.contribution_frequency().periods_per_year()),
            effective_rate,
        }
    }

    fn paid_in(&self, year: u32) -> f64 {
        self.initial_principal
            + self.contribution_amount * self.contributions_per_year * f64::from(year)
    }

    fn snapshot(&self, year: u32) -> YearlySnapshot {
        let cumulative_contributions = self.paid_in(year);
        let total_value = match self.regime {
            GrowthRegime::Flat => cumulative_contributions,
            GrowthRegime::Compounding => {
                let periods = self.contributions_per_year * f64::from(year);
                self.principal_growth(periods) + self.contribution_growth(periods)
            }
        };

        YearlySnapshot {
            year,
            total_value,
            cumulative_contributions,
            cumulative_interest: total_value - cumulative_contributions,
        }
    }

    fn principal_growth(&self, periods: f64) -> f64 {
        self.initial_principal * (1.0 + self.effective_rate).powf(periods)
    }

    // Ordinary annuity future value.
    fn contribution_growth(&self, periods: f64) -> f64 {
        if self.effective_rate > 0.0 {
            self.contribution_amount * ((1.0 + self.effective_rate).powf(periods) - 1.0)
                / self.effective_rate
        } else {
            // Rate > 0 that rounds away at the period scale.
            self.contribution_amount * periods
        }
    }
}
