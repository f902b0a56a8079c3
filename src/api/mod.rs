use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::core::{
    CompoundingFrequency, ConfigError, ContributionFrequency, InvestmentConfiguration,
    ProjectionResult, YearlySnapshot, project,
};

pub const MAX_API_YEARS: i64 = 200;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("years must be <= {max} for API requests, got {years}")]
    YearsAboveLimit { years: i64, max: i64 },

    #[error("failed to serialize projection: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliContributionFrequency {
    Weekly,
    Biweekly,
    Monthly,
    Annually,
}

impl From<CliContributionFrequency> for ContributionFrequency {
    fn from(value: CliContributionFrequency) -> Self {
        match value {
            CliContributionFrequency::Weekly => ContributionFrequency::Weekly,
            CliContributionFrequency::Biweekly => ContributionFrequency::Biweekly,
            CliContributionFrequency::Monthly => ContributionFrequency::Monthly,
            CliContributionFrequency::Annually => ContributionFrequency::Annually,
        }
    }
}

impl From<ContributionFrequency> for CliContributionFrequency {
    fn from(value: ContributionFrequency) -> Self {
        match value {
            ContributionFrequency::Weekly => CliContributionFrequency::Weekly,
            ContributionFrequency::Biweekly => CliContributionFrequency::Biweekly,
            ContributionFrequency::Monthly => CliContributionFrequency::Monthly,
            ContributionFrequency::Annually => CliContributionFrequency::Annually,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliCompoundingFrequency {
    Daily,
    Monthly,
    Quarterly,
    Annually,
}

impl From<CliCompoundingFrequency> for CompoundingFrequency {
    fn from(value: CliCompoundingFrequency) -> Self {
        match value {
            CliCompoundingFrequency::Daily => CompoundingFrequency::Daily,
            CliCompoundingFrequency::Monthly => CompoundingFrequency::Monthly,
            CliCompoundingFrequency::Quarterly => CompoundingFrequency::Quarterly,
            CliCompoundingFrequency::Annually => CompoundingFrequency::Annually,
        }
    }
}

impl From<CompoundingFrequency> for CliCompoundingFrequency {
    fn from(value: CompoundingFrequency) -> Self {
        match value {
            CompoundingFrequency::Daily => CliCompoundingFrequency::Daily,
            CompoundingFrequency::Monthly => CliCompoundingFrequency::Monthly,
            CompoundingFrequency::Quarterly => CliCompoundingFrequency::Quarterly,
            CompoundingFrequency::Annually => CliCompoundingFrequency::Annually,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    #[serde(alias = "principal")]
    initial_principal: Option<f64>,
    years: Option<i64>,
    #[serde(alias = "interestRate", alias = "annualInterestRatePercent")]
    annual_interest_rate: Option<f64>,
    #[serde(alias = "contribution")]
    contribution_amount: Option<f64>,
    contribution_frequency: Option<String>,
    compounding_frequency: Option<String>,
}

#[derive(Parser, Debug)]
#[command(
    name = "compound-growth",
    about = "Compound-interest growth projection (lump sum plus recurring contributions)",
    after_help = "Run `compound-growth serve [port]` to start the HTTP API instead."
)]
pub struct Cli {
    #[arg(long, default_value_t = 1000.0, help = "Starting lump sum")]
    initial_principal: f64,
    #[arg(
        long,
        default_value_t = 10,
        allow_negative_numbers = true,
        help = "Projection horizon in years; values below 1 are treated as 1"
    )]
    years: i64,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Nominal annual interest rate in percent, e.g. 5"
    )]
    annual_interest_rate: f64,
    #[arg(
        long,
        default_value_t = 100.0,
        help = "Amount paid in at every contribution period"
    )]
    contribution_amount: f64,
    #[arg(long, value_enum, default_value_t = CliContributionFrequency::Monthly)]
    contribution_frequency: CliContributionFrequency,
    #[arg(long, value_enum, default_value_t = CliCompoundingFrequency::Monthly)]
    compounding_frequency: CliCompoundingFrequency,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionSummary {
    final_value: f64,
    total_contributions: f64,
    total_interest: f64,
    growth_percentage: f64,
    effective_period_rate: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    configuration: InvestmentConfiguration,
    summary: ProjectionSummary,
    schedule: Vec<YearlySnapshot>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

fn build_configuration(cli: &Cli) -> Result<InvestmentConfiguration, ConfigError> {
    InvestmentConfiguration::new(
        cli.initial_principal,
        cli.years,
        cli.annual_interest_rate,
        cli.contribution_amount,
        cli.contribution_frequency.into(),
        cli.compounding_frequency.into(),
    )
}

pub fn run_cli(cli: &Cli) -> Result<String, ApiError> {
    let config = build_configuration(cli)?;
    let result = project(&config);
    log::debug!(
        "projected {} years, final value {:.2}",
        config.years(),
        result.final_value
    );

    match cli.format {
        OutputFormat::Table => Ok(render_table(&config, &result)),
        OutputFormat::Json => {
            let response = build_project_response(config, result);
            Ok(serde_json::to_string_pretty(&response)?)
        }
    }
}

fn render_table(config: &InvestmentConfiguration, result: &ProjectionResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Initial {:.2}, {} contributions of {:.2}, {}% compounded {} over {} years",
        config.initial_principal(),
        config.contribution_frequency(),
        config.contribution_amount(),
        config.annual_interest_rate_percent(),
        config.compounding_frequency(),
        config.years()
    );
    let _ = writeln!(
        out,
        "{:>5} {:>16} {:>16} {:>16}",
        "Year", "Total value", "Contributions", "Interest"
    );
    let _ = writeln!(out, "{}", "-".repeat(56));
    for row in &result.schedule {
        let _ = writeln!(
            out,
            "{:>5} {:>16.2} {:>16.2} {:>16.2}",
            row.year, row.total_value, row.cumulative_contributions, row.cumulative_interest
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Final value:         {:.2}", result.final_value);
    let _ = writeln!(out, "Total contributions: {:.2}", result.total_contributions);
    let _ = writeln!(out, "Total interest:      {:.2}", result.total_interest);
    let _ = writeln!(out, "Growth:              {:.2}%", result.growth_percentage());
    out
}

fn app() -> Router {
    Router::new()
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route("/healthz", get(health_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    log::info!("growth projection API listening on http://{addr}");
    log::info!("local access: http://127.0.0.1:{port}/api/project");

    axum::serve(listener, app()).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(
    payload: Result<Query<ProjectPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => project_handler_impl(payload).await,
        Err(rejection) => bad_request(ApiError::InvalidPayload(rejection.body_text())),
    }
}

async fn project_post_handler(
    payload: Result<Json<ProjectPayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => project_handler_impl(payload).await,
        Err(rejection) => bad_request(ApiError::InvalidPayload(rejection.body_text())),
    }
}

async fn project_handler_impl(payload: ProjectPayload) -> Response {
    let config = match configuration_from_payload(payload) {
        Ok(config) => config,
        Err(err) => return bad_request(err),
    };

    let result = project(&config);
    log::debug!(
        "served projection over {} years, final value {:.2}",
        config.years(),
        result.final_value
    );
    json_response(StatusCode::OK, build_project_response(config, result))
}

fn bad_request(err: ApiError) -> Response {
    log::warn!("rejected projection request: {err}");
    error_response(StatusCode::BAD_REQUEST, &err.to_string())
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn configuration_from_json(json: &str) -> Result<InvestmentConfiguration, ApiError> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| ApiError::InvalidPayload(e.to_string()))?;
    configuration_from_payload(payload)
}

fn configuration_from_payload(
    payload: ProjectPayload,
) -> Result<InvestmentConfiguration, ApiError> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.initial_principal {
        cli.initial_principal = v;
    }
    if let Some(v) = payload.years {
        if v > MAX_API_YEARS {
            return Err(ApiError::YearsAboveLimit {
                years: v,
                max: MAX_API_YEARS,
            });
        }
        cli.years = v;
    }
    if let Some(v) = payload.annual_interest_rate {
        cli.annual_interest_rate = v;
    }
    if let Some(v) = payload.contribution_amount {
        cli.contribution_amount = v;
    }
    if let Some(v) = payload.contribution_frequency {
        cli.contribution_frequency = v.parse::<ContributionFrequency>()?.into();
    }
    if let Some(v) = payload.compounding_frequency {
        cli.compounding_frequency = v.parse::<CompoundingFrequency>()?.into();
    }

    Ok(build_configuration(&cli)?)
}

fn default_cli_for_api() -> Cli {
    Cli {
        initial_principal: 1000.0,
        years: 10,
        annual_interest_rate: 5.0,
        contribution_amount: 100.0,
        contribution_frequency: CliContributionFrequency::Monthly,
        compounding_frequency: CliCompoundingFrequency::Monthly,
        format: OutputFormat::Json,
    }
}

fn build_project_response(
    configuration: InvestmentConfiguration,
    result: ProjectionResult,
) -> ProjectResponse {
    ProjectResponse {
        configuration,
        summary: ProjectionSummary {
            final_value: result.final_value,
            total_contributions: result.total_contributions,
            total_interest: result.total_interest,
            growth_percentage: result.growth_percentage(),
            effective_period_rate: result.effective_period_rate,
        },
        schedule: result.schedule,
    }
}
