use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    GoalSolveConfig, GoalSolveResult, GoalType, ProjectionInput, ProjectionResult,
    RecommendationFlags, project, recommendation_flags, solve_goal,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
enum ApiGoalType {
    #[serde(alias = "requiredContribution", alias = "required_contribution")]
    RequiredContribution,
    #[serde(alias = "maxWithdrawalRate", alias = "max_withdrawal_rate")]
    MaxWithdrawalRate,
}

impl From<ApiGoalType> for GoalType {
    fn from(value: ApiGoalType) -> Self {
        match value {
            ApiGoalType::RequiredContribution => GoalType::RequiredContribution,
            ApiGoalType::MaxWithdrawalRate => GoalType::MaxWithdrawalRate,
        }
    }
}

impl From<GoalType> for ApiGoalType {
    fn from(value: GoalType) -> Self {
        match value {
            GoalType::RequiredContribution => ApiGoalType::RequiredContribution,
            GoalType::MaxWithdrawalRate => ApiGoalType::MaxWithdrawalRate,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    life_expectancy: Option<u32>,
    current_savings: Option<f64>,
    annual_contribution: Option<f64>,
    expected_return_rate: Option<f64>,
    inflation_rate: Option<f64>,
    withdrawal_rate: Option<f64>,
    social_security_benefit: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SolvePayload {
    #[serde(flatten)]
    projection: ProjectPayload,
    goal: Option<ApiGoalType>,
    search_min: Option<f64>,
    search_max: Option<f64>,
    tolerance: Option<f64>,
    max_iterations: Option<u32>,
}

#[derive(Parser, Debug)]
#[command(
    name = "nestegg",
    about = "Deterministic retirement projection (two-phase savings simulation)"
)]
struct Cli {
    #[arg(long, help = "Age today in whole years")]
    current_age: u32,
    #[arg(long, help = "Age at which contributions stop and withdrawals begin")]
    retirement_age: u32,
    #[arg(long, default_value_t = 90, help = "Age the plan must fund through")]
    life_expectancy: u32,
    #[arg(long, default_value_t = 0.0)]
    current_savings: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Amount added once per year before retirement"
    )]
    annual_contribution: f64,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Expected annual return in percent, e.g. 7"
    )]
    expected_return_rate: f64,
    #[arg(
        long,
        default_value_t = 2.5,
        help = "Expected annual inflation in percent"
    )]
    inflation_rate: f64,
    #[arg(
        long,
        default_value_t = 4.0,
        help = "First-year withdrawal as percent of savings at retirement"
    )]
    withdrawal_rate: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Monthly Social Security benefit in today's money"
    )]
    social_security_benefit: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    #[serde(flatten)]
    projection: ProjectionResult,
    recommendations: RecommendationFlags,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveIterationResponse {
    iteration: u32,
    lower_bound: f64,
    upper_bound: f64,
    candidate_value: f64,
    candidate_succeeded: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveResponse {
    goal: ApiGoalType,
    search_min: f64,
    search_max: f64,
    tolerance: f64,
    max_iterations: u32,
    solved_value: Option<f64>,
    converged: bool,
    feasible: bool,
    message: String,
    iterations: Vec<SolveIterationResponse>,
}

impl From<GoalSolveResult> for SolveResponse {
    fn from(result: GoalSolveResult) -> Self {
        SolveResponse {
            goal: result.goal_type.into(),
            search_min: result.search_min,
            search_max: result.search_max,
            tolerance: result.tolerance,
            max_iterations: result.max_iterations,
            solved_value: result.solved_value,
            converged: result.converged,
            feasible: result.feasible,
            message: result.message,
            iterations: result
                .iterations
                .into_iter()
                .map(|it| SolveIterationResponse {
                    iteration: it.iteration,
                    lower_bound: it.lower_bound,
                    upper_bound: it.upper_bound,
                    candidate_value: it.candidate_value,
                    candidate_succeeded: it.candidate_succeeded,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn default_cli_for_api() -> Cli {
    Cli {
        current_age: 30,
        retirement_age: 65,
        life_expectancy: 90,
        current_savings: 50_000.0,
        annual_contribution: 6_000.0,
        expected_return_rate: 7.0,
        inflation_rate: 2.5,
        withdrawal_rate: 4.0,
        social_security_benefit: 1_500.0,
    }
}

fn projection_input_from_cli(cli: &Cli) -> ProjectionInput {
    ProjectionInput {
        current_age: cli.current_age,
        retirement_age: cli.retirement_age,
        life_expectancy: cli.life_expectancy,
        current_savings: cli.current_savings,
        annual_contribution: cli.annual_contribution,
        expected_return_rate: cli.expected_return_rate,
        inflation_rate: cli.inflation_rate,
        withdrawal_rate: cli.withdrawal_rate,
        social_security_benefit: cli.social_security_benefit,
    }
}

fn projection_input_from_payload(payload: ProjectPayload) -> ProjectionInput {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.current_age {
        cli.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        cli.retirement_age = v;
    }
    if let Some(v) = payload.life_expectancy {
        cli.life_expectancy = v;
    }
    if let Some(v) = payload.current_savings {
        cli.current_savings = v;
    }
    if let Some(v) = payload.annual_contribution {
        cli.annual_contribution = v;
    }
    if let Some(v) = payload.expected_return_rate {
        cli.expected_return_rate = v;
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }
    if let Some(v) = payload.withdrawal_rate {
        cli.withdrawal_rate = v;
    }
    if let Some(v) = payload.social_security_benefit {
        cli.social_security_benefit = v;
    }

    projection_input_from_cli(&cli)
}

fn project_response_from_payload(payload: ProjectPayload) -> Result<ProjectResponse, String> {
    let input = projection_input_from_payload(payload);
    let projection = project(&input).map_err(|e| e.to_string())?;
    let recommendations = recommendation_flags(&input);
    Ok(ProjectResponse {
        projection,
        recommendations,
    })
}

fn solve_response_from_payload(payload: SolvePayload) -> Result<SolveResponse, String> {
    let goal = payload.goal.unwrap_or(ApiGoalType::RequiredContribution);
    let (default_min, default_max, default_tolerance) = match goal {
        ApiGoalType::RequiredContribution => (0.0, 250_000.0, 10.0),
        ApiGoalType::MaxWithdrawalRate => (0.0, 20.0, 0.01),
    };

    let config = GoalSolveConfig {
        goal_type: goal.into(),
        search_min: payload.search_min.unwrap_or(default_min),
        search_max: payload.search_max.unwrap_or(default_max),
        tolerance: payload.tolerance.unwrap_or(default_tolerance),
        max_iterations: payload.max_iterations.unwrap_or(48),
    };

    let input = projection_input_from_payload(payload.projection);
    let result = solve_goal(&input, config)?;
    Ok(result.into())
}

pub fn run_projection_cli(args: Vec<String>) -> Result<String, String> {
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;
    let input = projection_input_from_cli(&cli);
    let projection = project(&input).map_err(|e| e.to_string())?;
    let response = ProjectResponse {
        projection,
        recommendations: recommendation_flags(&input),
    };
    serde_json::to_string_pretty(&response).map_err(|e| e.to_string())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route("/api/solve", post(solve_post_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "retirement projection API listening");
    axum::serve(listener, app).await
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    match project_response_from_payload(payload) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => {
            tracing::debug!(error = %msg, "rejected projection request");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

async fn solve_post_handler(Json(payload): Json<SolvePayload>) -> Response {
    match solve_response_from_payload(payload) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => {
            tracing::debug!(error = %msg, "rejected solve request");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
