use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionInput {
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,
    pub current_savings: f64,
    pub annual_contribution: f64,
    // Rates are percentages as entered by the user, e.g. 7.0 means 7%.
    pub expected_return_rate: f64,
    pub inflation_rate: f64,
    pub withdrawal_rate: f64,
    // Monthly benefit in today's money, assumed to start at retirement_age.
    pub social_security_benefit: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyPoint {
    pub age: u32,
    pub savings: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalPoint {
    pub age: u32,
    pub withdrawal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub total_savings_at_retirement: f64,
    pub monthly_income_in_retirement: f64,
    // None means savings outlast life_expectancy.
    pub savings_depletion_age: Option<u32>,
    pub savings_by_year: Vec<YearlyPoint>,
    pub withdrawals_by_year: Vec<WithdrawalPoint>,
    pub is_successful: bool,
    pub shortfall: f64,
    pub surplus_years: u32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationFlags {
    pub low_contribution_rate: bool,
    pub optimistic_return_assumption: bool,
    pub early_retirement: bool,
    pub aggressive_withdrawal_rate: bool,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("{field} ({value}) must be greater than {lower_field} ({lower_value})")]
    AgeOrdering {
        field: &'static str,
        value: u32,
        lower_field: &'static str,
        lower_value: u32,
    },
    #[error("{field} must be non-negative, got {value}")]
    NegativeAmount { field: &'static str, value: f64 },
    #[error("{field} must be a finite number, got {value}")]
    NonFiniteAmount { field: &'static str, value: f64 },
}
