use super::types::{
    ProjectionError, ProjectionInput, ProjectionResult, RecommendationFlags, WithdrawalPoint,
    YearlyPoint,
};

const LOW_CONTRIBUTION_RATIO: f64 = 0.10;
const OPTIMISTIC_RETURN_PCT: f64 = 8.0;
const CONVENTIONAL_RETIREMENT_AGE: u32 = 65;
const SUSTAINABLE_WITHDRAWAL_PCT: f64 = 4.0;

// How far past life expectancy the surplus probe keeps simulating before
// giving up and reporting a capped value.
const SURPLUS_PROBE_YEARS: u32 = 60;

pub fn project(input: &ProjectionInput) -> Result<ProjectionResult, ProjectionError> {
    validate(input)?;

    let return_rate = input.expected_return_rate / 100.0;
    let inflation = input.inflation_rate / 100.0;
    let withdrawal_rate = input.withdrawal_rate / 100.0;

    let year_count = (input.life_expectancy - input.current_age + 2) as usize;
    let mut savings_by_year = Vec::with_capacity(year_count);
    let mut savings = input.current_savings;

    for age in input.current_age..input.retirement_age {
        savings_by_year.push(YearlyPoint { age, savings });
        savings = savings * (1.0 + return_rate) + input.annual_contribution;
    }

    let total_savings_at_retirement = savings;
    savings_by_year.push(YearlyPoint {
        age: input.retirement_age,
        savings: total_savings_at_retirement,
    });

    // Fisher approximation, applied uniformly to every retirement year.
    let real_return = (1.0 + return_rate) / (1.0 + inflation) - 1.0;
    let initial_withdrawal = total_savings_at_retirement * withdrawal_rate;
    let monthly_income_in_retirement = initial_withdrawal / 12.0 + input.social_security_benefit;

    let retirement_years = (input.life_expectancy - input.retirement_age + 1) as usize;
    let mut withdrawals_by_year = Vec::with_capacity(retirement_years);
    let mut savings_depletion_age = None;

    for age in input.retirement_age..=input.life_expectancy {
        let net_withdrawal = net_withdrawal_for_year(input, initial_withdrawal, inflation, age);
        withdrawals_by_year.push(WithdrawalPoint {
            age,
            withdrawal: net_withdrawal,
        });

        savings = (savings * (1.0 + real_return) - net_withdrawal).max(0.0);
        savings_by_year.push(YearlyPoint {
            age: age + 1,
            savings,
        });

        // First zero crossing wins; later years never overwrite it.
        if savings <= 0.0 && savings_depletion_age.is_none() {
            savings_depletion_age = Some(age);
        }
    }

    let is_successful = savings_depletion_age.is_none_or(|age| age >= input.life_expectancy);
    let shortfall = match savings_depletion_age {
        Some(age) if !is_successful => {
            (input.life_expectancy - age) as f64 * initial_withdrawal
        }
        _ => 0.0,
    };
    let surplus_years = if savings_depletion_age.is_none() {
        probe_surplus_years(input, savings, initial_withdrawal, inflation, real_return)
    } else {
        0
    };

    Ok(ProjectionResult {
        total_savings_at_retirement,
        monthly_income_in_retirement,
        savings_depletion_age,
        savings_by_year,
        withdrawals_by_year,
        is_successful,
        shortfall,
        surplus_years,
    })
}

pub fn recommendation_flags(input: &ProjectionInput) -> RecommendationFlags {
    let low_contribution_rate = if input.current_savings > 0.0 {
        input.annual_contribution / input.current_savings < LOW_CONTRIBUTION_RATIO
    } else {
        input.annual_contribution <= 0.0
    };

    RecommendationFlags {
        low_contribution_rate,
        optimistic_return_assumption: input.expected_return_rate > OPTIMISTIC_RETURN_PCT,
        early_retirement: input.retirement_age < CONVENTIONAL_RETIREMENT_AGE,
        aggressive_withdrawal_rate: input.withdrawal_rate > SUSTAINABLE_WITHDRAWAL_PCT,
    }
}

fn net_withdrawal_for_year(
    input: &ProjectionInput,
    initial_withdrawal: f64,
    inflation: f64,
    age: u32,
) -> f64 {
    let years_since_retirement = (age - input.retirement_age) as i32;
    let inflation_factor = (1.0 + inflation).powi(years_since_retirement);
    let gross_withdrawal = initial_withdrawal * inflation_factor;
    let annual_social_security = input.social_security_benefit * 12.0 * inflation_factor;
    // Social Security offsets the draw on savings; any excess benefit is
    // spent, not reinvested.
    (gross_withdrawal - annual_social_security).max(0.0)
}

// The main loop stops at life expectancy, so a plan that is still funded
// there has an unknown amount of headroom. Keep running the same recurrence
// until the pot runs dry to report how many extra years it would have
// covered.
fn probe_surplus_years(
    input: &ProjectionInput,
    savings_at_life_expectancy: f64,
    initial_withdrawal: f64,
    inflation: f64,
    real_return: f64,
) -> u32 {
    let mut savings = savings_at_life_expectancy;
    let mut surplus_years = 0;

    for offset in 1..=SURPLUS_PROBE_YEARS {
        let age = input.life_expectancy + offset;
        let net_withdrawal = net_withdrawal_for_year(input, initial_withdrawal, inflation, age);
        savings = (savings * (1.0 + real_return) - net_withdrawal).max(0.0);
        surplus_years = offset;
        if savings <= 0.0 {
            break;
        }
    }

    surplus_years
}

fn validate(input: &ProjectionInput) -> Result<(), ProjectionError> {
    if input.current_age >= input.retirement_age {
        return Err(ProjectionError::AgeOrdering {
            field: "retirementAge",
            value: input.retirement_age,
            lower_field: "currentAge",
            lower_value: input.current_age,
        });
    }

    if input.retirement_age >= input.life_expectancy {
        return Err(ProjectionError::AgeOrdering {
            field: "lifeExpectancy",
            value: input.life_expectancy,
            lower_field: "retirementAge",
            lower_value: input.retirement_age,
        });
    }

    for (field, value) in [
        ("currentSavings", input.current_savings),
        ("annualContribution", input.annual_contribution),
        ("expectedReturnRate", input.expected_return_rate),
        ("inflationRate", input.inflation_rate),
        ("withdrawalRate", input.withdrawal_rate),
        ("socialSecurityBenefit", input.social_security_benefit),
    ] {
        if !value.is_finite() {
            return Err(ProjectionError::NonFiniteAmount { field, value });
        }
        if value < 0.0 {
            return Err(ProjectionError::NegativeAmount { field, value });
        }
    }

    Ok(())
}
