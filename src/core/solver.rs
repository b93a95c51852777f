use super::engine::project;
use super::types::ProjectionInput;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GoalType {
    RequiredContribution,
    MaxWithdrawalRate,
}

#[derive(Debug, Clone, Copy)]
pub struct GoalSolveConfig {
    pub goal_type: GoalType,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct GoalSolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_value: f64,
    pub candidate_succeeded: bool,
}

#[derive(Debug, Clone)]
pub struct GoalSolveResult {
    pub goal_type: GoalType,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
    pub solved_value: Option<f64>,
    pub iterations: Vec<GoalSolveIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

// Bisection over a single input dimension. The projection is deterministic,
// so candidates are classified by the success flag alone; the search assumes
// the outcome is monotone across the bounds.
pub fn solve_goal(
    input: &ProjectionInput,
    config: GoalSolveConfig,
) -> Result<GoalSolveResult, String> {
    validate_config(config)?;

    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let low_succeeds = evaluate_candidate(input, config.goal_type, config.search_min)?;
    let high_succeeds = evaluate_candidate(input, config.goal_type, config.search_max)?;

    let mut solved_value = None;
    let mut converged = false;
    let feasible;
    let message;

    match config.goal_type {
        GoalType::RequiredContribution => {
            if low_succeeds {
                solved_value = Some(config.search_min);
                converged = true;
                feasible = true;
                message = "Plan already succeeds at the lower contribution bound.".to_string();
            } else if !high_succeeds {
                feasible = false;
                message = "No contribution within the search bounds makes the plan succeed."
                    .to_string();
            } else {
                let mut lo = config.search_min;
                let mut hi = config.search_max;
                let mut it = 0;
                while it < config.max_iterations {
                    it += 1;
                    let mid = (lo + hi) * 0.5;
                    let succeeded = evaluate_candidate(input, config.goal_type, mid)?;
                    iterations.push(GoalSolveIteration {
                        iteration: it,
                        lower_bound: lo,
                        upper_bound: hi,
                        candidate_value: mid,
                        candidate_succeeded: succeeded,
                    });

                    if succeeded {
                        hi = mid;
                    } else {
                        lo = mid;
                    }

                    if (hi - lo).abs() <= config.tolerance {
                        converged = true;
                        solved_value = Some(hi);
                        break;
                    }
                }
                if solved_value.is_none() {
                    solved_value = Some(hi);
                }
                feasible = true;
                message = if converged {
                    "Solved required annual contribution.".to_string()
                } else {
                    "Hit the iteration cap before reaching tolerance; returning the best estimate."
                        .to_string()
                };
            }
        }
        GoalType::MaxWithdrawalRate => {
            if !low_succeeds {
                feasible = false;
                message = "Plan fails even at the lower withdrawal bound.".to_string();
            } else if high_succeeds {
                solved_value = Some(config.search_max);
                converged = true;
                feasible = true;
                message = "Upper withdrawal bound still succeeds; raise search max to probe higher."
                    .to_string();
            } else {
                let mut lo = config.search_min;
                let mut hi = config.search_max;
                let mut it = 0;
                while it < config.max_iterations {
                    it += 1;
                    let mid = (lo + hi) * 0.5;
                    let succeeded = evaluate_candidate(input, config.goal_type, mid)?;
                    iterations.push(GoalSolveIteration {
                        iteration: it,
                        lower_bound: lo,
                        upper_bound: hi,
                        candidate_value: mid,
                        candidate_succeeded: succeeded,
                    });

                    if succeeded {
                        lo = mid;
                    } else {
                        hi = mid;
                    }

                    if (hi - lo).abs() <= config.tolerance {
                        converged = true;
                        solved_value = Some(lo);
                        break;
                    }
                }
                if solved_value.is_none() {
                    solved_value = Some(lo);
                }
                feasible = true;
                message = if converged {
                    "Solved maximum sustainable withdrawal rate.".to_string()
                } else {
                    "Hit the iteration cap before reaching tolerance; returning the best estimate."
                        .to_string()
                };
            }
        }
    }

    Ok(GoalSolveResult {
        goal_type: config.goal_type,
        search_min: config.search_min,
        search_max: config.search_max,
        tolerance: config.tolerance,
        max_iterations: config.max_iterations,
        solved_value,
        iterations,
        converged,
        feasible,
        message,
    })
}

fn evaluate_candidate(
    base_input: &ProjectionInput,
    goal_type: GoalType,
    candidate_value: f64,
) -> Result<bool, String> {
    let mut input = base_input.clone();
    match goal_type {
        GoalType::RequiredContribution => input.annual_contribution = candidate_value,
        GoalType::MaxWithdrawalRate => input.withdrawal_rate = candidate_value,
    }

    let result = project(&input).map_err(|e| e.to_string())?;
    Ok(result.is_successful)
}

fn validate_config(config: GoalSolveConfig) -> Result<(), String> {
    if !config.search_min.is_finite() || !config.search_max.is_finite() {
        return Err("search bounds must be finite".to_string());
    }
    if config.search_min < 0.0 {
        return Err("search_min must be >= 0".to_string());
    }
    if config.search_max <= config.search_min {
        return Err("search_max must be greater than search_min".to_string());
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err("tolerance must be > 0".to_string());
    }
    if config.max_iterations == 0 {
        return Err("max_iterations must be > 0".to_string());
    }
    Ok(())
}
