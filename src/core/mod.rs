mod engine;
mod solver;
mod types;

pub use engine::{project, recommendation_flags};
pub use solver::{GoalSolveConfig, GoalSolveIteration, GoalSolveResult, GoalType, solve_goal};
pub use types::{
    ProjectionError, ProjectionInput, ProjectionResult, RecommendationFlags, WithdrawalPoint,
    YearlyPoint,
};
