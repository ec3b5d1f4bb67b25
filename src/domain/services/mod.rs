mod conflict_resolver;
mod health_evaluator;

pub use conflict_resolver::{ConflictResolver, Resolution};
pub use health_evaluator::HealthEvaluator;
