//! Habit plan generation.
//!
//! Two flows share one `PlanService`. The questions flow asks the LLM for
//! onboarding questions about a habit. The plan flow asks the LLM for a
//! 7-day skeleton, then enriches each day with scripture text and a
//! quotation. Only the LLM call and its parsing can fail a request.

pub mod model;
pub mod prompts;
pub mod routes;
pub mod service;

pub use model::{
    Answers, DayPlanSkeleton, EnrichedDayPlan, EnrichedPlan, OnboardingQuestion, PlanRequest,
    PlanSkeleton, QuestionKind, QuestionsResponse,
};
pub use routes::{PlanRouteState, plan_routes};
pub use service::PlanService;
