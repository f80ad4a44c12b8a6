//! Request, response and LLM payload types for the plan endpoints.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::PlanError;

use super::prompts::extract_json_object;

/// Minimum number of onboarding questions the model must return.
pub const MIN_QUESTIONS: usize = 4;
/// Number of days in a plan.
pub const PLAN_DAYS: u32 = 7;

/// How a question is answered in the frontend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QuestionKind {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "single-choice")]
    SingleChoice,
}

/// A clarifying question asked before the plan is generated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OnboardingQuestion {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// Body of `GET /questions/{habit}`; also the shape the model must emit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionsResponse {
    pub questions: Vec<OnboardingQuestion>,
}

impl QuestionsResponse {
    /// Parse and validate raw model output.
    pub fn from_llm_output(raw: &str) -> Result<Self, PlanError> {
        let parsed: Self = serde_json::from_str(extract_json_object(raw))?;
        parsed.validate()?;
        Ok(parsed)
    }

    fn validate(&self) -> Result<(), PlanError> {
        if self.questions.len() < MIN_QUESTIONS {
            return Err(PlanError::Schema(format!(
                "expected at least {MIN_QUESTIONS} questions, got {}",
                self.questions.len()
            )));
        }

        let mut seen = BTreeSet::new();
        for q in &self.questions {
            if q.id.trim().is_empty() || q.text.trim().is_empty() {
                return Err(PlanError::Schema(
                    "every question needs a non-empty id and text".to_string(),
                ));
            }
            if !seen.insert(q.id.as_str()) {
                return Err(PlanError::Schema(format!("duplicate question id {:?}", q.id)));
            }
            if q.kind == QuestionKind::SingleChoice
                && q.options.as_ref().is_none_or(|o| o.is_empty())
            {
                return Err(PlanError::Schema(format!(
                    "single-choice question {:?} has no options",
                    q.id
                )));
            }
        }
        Ok(())
    }
}

/// Answers keyed by question id. Not checked against the question list.
pub type Answers = BTreeMap<String, String>;

/// Body of `POST /plan`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub habit: String,
    #[serde(default)]
    pub answers: Answers,
}

/// One day of the plan as produced by the model, before enrichment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DayPlanSkeleton {
    pub day: u32,
    pub micro_action: String,
    pub reflection: String,
    pub verse_refs: Vec<String>,
    #[serde(default)]
    pub quote_tags: Vec<String>,
}

impl DayPlanSkeleton {
    /// The reference used for enrichment. Only the first is looked up.
    pub fn primary_verse(&self) -> &str {
        self.verse_refs.first().map(String::as_str).unwrap_or_default()
    }

    /// Tags joined with single spaces, as sent to the quotation search.
    pub fn quote_query(&self) -> String {
        self.quote_tags.join(" ")
    }
}

/// The 7-day structure returned by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlanSkeleton {
    pub plan_title: String,
    pub daily: Vec<DayPlanSkeleton>,
}

impl PlanSkeleton {
    /// Parse and validate raw model output; days come back sorted by `day`.
    pub fn from_llm_output(raw: &str) -> Result<Self, PlanError> {
        let mut parsed: Self = serde_json::from_str(extract_json_object(raw))?;
        parsed.daily.sort_by_key(|d| d.day);
        parsed.validate()?;
        Ok(parsed)
    }

    /// Expects `daily` sorted.
    fn validate(&self) -> Result<(), PlanError> {
        if self.daily.len() != PLAN_DAYS as usize {
            return Err(PlanError::Schema(format!(
                "expected {PLAN_DAYS} days, got {}",
                self.daily.len()
            )));
        }

        for (expected, day) in (1..=PLAN_DAYS).zip(&self.daily) {
            if day.day != expected {
                return Err(PlanError::Schema(format!(
                    "days must be numbered 1 to {PLAN_DAYS} exactly once (found day {} where day {expected} was expected)",
                    day.day
                )));
            }
            if day.primary_verse().trim().is_empty() {
                return Err(PlanError::Schema(format!(
                    "day {} has no verse reference",
                    day.day
                )));
            }
        }
        Ok(())
    }
}

/// A plan day with resolved verse text and quotation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedDayPlan {
    pub day: u32,
    pub micro_action: String,
    pub reflection: String,
    pub verse_reference: String,
    pub verse_text: String,
    /// Empty when no quotation was found.
    pub quote: String,
    pub quote_author: String,
}

/// Body of a successful `POST /plan`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedPlan {
    pub plan_title: String,
    pub daily: Vec<EnrichedDayPlan>,
}
