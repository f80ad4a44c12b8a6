//! LLM prompts for onboarding questions and plan skeletons, plus helpers for
//! pulling JSON out of model replies.

use super::model::Answers;

const QUESTIONS_SCHEMA: &str = r#"{"questions":[{"id":"q1","text":"...","type":"single-choice","options":["...","...","..."]},{"id":"q2","text":"...","type":"text"},{"id":"q3","text":"...","type":"single-choice","options":["...","...","..."]},{"id":"q4","text":"...","type":"text"},{"id":"q5","text":"...","type":"single-choice","options":["1","2","3","4","5"]}]}"#;

const PLAN_SCHEMA: &str = r#"{"planTitle":"...","daily":[{"day":1,"microAction":"...","reflection":"...","verseRefs":["Book Chap:Verse"],"quoteTags":["tag1","tag2"]},{"day":2,"microAction":"...","reflection":"...","verseRefs":["Book Chap:Verse"],"quoteTags":["tag1"]},{"day":3,"microAction":"...","reflection":"...","verseRefs":["Book Chap:Verse"],"quoteTags":["tag1","tag2"]},{"day":4,"microAction":"...","reflection":"...","verseRefs":["Book Chap:Verse"],"quoteTags":["tag1"]},{"day":5,"microAction":"...","reflection":"...","verseRefs":["Book Chap:Verse"],"quoteTags":["tag1","tag2"]},{"day":6,"microAction":"...","reflection":"...","verseRefs":["Book Chap:Verse"],"quoteTags":["tag1"]},{"day":7,"microAction":"...","reflection":"...","verseRefs":["Book Chap:Verse"],"quoteTags":["tag1","tag2"]}]}"#;

/// Prompt asking for onboarding questions about `habit`.
pub fn questions_prompt(habit: &str) -> String {
    format!(
        "You are an expert habit coach.\n\
         Ask concise onboarding questions that personalize a 7-day micro-habit plan.\n\
         Return ONLY valid minified JSON matching the schema below, with no commentary or markdown.\n\
         Keep each question under 120 characters.\n\
         Use only the types \"text\" or \"single-choice\"; single-choice questions must list their options.\n\
         Cover barriers, environment, motivation and confidence. Avoid highly sensitive topics and use simple language.\n\
         Generate at least 4 onboarding questions for a 7-day plan about the habit: \"{habit}\".\n\
         Schema: {QUESTIONS_SCHEMA}\n\
         Respond with the JSON object only."
    )
}

/// Prompt asking for a 7-day plan skeleton for `habit`, personalized by `answers`.
pub fn plan_prompt(habit: &str, answers: &Answers) -> Result<String, serde_json::Error> {
    let answers_json = serde_json::to_string(answers)?;
    Ok(format!(
        "You are a Christian habit coach.\n\
         Create a 7-day micro-habit plan.\n\
         Each day has exactly one concrete micro-action under 10 minutes, one short reflection prompt, \
         exactly one Bible verse reference (reference only, never verse text) and 1-2 quote tags.\n\
         Return ONLY valid minified JSON matching the schema below.\n\
         Write specific, actionable steps in the imperative voice. Keep the language simple and encouraging.\n\
         Prefer well-known references that exist in the KJV (Proverbs, James, Colossians, Joshua, Luke, Philippians).\n\
         Create a personalized 7-day plan for the habit \"{habit}\" using these answers: {answers_json}.\n\
         Rules:\n\
         - microAction: one specific action doable in under 10 minutes (e.g. \"Define today's top 3 outcomes.\")\n\
         - reflection: one sentence inviting self-examination, at most 140 characters\n\
         - verseRefs: exactly one reference string such as \"Proverbs 21:5\"\n\
         - quoteTags: 1-2 simple keywords (e.g. \"discipline\", \"focus\", \"courage\", \"stewardship\")\n\
         Schema: {PLAN_SCHEMA}\n\
         Respond with the JSON object only."
    ))
}

/// Extract a JSON object from model output that may carry fences or prose.
///
/// Falls back to the trimmed input so the JSON parser reports the error.
pub fn extract_json_object(text: &str) -> &str {
    let trimmed = text.trim();

    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return trimmed;
    }

    if let Some(start) = trimmed.find("```json") {
        let after = &trimmed[start + "```json".len()..];
        if let Some(end) = after.find("```") {
            return after[..end].trim();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        if let Some(end) = after.find("```") {
            let inner = after[..end].trim();
            if inner.starts_with('{') {
                return inner;
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if end > start {
            return &trimmed[start..=end];
        }
    }

    trimmed
}
