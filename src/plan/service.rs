//! PlanService — turns a habit into onboarding questions, and a habit plus
//! answers into an enriched 7-day plan.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::enrichment::{BibleApiClient, QuotableClient, QuoteSource, ScriptureSource};
use crate::error::{self, PlanError};
use crate::llm::{GitHubModelsClient, LlmProvider};

use super::model::{
    DayPlanSkeleton, EnrichedDayPlan, EnrichedPlan, PlanRequest, PlanSkeleton, QuestionsResponse,
};
use super::prompts::{plan_prompt, questions_prompt};

/// Coordinates the LLM and the enrichment sources for one request at a time.
///
/// Holds no per-request state; a single instance is shared by all handlers.
pub struct PlanService {
    llm: Arc<dyn LlmProvider>,
    scripture: Arc<dyn ScriptureSource>,
    quotes: Arc<dyn QuoteSource>,
    enrich_concurrency: usize,
}

impl PlanService {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        scripture: Arc<dyn ScriptureSource>,
        quotes: Arc<dyn QuoteSource>,
    ) -> Self {
        Self {
            llm,
            scripture,
            quotes,
            enrich_concurrency: 1,
        }
    }

    /// Enrich up to `n` days at once. Output order is unaffected.
    pub fn with_enrich_concurrency(mut self, n: usize) -> Self {
        self.enrich_concurrency = n.max(1);
        self
    }

    /// Wire the production clients from configuration over one shared
    /// outbound HTTP client.
    pub fn from_config(config: &AppConfig) -> error::Result<Self> {
        let http = config.http.build_client()?;

        let llm = GitHubModelsClient::new(http.clone(), config.github_models.clone());
        let scripture = BibleApiClient::new(http.clone(), &config.external_apis);
        let quotes = QuotableClient::new(http, &config.external_apis);

        Ok(Self::new(Arc::new(llm), Arc::new(scripture), Arc::new(quotes))
            .with_enrich_concurrency(config.server.enrich_concurrency))
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Ask the model for onboarding questions about `habit`.
    pub async fn questions(&self, habit: &str) -> Result<QuestionsResponse, PlanError> {
        let habit = require_habit(habit)?;

        let output = self.llm.complete(&questions_prompt(habit), None).await?;
        let questions = QuestionsResponse::from_llm_output(&output)?;

        info!(habit, count = questions.questions.len(), "Generated onboarding questions");
        Ok(questions)
    }

    /// Ask the model for a plan skeleton, then enrich every day.
    ///
    /// Only the model call and its parsing can fail; enrichment degrades to
    /// fallback text per day.
    pub async fn plan(&self, request: &PlanRequest) -> Result<EnrichedPlan, PlanError> {
        let habit = require_habit(&request.habit)?;

        let prompt = plan_prompt(habit, &request.answers)?;
        let output = self.llm.complete(&prompt, None).await?;
        let skeleton = PlanSkeleton::from_llm_output(&output)?;

        debug!(
            habit,
            title = %skeleton.plan_title,
            concurrency = self.enrich_concurrency,
            "Enriching plan skeleton"
        );

        // `buffered` yields in input order, so days stay sorted.
        let daily: Vec<EnrichedDayPlan> = stream::iter(skeleton.daily)
            .map(|day| self.enrich_day(day))
            .buffered(self.enrich_concurrency)
            .collect()
            .await;

        info!(habit, days = daily.len(), "Generated plan");
        Ok(EnrichedPlan {
            plan_title: skeleton.plan_title,
            daily,
        })
    }

    /// Verse first, then quote.
    async fn enrich_day(&self, day: DayPlanSkeleton) -> EnrichedDayPlan {
        let verse_reference = day.primary_verse().to_string();
        let verse_text = self.scripture.lookup(&verse_reference).await;
        let quote = self.quotes.search(&day.quote_query()).await;

        let (quote, quote_author) = match quote {
            Some(q) => (q.content, q.author),
            None => (String::new(), String::new()),
        };

        EnrichedDayPlan {
            day: day.day,
            micro_action: day.micro_action,
            reflection: day.reflection,
            verse_reference,
            verse_text,
            quote,
            quote_author,
        }
    }
}

fn require_habit(habit: &str) -> Result<&str, PlanError> {
    let trimmed = habit.trim();
    if trimmed.is_empty() {
        return Err(PlanError::InvalidRequest("habit must not be empty".to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::enrichment::{Quote, VERSE_ERROR};
    use crate::error::LlmError;
    use crate::plan::model::Answers;

    /// Stub LLM that returns a canned reply and records prompts.
    struct StubLlm {
        reply: Result<String, fn() -> LlmError>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubLlm {
        fn ok(reply: impl Into<String>) -> Self {
            Self {
                reply: Ok(reply.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing(err: fn() -> LlmError) -> Self {
            Self {
                reply: Err(err),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for StubLlm {
        fn model_name(&self) -> &str {
            "stub"
        }

        async fn complete(&self, prompt: &str, _model: Option<&str>) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    /// Scripture stub; later days answer faster to scramble completion order.
    #[derive(Default)]
    struct StubScripture {
        calls: AtomicUsize,
        fail: bool,
        delay: bool,
    }

    #[async_trait]
    impl ScriptureSource for StubScripture {
        async fn lookup(&self, reference: &str) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.delay {
                let chapter: u64 = reference
                    .split_whitespace()
                    .nth(1)
                    .and_then(|cv| cv.split(':').next())
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(0);
                tokio::time::sleep(Duration::from_millis(8 * (8 - chapter))).await;
            }
            if self.fail {
                VERSE_ERROR.to_string()
            } else {
                format!("Text of {reference}")
            }
        }
    }

    #[derive(Default)]
    struct StubQuotes {
        queries: Mutex<Vec<String>>,
        empty: bool,
    }

    #[async_trait]
    impl QuoteSource for StubQuotes {
        async fn search(&self, query: &str) -> Option<Quote> {
            self.queries.lock().unwrap().push(query.to_string());
            if self.empty {
                return None;
            }
            Some(Quote {
                content: format!("A quote about {query}"),
                author: "Anon".to_string(),
            })
        }
    }

    fn skeleton_reply() -> String {
        let daily: Vec<_> = [4, 2, 7, 1, 3, 6, 5]
            .iter()
            .map(|d| {
                json!({
                    "day": d,
                    "microAction": format!("Action {d}"),
                    "reflection": format!("Reflect {d}"),
                    "verseRefs": [format!("Proverbs {d}:1"), "Ignored 1:1"],
                    "quoteTags": ["focus", format!("t{d}")]
                })
            })
            .collect();
        json!({"planTitle": "Hydration Week", "daily": daily}).to_string()
    }

    fn questions_reply() -> String {
        json!({"questions": [
            {"id": "q1", "text": "How much water do you drink now?", "type": "single-choice", "options": ["<1L", "1-2L", ">2L"]},
            {"id": "q2", "text": "What stops you?", "type": "text"},
            {"id": "q3", "text": "Do you own a bottle?", "type": "single-choice", "options": ["Yes", "No"]},
            {"id": "q4", "text": "When do you forget most?", "type": "text"}
        ]})
        .to_string()
    }

    fn service(
        llm: Arc<StubLlm>,
        scripture: Arc<StubScripture>,
        quotes: Arc<StubQuotes>,
    ) -> PlanService {
        PlanService::new(llm, scripture, quotes)
    }

    fn request(habit: &str) -> PlanRequest {
        PlanRequest {
            habit: habit.to_string(),
            answers: Answers::new(),
        }
    }

    #[tokio::test]
    async fn questions_are_parsed_from_model_output() {
        let llm = Arc::new(StubLlm::ok(questions_reply()));
        let svc = service(llm.clone(), Default::default(), Default::default());

        let result = svc.questions("drink more water").await.unwrap();
        assert_eq!(result.questions.len(), 4);
        assert_eq!(result.questions[0].id, "q1");

        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("drink more water"));
    }

    #[tokio::test]
    async fn blank_habit_is_rejected_without_model_call() {
        let llm = Arc::new(StubLlm::ok(questions_reply()));
        let svc = service(llm.clone(), Default::default(), Default::default());

        let err = svc.questions("   ").await.unwrap_err();
        assert!(matches!(err, PlanError::InvalidRequest(_)));
        assert!(llm.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn plan_is_enriched_in_day_order() {
        let llm = Arc::new(StubLlm::ok(skeleton_reply()));
        let scripture = Arc::new(StubScripture::default());
        let quotes = Arc::new(StubQuotes::default());
        let svc = service(llm, scripture.clone(), quotes.clone());

        let plan = svc.plan(&request("drink more water")).await.unwrap();
        assert_eq!(plan.plan_title, "Hydration Week");
        assert_eq!(plan.daily.len(), 7);

        for (i, day) in plan.daily.iter().enumerate() {
            let n = i as u32 + 1;
            assert_eq!(day.day, n);
            assert_eq!(day.micro_action, format!("Action {n}"));
            assert_eq!(day.verse_reference, format!("Proverbs {n}:1"));
            assert_eq!(day.verse_text, format!("Text of Proverbs {n}:1"));
            assert_eq!(day.quote, format!("A quote about focus t{n}"));
            assert_eq!(day.quote_author, "Anon");
        }

        assert_eq!(scripture.calls.load(Ordering::SeqCst), 7);
        let queries = quotes.queries.lock().unwrap();
        let expected: Vec<String> = (1..=7).map(|n| format!("focus t{n}")).collect();
        assert_eq!(*queries, expected);
    }

    #[tokio::test]
    async fn concurrent_enrichment_preserves_order() {
        let llm = Arc::new(StubLlm::ok(skeleton_reply()));
        let scripture = Arc::new(StubScripture {
            delay: true,
            ..Default::default()
        });
        let svc = service(llm, scripture, Default::default()).with_enrich_concurrency(7);

        let plan = svc.plan(&request("drink more water")).await.unwrap();
        let days: Vec<u32> = plan.daily.iter().map(|d| d.day).collect();
        assert_eq!(days, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[tokio::test]
    async fn enrichment_failures_do_not_fail_the_plan() {
        let llm = Arc::new(StubLlm::ok(skeleton_reply()));
        let scripture = Arc::new(StubScripture {
            fail: true,
            ..Default::default()
        });
        let quotes = Arc::new(StubQuotes {
            empty: true,
            ..Default::default()
        });
        let svc = service(llm, scripture, quotes);

        let plan = svc.plan(&request("drink more water")).await.unwrap();
        assert_eq!(plan.daily.len(), 7);
        for day in &plan.daily {
            assert_eq!(day.verse_text, VERSE_ERROR);
            assert_eq!(day.quote, "");
            assert_eq!(day.quote_author, "");
        }
    }

    #[tokio::test]
    async fn missing_token_aborts_before_enrichment() {
        let llm = Arc::new(StubLlm::failing(|| LlmError::MissingToken));
        let scripture = Arc::new(StubScripture::default());
        let quotes = Arc::new(StubQuotes::default());
        let svc = service(llm, scripture.clone(), quotes.clone());

        let err = svc.plan(&request("drink more water")).await.unwrap_err();
        assert!(err.to_string().contains("token"));
        assert_eq!(scripture.calls.load(Ordering::SeqCst), 0);
        assert!(quotes.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_skeleton_aborts_before_enrichment() {
        let llm = Arc::new(StubLlm::ok("I'm sorry, I can't help with that."));
        let scripture = Arc::new(StubScripture::default());
        let svc = service(llm, scripture.clone(), Default::default());

        let err = svc.plan(&request("drink more water")).await.unwrap_err();
        assert!(matches!(err, PlanError::Parse(_)));
        assert_eq!(scripture.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn plan_prompt_carries_answers() {
        let llm = Arc::new(StubLlm::ok(skeleton_reply()));
        let svc = service(llm.clone(), Default::default(), Default::default());

        let mut answers = Answers::new();
        answers.insert("q2".to_string(), "I forget at work".to_string());
        svc.plan(&PlanRequest {
            habit: "drink more water".to_string(),
            answers,
        })
        .await
        .unwrap();

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].contains(r#"{"q2":"I forget at work"}"#));
    }

    #[test]
    fn from_config_wires_production_clients() {
        let mut config = AppConfig::default();
        config.server.enrich_concurrency = 3;

        let svc = PlanService::from_config(&config).unwrap();
        assert_eq!(svc.model_name(), "xai/grok-3");
        assert_eq!(svc.enrich_concurrency, 3);
    }
}
