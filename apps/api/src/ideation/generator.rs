//! Idea generation: orchestrates one generation run.
//!
//! Flow: resolve selection (explicit or auto) → validate knobs →
//!       build_request → messages → ChatCompletion::generate.
//!
//! Never touches session state. The caller records the result, and only on
//! success, so a failed run leaves the previous result untouched.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::ideation::briefing::BriefingInput;
use crate::ideation::request::build_request;
use crate::llm_client::{ChatCompletion, GenerationParams};
use crate::trends::models::TrendCatalog;
use crate::trends::scoring::auto_select;

pub const MAX_SELECTED_TRENDS: usize = 8;
pub const DEFAULT_TEMPERATURE: f32 = 0.4;
pub const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const DEFAULT_MAX_TOKENS: u32 = 1400;
pub const MAX_TOKENS_RANGE: RangeInclusive<u32> = 256..=4096;

const EMPTY_SELECTION: &str = "Select at least 1 trend.";

/// Request body for idea generation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateIdeasRequest {
    #[serde(default)]
    pub briefing: BriefingInput,
    /// Chosen trend names. Order is irrelevant; repeats collapse.
    #[serde(default)]
    pub selected: Vec<String>,
    /// Use the briefing-based pre-selection when `selected` is empty.
    #[serde(default)]
    pub auto_select: bool,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Result of one successful generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub text: String,
    pub model: String,
    pub selected: Vec<String>,
    pub trend_count: usize,
}

/// Final, de-duplicated selection for a request.
pub fn resolve_selection(
    request: &GenerateIdeasRequest,
    catalog: &TrendCatalog,
) -> Result<Vec<String>, AppError> {
    let auto_selected;
    let names: &[String] = if request.selected.is_empty() && request.auto_select {
        auto_selected = auto_select(&catalog.records, &request.briefing.query_text());
        &auto_selected
    } else {
        &request.selected
    };

    let mut seen: HashSet<&str> = HashSet::new();
    let mut selected: Vec<String> = Vec::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            continue;
        }
        if selected.len() == MAX_SELECTED_TRENDS {
            return Err(AppError::Validation(format!(
                "Select at most {MAX_SELECTED_TRENDS} trends."
            )));
        }
        selected.push(name.clone());
    }

    if selected.is_empty() {
        return Err(AppError::Validation(EMPTY_SELECTION.to_string()));
    }
    Ok(selected)
}

/// Model and sampling knobs, with defaults applied and ranges enforced.
pub fn resolve_params(
    request: &GenerateIdeasRequest,
    default_model: &str,
) -> Result<GenerationParams, AppError> {
    let model = request
        .model
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(default_model)
        .to_string();

    let temperature = request.temperature.unwrap_or(DEFAULT_TEMPERATURE);
    if !TEMPERATURE_RANGE.contains(&temperature) {
        return Err(AppError::Validation(format!(
            "temperature must be between {} and {}",
            TEMPERATURE_RANGE.start(),
            TEMPERATURE_RANGE.end()
        )));
    }

    let max_tokens = request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
    if !MAX_TOKENS_RANGE.contains(&max_tokens) {
        return Err(AppError::Validation(format!(
            "max_tokens must be between {} and {}",
            MAX_TOKENS_RANGE.start(),
            MAX_TOKENS_RANGE.end()
        )));
    }

    Ok(GenerationParams {
        model,
        temperature,
        max_tokens,
    })
}

/// Runs one generation against `catalog`.
pub async fn generate_ideas(
    llm: &dyn ChatCompletion,
    catalog: &TrendCatalog,
    default_model: &str,
    request: GenerateIdeasRequest,
) -> Result<GenerationOutcome, AppError> {
    let selected = resolve_selection(&request, catalog)?;
    let params = resolve_params(&request, default_model)?;

    let generation_request = build_request(&request.briefing, &selected, &catalog.records);
    if generation_request.trends.is_empty() {
        warn!("None of the {} selected trend(s) is in the catalog", selected.len());
        return Err(AppError::Validation(EMPTY_SELECTION.to_string()));
    }
    if generation_request.trends.len() < selected.len() {
        warn!(
            "{} selected trend(s) not present in the catalog",
            selected.len() - generation_request.trends.len()
        );
    }

    let messages = generation_request.messages()?;
    info!(
        "Generating ideas: model={}, trends={}, temperature={}, max_tokens={}",
        params.model,
        generation_request.trends.len(),
        params.temperature,
        params.max_tokens
    );

    let text = llm.generate(&messages, &params).await?;

    Ok(GenerationOutcome {
        text,
        model: params.model,
        selected,
        trend_count: generation_request.trends.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::fake::FakeChat;
    use crate::llm_client::{GenerationError, Role};
    use crate::trends::models::{DatasetSource, TrendRecord};
    use std::sync::Arc;

    fn catalog(names: &[&str]) -> TrendCatalog {
        let records: Vec<TrendRecord> = names
            .iter()
            .map(|n| TrendRecord {
                name: n.to_string(),
                description: format!("{} clínica", n.to_lowercase()),
                ..Default::default()
            })
            .collect();
        TrendCatalog {
            source: DatasetSource::Upload {
                file_name: "test.csv".to_string(),
            },
            content_hash: "hash".to_string(),
            records: Arc::from(records),
        }
    }

    fn request(selected: &[&str]) -> GenerateIdeasRequest {
        GenerateIdeasRequest {
            briefing: BriefingInput::seed(),
            selected: selected.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_selection_is_rejected_without_calling_llm() {
        let llm = FakeChat::ok("ideas");
        let result = generate_ideas(&llm, &catalog(&["A"]), "gpt-4o-mini", request(&[])).await;

        assert!(matches!(result, Err(AppError::Validation(msg)) if msg.contains("at least 1")));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_more_than_eight_distinct_trends_is_rejected() {
        let names: Vec<String> = (0..9).map(|i| format!("T{i}")).collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let llm = FakeChat::ok("ideas");

        let result = generate_ideas(&llm, &catalog(&name_refs), "m", request(&name_refs)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_selection_with_no_catalog_match_is_rejected() {
        let llm = FakeChat::ok("ideas");
        let result = generate_ideas(&llm, &catalog(&["A"]), "m", request(&["Nope", "Outra"])).await;

        assert!(matches!(result, Err(AppError::Validation(msg)) if msg.contains("at least 1")));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_partial_catalog_match_sends_only_known_trends() {
        let llm = FakeChat::ok("ideas");
        let outcome = generate_ideas(&llm, &catalog(&["A", "B"]), "m", request(&["B", "Nope"]))
            .await
            .unwrap();

        assert_eq!(outcome.trend_count, 1);
        assert_eq!(llm.call_count(), 1);
    }

    #[test]
    fn test_oversized_selection_stops_at_the_cap() {
        let names: Vec<String> = (0..100_000).map(|i| format!("T{i}")).collect();
        let req = GenerateIdeasRequest {
            selected: names,
            ..Default::default()
        };

        match resolve_selection(&req, &catalog(&["T0"])) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("at most 8")),
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_eight_distinct_names_with_repeats_are_accepted() {
        let mut names: Vec<&str> = vec!["A", "B", "C", "D", "E", "F", "G", "H"];
        names.extend(["A", "H", "C"]);
        let selected = resolve_selection(&request(&names), &catalog(&["A"])).unwrap();
        assert_eq!(selected, vec!["A", "B", "C", "D", "E", "F", "G", "H"]);
    }

    #[tokio::test]
    async fn test_repeated_names_count_once_toward_the_cap() {
        let llm = FakeChat::ok("ideas");
        let repeated = ["A"; 12];
        let outcome = generate_ideas(&llm, &catalog(&["A"]), "m", request(&repeated))
            .await
            .unwrap();
        assert_eq!(outcome.selected, vec!["A"]);
        assert_eq!(outcome.trend_count, 1);
    }

    #[tokio::test]
    async fn test_success_sends_two_messages_with_defaults() {
        let llm = FakeChat::ok("# 10 ideias");
        let outcome = generate_ideas(&llm, &catalog(&["A", "B", "C"]), "gpt-4o-mini", request(&["C", "A"]))
            .await
            .unwrap();

        assert_eq!(outcome.text, "# 10 ideias");
        assert_eq!(outcome.model, "gpt-4o-mini");
        assert_eq!(outcome.trend_count, 2);

        let calls = llm.calls();
        let (messages, params) = &calls[0];
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[1].content.contains("\"trend_nome\":\"A\""));
        assert!(messages[1].content.find("\"A\"") < messages[1].content.find("\"C\""));
        assert_eq!(params.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(params.max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[tokio::test]
    async fn test_auto_select_fills_empty_selection() {
        let llm = FakeChat::ok("ideas");
        let mut req = request(&[]);
        req.auto_select = true;

        let outcome = generate_ideas(&llm, &catalog(&["A", "B"]), "m", req).await.unwrap();
        assert_eq!(outcome.selected, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_explicit_selection_wins_over_auto_select() {
        let llm = FakeChat::ok("ideas");
        let mut req = request(&["B"]);
        req.auto_select = true;

        let outcome = generate_ideas(&llm, &catalog(&["A", "B"]), "m", req).await.unwrap();
        assert_eq!(outcome.selected, vec!["B"]);
    }

    #[tokio::test]
    async fn test_remote_failure_propagates() {
        let llm = FakeChat::failing(500);
        let result = generate_ideas(&llm, &catalog(&["A"]), "m", request(&["A"])).await;
        assert!(matches!(
            result,
            Err(AppError::Generation(GenerationError::RemoteService {
                status: Some(500),
                ..
            }))
        ));
    }

    #[test]
    fn test_params_out_of_range_are_rejected() {
        let mut req = request(&["A"]);
        req.temperature = Some(1.5);
        assert!(resolve_params(&req, "m").is_err());

        req.temperature = Some(f32::NAN);
        assert!(resolve_params(&req, "m").is_err());

        let mut req = request(&["A"]);
        req.max_tokens = Some(100);
        assert!(resolve_params(&req, "m").is_err());

        req.max_tokens = Some(5000);
        assert!(resolve_params(&req, "m").is_err());
    }

    #[test]
    fn test_params_bounds_are_inclusive() {
        let mut req = request(&["A"]);
        req.temperature = Some(0.0);
        req.max_tokens = Some(4096);
        let params = resolve_params(&req, "m").unwrap();
        assert_eq!(params.temperature, 0.0);
        assert_eq!(params.max_tokens, 4096);
    }

    #[test]
    fn test_blank_model_falls_back_to_default() {
        let mut req = request(&["A"]);
        req.model = Some("  ".to_string());
        assert_eq!(resolve_params(&req, "gpt-4o-mini").unwrap().model, "gpt-4o-mini");

        req.model = Some("gpt-4o".to_string());
        assert_eq!(resolve_params(&req, "gpt-4o-mini").unwrap().model, "gpt-4o");
    }
}
