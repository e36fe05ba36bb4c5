//! Brief assembly: turns a briefing and a trend selection into the
//! two-message prompt sent to the chat-completion API.

use std::collections::HashSet;

use serde::Serialize;

use crate::errors::AppError;
use crate::ideation::briefing::BriefingInput;
use crate::ideation::prompts::{CLIENT_LABEL, IDEATION_SYSTEM, TRENDS_LABEL};
use crate::llm_client::ChatMessage;
use crate::trends::models::TrendRecord;

/// Everything the model sees about the client. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub briefing: BriefingInput,
    pub trends: Vec<TrendRecord>,
}

/// Keeps the records whose name is selected, in dataset order.
///
/// Selection order and repeated names do not matter; names missing from the
/// dataset are ignored.
pub fn build_request(
    briefing: &BriefingInput,
    selected_names: &[String],
    all_records: &[TrendRecord],
) -> GenerationRequest {
    let selected: HashSet<&str> = selected_names.iter().map(String::as_str).collect();

    GenerationRequest {
        briefing: briefing.clone(),
        trends: all_records
            .iter()
            .filter(|r| selected.contains(r.name.as_str()))
            .cloned()
            .collect(),
    }
}

impl GenerationRequest {
    /// The user message: briefing JSON and selected-trends JSON.
    pub fn user_prompt(&self) -> Result<String, AppError> {
        let briefing_json = serde_json::to_string(&self.briefing)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize briefing: {e}")))?;
        let trends_json = serde_json::to_string(&self.trends)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize trends: {e}")))?;

        Ok(format!(
            "{CLIENT_LABEL} {briefing_json}\n{TRENDS_LABEL} {trends_json}"
        ))
    }

    /// `[system, user]`, in that order.
    pub fn messages(&self) -> Result<Vec<ChatMessage>, AppError> {
        Ok(vec![
            ChatMessage::system(IDEATION_SYSTEM),
            ChatMessage::user(self.user_prompt()?),
        ])
    }
}
