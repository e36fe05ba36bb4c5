use serde::{Deserialize, Serialize};

/// Client briefing form. Every field is free text and optional.
///
/// Serialized with the Portuguese keys the prompt uses; the English field
/// names are accepted as aliases on input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BriefingInput {
    #[serde(rename = "segmento", alias = "segment")]
    pub segment: String,
    #[serde(rename = "metas", alias = "goals")]
    pub goals: String,
    #[serde(rename = "restricoes", alias = "constraints")]
    pub constraints: String,
    #[serde(rename = "publicos", alias = "audiences")]
    pub audiences: String,
    #[serde(rename = "canais", alias = "channels")]
    pub channels: String,
    #[serde(rename = "tom", alias = "tone")]
    pub tone: String,
    #[serde(rename = "briefing_livre", alias = "free_text")]
    pub free_text: String,
}

impl BriefingInput {
    /// Values the form starts with.
    pub fn seed() -> Self {
        Self {
            segment: "Saúde e bem-estar".to_string(),
            goals: "aumentar captação; diferenciação; retenção".to_string(),
            constraints: "baixo CAPEX; execução < 90 dias".to_string(),
            audiences: "adultos 25–55".to_string(),
            channels: "clínica física; Instagram; WhatsApp".to_string(),
            tone: "humano, prático".to_string(),
            free_text: String::new(),
        }
    }

    /// All fields joined by single spaces, in form order. Scoring input.
    pub fn query_text(&self) -> String {
        [
            self.segment.as_str(),
            self.goals.as_str(),
            self.constraints.as_str(),
            self.audiences.as_str(),
            self.channels.as_str(),
            self.tone.as_str(),
            self.free_text.as_str(),
        ]
        .join(" ")
    }
}
