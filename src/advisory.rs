// src/advisory.rs
//
// Text-in/text-out calls to the hosted model. Failures never reach the
// caller as errors: they degrade to fixed advisory strings.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::AdvisoryConfig;
use crate::errors::ApiError;
use crate::models::UnitId;

pub const NOT_CONFIGURED: &str = "API key not configured.";
pub const ANALYSIS_UNAVAILABLE: &str =
    "Gagal menghubungkan ke layanan AI. Silakan coba lagi nanti.";
pub const ANSWER_UNAVAILABLE: &str = "Terjadi kesalahan saat memproses pertanyaan.";
pub const EMPTY_ANALYSIS: &str = "Tidak ada analisa yang dihasilkan.";
pub const EMPTY_ANSWER: &str = "Maaf, saya tidak mengerti pertanyaan tersebut.";

const SOP_CONTEXT: &str = "\
You are the standard-operating-procedure expert for a power plant. Answer the \
operator briefly and firmly, always putting occupational safety first. Reply in \
formal but plain Indonesian.

General context:
- If a machine overheats, shut it down immediately and report to the supervisor.
- Personal protective equipment is mandatory in red zones.
- Machine start-up: check electrical -> check hydraulics -> switch on main panel -> warm up for 5 minutes.";

pub struct AdvisoryClient {
    http: reqwest::Client,
    cfg: AdvisoryConfig,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    fn text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
            .unwrap_or_default()
    }
}

fn shift_note_prompt(notes: &str, unit: UnitId) -> String {
    format!(
        "You assist operators of an industrial power plant.\n\
         Analyse the following shift report note for {unit}.\n\n\
         Note: \"{notes}\"\n\n\
         Tasks:\n\
         1. Identify any safety or operational risk.\n\
         2. Give a short summary (at most 2 sentences).\n\
         3. If there is a problem, suggest a simple corrective action.\n\n\
         Answer in Indonesian, formatted as simple HTML (only <b>, <ul>, <li>, <p>)."
    )
}

impl AdvisoryClient {
    pub fn new(cfg: AdvisoryConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self { http, cfg })
    }

    pub fn is_configured(&self) -> bool {
        self.cfg.api_key.is_some()
    }

    /// One `generateContent` round trip.
    pub async fn complete(&self, prompt: &str, system: Option<&str>) -> Result<String, ApiError> {
        let key = self
            .cfg
            .api_key
            .as_deref()
            .ok_or_else(|| ApiError::ServiceUnavailable("no API key".into()))?;

        let mut body = json!({
            "contents": [{ "role": "user", "parts": [Part { text: prompt }] }],
        });
        if let Some(system) = system {
            body["systemInstruction"] = json!({ "parts": [Part { text: system }] });
        }

        let url = format!("{}/models/{}:generateContent", self.cfg.base_url, self.cfg.model);
        let resp: GenerateResponse = self
            .http
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::ServiceUnavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| ApiError::ServiceUnavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| ApiError::ServiceUnavailable(format!("bad response body: {e}")))?;
        Ok(resp.text())
    }

    async fn complete_or(
        &self,
        prompt: &str,
        system: Option<&str>,
        empty: &str,
        unavailable: &str,
    ) -> String {
        if !self.is_configured() {
            return NOT_CONFIGURED.to_string();
        }
        match self.complete(prompt, system).await {
            Ok(text) if text.trim().is_empty() => empty.to_string(),
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, model = %self.cfg.model, "advisory call failed");
                unavailable.to_string()
            }
        }
    }

    /// Risk summary for a shift note written about `unit`.
    pub async fn analyze_shift_note(&self, notes: &str, unit: UnitId) -> String {
        let prompt = shift_note_prompt(notes, unit);
        self.complete_or(&prompt, None, EMPTY_ANALYSIS, ANALYSIS_UNAVAILABLE)
            .await
    }

    /// Free-text question answered against the fixed safety-procedure context.
    pub async fn ask_sop(&self, question: &str) -> String {
        self.complete_or(question, Some(SOP_CONTEXT), EMPTY_ANSWER, ANSWER_UNAVAILABLE)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_text_joins_first_candidate_parts() {
        let resp: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "<p>Aman" }, { "text": "</p>" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(resp.text(), "<p>Aman</p>");

        let empty: GenerateResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn prompt_names_the_unit_and_quotes_the_note() {
        let p = shift_note_prompt("oil pressure dropping", UnitId::Unit3);
        assert!(p.contains("Unit 3"));
        assert!(p.contains("\"oil pressure dropping\""));
    }

    #[tokio::test]
    async fn unconfigured_client_says_so() {
        let client = AdvisoryClient::new(AdvisoryConfig::default()).unwrap();
        assert_eq!(client.ask_sop("apa itu APD?").await, NOT_CONFIGURED);
    }

    #[tokio::test]
    async fn unreachable_service_degrades_to_apology() {
        let client = AdvisoryClient::new(AdvisoryConfig {
            api_key: Some("k".into()),
            base_url: "http://127.0.0.1:9".into(),
            timeout_secs: 2,
            ..AdvisoryConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.analyze_shift_note("normal", UnitId::Unit1).await,
            ANALYSIS_UNAVAILABLE
        );
    }
}
