//! Chat-completion client that turns retrieved passages into a cited answer.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

const SYSTEM_PROMPT: &str = "You answer questions about the organization's internal documents. \
Use only the numbered sources provided. Cite every claim with the source number in square \
brackets, for example [2]. If the sources do not contain the answer, say so plainly.";

/// One numbered source handed to the model.
#[derive(Clone, Debug, Serialize)]
pub struct EvidenceBlock {
	pub name: Option<String>,
	pub year: Option<String>,
	pub link: Option<String>,
	pub content: String,
}

pub async fn generate(
	cfg: &docqa_config::GenerationProviderConfig,
	question: &str,
	evidence: &[EvidenceBlock],
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let mut body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": build_messages(question, evidence),
	});

	if let Some(max_tokens) = cfg.max_tokens {
		body["max_tokens"] = Value::from(max_tokens);
	}

	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_completion(json)
}

pub fn build_messages(question: &str, evidence: &[EvidenceBlock]) -> Vec<Value> {
	let sources: String = evidence
		.iter()
		.enumerate()
		.map(|(idx, block)| source_entry(idx + 1, block))
		.collect();

	vec![
		serde_json::json!({ "role": "system", "content": SYSTEM_PROMPT }),
		serde_json::json!({
			"role": "user",
			"content": format!("SOURCES:\n\n{}QUESTION: {question}", sources),
		}),
	]
}

fn source_entry(number: usize, block: &EvidenceBlock) -> String {
	let mut entry = format!("[{number}] {}", block.name.as_deref().unwrap_or("Untitled"));

	if let Some(year) = block.year.as_deref() {
		entry.push_str(&format!(" ({year})"));
	}
	if let Some(link) = block.link.as_deref() {
		entry.push_str(&format!(" <{link}>"));
	}

	entry.push('\n');
	entry.push_str(block.content.trim());
	entry.push_str("\n\n");

	entry
}

fn parse_completion(json: Value) -> Result<String> {
	json.get("choices")
		.and_then(Value::as_array)
		.and_then(|choices| choices.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|message| message.get("content"))
		.and_then(Value::as_str)
		.map(|content| content.trim().to_string())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Completion response is missing message content.".to_string(),
		})
}
