use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// Sends one system/user exchange to a chat endpoint in JSON mode and returns the raw reply text.
///
/// The reply is not parsed as JSON here; small models often wrap it in prose, so callers recover
/// the payload themselves.
pub async fn invoke(
	cfg: &pawmatch_config::LlmProviderConfig,
	system: &str,
	user: &str,
	timeout: Duration,
) -> Result<String> {
	let client = Client::builder().timeout(timeout).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = chat_body(cfg, system, user);
	let res = client
		.post(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_chat_content(&json)
}

/// Ollama takes `format` and `options`; OpenAI-compatible endpoints take `response_format` and a
/// top-level `temperature` and may reject unknown fields.
fn chat_body(cfg: &pawmatch_config::LlmProviderConfig, system: &str, user: &str) -> Value {
	let messages = serde_json::json!([
		{ "role": "system", "content": system },
		{ "role": "user", "content": user },
	]);

	if cfg.provider_id.eq_ignore_ascii_case("ollama") {
		serde_json::json!({
			"model": cfg.model,
			"messages": messages,
			"format": "json",
			"stream": false,
			"options": { "temperature": cfg.temperature },
		})
	} else {
		serde_json::json!({
			"model": cfg.model,
			"messages": messages,
			"response_format": { "type": "json_object" },
			"stream": false,
			"temperature": cfg.temperature,
		})
	}
}

/// Reads `message.content` (Ollama) or `choices[0].message.content` (OpenAI-compatible).
fn parse_chat_content(json: &Value) -> Result<String> {
	let content = json
		.get("message")
		.and_then(|msg| msg.get("content"))
		.or_else(|| {
			json.get("choices")
				.and_then(|v| v.as_array())
				.and_then(|arr| arr.first())
				.and_then(|choice| choice.get("message"))
				.and_then(|msg| msg.get("content"))
		})
		.and_then(|c| c.as_str());

	content.map(str::to_string).ok_or_else(|| Error::InvalidResponse {
		message: "Chat response is missing message content.".to_string(),
	})
}

#[cfg(test)]
mod tests {
	use serde_json::Map;

	use super::*;

	fn reasoning_config(provider_id: &str) -> pawmatch_config::LlmProviderConfig {
		pawmatch_config::LlmProviderConfig {
			provider_id: provider_id.to_string(),
			api_base: "http://127.0.0.1:11434".to_string(),
			api_key: String::new(),
			path: "/api/chat".to_string(),
			model: "llama3.2".to_string(),
			temperature: 0.1,
			timeout_ms: 1_000,
			default_headers: Map::new(),
		}
	}

	#[test]
	fn ollama_body_uses_format_and_options() {
		let body = chat_body(&reasoning_config("ollama"), "system", "user");

		assert_eq!(body["format"], "json");
		assert!(body["options"]["temperature"].is_number());
		assert!(body.get("temperature").is_none());
		assert!(body.get("response_format").is_none());
		assert_eq!(body["messages"][1]["content"], "user");
	}

	#[test]
	fn openai_body_omits_ollama_fields() {
		let body = chat_body(&reasoning_config("openai"), "system", "user");

		assert!(body.get("format").is_none());
		assert!(body.get("options").is_none());
		assert_eq!(body["response_format"]["type"], "json_object");
		assert!(body["temperature"].is_number());
		assert_eq!(body["messages"][0]["role"], "system");
	}

	#[test]
	fn parses_ollama_message_content() {
		let json = serde_json::json!({
			"model": "llama3.2",
			"message": { "role": "assistant", "content": "{\"scores\": [0.4]}" },
			"done": true
		});

		assert_eq!(parse_chat_content(&json).expect("parse failed"), "{\"scores\": [0.4]}");
	}

	#[test]
	fn parses_choice_content() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "content": "{\"explanation\": \"Calm.\"}" } }
			]
		});

		assert_eq!(parse_chat_content(&json).expect("parse failed"), "{\"explanation\": \"Calm.\"}");
	}

	#[test]
	fn missing_content_is_invalid_response() {
		let json = serde_json::json!({ "done": true });

		assert!(matches!(parse_chat_content(&json), Err(Error::InvalidResponse { .. })));
	}
}
