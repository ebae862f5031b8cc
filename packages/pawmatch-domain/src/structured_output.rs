//! Tolerant recovery of a JSON object or array from reasoning-model text.
//!
//! Small local models wrap valid JSON in prose or Markdown fences even when asked for JSON only.
//! Recovery tries, in order: the trimmed text, the text with fence markers removed, and the first
//! embedded object, then array, found by progressively greedier patterns.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

const EXCERPT_CHARS: usize = 160;

static EMBEDDED_JSON_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
	[r"(?s)\{.*?\}", r"(?s)\{.*\}", r"(?s)\[.*?\]", r"(?s)\[.*\]"]
		.into_iter()
		.filter_map(|pattern| Regex::new(pattern).ok())
		.collect()
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Model output contains no recoverable JSON: {excerpt:?}")]
pub struct MalformedOutput {
	pub excerpt: String,
}

pub fn recover_json(text: &str) -> Result<Value, MalformedOutput> {
	let trimmed = text.trim();

	if let Some(value) = parse_structured(trimmed) {
		return Ok(value);
	}

	let unfenced = strip_code_fences(trimmed);

	if unfenced != trimmed
		&& let Some(value) = parse_structured(unfenced.trim())
	{
		return Ok(value);
	}

	for pattern in EMBEDDED_JSON_PATTERNS.iter() {
		if let Some(found) = pattern.find(&unfenced)
			&& let Some(value) = parse_structured(found.as_str())
		{
			return Ok(value);
		}
	}

	Err(MalformedOutput { excerpt: excerpt(trimmed) })
}

fn parse_structured(text: &str) -> Option<Value> {
	if text.is_empty() {
		return None;
	}

	serde_json::from_str::<Value>(text).ok().filter(|value| value.is_object() || value.is_array())
}

fn strip_code_fences(text: &str) -> String {
	let mut kept = Vec::new();

	for line in text.lines() {
		let trimmed = line.trim();
		let inner = if let Some(rest) = trimmed.strip_prefix("```") {
			// An opening fence may carry a language tag such as `json`.
			let rest = if rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
				rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric())
			} else {
				rest
			};

			rest.strip_suffix("```").unwrap_or(rest)
		} else if let Some(rest) = trimmed.strip_suffix("```") {
			rest
		} else {
			line
		};

		if !inner.trim().is_empty() {
			kept.push(inner);
		}
	}

	kept.join("\n")
}

fn excerpt(text: &str) -> String {
	text.chars().take(EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn strips_language_tagged_fence() {
		let stripped = strip_code_fences("```json\n{\"scores\": [0.2]}\n```");

		assert_eq!(stripped, "{\"scores\": [0.2]}");
	}

	#[test]
	fn strips_single_line_fence() {
		assert_eq!(strip_code_fences("```[0.1, 0.9]```"), "[0.1, 0.9]");
	}

	#[test]
	fn scalar_json_is_not_structured() {
		assert!(parse_structured("0.7").is_none());
		assert!(parse_structured("\"text\"").is_none());
	}
}
