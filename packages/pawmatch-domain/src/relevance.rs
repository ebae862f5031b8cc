use serde_json::Value;

/// Records that a model returned a different number of scores than it was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountAdjustment {
	pub expected: usize,
	pub received: usize,
}

/// A validated score array, one entry per candidate in the batch, each in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchScores {
	pub scores: Vec<f32>,
	pub adjustment: Option<CountAdjustment>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoreShapeError {
	#[error("Score payload is neither a scores object nor an array.")]
	NotAnArray,
	#[error("Score payload contains no scores.")]
	Empty,
	#[error("Score at position {position} is not a finite number.")]
	NotANumber { position: usize },
}

pub fn clamp_unit(value: f32) -> f32 {
	if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Validates a recovered JSON value as batch scores.
///
/// Accepts `{"scores": [...]}` or a bare array. Entries may be numbers, numeric strings, or
/// objects carrying a numeric `score`. A short array is padded with `neutral` and a long one is
/// truncated; the returned `adjustment` reports either case.
pub fn parse_batch_scores(
	value: &Value,
	expected: usize,
	neutral: f32,
) -> Result<BatchScores, ScoreShapeError> {
	let items = match value {
		Value::Array(items) => items,
		Value::Object(map) => map
			.get("scores")
			.and_then(Value::as_array)
			.ok_or(ScoreShapeError::NotAnArray)?,
		_ => return Err(ScoreShapeError::NotAnArray),
	};

	if items.is_empty() {
		return Err(ScoreShapeError::Empty);
	}

	let mut scores = Vec::with_capacity(expected);

	for (position, item) in items.iter().enumerate() {
		let score = score_value(item).ok_or(ScoreShapeError::NotANumber { position })?;

		scores.push(clamp_unit(score));
	}

	let received = scores.len();
	let adjustment = (received != expected).then_some(CountAdjustment { expected, received });

	scores.resize(expected, clamp_unit(neutral));

	Ok(BatchScores { scores, adjustment })
}

fn score_value(item: &Value) -> Option<f32> {
	let raw = match item {
		Value::Number(number) => number.as_f64(),
		Value::String(text) => text.trim().parse::<f64>().ok(),
		Value::Object(map) => map.get("score").and_then(score_value).map(f64::from),
		_ => None,
	}?;

	raw.is_finite().then_some(raw as f32)
}
