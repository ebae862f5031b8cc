use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
	Dog,
	Cat,
	Rabbit,
	Bird,
	SmallAnimal,
	Reptile,
	Other,
}
impl Species {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Dog => "dog",
			Self::Cat => "cat",
			Self::Rabbit => "rabbit",
			Self::Bird => "bird",
			Self::SmallAnimal => "small_animal",
			Self::Reptile => "reptile",
			Self::Other => "other",
		}
	}

	pub fn from_label(label: &str) -> Self {
		match label.trim().to_ascii_lowercase().as_str() {
			"dog" => Self::Dog,
			"cat" => Self::Cat,
			"rabbit" => Self::Rabbit,
			"bird" => Self::Bird,
			"small_animal" => Self::SmallAnimal,
			"reptile" => Self::Reptile,
			_ => Self::Other,
		}
	}

	fn display_name(self) -> &'static str {
		match self {
			Self::SmallAnimal => "small animal",
			Self::Other => "companion animal",
			other => other.as_str(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
	Male,
	Female,
	Unknown,
}
impl Sex {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Male => "male",
			Self::Female => "female",
			Self::Unknown => "unknown",
		}
	}

	pub fn from_label(label: &str) -> Self {
		match label.trim().to_ascii_lowercase().as_str() {
			"male" => Self::Male,
			"female" => Self::Female,
			_ => Self::Unknown,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Size {
	Small,
	Medium,
	Large,
	#[serde(rename = "xlarge")]
	ExtraLarge,
	Unknown,
}
impl Size {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Small => "small",
			Self::Medium => "medium",
			Self::Large => "large",
			Self::ExtraLarge => "xlarge",
			Self::Unknown => "unknown",
		}
	}

	pub fn from_label(label: &str) -> Self {
		match label.trim().to_ascii_lowercase().as_str() {
			"small" => Self::Small,
			"medium" => Self::Medium,
			"large" => Self::Large,
			"xlarge" | "extra_large" => Self::ExtraLarge,
			_ => Self::Unknown,
		}
	}

	pub(crate) fn descriptor(self) -> Option<&'static str> {
		match self {
			Self::Small => Some("small"),
			Self::Medium => Some("medium-sized"),
			Self::Large => Some("large"),
			Self::ExtraLarge => Some("extra-large"),
			Self::Unknown => None,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyLevel {
	Low,
	Medium,
	High,
	Unknown,
}
impl EnergyLevel {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Low => "low",
			Self::Medium => "medium",
			Self::High => "high",
			Self::Unknown => "unknown",
		}
	}

	pub fn from_label(label: &str) -> Self {
		match label.trim().to_ascii_lowercase().as_str() {
			"low" => Self::Low,
			"medium" => Self::Medium,
			"high" => Self::High,
			_ => Self::Unknown,
		}
	}

	pub(crate) fn descriptor(self) -> Option<&'static str> {
		match self {
			Self::Low => Some("low-energy"),
			Self::Medium => Some("moderately active"),
			Self::High => Some("high-energy"),
			Self::Unknown => None,
		}
	}
}

/// A shelter listing as stored after extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
	pub id: Uuid,
	pub external_id: Option<String>,
	pub name: String,
	pub species: Species,
	pub breed: String,
	pub age_text: String,
	pub age_months: Option<i32>,
	pub sex: Sex,
	pub size: Size,
	pub weight_lbs: Option<f64>,
	pub color: String,
	pub energy_level: EnergyLevel,
	pub good_with_dogs: Option<bool>,
	pub good_with_cats: Option<bool>,
	pub good_with_children: Option<bool>,
	pub house_trained: Option<bool>,
	pub special_needs: Option<String>,
	pub personality_description: String,
	pub adoption_fee: Option<f64>,
	pub is_neutered: Option<bool>,
	pub shelter_name: String,
	pub shelter_location: Option<String>,
	pub shelter_contact: Option<String>,
	pub listing_url: String,
	pub image_urls: Vec<String>,
}
impl Pet {
	/// A listing with every optional attribute unknown.
	pub fn new(id: Uuid, name: impl Into<String>, species: Species) -> Self {
		Self {
			id,
			external_id: None,
			name: name.into(),
			species,
			breed: UNKNOWN.to_string(),
			age_text: UNKNOWN.to_string(),
			age_months: None,
			sex: Sex::Unknown,
			size: Size::Unknown,
			weight_lbs: None,
			color: UNKNOWN.to_string(),
			energy_level: EnergyLevel::Unknown,
			good_with_dogs: None,
			good_with_cats: None,
			good_with_children: None,
			house_trained: None,
			special_needs: None,
			personality_description: String::new(),
			adoption_fee: None,
			is_neutered: None,
			shelter_name: UNKNOWN.to_string(),
			shelter_location: None,
			shelter_contact: None,
			listing_url: String::new(),
			image_urls: Vec::new(),
		}
	}

	pub fn display_name(&self) -> &str {
		let trimmed = self.name.trim();

		if trimmed.is_empty() { "This pet" } else { trimmed }
	}

	pub fn species_name(&self) -> &'static str {
		self.species.display_name()
	}

	pub fn known_breed(&self) -> Option<&str> {
		known(&self.breed)
	}

	pub fn known_shelter(&self) -> Option<&str> {
		known(&self.shelter_name)
	}

	/// Compact one-line profile used in batch scoring prompts.
	pub fn summary_line(&self, position: usize, max_personality_chars: usize) -> String {
		let mut line = format!(
			"{position}. {} ({}, {}, {}, {})",
			self.display_name(),
			self.species.as_str(),
			self.breed.trim(),
			self.age_text.trim(),
			self.sex.as_str(),
		);

		line.push_str(&format!(
			" size {}, energy {}",
			self.size.as_str(),
			self.energy_level.as_str()
		));

		for (label, flag) in self.compatibility_flags() {
			line.push_str(&format!("; {label}: {}", yes_no(flag)));
		}

		if let Some(needs) = self.special_needs.as_deref().and_then(known) {
			line.push_str(&format!("; special needs: {}", truncate_chars(needs, 80)));
		}

		let personality = self.personality_description.trim();

		if !personality.is_empty() && max_personality_chars > 0 {
			line.push_str(&format!("; {}", truncate_chars(personality, max_personality_chars)));
		}

		line
	}

	/// Multi-line profile used when a single pet is explained.
	pub fn profile_text(&self) -> String {
		let mut lines = vec![format!("Name: {}", self.display_name())];

		lines.push(format!("Species: {}, Breed: {}", self.species.as_str(), self.breed.trim()));
		lines.push(format!(
			"Age: {}, Sex: {}, Size: {}",
			self.age_text.trim(),
			self.sex.as_str(),
			self.size.as_str()
		));

		if let Some(weight) = self.weight_lbs {
			lines.push(format!("Weight: {weight} lbs"));
		}

		lines.push(format!("Energy level: {}", self.energy_level.as_str()));

		for (label, flag) in self.compatibility_flags() {
			lines.push(format!("{}: {}", capitalize(label), yes_no(flag)));
		}

		if let Some(needs) = self.special_needs.as_deref().and_then(known) {
			lines.push(format!("Special needs: {needs}"));
		}
		if !self.personality_description.trim().is_empty() {
			lines.push(format!("Personality: {}", self.personality_description.trim()));
		}
		if let Some(fee) = self.adoption_fee {
			lines.push(format!("Adoption fee: ${fee}"));
		}
		if let Some(shelter) = self.known_shelter() {
			lines.push(format!("Shelter: {shelter}"));
		}
		if let Some(location) = self.shelter_location.as_deref().and_then(known) {
			lines.push(format!("Location: {location}"));
		}

		lines.join("\n")
	}

	/// Case-insensitive substring match against the shelter location. Listings without a
	/// location never match.
	pub fn location_matches(&self, locality: &str) -> bool {
		let needle = locality.trim().to_lowercase();

		if needle.is_empty() {
			return true;
		}

		self.shelter_location
			.as_deref()
			.map(|location| location.to_lowercase().contains(&needle))
			.unwrap_or(false)
	}

	pub(crate) fn compatibility_flags(&self) -> Vec<(&'static str, bool)> {
		[
			("good with dogs", self.good_with_dogs),
			("good with cats", self.good_with_cats),
			("good with children", self.good_with_children),
			("house trained", self.house_trained),
		]
		.into_iter()
		.filter_map(|(label, flag)| flag.map(|value| (label, value)))
		.collect()
	}
}

pub(crate) const UNKNOWN: &str = "Unknown";

pub(crate) fn known(value: &str) -> Option<&str> {
	let trimmed = value.trim();

	if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNKNOWN) { None } else { Some(trimmed) }
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
	if text.chars().count() <= max_chars {
		return text.to_string();
	}

	let mut out: String = text.chars().take(max_chars).collect();

	out.truncate(out.trim_end().len());
	out.push_str("...");

	out
}

fn yes_no(flag: bool) -> &'static str {
	if flag { "yes" } else { "no" }
}

fn capitalize(text: &str) -> String {
	let mut chars = text.chars();

	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}
