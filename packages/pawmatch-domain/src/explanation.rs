use crate::pet::{Pet, Sex, known, truncate_chars};

const PERSONALITY_CHARS: usize = 140;

/// Builds a match explanation from a listing's own attributes.
///
/// Used when the reasoning model cannot explain a match. The text always names the pet and its
/// species, so listings with different attributes never share an explanation.
pub fn attribute_explanation(pet: &Pet) -> String {
	let mut descriptors = Vec::new();

	if let Some(size) = pet.size.descriptor() {
		descriptors.push(size.to_string());
	}
	if let Some(energy) = pet.energy_level.descriptor() {
		descriptors.push(energy.to_string());
	}

	let kind = match pet.known_breed() {
		Some(breed) if !breed.to_lowercase().contains(pet.species_name()) =>
			format!("{breed} {}", pet.species_name()),
		Some(breed) => breed.to_string(),
		None => pet.species_name().to_string(),
	};
	let kind = match pet.sex {
		Sex::Unknown => kind,
		sex => format!("{} {kind}", sex.as_str()),
	};
	let subject = if descriptors.is_empty() {
		kind
	} else {
		format!("{} {kind}", descriptors.join(", "))
	};
	let mut text = format!("{} is {} {subject}", pet.display_name(), article(&subject));
	let (positives, negatives) = compatibility_phrases(pet);

	if !positives.is_empty() {
		text.push_str(&format!(" who is {}", join_phrases(&positives)));
	}

	text.push('.');

	if !negatives.is_empty() {
		text.push_str(&format!(" Best in a home {}.", join_phrases(&negatives)));
	}

	let details = detail_phrases(pet);

	if !details.is_empty() {
		text.push_str(&format!(" Details: {}.", join_phrases_owned(&details)));
	}

	let personality = pet.personality_description.trim();

	if !personality.is_empty() {
		text.push_str(&format!(
			" Shelter notes: {}",
			ensure_period(&truncate_chars(first_sentence(personality), PERSONALITY_CHARS))
		));
	}

	if let Some(needs) = pet.special_needs.as_deref().and_then(known) {
		text.push_str(&format!(" Special needs: {}", ensure_period(&truncate_chars(needs, 80))));
	}

	match (pet.known_shelter(), pet.shelter_location.as_deref().and_then(known)) {
		(Some(shelter), Some(location)) =>
			text.push_str(&format!(" Listed by {shelter} in {location}.")),
		(Some(shelter), None) => text.push_str(&format!(" Listed by {shelter}.")),
		(None, Some(location)) => text.push_str(&format!(" Located in {location}.")),
		(None, None) => {},
	}

	text
}

fn compatibility_phrases(pet: &Pet) -> (Vec<&'static str>, Vec<&'static str>) {
	let mut positives = Vec::new();
	let mut negatives = Vec::new();

	for (flag, positive, negative) in [
		(pet.good_with_children, "good with children", "without young children"),
		(pet.good_with_dogs, "good with other dogs", "without other dogs"),
		(pet.good_with_cats, "good with cats", "without cats"),
		(pet.house_trained, "house-trained", "ready to work on house training"),
	] {
		match flag {
			Some(true) => positives.push(positive),
			Some(false) => negatives.push(negative),
			None => {},
		}
	}

	(positives, negatives)
}

fn detail_phrases(pet: &Pet) -> Vec<String> {
	let mut details = Vec::new();

	if let Some(age) = known(&pet.age_text) {
		details.push(format!("age {age}"));
	}
	if let Some(weight) = pet.weight_lbs.filter(|weight| weight.is_finite() && *weight > 0.0) {
		details.push(format!("about {weight} lbs"));
	}
	if let Some(color) = known(&pet.color) {
		details.push(format!("{} coat", color.to_lowercase()));
	}
	if pet.is_neutered == Some(true) {
		details.push(
			match pet.sex {
				Sex::Male => "neutered",
				Sex::Female => "spayed",
				Sex::Unknown => "spayed or neutered",
			}
			.to_string(),
		);
	}
	if let Some(fee) = pet.adoption_fee.filter(|fee| fee.is_finite() && *fee >= 0.0) {
		details.push(format!("adoption fee ${fee}"));
	}

	details
}

fn join_phrases_owned(phrases: &[String]) -> String {
	let borrowed: Vec<&str> = phrases.iter().map(String::as_str).collect();

	join_phrases(&borrowed)
}

fn join_phrases(phrases: &[&str]) -> String {
	match phrases {
		[] => String::new(),
		[only] => only.to_string(),
		[head @ .., last] => format!("{} and {last}", head.join(", ")),
	}
}

fn article(word: &str) -> &'static str {
	match word.chars().next().map(|c| c.to_ascii_lowercase()) {
		Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
		_ => "a",
	}
}

fn first_sentence(text: &str) -> &str {
	text.find(['.', '!', '?']).map(|end| &text[..=end]).unwrap_or(text)
}

fn ensure_period(text: &str) -> String {
	let trimmed = text.trim_end();

	if trimmed.ends_with(['.', '!', '?']) { trimmed.to_string() } else { format!("{trimmed}.") }
}

#[cfg(test)]
mod tests {
	use uuid::Uuid;

	use super::*;
	use crate::pet::{EnergyLevel, Size, Species};

	#[test]
	fn joins_phrases_naturally() {
		assert_eq!(join_phrases(&["a"]), "a");
		assert_eq!(join_phrases(&["a", "b", "c"]), "a, b and c");
	}

	#[test]
	fn picks_article_from_first_letter() {
		assert_eq!(article("extra-large dog"), "an");
		assert_eq!(article("small cat"), "a");
	}

	#[test]
	fn describes_size_energy_and_flags() {
		let mut pet = Pet::new(Uuid::nil(), "Pudding", Species::Dog);

		pet.breed = "Cavalier King Charles Spaniel".to_string();
		pet.size = Size::Small;
		pet.energy_level = EnergyLevel::Low;
		pet.good_with_children = Some(true);
		pet.house_trained = Some(true);
		pet.good_with_cats = Some(false);

		let text = attribute_explanation(&pet);

		assert!(text.starts_with(
			"Pudding is a small, low-energy Cavalier King Charles Spaniel dog who is good with \
			 children and house-trained."
		));
		assert!(text.contains("Best in a home without cats."));
	}

	#[test]
	fn names_sex_and_lists_known_details() {
		let mut pet = Pet::new(Uuid::nil(), "Max", Species::Dog);

		pet.sex = Sex::Female;
		pet.age_text = "11 years".to_string();
		pet.weight_lbs = Some(70.0);
		pet.is_neutered = Some(true);

		assert_eq!(
			attribute_explanation(&pet),
			"Max is a female dog. Details: age 11 years, about 70 lbs and spayed."
		);
	}
}
