use pawmatch_domain::{
	Candidate, EnergyLevel, Pet, Sex, Size, Species, relevance::clamp_unit,
};
use pawmatch_storage::{db::Db, models::PetRow, queries};

use crate::{BoxFuture, CandidateRetriever, Result};

impl CandidateRetriever for Db {
	fn vector_search<'a>(
		&'a self,
		query_vec: &'a [f32],
		top_k: u32,
		species: Option<Species>,
	) -> BoxFuture<'a, Result<Vec<Candidate>>> {
		Box::pin(async move {
			let rows =
				queries::vector_search(self, query_vec, top_k, species.map(Species::as_str)).await?;

			Ok(rows.into_iter().map(candidate_from_row).collect())
		})
	}
}

pub fn candidate_from_row(row: PetRow) -> Candidate {
	let similarity = clamp_unit(row.similarity);
	let mut pet = Pet::new(row.id, row.name, Species::from_label(&row.species));

	pet.external_id = row.external_id;
	pet.age_months = row.age_months;
	pet.weight_lbs = row.weight_lbs;
	pet.sex = row.sex.as_deref().map(Sex::from_label).unwrap_or(Sex::Unknown);
	pet.size = row.size.as_deref().map(Size::from_label).unwrap_or(Size::Unknown);
	pet.energy_level =
		row.energy_level.as_deref().map(EnergyLevel::from_label).unwrap_or(EnergyLevel::Unknown);
	pet.good_with_dogs = row.good_with_dogs;
	pet.good_with_cats = row.good_with_cats;
	pet.good_with_children = row.good_with_children;
	pet.house_trained = row.house_trained;
	pet.special_needs = row.special_needs;
	pet.adoption_fee = row.adoption_fee;
	pet.is_neutered = row.is_neutered;
	pet.shelter_location = row.shelter_location;
	pet.shelter_contact = row.shelter_contact;
	pet.image_urls = row.image_urls.unwrap_or_default();

	if let Some(breed) = row.breed {
		pet.breed = breed;
	}
	if let Some(age_text) = row.age_text {
		pet.age_text = age_text;
	}
	if let Some(color) = row.color {
		pet.color = color;
	}
	if let Some(personality) = row.personality_description {
		pet.personality_description = personality;
	}
	if let Some(listing_url) = row.listing_url {
		pet.listing_url = listing_url;
	}
	if let Some(shelter_name) = row.shelter_name {
		pet.shelter_name = shelter_name;
	}

	Candidate { pet, similarity }
}

#[cfg(test)]
mod tests {
	use uuid::Uuid;

	use super::*;

	fn row() -> PetRow {
		PetRow {
			id: Uuid::nil(),
			external_id: Some("CMHS-A-46003".to_string()),
			name: "Biscuit".to_string(),
			species: "dog".to_string(),
			breed: None,
			age_text: Some("2 years".to_string()),
			age_months: Some(24),
			sex: Some("female".to_string()),
			size: Some("xlarge".to_string()),
			weight_lbs: Some(81.5),
			color: None,
			energy_level: Some("mystery".to_string()),
			good_with_dogs: Some(true),
			good_with_cats: None,
			good_with_children: Some(false),
			house_trained: None,
			special_needs: None,
			personality_description: None,
			adoption_fee: Some(150.0),
			is_neutered: Some(true),
			listing_url: None,
			image_urls: None,
			shelter_name: Some("Happy Tails".to_string()),
			shelter_location: Some("Austin, TX".to_string()),
			shelter_contact: None,
			similarity: 1.2,
		}
	}

	#[test]
	fn maps_row_labels_and_defaults() {
		let candidate = candidate_from_row(row());

		assert_eq!(candidate.similarity, 1.0);
		assert_eq!(candidate.pet.size, Size::ExtraLarge);
		assert_eq!(candidate.pet.energy_level, EnergyLevel::Unknown);
		assert_eq!(candidate.pet.breed, "Unknown");
		assert_eq!(candidate.pet.shelter_name, "Happy Tails");
		assert!(candidate.pet.image_urls.is_empty());
	}
}
