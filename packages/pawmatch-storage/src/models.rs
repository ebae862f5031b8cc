use uuid::Uuid;

/// A pet row joined with its shelter, as returned by similarity search.
#[derive(Debug, sqlx::FromRow)]
pub struct PetRow {
	pub id: Uuid,
	pub external_id: Option<String>,
	pub name: String,
	pub species: String,
	pub breed: Option<String>,
	pub age_text: Option<String>,
	pub age_months: Option<i32>,
	pub sex: Option<String>,
	pub size: Option<String>,
	pub weight_lbs: Option<f64>,
	pub color: Option<String>,
	pub energy_level: Option<String>,
	pub good_with_dogs: Option<bool>,
	pub good_with_cats: Option<bool>,
	pub good_with_children: Option<bool>,
	pub house_trained: Option<bool>,
	pub special_needs: Option<String>,
	pub personality_description: Option<String>,
	pub adoption_fee: Option<f64>,
	pub is_neutered: Option<bool>,
	pub listing_url: Option<String>,
	pub image_urls: Option<Vec<String>>,
	pub shelter_name: Option<String>,
	pub shelter_location: Option<String>,
	pub shelter_contact: Option<String>,
	pub similarity: f32,
}
