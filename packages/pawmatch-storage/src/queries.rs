use crate::{Error, Result, db::Db, models::PetRow};

/// Nearest pets to `query_vec` by cosine similarity, best first.
///
/// Similarity is `1 - cosine distance`. Pets without an embedding are never returned.
pub async fn vector_search(
	db: &Db,
	query_vec: &[f32],
	top_k: u32,
	species: Option<&str>,
) -> Result<Vec<PetRow>> {
	if query_vec.is_empty() {
		return Err(Error::InvalidArgument("Query vector must be non-empty.".to_string()));
	}
	if query_vec.iter().any(|value| !value.is_finite()) {
		return Err(Error::InvalidArgument("Query vector must contain finite values.".to_string()));
	}

	let rows = sqlx::query_as::<_, PetRow>(
		"\
SELECT
	p.id,
	p.external_id,
	p.name,
	p.species,
	p.breed,
	p.age_text,
	p.age_months,
	p.sex,
	p.size,
	p.weight_lbs,
	p.color,
	p.energy_level,
	p.good_with_dogs,
	p.good_with_cats,
	p.good_with_children,
	p.house_trained,
	p.special_needs,
	p.personality_description,
	p.adoption_fee,
	p.is_neutered,
	p.listing_url,
	p.image_urls,
	s.name AS shelter_name,
	s.location AS shelter_location,
	s.contact_info AS shelter_contact,
	(1 - (p.embedding <=> $1::text::vector))::real AS similarity
FROM pets p
LEFT JOIN shelters s ON s.id = p.shelter_id
WHERE p.embedding IS NOT NULL
	AND ($3::text IS NULL OR p.species = $3)
ORDER BY p.embedding <=> $1::text::vector
LIMIT $2",
	)
	.bind(vector_to_pg(query_vec))
	.bind(i64::from(top_k))
	.bind(species)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub fn vector_to_pg(vec: &[f32]) -> String {
	let mut out = String::with_capacity(vec.len() * 8 + 2);

	out.push('[');

	for (idx, value) in vec.iter().enumerate() {
		if idx > 0 {
			out.push(',');
		}

		out.push_str(&value.to_string());
	}

	out.push(']');

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn formats_pgvector_literal() {
		assert_eq!(vector_to_pg(&[0.5, -1.0, 2.25]), "[0.5,-1,2.25]");
		assert_eq!(vector_to_pg(&[]), "[]");
	}
}
