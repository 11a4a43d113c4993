use std::fmt;

use crate::formats::Pet;

/// Feed completeness numbers printed after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub with_photo: usize,
    pub without_photo: Vec<String>,
    pub dogs: usize,
    pub cats: usize,
    pub other: usize,
}

impl RunSummary {
    pub fn from_pets(pets: &[Pet]) -> Self {
        let without_photo = pets
            .iter()
            .filter(|pet| pet.photo_url.is_none())
            .map(|pet| pet.name.clone())
            .collect::<Vec<_>>();
        let dogs = pets.iter().filter(|pet| pet.pet_type == "Dog").count();
        let cats = pets.iter().filter(|pet| pet.pet_type == "Cat").count();

        Self {
            total: pets.len(),
            with_photo: pets.len() - without_photo.len(),
            without_photo,
            dogs,
            cats,
            other: pets.len() - dogs - cats,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for name in &self.without_photo {
            writeln!(f, "{name} had no photo")?;
        }
        writeln!(
            f,
            "{} pets total, {} with photos, {} without",
            self.total,
            self.with_photo,
            self.without_photo.len()
        )?;
        write!(
            f,
            "Breakdown: {} dogs, {} cats, {} other",
            self.dogs, self.cats, self.other
        )
    }
}
