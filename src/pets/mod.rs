use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A pet record as the service reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub animal_type: String,
    /// The service echoes age back as it was submitted, string or number.
    #[serde(default)]
    pub age: Value,
    #[serde(default)]
    pub pet_photo: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PetList {
    #[serde(default)]
    pub pets: Vec<Pet>,
}

impl PetList {
    pub fn len(&self) -> usize {
        self.pets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pets.is_empty()
    }

    pub fn first(&self) -> Option<&Pet> {
        self.pets.first()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.pets.iter().map(|pet| pet.id.as_str())
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.ids().any(|candidate| candidate == id)
    }
}

/// Which pets `GET api/pets` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PetFilter {
    All,
    MyPets,
}

impl PetFilter {
    pub fn as_query_value(self) -> &'static str {
        match self {
            PetFilter::All => "",
            PetFilter::MyPets => "my_pets",
        }
    }
}

impl Display for PetFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PetFilter::All => "all pets",
            PetFilter::MyPets => "my pets",
        };
        write!(f, "{label}")
    }
}

/// Fields submitted when creating or updating a pet. Age is kept as text so
/// blank and negative values can be sent as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetForm {
    pub name: String,
    pub animal_type: String,
    pub age: String,
}

impl PetForm {
    pub fn new(name: impl Into<String>, animal_type: impl Into<String>, age: impl Display) -> Self {
        Self {
            name: name.into(),
            animal_type: animal_type.into(),
            age: age.to_string(),
        }
    }

    pub fn fields(&self) -> Vec<(String, String)> {
        vec![
            ("name".to_string(), self.name.clone()),
            ("animal_type".to_string(), self.animal_type.clone()),
            ("age".to_string(), self.age.clone()),
        ]
    }
}
