use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Medical specialties a doctor can practise and a request can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Specialty {
    Generaliste,
    Cardiologue,
    Dermatologue,
    Gynecologue,
    Psychologue,
    Neurologue,
    Ophtalmologue,
    Pediatre,
    Dentiste,
}

impl Specialty {
    pub const ALL: [Specialty; 9] = [
        Specialty::Generaliste,
        Specialty::Cardiologue,
        Specialty::Dermatologue,
        Specialty::Gynecologue,
        Specialty::Psychologue,
        Specialty::Neurologue,
        Specialty::Ophtalmologue,
        Specialty::Pediatre,
        Specialty::Dentiste,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Specialty::Generaliste => "GENERALISTE",
            Specialty::Cardiologue => "CARDIOLOGUE",
            Specialty::Dermatologue => "DERMATOLOGUE",
            Specialty::Gynecologue => "GYNECOLOGUE",
            Specialty::Psychologue => "PSYCHOLOGUE",
            Specialty::Neurologue => "NEUROLOGUE",
            Specialty::Ophtalmologue => "OPHTALMOLOGUE",
            Specialty::Pediatre => "PEDIATRE",
            Specialty::Dentiste => "DENTISTE",
        }
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Specialty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Specialty::ALL
            .iter()
            .copied()
            .find(|specialty| specialty.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown specialty: {}", s))
    }
}

/// Name card of a patient, doctor or admin as stored in its table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(rename = "nom")]
    pub last_name: String,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specialty_round_trips_through_str() {
        assert_eq!("cardiologue".parse::<Specialty>(), Ok(Specialty::Cardiologue));
        assert_eq!(Specialty::Pediatre.to_string(), "PEDIATRE");
        assert!("ORTHOPEDISTE".parse::<Specialty>().is_err());
    }

    #[test]
    fn test_person_uses_store_column_names() {
        let person: Person = serde_json::from_value(serde_json::json!({
            "id": "8c1f0f5e-9a44-4a55-8f53-0b7f3c1d2e10",
            "prenom": "Awa",
            "nom": "Diop",
            "email": "ignored@example.com"
        }))
        .unwrap();

        assert_eq!(person.full_name(), "Awa Diop");
    }
}
