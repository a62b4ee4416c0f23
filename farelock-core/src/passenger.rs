use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Passenger fare/age class.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PassengerCategory {
    Adult,
    Child,
    Infant,
    InfantSeat,
}

impl PassengerCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassengerCategory::Adult => "adult",
            PassengerCategory::Child => "child",
            PassengerCategory::Infant => "infant",
            PassengerCategory::InfantSeat => "infant_seat",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

/// Script family a document requires the holder's name fields to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFamily {
    Cyrillic,
    Latin,
}

impl ScriptFamily {
    /// Whether every alphabetic character of `value` belongs to this family.
    /// Hyphen, apostrophe and whitespace are neutral and always allowed.
    pub fn matches(&self, value: &str) -> bool {
        value.chars().all(|c| {
            if c == '-' || c == '\'' || c.is_whitespace() {
                return true;
            }
            match self {
                ScriptFamily::Cyrillic => ('\u{0400}'..='\u{04FF}').contains(&c),
                ScriptFamily::Latin => c.is_ascii_alphabetic(),
            }
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    NationalPassport,
    InternationalPassport,
    BirthCertificate,
    ForeignDocument,
}

/// Per-document form configuration: which fields are active and which
/// script the name fields must use.
#[derive(Debug, Clone, Copy)]
pub struct DocumentProfile {
    pub script: ScriptFamily,
    pub requires_expiry: bool,
    pub requires_patronymic: bool,
}

impl DocumentType {
    pub fn profile(&self) -> DocumentProfile {
        match self {
            DocumentType::NationalPassport => DocumentProfile {
                script: ScriptFamily::Cyrillic,
                requires_expiry: false,
                requires_patronymic: true,
            },
            DocumentType::BirthCertificate => DocumentProfile {
                script: ScriptFamily::Cyrillic,
                requires_expiry: false,
                requires_patronymic: true,
            },
            DocumentType::InternationalPassport => DocumentProfile {
                script: ScriptFamily::Latin,
                requires_expiry: true,
                requires_patronymic: false,
            },
            DocumentType::ForeignDocument => DocumentProfile {
                script: ScriptFamily::Latin,
                requires_expiry: true,
                requires_patronymic: false,
            },
        }
    }
}

/// A passenger draft mirroring one of the booking's requested slots.
/// Mutated field-by-field by the form layer and persisted only on
/// explicit submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
    pub slot_id: Uuid,
    pub category: PassengerCategory,
    pub last_name: String,
    pub first_name: String,
    pub patronymic: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
    pub document_type: DocumentType,
    pub document_number: String,
    pub document_expiry: Option<NaiveDate>,
    pub citizenship: Option<String>,
}

impl Passenger {
    /// Create an empty draft for a requested category slot.
    pub fn slot(category: PassengerCategory) -> Self {
        Self {
            slot_id: Uuid::new_v4(),
            category,
            last_name: String::new(),
            first_name: String::new(),
            patronymic: None,
            gender: None,
            birth_date: None,
            document_type: DocumentType::NationalPassport,
            document_number: String::new(),
            document_expiry: None,
            citizenship: None,
        }
    }
}
