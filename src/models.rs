use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::StoreError;

/// When a labourer can start. Stored as the display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Availability {
    #[serde(rename = "Immediate")]
    Immediate,
    #[serde(rename = "Within 2 days")]
    WithinTwoDays,
    #[serde(rename = "Within a week")]
    WithinAWeek,
    #[serde(rename = "After a week")]
    AfterAWeek,
}

impl Availability {
    pub const ALL: [Availability; 4] = [
        Availability::Immediate,
        Availability::WithinTwoDays,
        Availability::WithinAWeek,
        Availability::AfterAWeek,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Availability::Immediate => "Immediate",
            Availability::WithinTwoDays => "Within 2 days",
            Availability::WithinAWeek => "Within a week",
            Availability::AfterAWeek => "After a week",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Availability {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| StoreError::InvalidAvailability(s.to_string()))
    }
}

impl ToSql for Availability {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Availability {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: StoreError| FromSqlError::Other(Box::new(e)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabourProfile {
    pub id: i64,
    pub full_name: String,
    pub age: u32,
    pub phone: String,
    pub location: String,
    pub languages: Vec<String>,
    pub photo: Option<String>,
    pub id_proof: Option<String>,
    pub experience: u32,
    pub hourly_rate: u32,
    pub availability: Availability,
    pub verified: bool,
    pub completed_jobs: u32,
    pub skills: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A labour profile as collected by the registration form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLabourProfile {
    pub full_name: String,
    pub age: u32,
    pub phone: String,
    pub location: String,
    pub languages: Vec<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub id_proof: Option<String>,
    pub experience: u32,
    pub hourly_rate: u32,
    pub availability: Availability,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub completed_jobs: u32,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Partial labour profile. `None` leaves a column untouched; for the
/// nullable columns `Some(None)` clears the value.
///
/// When `skills` is present the profile's whole skill set is replaced.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabourProfileUpdate {
    pub full_name: Option<String>,
    pub age: Option<u32>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub languages: Option<Vec<String>>,
    #[serde(deserialize_with = "nullable")]
    pub photo: Option<Option<String>>,
    #[serde(deserialize_with = "nullable")]
    pub id_proof: Option<Option<String>>,
    pub experience: Option<u32>,
    pub hourly_rate: Option<u32>,
    pub availability: Option<Availability>,
    pub verified: Option<bool>,
    pub completed_jobs: Option<u32>,
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractorProfile {
    pub id: i64,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub pincode: String,
    pub photo: Option<String>,
    pub id_proof: Option<String>,
    pub account_holder: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub bank_name: String,
    pub receive_notifications: bool,
    pub share_location_data: bool,
    pub agree_to_terms: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContractorProfile {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub pincode: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub id_proof: Option<String>,
    pub account_holder: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub bank_name: String,
    #[serde(default = "default_true")]
    pub receive_notifications: bool,
    #[serde(default = "default_true")]
    pub share_location_data: bool,
    #[serde(default)]
    pub agree_to_terms: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContractorProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub photo: Option<Option<String>>,
    #[serde(deserialize_with = "nullable")]
    pub id_proof: Option<Option<String>>,
    pub account_holder: Option<String>,
    pub account_number: Option<String>,
    pub ifsc_code: Option<String>,
    pub bank_name: Option<String>,
    pub receive_notifications: Option<bool>,
    pub share_location_data: Option<bool>,
    pub agree_to_terms: Option<bool>,
}

fn default_true() -> bool {
    true
}

// Present-but-null deserializes to Some(None), absent stays None.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Split the comma-delimited languages column.
pub(crate) fn split_languages(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn join_languages(languages: &[String]) -> String {
    languages
        .iter()
        .map(|lang| lang.trim())
        .filter(|lang| !lang.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_parses_labels() {
        assert_eq!("Within 2 days".parse::<Availability>().unwrap(), Availability::WithinTwoDays);
        assert_eq!("immediate".parse::<Availability>().unwrap(), Availability::Immediate);
        assert!("tomorrow".parse::<Availability>().is_err());
    }

    #[test]
    fn languages_trim_and_drop_empty() {
        assert_eq!(split_languages("Hindi, English ,,Telugu"), vec!["Hindi", "English", "Telugu"]);
        assert!(split_languages("").is_empty());
        assert_eq!(join_languages(&["Hindi ".into(), "".into(), "Odia".into()]), "Hindi, Odia");
    }

    #[test]
    fn update_distinguishes_null_from_absent() {
        let update: LabourProfileUpdate =
            serde_json::from_str(r#"{"photo": null, "hourlyRate": 450}"#).unwrap();
        assert_eq!(update.photo, Some(None));
        assert_eq!(update.id_proof, None);
        assert_eq!(update.hourly_rate, Some(450));
        assert_eq!(update.skills, None);
    }

    #[test]
    fn new_contractor_defaults_preference_flags() {
        let json = r#"{
            "fullName": "Ravi Kumar", "phone": "9876543210", "email": "ravi@example.com",
            "address": "12 MG Road", "city": "Pune", "pincode": "411001",
            "accountHolder": "Ravi Kumar", "accountNumber": "0012345678",
            "ifscCode": "HDFC0001234", "bankName": "HDFC"
        }"#;
        let profile: NewContractorProfile = serde_json::from_str(json).unwrap();
        assert!(profile.receive_notifications);
        assert!(profile.share_location_data);
        assert!(!profile.agree_to_terms);
    }
}
