//! Udyam Registration record extracted from a model response.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level key holding the nested NIC code lists.
pub const NIC_CODES_KEY: &str = "NATIONAL_INDUSTRY_CLASSIFICATION_CODES";

/// Keys of the top-level string fields of a Udyam certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    UdyamRegistrationNumber,
    EnterpriseName,
    EnterpriseType,
    MajorActivity,
    SocialCategoryOfEntrepreneur,
    NameOfUnit,
    OfficialAddressOfEnterprise,
    DateOfIncorporation,
    DateOfCommencement,
    DateOfUdyamRegistration,
}

impl Field {
    /// Every string field.
    pub const ALL: [Field; 10] = [
        Field::UdyamRegistrationNumber,
        Field::EnterpriseName,
        Field::EnterpriseType,
        Field::MajorActivity,
        Field::SocialCategoryOfEntrepreneur,
        Field::NameOfUnit,
        Field::OfficialAddressOfEnterprise,
        Field::DateOfIncorporation,
        Field::DateOfCommencement,
        Field::DateOfUdyamRegistration,
    ];

    /// JSON key of this field.
    pub fn key(self) -> &'static str {
        match self {
            Field::UdyamRegistrationNumber => "UDYAM_REGISTRATION_NUMBER",
            Field::EnterpriseName => "ENTERPRISE_NAME",
            Field::EnterpriseType => "ENTERPRISE_TYPE",
            Field::MajorActivity => "MAJOR_ACTIVITY",
            Field::SocialCategoryOfEntrepreneur => "SOCIAL_CATEGORY_OF_ENTREPRENEUR",
            Field::NameOfUnit => "NAME_OF_UNIT",
            Field::OfficialAddressOfEnterprise => "OFFICIAL_ADDRESS_OF_ENTERPRISE",
            Field::DateOfIncorporation => "DATE_OF_INCORPORATION_OR_REGISTRATION_OF_ENTERPRISE",
            Field::DateOfCommencement => "DATE_OF_COMMENCEMENT_OF_PRODUCTION_OR_BUSINESS",
            Field::DateOfUdyamRegistration => "DATE_OF_UDYAM_REGISTRATION",
        }
    }

    /// Look up a field by its JSON key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

/// Granularity of a National Industry Classification code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NicLevel {
    TwoDigit,
    FourDigit,
    FiveDigit,
}

impl NicLevel {
    /// All levels, coarsest first.
    pub const ALL: [NicLevel; 3] = [NicLevel::TwoDigit, NicLevel::FourDigit, NicLevel::FiveDigit];

    /// JSON key of the list for this level.
    pub fn key(self) -> &'static str {
        match self {
            NicLevel::TwoDigit => "NIC_2_DIGIT",
            NicLevel::FourDigit => "NIC_4_DIGIT",
            NicLevel::FiveDigit => "NIC_5_DIGIT",
        }
    }

    /// Human-readable label, e.g. `NIC 2-DIGIT`.
    pub fn label(self) -> &'static str {
        match self {
            NicLevel::TwoDigit => "NIC 2-DIGIT",
            NicLevel::FourDigit => "NIC 4-DIGIT",
            NicLevel::FiveDigit => "NIC 5-DIGIT",
        }
    }
}

/// NIC code lists of an enterprise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NicCodes {
    #[serde(rename = "NIC_2_DIGIT", default)]
    pub two_digit: Vec<String>,

    #[serde(rename = "NIC_4_DIGIT", default)]
    pub four_digit: Vec<String>,

    #[serde(rename = "NIC_5_DIGIT", default)]
    pub five_digit: Vec<String>,

    /// Unrecognized keys inside the nested object.
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl NicCodes {
    /// Codes recorded for a level.
    pub fn codes(&self, level: NicLevel) -> &[String] {
        match level {
            NicLevel::TwoDigit => &self.two_digit,
            NicLevel::FourDigit => &self.four_digit,
            NicLevel::FiveDigit => &self.five_digit,
        }
    }

    fn from_map(mut map: Map<String, Value>) -> Self {
        let mut take = |level: NicLevel| map.remove(level.key()).map(coerce_list).unwrap_or_default();
        let two_digit = take(NicLevel::TwoDigit);
        let four_digit = take(NicLevel::FourDigit);
        let five_digit = take(NicLevel::FiveDigit);
        Self {
            two_digit,
            four_digit,
            five_digit,
            extras: map,
        }
    }
}

/// Structured fields of a Udyam Registration certificate.
///
/// Every field is optional: an absent key means "not found". Keys outside the
/// fixed schema are kept in `extras` and never cause a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    #[serde(rename = "UDYAM_REGISTRATION_NUMBER", skip_serializing_if = "Option::is_none")]
    pub udyam_registration_number: Option<String>,

    #[serde(rename = "ENTERPRISE_NAME", skip_serializing_if = "Option::is_none")]
    pub enterprise_name: Option<String>,

    #[serde(rename = "ENTERPRISE_TYPE", skip_serializing_if = "Option::is_none")]
    pub enterprise_type: Option<String>,

    #[serde(rename = "MAJOR_ACTIVITY", skip_serializing_if = "Option::is_none")]
    pub major_activity: Option<String>,

    #[serde(rename = "SOCIAL_CATEGORY_OF_ENTREPRENEUR", skip_serializing_if = "Option::is_none")]
    pub social_category_of_entrepreneur: Option<String>,

    #[serde(rename = "NAME_OF_UNIT", skip_serializing_if = "Option::is_none")]
    pub name_of_unit: Option<String>,

    #[serde(rename = "OFFICIAL_ADDRESS_OF_ENTERPRISE", skip_serializing_if = "Option::is_none")]
    pub official_address_of_enterprise: Option<String>,

    #[serde(
        rename = "DATE_OF_INCORPORATION_OR_REGISTRATION_OF_ENTERPRISE",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_of_incorporation: Option<String>,

    #[serde(
        rename = "DATE_OF_COMMENCEMENT_OF_PRODUCTION_OR_BUSINESS",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_of_commencement: Option<String>,

    #[serde(rename = "NATIONAL_INDUSTRY_CLASSIFICATION_CODES", skip_serializing_if = "Option::is_none")]
    pub nic_codes: Option<NicCodes>,

    #[serde(rename = "DATE_OF_UDYAM_REGISTRATION", skip_serializing_if = "Option::is_none")]
    pub date_of_udyam_registration: Option<String>,

    /// Keys the model returned outside the fixed schema.
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl ExtractedRecord {
    /// Build a record from a decoded JSON object, tolerating loose typing.
    ///
    /// Numbers and booleans in string fields keep their JSON text, `null`
    /// means absent, and values of an unusable shape move to `extras`.
    pub fn from_map(mut map: Map<String, Value>) -> Self {
        let mut record = Self::default();

        for field in Field::ALL {
            let Some(value) = map.remove(field.key()) else {
                continue;
            };
            match coerce_text(value) {
                Ok(text) => *record.slot_mut(field) = text,
                Err(other) => {
                    record.extras.insert(field.key().to_string(), other);
                }
            }
        }

        match map.remove(NIC_CODES_KEY) {
            Some(Value::Object(nested)) => record.nic_codes = Some(NicCodes::from_map(nested)),
            Some(Value::Null) | None => {}
            Some(other) => {
                record.extras.insert(NIC_CODES_KEY.to_string(), other);
            }
        }

        record.extras.extend(map);
        record
    }

    /// Raw value of a string field, if the key was present.
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::UdyamRegistrationNumber => self.udyam_registration_number.as_deref(),
            Field::EnterpriseName => self.enterprise_name.as_deref(),
            Field::EnterpriseType => self.enterprise_type.as_deref(),
            Field::MajorActivity => self.major_activity.as_deref(),
            Field::SocialCategoryOfEntrepreneur => self.social_category_of_entrepreneur.as_deref(),
            Field::NameOfUnit => self.name_of_unit.as_deref(),
            Field::OfficialAddressOfEnterprise => self.official_address_of_enterprise.as_deref(),
            Field::DateOfIncorporation => self.date_of_incorporation.as_deref(),
            Field::DateOfCommencement => self.date_of_commencement.as_deref(),
            Field::DateOfUdyamRegistration => self.date_of_udyam_registration.as_deref(),
        }
    }

    /// Value of a string field if it is present and non-empty.
    /// Whitespace-only values count as found and are shown verbatim.
    pub fn found(&self, field: Field) -> Option<&str> {
        self.get(field).filter(|value| !value.is_empty())
    }

    /// Codes for a NIC level; empty when the nested key is absent.
    pub fn nic(&self, level: NicLevel) -> &[String] {
        self.nic_codes
            .as_ref()
            .map(|codes| codes.codes(level))
            .unwrap_or(&[])
    }

    /// Number of schema entries (string fields and NIC levels) that were found.
    pub fn found_count(&self) -> usize {
        let fields = Field::ALL
            .iter()
            .filter(|field| self.found(**field).is_some())
            .count();
        let levels = NicLevel::ALL
            .iter()
            .filter(|level| !self.nic(**level).is_empty())
            .count();
        fields + levels
    }

    /// Keys of schema entries that were not found.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing: Vec<&'static str> = Field::ALL
            .iter()
            .filter(|field| self.found(**field).is_none())
            .map(|field| field.key())
            .collect();
        missing.extend(
            NicLevel::ALL
                .iter()
                .filter(|level| self.nic(**level).is_empty())
                .map(|level| level.key()),
        );
        missing
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::UdyamRegistrationNumber => &mut self.udyam_registration_number,
            Field::EnterpriseName => &mut self.enterprise_name,
            Field::EnterpriseType => &mut self.enterprise_type,
            Field::MajorActivity => &mut self.major_activity,
            Field::SocialCategoryOfEntrepreneur => &mut self.social_category_of_entrepreneur,
            Field::NameOfUnit => &mut self.name_of_unit,
            Field::OfficialAddressOfEnterprise => &mut self.official_address_of_enterprise,
            Field::DateOfIncorporation => &mut self.date_of_incorporation,
            Field::DateOfCommencement => &mut self.date_of_commencement,
            Field::DateOfUdyamRegistration => &mut self.date_of_udyam_registration,
        }
    }
}

impl From<Map<String, Value>> for ExtractedRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self::from_map(map)
    }
}

fn coerce_text(value: Value) -> Result<Option<String>, Value> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        other => Err(other),
    }
}

fn coerce_list(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Null => None,
                Value::String(text) => Some(text),
                other => Some(other.to_string()),
            })
            .collect(),
        Value::String(text) if text.is_empty() => Vec::new(),
        Value::String(text) => vec![text],
        _ => Vec::new(),
    }
}
