//! Target JSON schema embedded in the extraction prompt.
//!
//! The model is not constrained to this schema; it is an implicit contract
//! with [`ExtractedRecord`](crate::models::record::ExtractedRecord), so the
//! keys below must stay identical to
//! [`Field::key`](crate::models::record::Field::key) and
//! [`NicLevel::key`](crate::models::record::NicLevel::key).

use serde_json::Value;

const SCHEMA_DESCRIPTION: &str = r#"
Return the following fields strictly as valid JSON:

{
  "UDYAM_REGISTRATION_NUMBER": "",
  "ENTERPRISE_NAME": "",
  "ENTERPRISE_TYPE": "",
  "MAJOR_ACTIVITY": "",
  "SOCIAL_CATEGORY_OF_ENTREPRENEUR": "",
  "NAME_OF_UNIT": "",
  "OFFICIAL_ADDRESS_OF_ENTERPRISE": "",
  "DATE_OF_INCORPORATION_OR_REGISTRATION_OF_ENTERPRISE": "",
  "DATE_OF_COMMENCEMENT_OF_PRODUCTION_OR_BUSINESS": "",
  "NATIONAL_INDUSTRY_CLASSIFICATION_CODES": {
        "NIC_2_DIGIT": [],
        "NIC_4_DIGIT": [],
        "NIC_5_DIGIT": []
  },
  "DATE_OF_UDYAM_REGISTRATION": ""
}
"#;

/// Instruction and JSON skeleton sent to the model after the raw text.
pub fn schema_description() -> &'static str {
    SCHEMA_DESCRIPTION
}

/// The JSON skeleton of [`schema_description`], decoded.
pub fn schema_skeleton() -> Value {
    let start = SCHEMA_DESCRIPTION.find('{').unwrap_or(0);
    let end = SCHEMA_DESCRIPTION.rfind('}').map_or(SCHEMA_DESCRIPTION.len(), |i| i + 1);
    serde_json::from_str(&SCHEMA_DESCRIPTION[start..end]).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{Field, NIC_CODES_KEY, NicLevel};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_skeleton_is_valid_json_object() {
        let skeleton = schema_skeleton();
        let object = skeleton.as_object().expect("skeleton must be an object");
        assert_eq!(object.len(), Field::ALL.len() + 1);
    }

    #[test]
    fn test_skeleton_matches_record_keys() {
        let skeleton = schema_skeleton();
        for field in Field::ALL {
            assert_eq!(skeleton[field.key()], Value::String(String::new()), "{}", field.key());
        }
        for level in NicLevel::ALL {
            assert_eq!(skeleton[NIC_CODES_KEY][level.key()], Value::Array(Vec::new()));
        }
    }

    #[test]
    fn test_description_is_stable() {
        assert!(schema_description().contains("strictly as valid JSON"));
        assert_eq!(schema_description(), schema_description());
    }
}
