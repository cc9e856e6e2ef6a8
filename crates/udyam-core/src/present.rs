//! Field-by-field rendering of an extraction result.

use crate::models::record::{ExtractedRecord, Field, NicLevel};

/// Marker shown in place of a missing value.
pub const NOT_FOUND: &str = "NOT FOUND";

/// Message shown when the model response held no structured data.
pub const EXTRACTION_FAILED: &str = "EXTRACTION FAILED: no structured data found in model response";

/// Heading printed above the NIC code lines.
pub const NIC_HEADING: &str = "NATIONAL INDUSTRY CLASSIFICATION CODES";

/// One displayed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A labelled value; `None` renders as [`NOT_FOUND`].
    Value {
        label: &'static str,
        value: Option<String>,
        nested: bool,
    },
    /// A section heading.
    Heading(&'static str),
}

impl Entry {
    /// Whether this entry is a value that was not found.
    pub fn is_missing(&self) -> bool {
        matches!(self, Entry::Value { value: None, .. })
    }

    /// Plain-text rendering of the entry.
    pub fn to_line(&self) -> String {
        match self {
            Entry::Value {
                label,
                value,
                nested,
            } => {
                let indent = if *nested { "  - " } else { "" };
                format!("{}{}: {}", indent, label, value.as_deref().unwrap_or(NOT_FOUND))
            }
            Entry::Heading(title) => format!("{}:", title),
        }
    }
}

/// What to show for one extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    /// No structured data; no fields are shown.
    Failed,
    /// Fixed schema entries in schema order.
    Record(Vec<Entry>),
}

impl Presentation {
    /// Lay out a record, or the failure indication when there is none.
    pub fn new(record: Option<&ExtractedRecord>) -> Self {
        match record {
            Some(record) => Self::Record(entries(record)),
            None => Self::Failed,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    pub fn entries(&self) -> &[Entry] {
        match self {
            Self::Failed => &[],
            Self::Record(entries) => entries,
        }
    }

    /// Plain-text rendering, one entry per line.
    pub fn render_text(&self) -> String {
        match self {
            Self::Failed => format!("{}\n", EXTRACTION_FAILED),
            Self::Record(entries) => entries
                .iter()
                .map(|entry| entry.to_line() + "\n")
                .collect(),
        }
    }
}

fn entries(record: &ExtractedRecord) -> Vec<Entry> {
    let mut entries = Vec::with_capacity(Field::ALL.len() + NicLevel::ALL.len() + 1);

    for field in Field::ALL {
        // The NIC section sits between the commencement date and the registration date.
        if field == Field::DateOfUdyamRegistration {
            entries.push(Entry::Heading(NIC_HEADING));
            for level in NicLevel::ALL {
                let codes = record.nic(level);
                entries.push(Entry::Value {
                    label: level.label(),
                    value: (!codes.is_empty()).then(|| codes.join(", ")),
                    nested: true,
                });
            }
        }

        entries.push(Entry::Value {
            label: field.key(),
            value: record.found(field).map(str::to_string),
            nested: false,
        });
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::parse_response;
    use pretty_assertions::assert_eq;

    fn render(raw: &str) -> String {
        Presentation::new(parse_response(raw).ok().as_ref()).render_text()
    }

    #[test]
    fn test_single_field_record() {
        let text = render(r#"{"ENTERPRISE_NAME": "Acme"}"#);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines.contains(&"ENTERPRISE_NAME: Acme"));
        for field in Field::ALL.iter().filter(|f| **f != Field::EnterpriseName) {
            let expected = format!("{}: NOT FOUND", field.key());
            assert!(lines.contains(&expected.as_str()), "{}", expected);
        }
        assert_eq!(text.matches(NOT_FOUND).count(), 12);
    }

    #[test]
    fn test_failure_shows_no_fields() {
        let text = render("Sorry, I could not extract any data.");
        assert_eq!(text, format!("{}\n", EXTRACTION_FAILED));
        assert!(!text.contains("ENTERPRISE_NAME"));
        assert!(Presentation::new(None).entries().is_empty());
    }

    #[test]
    fn test_nic_lines() {
        let text = render(
            r#"{"NATIONAL_INDUSTRY_CLASSIFICATION_CODES": {"NIC_2_DIGIT": ["01"], "NIC_4_DIGIT": [], "NIC_5_DIGIT": []}}"#,
        );
        assert!(text.contains("  - NIC 2-DIGIT: 01\n"));
        assert!(text.contains("  - NIC 4-DIGIT: NOT FOUND\n"));
        assert!(text.contains("  - NIC 5-DIGIT: NOT FOUND\n"));
    }

    #[test]
    fn test_nic_lists_are_comma_joined() {
        let text = render(
            r#"{"NATIONAL_INDUSTRY_CLASSIFICATION_CODES": {"NIC_5_DIGIT": ["10711", "10712"]}}"#,
        );
        assert!(text.contains("NIC 5-DIGIT: 10711, 10712"));
        assert!(text.contains("NIC 2-DIGIT: NOT FOUND"));
    }

    #[test]
    fn test_schema_order() {
        let presentation = Presentation::new(Some(&ExtractedRecord::default()));
        let lines: Vec<String> = presentation.entries().iter().map(Entry::to_line).collect();
        assert_eq!(
            lines,
            vec![
                "UDYAM_REGISTRATION_NUMBER: NOT FOUND",
                "ENTERPRISE_NAME: NOT FOUND",
                "ENTERPRISE_TYPE: NOT FOUND",
                "MAJOR_ACTIVITY: NOT FOUND",
                "SOCIAL_CATEGORY_OF_ENTREPRENEUR: NOT FOUND",
                "NAME_OF_UNIT: NOT FOUND",
                "OFFICIAL_ADDRESS_OF_ENTERPRISE: NOT FOUND",
                "DATE_OF_INCORPORATION_OR_REGISTRATION_OF_ENTERPRISE: NOT FOUND",
                "DATE_OF_COMMENCEMENT_OF_PRODUCTION_OR_BUSINESS: NOT FOUND",
                "NATIONAL INDUSTRY CLASSIFICATION CODES:",
                "  - NIC 2-DIGIT: NOT FOUND",
                "  - NIC 4-DIGIT: NOT FOUND",
                "  - NIC 5-DIGIT: NOT FOUND",
                "DATE_OF_UDYAM_REGISTRATION: NOT FOUND",
            ]
        );
        assert_eq!(presentation.entries().iter().filter(|e| e.is_missing()).count(), 13);
    }

    #[test]
    fn test_whitespace_value_is_shown_verbatim() {
        let text = render("Sure:\n{\"ENTERPRISE_NAME\": \"   \", \"NAME_OF_UNIT\": \"\"}");
        assert!(text.contains("ENTERPRISE_NAME:    \n"));
        assert!(text.contains("NAME_OF_UNIT: NOT FOUND\n"));
    }

    #[test]
    fn test_extra_keys_are_not_shown() {
        let text = render(r#"{"ENTERPRISE_NAME": "Acme", "PAN": "ABCDE1234F"}"#);
        assert!(!text.contains("PAN"));
    }
}
