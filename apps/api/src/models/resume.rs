use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::render::RenderError;

/// A single resume, as supplied by the caller.
///
/// Built once per request or invocation, rendered, then dropped. Only `name` is
/// mandatory at the top level; every section defaults to empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResumeRecord {
    pub name: String,
    #[serde(default)]
    pub contact: Contact,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub awards: Vec<Award>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub certifications: Vec<Certification>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub publications: Vec<Publication>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub links: Vec<ContactLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactLink {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Skill {
    pub category: String,
    pub items: SkillItems,
}

/// Skill items arrive either as a list or as one comma-separated string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SkillItems {
    List(Vec<String>),
    Text(String),
}

impl SkillItems {
    pub fn joined(&self) -> String {
        match self {
            SkillItems::List(items) => items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            SkillItems::Text(text) => text.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Experience {
    pub title: String,
    #[serde(alias = "organization")]
    pub company: String,
    #[serde(default)]
    pub company_url: Option<String>,
    #[serde(default)]
    pub company_description: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub date_start: String,
    #[serde(default)]
    pub date_end: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub achievements: Vec<Achievement>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Achievement {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub date_start: String,
    #[serde(default)]
    pub date_end: String,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Award {
    pub title: String,
    pub organization: String,
    #[serde(default)]
    pub organization_detail: Option<String>,
    #[serde(default)]
    pub organization_url: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Certification {
    pub title: String,
    pub organization: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Publication {
    pub authors: String,
    pub title: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default, deserialize_with = "year_as_text")]
    pub year: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl ResumeRecord {
    /// Parses and validates a record from raw JSON bytes.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, RenderError> {
        let record: ResumeRecord = serde_json::from_slice(bytes)
            .map_err(|e| RenderError::Data(format!("invalid resume data: {e}")))?;
        record.validate()?;
        Ok(record)
    }

    /// Checks the constraints serde cannot express.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.name.trim().is_empty() {
            return Err(RenderError::Data("field 'name' must not be empty".to_string()));
        }
        Ok(())
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn year_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct YearVisitor;

    impl<'de> de::Visitor<'de> for YearVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a year as a number or string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(YearVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_record_defaults_sections() {
        let record = ResumeRecord::from_json_slice(
            br#"{"name": "Jane Roe", "contact": {"email": "jane@x.com"}}"#,
        )
        .unwrap();
        assert_eq!(record.contact.email, "jane@x.com");
        assert!(record.contact.phone.is_empty());
        assert!(record.skills.is_empty());
        assert!(record.awards.is_empty());
        assert!(record.publications.is_empty());
    }

    #[test]
    fn test_missing_name_is_data_error() {
        let err = ResumeRecord::from_json_slice(br#"{"summary": "hi"}"#).unwrap_err();
        assert!(matches!(err, RenderError::Data(ref m) if m.contains("name")));
    }

    #[test]
    fn test_blank_name_is_data_error() {
        let err = ResumeRecord::from_json_slice(br#"{"name": "   "}"#).unwrap_err();
        assert!(matches!(err, RenderError::Data(_)));
    }

    #[test]
    fn test_malformed_json_is_data_error() {
        let err = ResumeRecord::from_json_slice(b"{not json").unwrap_err();
        assert!(matches!(err, RenderError::Data(_)));
    }

    #[test]
    fn test_null_optional_sections_are_empty() {
        let record = ResumeRecord::from_json_slice(
            br#"{"name": "A", "awards": null, "certifications": null, "publications": null}"#,
        )
        .unwrap();
        assert!(record.awards.is_empty());
        assert!(record.certifications.is_empty());
    }

    #[test]
    fn test_skill_items_accept_list_and_string() {
        let record = ResumeRecord::from_json_slice(
            br#"{"name": "A", "skills": [
                {"category": "Languages", "items": ["Rust", " Go ", ""]},
                {"category": "Tools", "items": "Git, Docker"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(record.skills[0].items.joined(), "Rust, Go");
        assert_eq!(record.skills[1].items.joined(), "Git, Docker");
    }

    #[test]
    fn test_experience_accepts_organization_alias() {
        let record = ResumeRecord::from_json_slice(
            br#"{"name": "A", "experience": [{"title": "Engineer", "organization": "Acme"}]}"#,
        )
        .unwrap();
        assert_eq!(record.experience[0].company, "Acme");
        assert!(record.experience[0].achievements.is_empty());
    }

    #[test]
    fn test_publication_year_number_or_string() {
        let record = ResumeRecord::from_json_slice(
            br#"{"name": "A", "publications": [
                {"authors": "A", "title": "T", "year": 2021},
                {"authors": "A", "title": "U", "year": "2022"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(record.publications[0].year, "2021");
        assert_eq!(record.publications[1].year, "2022");
    }

    #[test]
    fn test_entry_missing_required_field_is_data_error() {
        let err = ResumeRecord::from_json_slice(
            br#"{"name": "A", "education": [{"degree": "BSc"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::Data(ref m) if m.contains("institution")));
    }
}
