use serde::{Deserialize, Serialize};

/// The canonical resume document consumed by every template renderer.
///
/// Every field defaults to an empty value, so renderers never guard against
/// `null`. `photo` is the only optional field and is omitted when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UniversalResumeData {
    pub personal: PersonalInfo,
    pub summary: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    pub projects: Vec<Project>,
    pub certifications: Vec<Certification>,
    pub languages: Vec<Language>,
    pub interests: Vec<Interest>,
    pub custom_sections: Vec<CustomSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub title: String,
    pub website: String,
    pub linked_in: String,
    pub github: String,
    pub portfolio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl PersonalInfo {
    /// True when at least one text field carries a value.
    pub fn has_content(&self) -> bool {
        [
            &self.full_name,
            &self.email,
            &self.phone,
            &self.location,
            &self.title,
            &self.website,
            &self.linked_in,
            &self.github,
            &self.portfolio,
        ]
        .iter()
        .any(|field| !field.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Experience {
    pub company: String,
    pub position: String,
    pub location: String,
    pub start_date: String,
    /// Free text. `"Present"` marks a current role and is never parsed.
    pub end_date: String,
    pub description: String,
    pub achievements: Vec<String>,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub gpa: String,
    pub honors: Vec<String>,
    pub coursework: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    pub description: String,
    pub role: String,
    pub start_date: String,
    pub end_date: String,
    pub technologies: Vec<String>,
    pub url: String,
    pub github: String,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Certification {
    pub name: String,
    pub issuer: String,
    pub date: String,
    pub url: String,
    pub credential_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Language {
    pub name: String,
    pub proficiency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interest {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomSection {
    pub title: String,
    pub content: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_camel_case_without_nulls() {
        let value = serde_json::to_value(UniversalResumeData::default()).unwrap();
        assert_eq!(value["personal"]["fullName"], json!(""));
        assert_eq!(value["personal"]["linkedIn"], json!(""));
        assert!(value["personal"].get("photo").is_none());
        assert_eq!(value["customSections"], json!([]));
    }

    #[test]
    fn test_partial_document_deserializes_with_defaults() {
        let data: UniversalResumeData = serde_json::from_value(json!({
            "personal": {"fullName": "Ada"},
            "experience": [{"company": "Analytical Engines"}]
        }))
        .unwrap();
        assert_eq!(data.personal.full_name, "Ada");
        assert_eq!(data.experience[0].position, "");
        assert!(data.skills.is_empty());
    }
}
