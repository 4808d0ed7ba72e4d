//! AI resume JSON → Universal Resume.
//!
//! The AI service's output schema drifts between provider versions, so the
//! input stays an untyped `serde_json::Value` and every target field is read
//! through a `KeyChain`. The mapping is total: absent or malformed input
//! degrades to empty values and never errors.

use serde_json::Value;

use crate::resume::resolve::{
    resolve, resolve_array, resolve_str, resolve_string_list, string_items, KeyChain,
};
use crate::resume::universal::{
    Certification, CustomSection, Education, Experience, Interest, Language, PersonalInfo,
    Project, UniversalResumeData,
};

/// Title of the custom section carrying AI metadata warnings.
pub const AI_NOTES_TITLE: &str = "AI Processing Notes";
pub const PRESENT: &str = "Present";
const DEFAULT_PROFICIENCY: &str = "Intermediate";

// ── Top level ───────────────────────────────────────────────────────────────
const HEADER: KeyChain = &["header", "personal", "contact"];
const SUMMARY: KeyChain = &["summary", "profile", "objective"];
const EXPERIENCE: KeyChain = &["experience", "workExperience", "work"];
const EDUCATION: KeyChain = &["education"];
const PROJECTS: KeyChain = &["projects"];
const SKILLS: KeyChain = &["skills"];
const CERTIFICATIONS: KeyChain = &["certifications", "certificates"];
const LANGUAGES: KeyChain = &["languages"];
const INTERESTS: KeyChain = &["interests", "hobbies"];
const OTHER_SECTIONS: KeyChain = &["otherSections", "customSections"];

// ── Header ──────────────────────────────────────────────────────────────────
const FULL_NAME: KeyChain = &["fullName", "name", "full_name"];
const EMAIL: KeyChain = &["email"];
const PHONE: KeyChain = &["phone", "phoneNumber"];
const LOCATION: KeyChain = &["location", "address", "city"];
const HEADLINE: KeyChain = &["title", "headline"];
const LINKEDIN: KeyChain = &["links.linkedin", "linkedin", "linkedIn"];
const GITHUB: KeyChain = &["links.github", "github"];
const WEBSITE: KeyChain = &["links.portfolio", "links.website", "website", "portfolio"];
const PORTFOLIO: KeyChain = &["links.portfolio", "portfolio"];
const PHOTO: KeyChain = &["photo", "photoUrl", "avatar"];

// ── Entries ─────────────────────────────────────────────────────────────────
const COMPANY: KeyChain = &["company", "employer", "organization"];
const POSITION: KeyChain = &["title", "position", "role"];
const DESCRIPTION: KeyChain = &["description", "summary"];
const ACHIEVEMENTS: KeyChain = &["bullets", "achievements", "highlights"];
const TECHNOLOGIES: KeyChain = &["technologies", "tech", "techStack"];
const START_DATE: KeyChain = &["startDate", "start_date", "start"];
const END_DATE: KeyChain = &["endDate", "end_date", "end"];
const DATES: KeyChain = &["dates", "period"];
const INSTITUTION: KeyChain = &["school", "institution", "university"];
const DEGREE: KeyChain = &["degree", "diploma"];
const FIELD: KeyChain = &["field", "fieldOfStudy", "major"];
const GPA: KeyChain = &["gpa", "grade"];
const HONORS: KeyChain = &["honors", "awards"];
const COURSEWORK: KeyChain = &["coursework", "courses"];
const PROJECT_NAME: KeyChain = &["name", "title"];
const PROJECT_HIGHLIGHTS: KeyChain = &["bullets", "highlights"];
const ROLE: KeyChain = &["role"];
const URL: KeyChain = &["url", "link"];
const CERT_NAME: KeyChain = &["name", "title"];
const ISSUER: KeyChain = &["issuer", "authority", "organization"];
const CERT_DATE: KeyChain = &["date", "issued", "dates"];
const CREDENTIAL_ID: KeyChain = &["credentialId", "credential_id"];
const LANGUAGE_NAME: KeyChain = &["name", "language"];
const PROFICIENCY: KeyChain = &["proficiency", "level"];
const SECTION_TITLE: KeyChain = &["title", "name"];
const SECTION_ITEMS: KeyChain = &["items", "content"];

/// Skill categories in flattening order. Unknown categories follow in key order.
const SKILL_CATEGORIES: &[&str] = &["languages", "frameworks", "tools", "other"];

/// Converts AI-produced resume JSON into a fully-defaulted `UniversalResumeData`.
pub fn resume_json_to_universal(ai: &Value) -> UniversalResumeData {
    let header = resolve(ai, HEADER).unwrap_or(&Value::Null);

    let mut custom_sections: Vec<CustomSection> = processing_notes(ai).into_iter().collect();
    custom_sections.extend(objects(ai, OTHER_SECTIONS).filter_map(map_custom_section));

    UniversalResumeData {
        personal: map_personal(header),
        summary: resolve_str(ai, SUMMARY),
        experience: objects(ai, EXPERIENCE).map(map_experience).collect(),
        education: objects(ai, EDUCATION).map(map_education).collect(),
        skills: flatten_skills(resolve(ai, SKILLS)),
        projects: objects(ai, PROJECTS).map(map_project).collect(),
        certifications: resolve_array(ai, CERTIFICATIONS)
            .iter()
            .filter_map(map_certification)
            .collect(),
        languages: resolve_array(ai, LANGUAGES)
            .iter()
            .filter_map(map_language)
            .collect(),
        interests: string_items(resolve_array(ai, INTERESTS))
            .into_iter()
            .map(|name| Interest { name })
            .collect(),
        custom_sections,
    }
}

fn objects<'a>(value: &'a Value, keys: KeyChain) -> impl Iterator<Item = &'a Value> {
    resolve_array(value, keys).iter().filter(|item| item.is_object())
}

fn map_personal(header: &Value) -> PersonalInfo {
    let photo = resolve_str(header, PHOTO);
    PersonalInfo {
        full_name: resolve_str(header, FULL_NAME),
        email: resolve_str(header, EMAIL),
        phone: resolve_str(header, PHONE),
        location: resolve_str(header, LOCATION),
        title: resolve_str(header, HEADLINE),
        website: resolve_str(header, WEBSITE),
        linked_in: resolve_str(header, LINKEDIN),
        github: resolve_str(header, GITHUB),
        portfolio: resolve_str(header, PORTFOLIO),
        photo: (!photo.is_empty()).then_some(photo),
    }
}

fn map_experience(entry: &Value) -> Experience {
    let achievements = resolve_string_list(entry, ACHIEVEMENTS);
    let (start_date, mut end_date) = map_dates(entry);
    let is_current = entry.get("current").and_then(Value::as_bool) == Some(true);
    if end_date.is_empty() && is_current {
        end_date = PRESENT.to_string();
    }

    let description = match resolve_str(entry, DESCRIPTION) {
        d if d.is_empty() => achievements.join("\n"),
        d => d,
    };

    Experience {
        company: resolve_str(entry, COMPANY),
        position: resolve_str(entry, POSITION),
        location: resolve_str(entry, LOCATION),
        start_date,
        end_date,
        description,
        achievements,
        technologies: resolve_string_list(entry, TECHNOLOGIES),
    }
}

fn map_education(entry: &Value) -> Education {
    let (start_date, end_date) = map_dates(entry);
    Education {
        institution: resolve_str(entry, INSTITUTION),
        degree: resolve_str(entry, DEGREE),
        field: resolve_str(entry, FIELD),
        location: resolve_str(entry, LOCATION),
        start_date,
        end_date,
        gpa: resolve_str(entry, GPA),
        honors: resolve_string_list(entry, HONORS),
        coursework: resolve_string_list(entry, COURSEWORK),
    }
}

fn map_project(entry: &Value) -> Project {
    let highlights = resolve_string_list(entry, PROJECT_HIGHLIGHTS);
    let (start_date, end_date) = map_dates(entry);
    let description = match resolve_str(entry, &["description"]) {
        d if d.is_empty() => highlights.first().cloned().unwrap_or_default(),
        d => d,
    };

    Project {
        name: resolve_str(entry, PROJECT_NAME),
        description,
        role: resolve_str(entry, ROLE),
        start_date,
        end_date,
        technologies: resolve_string_list(entry, TECHNOLOGIES),
        url: resolve_str(entry, URL),
        github: resolve_str(entry, GITHUB),
        highlights,
    }
}

fn map_certification(entry: &Value) -> Option<Certification> {
    match entry {
        Value::String(name) if !name.trim().is_empty() => Some(Certification {
            name: name.trim().to_string(),
            ..Default::default()
        }),
        Value::Object(_) => Some(Certification {
            name: resolve_str(entry, CERT_NAME),
            issuer: resolve_str(entry, ISSUER),
            date: resolve_str(entry, CERT_DATE),
            url: resolve_str(entry, URL),
            credential_id: resolve_str(entry, CREDENTIAL_ID),
        }),
        _ => None,
    }
}

fn map_language(entry: &Value) -> Option<Language> {
    let (name, proficiency) = match entry {
        Value::String(name) => (name.trim().to_string(), String::new()),
        Value::Object(_) => (
            resolve_str(entry, LANGUAGE_NAME),
            resolve_str(entry, PROFICIENCY),
        ),
        _ => return None,
    };
    if name.is_empty() {
        return None;
    }
    let proficiency = if proficiency.is_empty() {
        DEFAULT_PROFICIENCY.to_string()
    } else {
        proficiency
    };
    Some(Language { name, proficiency })
}

fn map_custom_section(section: &Value) -> Option<CustomSection> {
    let title = resolve_str(section, SECTION_TITLE);
    let content = resolve_string_list(section, SECTION_ITEMS);
    if title.is_empty() && content.is_empty() {
        return None;
    }
    Some(CustomSection { title, content })
}

/// Carries AI metadata forward as a visible section so nothing is silently dropped.
fn processing_notes(ai: &Value) -> Option<CustomSection> {
    let metadata = ai.get("metadata")?;
    let mut notes = resolve_string_list(metadata, &["warnings"]);
    if metadata.get("sourceOrderPreserved").and_then(Value::as_bool) == Some(false) {
        notes.push("Section order differs from the source document".to_string());
    }
    if notes.is_empty() {
        return None;
    }
    Some(CustomSection {
        title: AI_NOTES_TITLE.to_string(),
        content: notes,
    })
}

/// Flattens `{languages, frameworks, tools, other, ...}` into one list.
/// Duplicates across categories are kept.
fn flatten_skills(skills: Option<&Value>) -> Vec<String> {
    match skills {
        Some(Value::Array(items)) => string_items(items),
        Some(Value::Object(categories)) => {
            let known = SKILL_CATEGORIES
                .iter()
                .filter_map(|key| categories.get(*key));
            let extra = categories
                .iter()
                .filter(|(key, _)| !SKILL_CATEGORIES.contains(&key.as_str()))
                .map(|(_, value)| value);

            known
                .chain(extra)
                .filter_map(Value::as_array)
                .flat_map(|items| string_items(items))
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Explicit start/end dates win; otherwise a single `dates` string is split.
fn map_dates(entry: &Value) -> (String, String) {
    let start = resolve_str(entry, START_DATE);
    let end = resolve_str(entry, END_DATE);
    if !start.is_empty() || !end.is_empty() {
        return (start, end);
    }
    split_date_range(&resolve_str(entry, DATES))
}

/// Splits `"2015 - 2019"`, `"Jan 2020 – Present"` or `"2015-2019"` into a pair.
/// An unsplittable value is taken as the end date.
pub fn split_date_range(dates: &str) -> (String, String) {
    let dates = dates.trim();
    if dates.is_empty() {
        return (String::new(), String::new());
    }

    for separator in [" - ", " – ", " — ", "–", "—", " to "] {
        if let Some((start, end)) = dates.split_once(separator) {
            return (start.trim().to_string(), end.trim().to_string());
        }
    }

    if let Some((start, end)) = dates.split_once('-') {
        if is_year(start) && is_year(end) {
            return (start.to_string(), end.to_string());
        }
    }

    (String::new(), dates.to_string())
}

fn is_year(s: &str) -> bool {
    s.len() == 4 && s.chars().all(|c| c.is_ascii_digit())
}
