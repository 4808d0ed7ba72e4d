//! Universal Resume → plain-text CV, the artifact re-submitted to the AI service
//! for "adapt to job" and "polish". Deterministic, lossy, never parsed back.

use crate::resume::adapter::AI_NOTES_TITLE;
use crate::resume::universal::{
    Certification, CustomSection, Education, Experience, Language, PersonalInfo, Project,
    UniversalResumeData,
};

const BULLET: &str = "• ";

/// Renders one banner per non-empty section, in a fixed order.
pub fn universal_to_plain_text_cv(data: &UniversalResumeData) -> String {
    let mut lines: Vec<String> = Vec::new();

    if data.personal.has_content() {
        push_section(&mut lines, "PERSONAL INFORMATION", personal_lines(&data.personal));
    }
    if !data.summary.trim().is_empty() {
        push_section(&mut lines, "PROFESSIONAL SUMMARY", vec![data.summary.clone()]);
    }
    push_entries(&mut lines, "PROFESSIONAL EXPERIENCE", &data.experience, experience_lines);
    push_entries(&mut lines, "PROJECTS", &data.projects, project_lines);
    push_entries(&mut lines, "EDUCATION", &data.education, education_lines);
    if !data.skills.is_empty() {
        push_section(&mut lines, "SKILLS", vec![data.skills.join(", ")]);
    }
    push_section(
        &mut lines,
        "CERTIFICATIONS",
        data.certifications.iter().map(certification_line).collect(),
    );
    push_section(
        &mut lines,
        "LANGUAGES",
        data.languages.iter().map(language_line).collect(),
    );
    if !data.interests.is_empty() {
        let names: Vec<&str> = data.interests.iter().map(|i| i.name.as_str()).collect();
        push_section(&mut lines, "INTERESTS", vec![names.join(", ")]);
    }
    for section in &data.custom_sections {
        push_custom_section(&mut lines, section);
    }

    lines.join("\n")
}

/// Appends `=== BANNER ===`, the body and a blank line. Empty bodies are skipped.
fn push_section(lines: &mut Vec<String>, banner: &str, body: Vec<String>) {
    if body.is_empty() {
        return;
    }
    lines.push(format!("=== {banner} ==="));
    lines.extend(body);
    lines.push(String::new());
}

/// Like `push_section`, but every entry is followed by its own blank line.
fn push_entries<T>(
    lines: &mut Vec<String>,
    banner: &str,
    entries: &[T],
    render: fn(&T) -> Vec<String>,
) {
    if entries.is_empty() {
        return;
    }
    lines.push(format!("=== {banner} ==="));
    for entry in entries {
        lines.extend(render(entry));
        lines.push(String::new());
    }
}

fn push_custom_section(lines: &mut Vec<String>, section: &CustomSection) {
    if section.title == AI_NOTES_TITLE || section.title.trim().is_empty() {
        return;
    }
    let body = section
        .content
        .iter()
        .map(|item| format!("{BULLET}{item}"))
        .collect();
    push_section(lines, &section.title.to_uppercase(), body);
}

fn personal_lines(p: &PersonalInfo) -> Vec<String> {
    [
        ("Name", &p.full_name),
        ("Title", &p.title),
        ("Email", &p.email),
        ("Phone", &p.phone),
        ("Location", &p.location),
        ("LinkedIn", &p.linked_in),
        ("GitHub", &p.github),
        ("Website", &p.website),
        ("Portfolio", &p.portfolio),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(label, value)| format!("{label}: {value}"))
    .collect()
}

fn experience_lines(exp: &Experience) -> Vec<String> {
    let mut out = vec![format!("{} at {}", exp.position, exp.company)];
    if !exp.location.is_empty() {
        out.push(format!("Location: {}", exp.location));
    }
    if let Some(period) = period(&exp.start_date, &exp.end_date) {
        out.push(format!("Period: {period}"));
    }
    if !exp.achievements.is_empty() {
        out.extend(exp.achievements.iter().map(|a| format!("{BULLET}{a}")));
    } else if !exp.description.is_empty() {
        out.push(exp.description.clone());
    }
    out
}

fn project_lines(proj: &Project) -> Vec<String> {
    let mut out = vec![proj.name.clone()];
    if !proj.url.is_empty() {
        out.push(format!("URL: {}", proj.url));
    }
    if !proj.technologies.is_empty() {
        out.push(format!("Technologies: {}", proj.technologies.join(", ")));
    }
    if !proj.highlights.is_empty() {
        out.extend(proj.highlights.iter().map(|h| format!("{BULLET}{h}")));
    } else if !proj.description.is_empty() {
        out.push(proj.description.clone());
    }
    out
}

fn education_lines(edu: &Education) -> Vec<String> {
    let degree = if edu.degree.is_empty() { "Degree" } else { edu.degree.as_str() };
    let mut out = vec![format!("{degree} - {}", edu.institution)];
    if !edu.field.is_empty() {
        out.push(format!("Field: {}", edu.field));
    }
    if !edu.location.is_empty() {
        out.push(format!("Location: {}", edu.location));
    }
    if let Some(period) = period(&edu.start_date, &edu.end_date) {
        out.push(format!("Period: {period}"));
    }
    if !edu.gpa.is_empty() {
        out.push(format!("GPA: {}", edu.gpa));
    }
    if !edu.honors.is_empty() {
        out.push(format!("Honors: {}", edu.honors.join(", ")));
    }
    out
}

fn certification_line(cert: &Certification) -> String {
    let details: Vec<&str> = [cert.issuer.as_str(), cert.date.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    if details.is_empty() {
        cert.name.clone()
    } else {
        format!("{} ({})", cert.name, details.join(", "))
    }
}

fn language_line(lang: &Language) -> String {
    if lang.proficiency.is_empty() {
        lang.name.clone()
    } else {
        format!("{} ({})", lang.name, lang.proficiency)
    }
}

fn period(start: &str, end: &str) -> Option<String> {
    let parts: Vec<&str> = [start, end].into_iter().filter(|s| !s.is_empty()).collect();
    (!parts.is_empty()).then(|| parts.join(" - "))
}
