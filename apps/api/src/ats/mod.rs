//! ATS report: a heuristic estimate of how well a résumé survives an
//! Applicant Tracking System, scored over four equally weighted pillars.
//!
//! Everything here is pure: the report is a function of the résumé and the
//! optional job description.

pub mod checks;
pub mod handlers;
pub mod text;

use serde::{Deserialize, Serialize};

use crate::ats::checks::{
    check_contact_info, check_essential_sections, check_impact, check_keywords, check_length,
    ContactInfoCheck, EssentialSectionsCheck, ImpactCheck, KeywordsCheck, LengthCheck,
    SectionStatus,
};
use crate::ats::text::detect_buzzwords;
use crate::resume::adapter::AI_NOTES_TITLE;
use crate::resume::universal_to_plain_text_cv;
use crate::resume::UniversalResumeData;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScorePillars {
    pub technical_ats: u32,
    pub content_quality: u32,
    pub impact_specificity: u32,
    pub relevance_keywords: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtsSections {
    pub essential_sections: EssentialSectionsCheck,
    pub contact_info: ContactInfoCheck,
    pub length_and_bullets: LengthCheck,
    pub quantify_impact: ImpactCheck,
    pub keywords_relevance: KeywordsCheck,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtsReport {
    pub global_score: u32,
    pub status: SectionStatus,
    pub pillars: ScorePillars,
    pub sections: AtsSections,
    pub buzzwords: Vec<String>,
}

pub fn build_ats_report(resume: &UniversalResumeData, job_description: Option<&str>) -> AtsReport {
    let text = universal_to_plain_text_cv(resume);
    let bullets = collect_bullets(resume);

    let sections = AtsSections {
        essential_sections: check_essential_sections(resume),
        contact_info: check_contact_info(&resume.personal),
        length_and_bullets: check_length(&text, &bullets),
        quantify_impact: check_impact(&bullets),
        keywords_relevance: check_keywords(&keyword_text(resume), job_description),
    };

    let pillars = ScorePillars {
        technical_ats: sections.essential_sections.score,
        content_quality: sections.length_and_bullets.score,
        impact_specificity: (0.75 * sections.quantify_impact.score as f64
            + 0.25 * sections.contact_info.score as f64)
            .round() as u32,
        relevance_keywords: sections.keywords_relevance.score,
    };
    let global_score = global_score(&pillars);

    AtsReport {
        global_score,
        status: SectionStatus::from_score(global_score),
        pillars,
        buzzwords: detect_buzzwords(&text).into_iter().map(String::from).collect(),
        sections,
    }
}

fn global_score(p: &ScorePillars) -> u32 {
    let sum = p.technical_ats + p.content_quality + p.impact_specificity + p.relevance_keywords;
    (sum as f64 / 4.0).round() as u32
}

/// What the candidate wrote, minus contact details and rendering labels.
fn keyword_text(resume: &UniversalResumeData) -> String {
    let mut parts: Vec<&str> = vec![resume.personal.title.as_str(), resume.summary.as_str()];
    for exp in &resume.experience {
        parts.extend([exp.position.as_str(), exp.company.as_str(), exp.description.as_str()]);
        parts.extend(exp.achievements.iter().map(String::as_str));
        parts.extend(exp.technologies.iter().map(String::as_str));
    }
    for proj in &resume.projects {
        parts.extend([proj.name.as_str(), proj.role.as_str(), proj.description.as_str()]);
        parts.extend(proj.highlights.iter().map(String::as_str));
        parts.extend(proj.technologies.iter().map(String::as_str));
    }
    for edu in &resume.education {
        parts.extend([edu.degree.as_str(), edu.field.as_str(), edu.institution.as_str()]);
        parts.extend(edu.coursework.iter().map(String::as_str));
    }
    parts.extend(resume.skills.iter().map(String::as_str));
    for cert in &resume.certifications {
        parts.extend([cert.name.as_str(), cert.issuer.as_str()]);
    }
    parts.extend(resume.languages.iter().map(|l| l.name.as_str()));
    parts.extend(resume.interests.iter().map(|i| i.name.as_str()));
    for section in resume.custom_sections.iter().filter(|s| s.title != AI_NOTES_TITLE) {
        parts.extend(section.content.iter().map(String::as_str));
    }
    parts.retain(|p| !p.is_empty());
    parts.join("\n")
}

/// Experience achievements, then project highlights. Entries without bullets
/// contribute their description lines instead.
fn collect_bullets(resume: &UniversalResumeData) -> Vec<&str> {
    let mut bullets = Vec::new();
    for exp in &resume.experience {
        if exp.achievements.is_empty() {
            bullets.extend(description_lines(&exp.description));
        } else {
            bullets.extend(exp.achievements.iter().map(String::as_str));
        }
    }
    for proj in &resume.projects {
        bullets.extend(proj.highlights.iter().map(String::as_str));
    }
    bullets.retain(|b| !b.trim().is_empty());
    bullets
}

fn description_lines(description: &str) -> impl Iterator<Item = &str> {
    description
        .lines()
        .map(|l| l.trim().trim_start_matches(['-', '•', '*']).trim())
}
