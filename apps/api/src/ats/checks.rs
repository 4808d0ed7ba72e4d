//! Individual ATS checks. Each scores 0–100 and never fails.

use serde::{Deserialize, Serialize};

use crate::ats::text::{
    contains_keyword, count_words, extract_job_keywords, has_metric, is_professional_email,
    is_vague, starts_with_strong_verb, tokenize,
};
use crate::resume::universal::{PersonalInfo, UniversalResumeData};

const NO_JOB_DESCRIPTION_BASELINE: u32 = 75;
const MIN_WORDS: usize = 250;
const MAX_WORDS: usize = 1200;
const LONG_BULLET_WORDS: usize = 35;
const MAX_LONG_BULLET_EXAMPLES: usize = 5;
const WORDY_BULLET_WORDS: usize = 22;
const MAX_IMPACT_BULLETS: usize = 15;
const WEAKEST_BULLET_EXAMPLES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Excellent,
    Good,
    NeedsImprovement,
    Poor,
}

impl SectionStatus {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => SectionStatus::Excellent,
            75..=89 => SectionStatus::Good,
            50..=74 => SectionStatus::NeedsImprovement,
            _ => SectionStatus::Poor,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EssentialSectionsCheck {
    pub score: u32,
    pub status: SectionStatus,
    pub has_experience: bool,
    pub has_education: bool,
    pub has_skills: bool,
    pub suggestions: Vec<String>,
}

pub fn check_essential_sections(resume: &UniversalResumeData) -> EssentialSectionsCheck {
    let has_experience = !resume.experience.is_empty();
    let has_education = !resume.education.is_empty();
    let has_skills = !resume.skills.is_empty();

    let score = [(has_experience, 40u32), (has_education, 30), (has_skills, 30)]
        .into_iter()
        .filter(|(present, _)| *present)
        .map(|(_, points)| points)
        .sum();

    let mut suggestions = Vec::new();
    for (present, name) in [
        (has_experience, "Experience"),
        (has_education, "Education"),
        (has_skills, "Skills"),
    ] {
        if !present {
            suggestions.push(format!("Add a clearly labelled \"{name}\" section."));
        }
    }

    EssentialSectionsCheck {
        score,
        status: SectionStatus::from_score(score),
        has_experience,
        has_education,
        has_skills,
        suggestions,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactInfoCheck {
    pub score: u32,
    pub status: SectionStatus,
    pub has_email: bool,
    pub email_professional: bool,
    pub has_phone: bool,
    pub has_location: bool,
    pub has_linkedin_or_website: bool,
    pub suggestions: Vec<String>,
}

pub fn check_contact_info(personal: &PersonalInfo) -> ContactInfoCheck {
    let has_email = personal.email.contains('@');
    let email_professional = has_email && is_professional_email(&personal.email);
    let has_phone = !personal.phone.trim().is_empty();
    let has_location = !personal.location.trim().is_empty();
    let has_linkedin_or_website = [
        &personal.linked_in,
        &personal.website,
        &personal.github,
        &personal.portfolio,
    ]
    .iter()
    .any(|link| !link.trim().is_empty());

    let score = [
        (has_email, 30u32),
        (email_professional, 20),
        (has_phone, 20),
        (has_location, 10),
        (has_linkedin_or_website, 20),
    ]
    .into_iter()
    .filter(|(present, _)| *present)
    .map(|(_, points)| points)
    .sum();

    let mut suggestions = Vec::new();
    if !has_email {
        suggestions.push("Add an email address at the top of your resume.".to_string());
    } else if !email_professional {
        suggestions.push(
            "Use a professional email (firstname.lastname@domain.com), avoid nicknames."
                .to_string(),
        );
    }
    if !has_phone {
        suggestions.push("Add a phone number.".to_string());
    }
    if !has_location {
        suggestions.push("Indicate your location (City, Country).".to_string());
    }
    if !has_linkedin_or_website {
        suggestions.push("Add your LinkedIn profile or a portfolio link.".to_string());
    }

    ContactInfoCheck {
        score,
        status: SectionStatus::from_score(score),
        has_email,
        email_professional,
        has_phone,
        has_location,
        has_linkedin_or_website,
        suggestions,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LengthCheck {
    pub score: u32,
    pub status: SectionStatus,
    pub word_count: usize,
    /// `"1"`, `"2"` or `"3+"`.
    pub estimated_pages: String,
    pub long_bullets: Vec<String>,
    pub suggestions: Vec<String>,
}

pub fn estimate_pages(word_count: usize) -> &'static str {
    match word_count {
        0..=549 => "1",
        550..=1099 => "2",
        _ => "3+",
    }
}

pub fn check_length(text: &str, bullets: &[&str]) -> LengthCheck {
    let word_count = count_words(text);
    let long_bullets: Vec<String> = bullets
        .iter()
        .filter(|b| count_words(b) > LONG_BULLET_WORDS)
        .take(MAX_LONG_BULLET_EXAMPLES)
        .map(|b| b.to_string())
        .collect();

    let mut score: i32 = 100;
    let mut suggestions = Vec::new();
    if word_count < MIN_WORDS {
        score -= 20;
        suggestions.push(format!(
            "Resume too short ({word_count} words). Add more detail about your experience and skills."
        ));
    } else if word_count > MAX_WORDS {
        score -= 20;
        suggestions.push(format!(
            "Resume too long ({word_count} words). Focus on the last 10 years and the most relevant roles."
        ));
    }
    score -= 5 * long_bullets.len() as i32;
    if !long_bullets.is_empty() {
        suggestions.push(format!(
            "{} bullets exceed {LONG_BULLET_WORDS} words. Shorten them to 20-30 words.",
            long_bullets.len()
        ));
    }

    let score = score.clamp(0, 100) as u32;
    LengthCheck {
        score,
        status: SectionStatus::from_score(score),
        word_count,
        estimated_pages: estimate_pages(word_count).to_string(),
        long_bullets,
        suggestions,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BulletFinding {
    pub bullet: String,
    pub score: u32,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactCheck {
    pub score: u32,
    pub status: SectionStatus,
    pub bullets_analyzed: usize,
    pub strong_verb_count: usize,
    pub metrics_count: usize,
    pub vague_count: usize,
    /// Lowest-scoring bullets, worst first.
    pub weakest_bullets: Vec<BulletFinding>,
}

pub fn score_bullet(bullet: &str) -> BulletFinding {
    let mut score: i32 = 100;
    let mut issues = Vec::new();

    if !starts_with_strong_verb(bullet) {
        score -= 30;
        issues.push("lacks strong action verb".to_string());
    }
    if !has_metric(bullet) {
        score -= 10;
        issues.push("no quantifiable metric".to_string());
    }
    if is_vague(bullet) {
        score -= 20;
        issues.push("vague phrasing".to_string());
    }
    if count_words(bullet) > WORDY_BULLET_WORDS {
        score -= 10;
        issues.push("too long".to_string());
    }

    BulletFinding {
        bullet: bullet.to_string(),
        score: score.max(0) as u32,
        issues,
    }
}

pub fn check_impact(bullets: &[&str]) -> ImpactCheck {
    let findings: Vec<BulletFinding> = bullets
        .iter()
        .take(MAX_IMPACT_BULLETS)
        .map(|b| score_bullet(b))
        .collect();

    let score = if findings.is_empty() {
        0
    } else {
        let total: u32 = findings.iter().map(|f| f.score).sum();
        (total as f64 / findings.len() as f64).round() as u32
    };

    let analyzed = &bullets[..findings.len()];
    let strong_verb_count = analyzed.iter().filter(|b| starts_with_strong_verb(b)).count();
    let metrics_count = analyzed.iter().filter(|b| has_metric(b)).count();
    let vague_count = analyzed.iter().filter(|b| is_vague(b)).count();

    let mut weakest = findings.clone();
    weakest.sort_by_key(|f| f.score);
    weakest.truncate(WEAKEST_BULLET_EXAMPLES);

    ImpactCheck {
        score,
        status: SectionStatus::from_score(score),
        bullets_analyzed: findings.len(),
        strong_verb_count,
        metrics_count,
        vague_count,
        weakest_bullets: weakest,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordsCheck {
    pub score: u32,
    pub status: SectionStatus,
    pub job_description_provided: bool,
    pub present_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub suggestions: Vec<String>,
}

/// `resume_text` should carry résumé content only, without rendered labels or
/// banners, so that words like "Email" never count as matches.
pub fn check_keywords(resume_text: &str, job_description: Option<&str>) -> KeywordsCheck {
    let Some(jd) = job_description.filter(|jd| !jd.trim().is_empty()) else {
        return KeywordsCheck {
            score: NO_JOB_DESCRIPTION_BASELINE,
            status: SectionStatus::from_score(NO_JOB_DESCRIPTION_BASELINE),
            job_description_provided: false,
            present_keywords: Vec::new(),
            missing_keywords: Vec::new(),
            suggestions: vec![
                "Paste a job description to check keyword coverage.".to_string(),
            ],
        };
    };

    let resume_tokens = tokenize(resume_text);
    let (present_keywords, missing_keywords): (Vec<String>, Vec<String>) =
        extract_job_keywords(jd)
            .into_iter()
            .partition(|k| contains_keyword(&resume_tokens, k));

    let total = present_keywords.len() + missing_keywords.len();
    let score = if total == 0 {
        0
    } else {
        (present_keywords.len() as f64 / total as f64 * 100.0).round() as u32
    };

    let mut suggestions = Vec::new();
    if !missing_keywords.is_empty() {
        let top: Vec<&str> = missing_keywords.iter().take(5).map(String::as_str).collect();
        suggestions.push(format!(
            "Important missing keywords: {}. Add them if you have these skills.",
            top.join(", ")
        ));
    }

    KeywordsCheck {
        score,
        status: SectionStatus::from_score(score),
        job_description_provided: true,
        present_keywords,
        missing_keywords,
        suggestions,
    }
}
