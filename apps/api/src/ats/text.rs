//! Word lists and text heuristics shared by the ATS checks.

use std::collections::HashMap;

const STOPWORDS: &[&str] = &[
    // English
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not", "on",
    "with", "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they", "we",
    "say", "her", "she", "or", "an", "will", "my", "one", "all", "would", "there", "their",
    "was", "were", "been", "has", "had", "are", "is", "am", "me", "him", "can", "could",
    "should", "may", "might", "must", "shall", "who", "what", "when", "where", "why", "how",
    "which", "whom", "into", "onto", "upon", "over", "under", "about", "after", "before",
    "our", "your", "work", "working", "team", "role", "years", "experience", "strong",
    "ability", "including", "etc",
    // French
    "le", "la", "les", "un", "une", "des", "du", "de", "au", "aux", "et", "ou", "mais", "pour",
    "dans", "sur", "avec", "sans", "par", "en", "nous", "vous", "est", "sont", "qui", "que",
    // Spanish
    "el", "los", "las", "y", "o", "pero", "como", "del", "al", "con", "sin", "es", "son",
    // German
    "der", "die", "das", "und", "oder", "mit", "von", "zu", "bei", "nach", "ist", "sind",
];

pub const STRONG_ACTION_VERBS: &[&str] = &[
    "led", "built", "designed", "implemented", "optimized", "launched", "created", "developed",
    "engineered", "architected", "established", "spearheaded", "drove", "accelerated",
    "delivered", "achieved", "reduced", "increased", "improved", "transformed", "streamlined",
    "automated", "scaled", "migrated", "deployed", "integrated", "managed", "negotiated",
    "mentored", "founded",
];

pub const BUZZWORDS: &[&str] = &[
    "team player", "hard-working", "hardworking", "dynamic", "innovative", "results-driven",
    "results driven", "passionate", "detail-oriented", "detail oriented", "synergy",
    "leverage", "paradigm", "holistic", "strategic thinker", "go-getter", "self-starter",
    "out of the box", "think outside the box", "hit the ground running", "low-hanging fruit",
    "best of breed", "world-class", "best in class", "motivated", "dedicated",
];

const VAGUE_PHRASES: &[&str] = &[
    "responsible for",
    "worked on",
    "helped",
    "assisted",
    "participated",
    "involved in",
];

const METRIC_WORDS: &[&str] = &["increased", "reduced", "improved", "grew", "saved"];

/// Technical terms picked out of job descriptions regardless of frequency.
/// Multi-word terms are matched as consecutive tokens.
const TECH_TERMS: &[&str] = &[
    "react", "angular", "vue", "node.js", "nodejs", "python", "java", "javascript",
    "typescript", "c++", "c#", "ruby", "go", "rust", "swift", "kotlin", "aws", "azure", "gcp",
    "docker", "kubernetes", "k8s", "terraform", "jenkins", "git", "github", "gitlab", "sql",
    "nosql", "mongodb", "postgresql", "mysql", "redis", "elasticsearch", "machine learning",
    "deep learning", "artificial intelligence", "computer vision", "ml", "ai", "nlp", "agile",
    "scrum", "kanban", "devops", "ci/cd", "tdd", "bdd", "rest", "api", "graphql",
    "microservices", "serverless",
];

const SYNONYMS: &[(&str, &[&str])] = &[
    ("javascript", &["js", "ecmascript"]),
    ("typescript", &["ts"]),
    ("machine learning", &["ml", "machine-learning"]),
    ("artificial intelligence", &["ai", "a.i."]),
    ("node.js", &["nodejs", "node"]),
    ("react.js", &["react", "reactjs"]),
    ("kubernetes", &["k8s"]),
    ("python", &["py"]),
];

const UNPROFESSIONAL_EMAIL_WORDS: &[&str] = &[
    "cool", "party", "sexy", "fun", "crazy", "dude", "bro", "chick", "baby",
];

const MAX_JOB_KEYWORDS: usize = 25;
const FREQUENT_JOB_WORDS: usize = 10;

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Lower-cased tokens, keeping the inner punctuation of terms like `node.js`,
/// `c++`, `c#` and `ci/cd`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '.' | '+' | '#' | '/' | '-' | '\'')))
        .map(|t| t.trim_matches(|c: char| matches!(c, '.' | '/' | '-' | '\'')))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn starts_with_strong_verb(bullet: &str) -> bool {
    bullet
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphabetic()).to_lowercase())
        .find(|w| !w.is_empty())
        .is_some_and(|w| STRONG_ACTION_VERBS.contains(&w.as_str()))
}

/// Percentages, `10+`, `$500`, `3x`, or an outcome verb.
pub fn has_metric(bullet: &str) -> bool {
    let chars: Vec<char> = bullet.chars().collect();
    let numeric = chars.windows(2).any(|w| match (w[0], w[1]) {
        (d, '%' | '+' | 'x' | 'X') if d.is_ascii_digit() => true,
        ('$' | '€' | '£', d) if d.is_ascii_digit() => true,
        _ => false,
    });
    if numeric {
        return true;
    }
    let lower = bullet.to_lowercase();
    METRIC_WORDS.iter().any(|w| lower.contains(w))
}

pub fn is_vague(bullet: &str) -> bool {
    let lower = bullet.to_lowercase();
    VAGUE_PHRASES.iter().any(|p| lower.contains(p))
}

pub fn detect_buzzwords(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    BUZZWORDS
        .iter()
        .copied()
        .filter(|b| lower.contains(b))
        .collect()
}

/// No slang in the local part and at most three digits.
pub fn is_professional_email(email: &str) -> bool {
    let email = email.trim().to_lowercase();
    let Some((local, _domain)) = email.split_once('@') else {
        return false;
    };
    let slang = local
        .split(|c: char| !c.is_alphanumeric())
        .any(|part| UNPROFESSIONAL_EMAIL_WORDS.contains(&part));
    let digits = local.chars().filter(char::is_ascii_digit).count();
    !slang && digits <= 3
}

/// Most frequent non-stopword terms (longer than two characters), ties broken
/// by first appearance.
pub fn top_words(text: &str, top_n: usize) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut freq: HashMap<String, usize> = HashMap::new();

    for token in tokenize(text) {
        if token.chars().count() <= 2 || STOPWORDS.contains(&token.as_str()) {
            continue;
        }
        let count = freq.entry(token.clone()).or_insert(0);
        if *count == 0 {
            order.push(token);
        }
        *count += 1;
    }

    let mut words: Vec<(String, usize)> = order
        .into_iter()
        .map(|w| {
            let count = freq[&w];
            (w, count)
        })
        .collect();
    // Stable sort keeps first-appearance order among equal counts.
    words.sort_by(|a, b| b.1.cmp(&a.1));
    words.truncate(top_n);
    words
}

/// Technical terms in order of appearance, then the most frequent words,
/// de-duplicated and capped.
pub fn extract_job_keywords(job_description: &str) -> Vec<String> {
    if job_description.trim().is_empty() {
        return Vec::new();
    }

    let tokens = tokenize(job_description);
    let terms: Vec<(&str, Vec<String>)> = TECH_TERMS.iter().map(|t| (*t, tokenize(t))).collect();
    let mut keywords: Vec<String> = Vec::new();

    for i in 0..tokens.len() {
        for (term, parts) in &terms {
            if !parts.is_empty() && tokens[i..].starts_with(parts) {
                push_unique(&mut keywords, term.to_string());
            }
        }
    }

    for (word, _) in top_words(job_description, FREQUENT_JOB_WORDS) {
        push_unique(&mut keywords, word);
    }

    keywords.truncate(MAX_JOB_KEYWORDS);
    keywords
}

/// Whole-token match of `keyword` (or one of its synonyms) against tokens
/// produced by [`tokenize`]. Multi-word keywords match consecutive tokens.
pub fn contains_keyword(resume_tokens: &[String], keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    if contains_phrase(resume_tokens, &tokenize(&keyword)) {
        return true;
    }
    SYNONYMS
        .iter()
        .find(|(k, _)| *k == keyword)
        .is_some_and(|(_, syns)| syns.iter().any(|s| contains_phrase(resume_tokens, &tokenize(s))))
}

fn contains_phrase(tokens: &[String], phrase: &[String]) -> bool {
    !phrase.is_empty() && tokens.windows(phrase.len()).any(|window| window == phrase)
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}
