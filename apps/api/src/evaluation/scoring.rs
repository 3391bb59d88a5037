//! Resume scoring — keyword category matching plus an experience-duration
//! estimate, combined into a fixed-weight overall score.
//!
//! Pure and deterministic (modulo the `Present` anchor): no I/O, no LLM call.
//! Malformed input never errors — unparseable fragments degrade to 0.

use chrono::{DateTime, Datelike, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Keyword sets
// ────────────────────────────────────────────────────────────────────────────

// All keywords lowercase; matching lowercases the text once.
pub const AI_ML_KEYWORDS: &[&str] = &[
    "machine learning",
    "ml",
    "artificial intelligence",
    "ai",
    "deep learning",
    "neural network",
    "tensorflow",
];

pub const LLM_KEYWORDS: &[&str] = &[
    "llm",
    "transformer",
    "langchain",
    "huggingface",
    "fine-tuning",
    "generative ai",
    "llama",
    "gemini",
];

pub const PYTHON_KEYWORDS: &[&str] = &["python"];

/// Category weights for the overall score: AI/ML, LLM, Python, experience.
const WEIGHTS: (f64, f64, f64, f64) = (0.3, 0.2, 0.3, 0.2);

/// Years of experience at which the experience score saturates at 100.
const FULL_EXPERIENCE_YEARS: f64 = 5.0;

// ────────────────────────────────────────────────────────────────────────────
// Output data model
// ────────────────────────────────────────────────────────────────────────────

/// Full scoring result for one resume. Every field is in [0, 100],
/// rounded to 2 decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub ai_ml_match: f64,
    pub llm_match: f64,
    pub python_match: f64,
    pub experience_match: f64,
    pub overall_score: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Public entry points
// ────────────────────────────────────────────────────────────────────────────

/// Scores a resume text. `Present` date ranges resolve against the current
/// month at call time.
pub fn evaluate(text: &str) -> Scores {
    evaluate_at(text, Utc::now())
}

/// Same as [`evaluate`] with an explicit `Present` anchor, so experience
/// scoring is deterministic under test.
pub fn evaluate_at(text: &str, now: DateTime<Utc>) -> Scores {
    let ai_ml = round2(keyword_match_score(text, AI_ML_KEYWORDS));
    let llm = round2(keyword_match_score(text, LLM_KEYWORDS));
    let python = round2(keyword_match_score(text, PYTHON_KEYWORDS));

    let years = extract_years_of_experience(text, now);
    let experience = round2(experience_score(years));

    // Overall is a function of the stored (rounded) category scores, so a
    // persisted record can always be re-derived from its components.
    let (w_ai, w_llm, w_py, w_exp) = WEIGHTS;
    let overall = round2(ai_ml * w_ai + llm * w_llm + python * w_py + experience * w_exp);

    Scores {
        ai_ml_match: ai_ml,
        llm_match: llm,
        python_match: python,
        experience_match: experience,
        overall_score: overall,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Keyword matching
// ────────────────────────────────────────────────────────────────────────────

/// Percentage of `keywords` present as case-insensitive substrings of `text`.
/// Each keyword counts at most once regardless of repetition.
/// An empty keyword set scores 0 — defined, not an error.
pub fn keyword_match_score(text: &str, keywords: &[&str]) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    let haystack = text.to_lowercase();
    let matched = keywords.iter().filter(|kw| haystack.contains(*kw)).count();
    ((matched as f64 / keywords.len() as f64) * 100.0).min(100.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Experience extraction
// ────────────────────────────────────────────────────────────────────────────

lazy_static! {
    // Date ranges like "07/2024 - Present" or "05/2022 - 11/2023",
    // whitespace-tolerant around the hyphen.
    static ref DATE_RANGE: Regex =
        Regex::new(r"(?i)(\d{2}/\d{4})\s*-\s*(Present|\d{2}/\d{4})").expect("valid regex");
}

/// Sums the duration of every `MM/YYYY - MM/YYYY` (or `- Present`) range in
/// the text, in years rounded to 2 decimals.
///
/// Overlapping ranges are summed independently — concurrent positions
/// double-count by design. An invalid month (e.g. `13/2020`) aborts the
/// whole extraction and yields 0.0; this function never errors.
pub fn extract_years_of_experience(text: &str, now: DateTime<Utc>) -> f64 {
    let now_index = now.year() * 12 + now.month() as i32;

    let mut total_months = 0i32;
    for caps in DATE_RANGE.captures_iter(text) {
        let start = match month_index(&caps[1]) {
            Some(idx) => idx,
            None => return 0.0,
        };
        let end = if caps[2].eq_ignore_ascii_case("present") {
            now_index
        } else {
            match month_index(&caps[2]) {
                Some(idx) => idx,
                None => return 0.0,
            }
        };
        total_months += end - start;
    }

    round2(total_months as f64 / 12.0)
}

/// Months-since-year-zero index of an `MM/YYYY` token.
/// `None` if the month is outside 1–12 or the year is not a calendar year,
/// the same values a `(year, month, 1)` date constructor would reject.
fn month_index(token: &str) -> Option<i32> {
    let (month, year) = token.split_once('/')?;
    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    if !(1..=12).contains(&month) || year < 1 {
        return None;
    }
    Some(year * 12 + month as i32)
}

/// Saturates at 100 for five or more years; clamped below at 0 so an
/// end-before-start range cannot push the score negative.
fn experience_score(years: f64) -> f64 {
    if years >= FULL_EXPERIENCE_YEARS {
        100.0
    } else {
        ((years / FULL_EXPERIENCE_YEARS) * 100.0).max(0.0)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
