use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Full evaluation row, including the extracted resume text.
#[derive(Debug, Clone, FromRow)]
pub struct ResumeEvaluation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub resume_text: String,
    pub ai_ml_match: f64,
    pub llm_match: f64,
    pub python_match: f64,
    pub experience_match: f64,
    pub overall_score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The four per-category scores, nested under `scores` in responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub ai_ml_match: f64,
    pub llm_match: f64,
    pub python_match: f64,
    pub experience_match: f64,
}

/// Client-facing evaluation shape. Omits the stored resume text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub id: Uuid,
    pub filename: String,
    pub scores: CategoryScores,
    pub overall_score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ResumeEvaluation> for EvaluationSummary {
    fn from(row: ResumeEvaluation) -> Self {
        EvaluationSummary {
            id: row.id,
            filename: row.filename,
            scores: CategoryScores {
                ai_ml_match: row.ai_ml_match,
                llm_match: row.llm_match,
                python_match: row.python_match,
                experience_match: row.experience_match,
            },
            overall_score: row.overall_score,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
