//! Persistence for evaluation records.
//!
//! Every lookup and delete carries the requesting user's id in the WHERE
//! clause, so cross-user access is impossible by construction.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::scoring::Scores;
use crate::models::evaluation::ResumeEvaluation;

const COLUMNS: &str = "id, user_id, filename, resume_text, ai_ml_match, llm_match, \
                       python_match, experience_match, overall_score, created_at, updated_at";

/// Inserts a new evaluation and returns its id.
pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    filename: &str,
    resume_text: &str,
    scores: &Scores,
) -> Result<Uuid, AppError> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO resume_evaluations
            (user_id, filename, resume_text,
             ai_ml_match, llm_match, python_match, experience_match, overall_score)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(filename)
    .bind(resume_text)
    .bind(scores.ai_ml_match)
    .bind(scores.llm_match)
    .bind(scores.python_match)
    .bind(scores.experience_match)
    .bind(scores.overall_score)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// All evaluations owned by `user_id`, newest first.
pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<ResumeEvaluation>, AppError> {
    let rows = sqlx::query_as::<_, ResumeEvaluation>(&format!(
        "SELECT {COLUMNS} FROM resume_evaluations WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Single evaluation by id, scoped to its owner.
pub async fn find_by_id(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<ResumeEvaluation>, AppError> {
    let row = sqlx::query_as::<_, ResumeEvaluation>(&format!(
        "SELECT {COLUMNS} FROM resume_evaluations WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Deletes one evaluation; `false` if it did not exist or belongs to
/// another user.
pub async fn delete_by_id(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM resume_evaluations WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Deletes every listed evaluation the user owns; returns the count deleted.
/// Ids owned by other users are silently skipped.
pub async fn delete_batch(pool: &PgPool, ids: &[Uuid], user_id: Uuid) -> Result<u64, AppError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let result =
        sqlx::query("DELETE FROM resume_evaluations WHERE id = ANY($1) AND user_id = $2")
            .bind(ids)
            .bind(user_id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected())
}

/// Deletes all of the user's evaluations; returns the count deleted.
pub async fn delete_all(pool: &PgPool, user_id: Uuid) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM resume_evaluations WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

// Integration tests against a live database. Run explicitly with
// `cargo test -- --ignored` and DATABASE_URL pointing at a scratch Postgres.
#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    const SCHEMA: &str = include_str!("../../migrations/001_init.sql");

    async fn test_pool() -> PgPool {
        let url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set for ignored database tests");
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("connect to test database");
        for statement in SCHEMA.split(';') {
            let statement = statement.trim();
            if !statement.is_empty() {
                sqlx::query(statement)
                    .execute(&pool)
                    .await
                    .expect("apply schema");
            }
        }
        pool
    }

    async fn create_user(pool: &PgPool) -> Uuid {
        sqlx::query_scalar(
            "INSERT INTO users (email, name, password_hash) VALUES ($1, 'Test', 'x') RETURNING id",
        )
        .bind(format!("{}@example.com", Uuid::new_v4()))
        .fetch_one(pool)
        .await
        .expect("insert test user")
    }

    async fn drop_user(pool: &PgPool, user_id: Uuid) {
        // Evaluations cascade with the user row.
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(pool)
            .await
            .expect("delete test user");
    }

    fn sample_scores() -> Scores {
        Scores {
            ai_ml_match: 42.86,
            llm_match: 25.0,
            python_match: 100.0,
            experience_match: 60.0,
            overall_score: 59.86,
        }
    }

    #[tokio::test]
    #[ignore]
    async fn test_create_then_find_round_trip() {
        let pool = test_pool().await;
        let owner = create_user(&pool).await;

        let scores = sample_scores();
        let id = create(&pool, owner, "cv.pdf", "python tensorflow", &scores)
            .await
            .unwrap();

        let row = find_by_id(&pool, id, owner).await.unwrap().unwrap();
        assert_eq!(row.filename, "cv.pdf");
        assert_eq!(row.resume_text, "python tensorflow");
        assert_eq!(row.ai_ml_match, scores.ai_ml_match);
        assert_eq!(row.llm_match, scores.llm_match);
        assert_eq!(row.python_match, scores.python_match);
        assert_eq!(row.experience_match, scores.experience_match);
        assert_eq!(row.overall_score, scores.overall_score);

        drop_user(&pool, owner).await;
    }

    #[tokio::test]
    #[ignore]
    async fn test_cross_user_find_is_not_found() {
        let pool = test_pool().await;
        let owner = create_user(&pool).await;
        let other = create_user(&pool).await;

        let id = create(&pool, owner, "cv.pdf", "text", &sample_scores())
            .await
            .unwrap();

        assert!(find_by_id(&pool, id, other).await.unwrap().is_none());
        assert!(find_by_id(&pool, id, owner).await.unwrap().is_some());

        drop_user(&pool, owner).await;
        drop_user(&pool, other).await;
    }

    #[tokio::test]
    #[ignore]
    async fn test_cross_user_delete_never_succeeds() {
        let pool = test_pool().await;
        let owner = create_user(&pool).await;
        let other = create_user(&pool).await;

        let id = create(&pool, owner, "cv.pdf", "text", &sample_scores())
            .await
            .unwrap();

        assert!(!delete_by_id(&pool, id, other).await.unwrap());
        assert_eq!(delete_batch(&pool, &[id], other).await.unwrap(), 0);
        // Still present for its owner, and the owner can delete it.
        assert!(find_by_id(&pool, id, owner).await.unwrap().is_some());
        assert!(delete_by_id(&pool, id, owner).await.unwrap());

        drop_user(&pool, owner).await;
        drop_user(&pool, other).await;
    }

    #[tokio::test]
    #[ignore]
    async fn test_list_is_owner_scoped_newest_first() {
        let pool = test_pool().await;
        let owner = create_user(&pool).await;
        let other = create_user(&pool).await;

        let first = create(&pool, owner, "a.pdf", "t", &sample_scores())
            .await
            .unwrap();
        // created_at has finite resolution; keep the insert order observable
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let second = create(&pool, owner, "b.pdf", "t", &sample_scores())
            .await
            .unwrap();
        create(&pool, other, "c.pdf", "t", &sample_scores())
            .await
            .unwrap();

        let rows = list_by_user(&pool, owner).await.unwrap();
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second, first]);

        drop_user(&pool, owner).await;
        drop_user(&pool, other).await;
    }
}
