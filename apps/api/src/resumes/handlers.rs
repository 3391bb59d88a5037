//! Resume endpoints: multipart upload pipeline plus per-user CRUD.

use std::io::Write;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::guard::AuthUser;
use crate::errors::AppError;
use crate::evaluation::scoring::{self, Scores};
use crate::evaluation::store;
use crate::models::evaluation::EvaluationSummary;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResult {
    pub id: Uuid,
    pub filename: String,
    pub scores: Scores,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub results: Vec<UploadResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<EvaluationSummary>,
}

#[derive(Debug, Deserialize)]
pub struct BatchDeleteRequest {
    // A body without the field deletes nothing rather than failing to parse.
    #[serde(default)]
    pub resume_ids: Vec<String>,
}

/// POST /api/resumes/upload
///
/// Processes each `files` part independently: a failed file records a
/// per-file error and never aborts its siblings. 200 if at least one file
/// succeeded, 400 otherwise.
pub async fn upload_resumes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let mut results = Vec::new();
    let mut errors = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("files") {
            continue;
        }
        let filename = match field.file_name().map(sanitize_filename) {
            Some(name) if !name.is_empty() => name,
            _ => continue,
        };
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                errors.push(format!("{filename}: {e}"));
                continue;
            }
        };

        match process_file(&state, user_id, &filename, data).await {
            Ok(result) => results.push(result),
            Err(message) => errors.push(message),
        }
    }

    if results.is_empty() && errors.is_empty() {
        return Err(AppError::Validation("No files provided".to_string()));
    }

    let status = if results.is_empty() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    Ok((status, Json(UploadResponse { results, errors })))
}

/// Validates, extracts, scores, and persists one uploaded file.
/// Errors are per-file messages, not `AppError`s.
async fn process_file(
    state: &AppState,
    user_id: Uuid,
    filename: &str,
    data: Bytes,
) -> Result<UploadResult, String> {
    let ext = file_extension(filename);
    if !state.config.allowed_extensions.contains(&ext) {
        return Err(format!("{filename}: Invalid file type"));
    }
    if data.len() > state.config.max_upload_bytes {
        return Err(format!("{filename}: File too large"));
    }

    // File I/O and PDF parsing are blocking; keep them off the async
    // executor.
    let upload_dir = state.config.upload_dir.clone();
    let name = filename.to_string();
    let ext_owned = ext.clone();
    let resume_text =
        tokio::task::spawn_blocking(move || store_and_extract(&upload_dir, &name, &ext_owned, &data))
            .await
            .map_err(|e| format!("{filename}: {e}"))??;
    if resume_text.trim().is_empty() {
        return Err(format!("{filename}: Could not extract text"));
    }

    let scores = scoring::evaluate(&resume_text);
    let id = store::create(&state.db, user_id, filename, &resume_text, &scores)
        .await
        .map_err(|e| format!("{filename}: {e}"))?;

    tracing::info!(%id, filename, overall = scores.overall_score, "resume evaluated");
    Ok(UploadResult {
        id,
        filename: filename.to_string(),
        scores,
    })
}

/// GET /api/resumes
pub async fn list_resumes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ResumeListResponse>, AppError> {
    let rows = store::list_by_user(&state.db, user_id).await?;
    Ok(Json(ResumeListResponse {
        resumes: rows.into_iter().map(EvaluationSummary::from).collect(),
    }))
}

/// GET /api/resumes/:id
pub async fn get_resume(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<EvaluationSummary>, AppError> {
    let id = parse_resume_id(&id)?;
    let row = store::find_by_id(&state.db, id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;
    Ok(Json(EvaluationSummary::from(row)))
}

/// DELETE /api/resumes/:id
pub async fn delete_resume(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_resume_id(&id)?;
    if !store::delete_by_id(&state.db, id, user_id).await? {
        return Err(AppError::NotFound("Resume not found".to_string()));
    }
    Ok(Json(json!({ "message": "Resume deleted" })))
}

/// POST /api/resumes/batch/delete
pub async fn delete_batch(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<BatchDeleteRequest>,
) -> Result<Json<Value>, AppError> {
    // Unparseable ids simply don't match anything, same as ids the user
    // doesn't own.
    let ids: Vec<Uuid> = req
        .resume_ids
        .iter()
        .filter_map(|raw| Uuid::parse_str(raw).ok())
        .collect();
    let deleted = store::delete_batch(&state.db, &ids, user_id).await?;
    Ok(Json(json!({ "message": format!("{deleted} resumes deleted") })))
}

/// DELETE /api/resumes/clear-all
pub async fn clear_all(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>, AppError> {
    let deleted = store::delete_all(&state.db, user_id).await?;
    Ok(Json(json!({ "message": format!("Cleared {deleted} resumes") })))
}

/// Writes the payload to a scratch file and extracts its text. NamedTempFile
/// is removed on drop, so every exit path — error or success — cleans up the
/// on-disk copy.
fn store_and_extract(
    upload_dir: &std::path::Path,
    filename: &str,
    ext: &str,
    data: &[u8],
) -> Result<String, String> {
    let mut temp = tempfile::Builder::new()
        .prefix("resume-")
        .tempfile_in(upload_dir)
        .map_err(|e| format!("{filename}: Could not store upload: {e}"))?;
    temp.write_all(data)
        .map_err(|e| format!("{filename}: Could not store upload: {e}"))?;

    Ok(crate::resumes::extract::extract_resume_text(
        temp.path(),
        ext,
    ))
}

/// An unparseable id can't name an existing record, so it reads as 404
/// rather than 400.
fn parse_resume_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Resume not found".to_string()))
}

/// Lowercased extension of an uploaded filename, empty if absent.
fn file_extension(filename: &str) -> String {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Strips directory components and unusual characters from a client-supplied
/// filename before it is echoed back or stored.
fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_extension_lowercases() {
        assert_eq!(file_extension("Resume.PDF"), "pdf");
        assert_eq!(file_extension("cv.docx"), "docx");
    }

    #[test]
    fn test_file_extension_missing() {
        assert_eq!(file_extension("README"), "");
        assert_eq!(file_extension(""), "");
    }

    #[test]
    fn test_file_extension_takes_last_segment() {
        assert_eq!(file_extension("archive.tar.gz"), "gz");
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(r"C:\Users\x\cv.pdf"), "cv.pdf");
    }

    #[test]
    fn test_sanitize_replaces_odd_characters() {
        assert_eq!(sanitize_filename("my resume (final).pdf"), "my_resume__final_.pdf");
    }

    #[test]
    fn test_sanitize_keeps_ordinary_names() {
        assert_eq!(sanitize_filename("jane-doe_cv.docx"), "jane-doe_cv.docx");
    }

    #[test]
    fn test_parse_resume_id_invalid_is_not_found() {
        assert!(matches!(
            parse_resume_id("not-a-uuid"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_batch_delete_body_without_ids_parses_as_empty() {
        let req: BatchDeleteRequest = serde_json::from_str("{}").unwrap();
        assert!(req.resume_ids.is_empty());

        let req: BatchDeleteRequest =
            serde_json::from_str(r#"{"resume_ids": ["a", "b"]}"#).unwrap();
        assert_eq!(req.resume_ids, vec!["a", "b"]);
    }

    #[test]
    fn test_store_and_extract_reads_back_text() {
        let dir = tempfile::tempdir().unwrap();
        let text = store_and_extract(dir.path(), "cv.txt", "txt", b"python and tensorflow")
            .unwrap();
        assert_eq!(text, "python and tensorflow");
    }

    #[test]
    fn test_store_and_extract_removes_scratch_file() {
        let dir = tempfile::tempdir().unwrap();
        store_and_extract(dir.path(), "cv.txt", "txt", b"some text").unwrap();
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_store_and_extract_missing_dir_is_per_file_error() {
        let err = store_and_extract(std::path::Path::new("/nonexistent-dir"), "cv.txt", "txt", b"x")
            .unwrap_err();
        assert!(err.starts_with("cv.txt:"));
    }
}
