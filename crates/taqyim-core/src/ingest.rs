//! Ingestion session management: one call imports one uploaded file,
//! leaving behind a finalized `UploadSession` row and zero or more
//! `TaggingData` rows.
//!
//! Transactional boundaries matter here: the session row is committed in
//! `processing` state before parsing starts so progress stays observable,
//! each record insert commits independently, and file-level parse failures
//! finalize the session as `failed` without touching `tagging_data`.

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::IngestConfig;
use crate::db::DbPool;
use crate::error::{CoreError, Result};
use crate::parser::{parse_upload, ParsedRecord};
use crate::types::{Principal, SessionStatus, UploadSession};
use crate::users;

/// Final tally of one ingestion attempt.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReceipt {
    pub session_id: String,
    pub total_records: i64,
    pub processed_records: i64,
    pub failed_records: i64,
    pub status: SessionStatus,
}

/// Import one uploaded file. Admin-only; the principal is the resolved
/// identity handed in by the authentication layer.
pub async fn ingest_upload(
    pool: &DbPool,
    principal: &Principal,
    config: &IngestConfig,
    filename: &str,
    extension: &str,
    bytes: &[u8],
) -> Result<IngestReceipt> {
    if !principal.is_admin() {
        return Err(CoreError::Permission { required: "admin" });
    }
    users::get_user(pool, &principal.id).await?;

    if !config.allows(extension) {
        return Err(CoreError::UnsupportedFileType {
            extension: extension.trim_start_matches('.').to_lowercase(),
        });
    }

    // Committed immediately: progress is observable even if parsing fails.
    let session_id = create_session(pool, filename, &principal.id).await?;

    let records = match parse_upload(bytes, filename, extension, config) {
        Ok(records) => records,
        Err(err) => {
            error!(session_id = %session_id, %err, "file-level parse failure");
            fail_session(pool, &session_id, &err.to_string()).await?;
            return Err(err);
        }
    };

    let total = records.len() as i64;
    let (processed, failed, errors) = persist_records(pool, &records, &principal.id).await;

    let error_log = if errors.is_empty() {
        None
    } else {
        Some(errors.join("\n"))
    };

    sqlx::query(
        r#"
            UPDATE upload_sessions
            SET total_records = ?,
                processed_records = ?,
                failed_records = ?,
                status = 'completed',
                error_log = ?
            WHERE id = ?
        "#,
    )
    .bind(total)
    .bind(processed)
    .bind(failed)
    .bind(&error_log)
    .bind(&session_id)
    .execute(pool)
    .await?;

    info!(
        session_id = %session_id,
        total, processed, failed,
        "ingestion session completed"
    );

    Ok(IngestReceipt {
        session_id,
        total_records: total,
        processed_records: processed,
        failed_records: failed,
        status: SessionStatus::Completed,
    })
}

/// Insert each record independently; one row failing never aborts the rest.
/// Returns (processed, failed, per-row error messages with 1-based indices).
pub async fn persist_records(
    pool: &DbPool,
    records: &[ParsedRecord],
    uploaded_by: &str,
) -> (i64, i64, Vec<String>) {
    let mut processed = 0i64;
    let mut failed = 0i64;
    let mut errors = Vec::new();

    for (index, record) in records.iter().enumerate() {
        match insert_record(pool, record, uploaded_by).await {
            Ok(()) => processed += 1,
            Err(err) => {
                failed += 1;
                errors.push(format!("السطر {}: {}", index + 1, err));
            }
        }
    }

    (processed, failed, errors)
}

async fn insert_record(pool: &DbPool, record: &ParsedRecord, uploaded_by: &str) -> Result<()> {
    sqlx::query(
        r#"
            INSERT INTO tagging_data
                (id, text, original_tags, tag_en, tag_ar, status, uploaded_by, uploaded_at)
            VALUES (?, ?, ?, ?, ?, 'pending', ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&record.text)
    .bind(&record.original_tags)
    .bind(&record.tag_en)
    .bind(&record.tag_ar)
    .bind(uploaded_by)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_session(pool: &DbPool, filename: &str, uploaded_by: &str) -> Result<String> {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
            INSERT INTO upload_sessions (id, filename, status, uploaded_by, uploaded_at)
            VALUES (?, ?, 'processing', ?, ?)
        "#,
    )
    .bind(&id)
    .bind(filename)
    .bind(uploaded_by)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(id)
}

async fn fail_session(pool: &DbPool, session_id: &str, message: &str) -> Result<()> {
    sqlx::query(
        r#"
            UPDATE upload_sessions
            SET status = 'failed', error_log = ?
            WHERE id = ?
        "#,
    )
    .bind(message)
    .bind(session_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_session(pool: &DbPool, id: &str) -> Result<UploadSession> {
    sqlx::query_as::<_, UploadSession>(r#"SELECT * FROM upload_sessions WHERE id = ?"#)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| CoreError::not_found("upload session"))
}

/// All sessions, newest first. Admin-only view.
pub async fn list_sessions(pool: &DbPool, principal: &Principal) -> Result<Vec<UploadSession>> {
    if !principal.is_admin() {
        return Err(CoreError::Permission { required: "admin" });
    }
    let sessions = sqlx::query_as::<_, UploadSession>(
        r#"SELECT * FROM upload_sessions ORDER BY uploaded_at DESC"#,
    )
    .fetch_all(pool)
    .await?;
    Ok(sessions)
}
