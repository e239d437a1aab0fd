//! The review state machine: `pending` → `approved` (approve) or
//! `pending` → `reviewed` (modify); `reject` records the decision without
//! moving the item.
//!
//! The review row and the item's status update commit as one transaction,
//! and the duplicate check runs inside that same transaction with the
//! UNIQUE(data_id, reviewer_id) index as the backstop against a racing
//! submission by the same reviewer.

use chrono::Utc;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::{CoreError, Result};
use crate::types::{Decision, Principal, TaggingData, TaggingReview};
use crate::users;

#[derive(Debug, Clone)]
pub struct ReviewSubmission {
    pub data_id: String,
    pub decision: Decision,
    pub new_tag_en: Option<String>,
    pub new_tag_ar: Option<String>,
    pub notes: Option<String>,
    /// 1-10; defaults to 5.
    pub confidence: Option<i64>,
    /// Seconds the reviewer spent on the item.
    pub time_spent: Option<i64>,
}

/// Record one reviewer decision and advance the item accordingly.
///
/// A `reject` decision deliberately leaves the item's status untouched, so
/// the item stays in other reviewers' queues while the rejecting reviewer is
/// blocked from resubmitting by the duplicate check. Product has been asked
/// whether that lockout is intended; until then this is the contract.
pub async fn submit_review(
    pool: &DbPool,
    principal: &Principal,
    submission: ReviewSubmission,
) -> Result<TaggingReview> {
    users::get_user(pool, &principal.id).await?;

    let review = TaggingReview {
        id: Uuid::new_v4().to_string(),
        data_id: submission.data_id.clone(),
        reviewer_id: principal.id.clone(),
        decision: submission.decision.as_str().to_string(),
        new_tag_en: submission.new_tag_en.clone(),
        new_tag_ar: submission.new_tag_ar.clone(),
        notes: submission.notes.clone(),
        confidence: submission.confidence.unwrap_or(5).clamp(1, 10),
        time_spent: submission.time_spent,
        reviewed_at: Utc::now(),
    };

    let mut tx = pool.begin().await?;

    let item = sqlx::query_as::<_, TaggingData>(r#"SELECT * FROM tagging_data WHERE id = ?"#)
        .bind(&submission.data_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::not_found("tagging data"))?;

    let existing: Option<(String,)> = sqlx::query_as(
        r#"SELECT id FROM tagging_reviews WHERE data_id = ? AND reviewer_id = ?"#,
    )
    .bind(&submission.data_id)
    .bind(&principal.id)
    .fetch_optional(&mut *tx)
    .await?;

    if existing.is_some() {
        return Err(CoreError::DuplicateReview {
            data_id: submission.data_id,
            reviewer_id: principal.id.clone(),
        });
    }

    let inserted = sqlx::query(
        r#"
            INSERT INTO tagging_reviews
                (id, data_id, reviewer_id, decision, new_tag_en, new_tag_ar,
                 notes, confidence, time_spent, reviewed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&review.id)
    .bind(&review.data_id)
    .bind(&review.reviewer_id)
    .bind(&review.decision)
    .bind(&review.new_tag_en)
    .bind(&review.new_tag_ar)
    .bind(&review.notes)
    .bind(review.confidence)
    .bind(review.time_spent)
    .bind(review.reviewed_at)
    .execute(&mut *tx)
    .await;

    if let Err(err) = inserted {
        // The unique index caught a racing submission by this reviewer.
        if err
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation())
        {
            return Err(CoreError::DuplicateReview {
                data_id: submission.data_id,
                reviewer_id: principal.id.clone(),
            });
        }
        return Err(err.into());
    }

    match submission.decision {
        Decision::Approve => {
            sqlx::query(r#"UPDATE tagging_data SET status = 'approved' WHERE id = ?"#)
                .bind(&submission.data_id)
                .execute(&mut *tx)
                .await?;
        }
        Decision::Modify => {
            let tag_en = submission.new_tag_en.or(item.tag_en);
            let tag_ar = submission.new_tag_ar.or(item.tag_ar);
            sqlx::query(
                r#"
                    UPDATE tagging_data
                    SET tag_en = ?, tag_ar = ?, status = 'reviewed'
                    WHERE id = ?
                "#,
            )
            .bind(&tag_en)
            .bind(&tag_ar)
            .bind(&submission.data_id)
            .execute(&mut *tx)
            .await?;
        }
        Decision::Reject => {}
    }

    tx.commit().await?;
    Ok(review)
}

/// A page of items with the total count for the underlying filter.
#[derive(Debug, Clone)]
pub struct DataPage {
    pub items: Vec<TaggingData>,
    pub total: i64,
}

fn page_bounds(page: i64, per_page: i64) -> (i64, i64) {
    let per_page = per_page.clamp(1, 100);
    let offset = (page.max(1) - 1) * per_page;
    (per_page, offset)
}

/// Items visible to a reviewer: pending, and not yet reviewed by them.
/// This is a reviewer-scoped exclusion, not a lock; two reviewers may both
/// see and submit for the same pending item.
pub async fn pending_for_reviewer(
    pool: &DbPool,
    reviewer_id: &str,
    page: i64,
    per_page: i64,
) -> Result<DataPage> {
    let (limit, offset) = page_bounds(page, per_page);

    let items = sqlx::query_as::<_, TaggingData>(
        r#"
            SELECT * FROM tagging_data
            WHERE status = 'pending'
              AND id NOT IN (SELECT data_id FROM tagging_reviews WHERE reviewer_id = ?)
            ORDER BY uploaded_at, id
            LIMIT ? OFFSET ?
        "#,
    )
    .bind(reviewer_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let (total,): (i64,) = sqlx::query_as(
        r#"
            SELECT COUNT(*) FROM tagging_data
            WHERE status = 'pending'
              AND id NOT IN (SELECT data_id FROM tagging_reviews WHERE reviewer_id = ?)
        "#,
    )
    .bind(reviewer_id)
    .fetch_one(pool)
    .await?;

    Ok(DataPage { items, total })
}

/// Unfiltered status view used by admins.
pub async fn list_by_status(
    pool: &DbPool,
    status: &str,
    page: i64,
    per_page: i64,
) -> Result<DataPage> {
    let (limit, offset) = page_bounds(page, per_page);

    let items = sqlx::query_as::<_, TaggingData>(
        r#"
            SELECT * FROM tagging_data
            WHERE status = ?
            ORDER BY uploaded_at, id
            LIMIT ? OFFSET ?
        "#,
    )
    .bind(status)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let (total,): (i64,) =
        sqlx::query_as(r#"SELECT COUNT(*) FROM tagging_data WHERE status = ?"#)
            .bind(status)
            .fetch_one(pool)
            .await?;

    Ok(DataPage { items, total })
}

pub async fn get_item(pool: &DbPool, id: &str) -> Result<TaggingData> {
    sqlx::query_as::<_, TaggingData>(r#"SELECT * FROM tagging_data WHERE id = ?"#)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| CoreError::not_found("tagging data"))
}
