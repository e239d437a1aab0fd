//! Read-only aggregate views over persisted review data.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::DbPool;
use crate::error::{CoreError, Result};
use crate::types::Principal;
use crate::users;

#[derive(Debug, Clone, Serialize)]
pub struct OverallStats {
    pub total_data: i64,
    pub pending_data: i64,
    pub reviewed_data: i64,
    pub approved_data: i64,
    /// Percentage of items past `pending`, rounded to two decimals.
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonalStats {
    pub user_reviews: i64,
    pub user_approvals: i64,
    pub user_approval_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyStats {
    pub daily_reviews: i64,
    pub avg_review_time: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewerPerformance {
    pub username: String,
    pub review_count: i64,
    pub approval_rate: f64,
}

fn percentage(part: i64, whole: i64) -> f64 {
    if whole > 0 {
        (part as f64 / whole as f64 * 10000.0).round() / 100.0
    } else {
        0.0
    }
}

async fn count_by_status(pool: &DbPool, status: &str) -> Result<i64> {
    let (count,): (i64,) =
        sqlx::query_as(r#"SELECT COUNT(*) FROM tagging_data WHERE status = ?"#)
            .bind(status)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

pub async fn overall(pool: &DbPool) -> Result<OverallStats> {
    let (total,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM tagging_data"#)
        .fetch_one(pool)
        .await?;
    let pending = count_by_status(pool, "pending").await?;
    let reviewed = count_by_status(pool, "reviewed").await?;
    let approved = count_by_status(pool, "approved").await?;

    Ok(OverallStats {
        total_data: total,
        pending_data: pending,
        reviewed_data: reviewed,
        approved_data: approved,
        completion_rate: percentage(reviewed + approved, total),
    })
}

pub async fn personal(pool: &DbPool, reviewer_id: &str) -> Result<PersonalStats> {
    let (reviews,): (i64,) =
        sqlx::query_as(r#"SELECT COUNT(*) FROM tagging_reviews WHERE reviewer_id = ?"#)
            .bind(reviewer_id)
            .fetch_one(pool)
            .await?;
    let (approvals,): (i64,) = sqlx::query_as(
        r#"SELECT COUNT(*) FROM tagging_reviews WHERE reviewer_id = ? AND decision = 'approve'"#,
    )
    .bind(reviewer_id)
    .fetch_one(pool)
    .await?;

    Ok(PersonalStats {
        user_reviews: reviews,
        user_approvals: approvals,
        user_approval_rate: percentage(approvals, reviews),
    })
}

/// Reviews submitted since UTC midnight and their average time spent.
/// Admin-only.
pub async fn daily(pool: &DbPool, principal: &Principal, now: DateTime<Utc>) -> Result<DailyStats> {
    if !principal.is_admin() {
        return Err(CoreError::Permission { required: "admin" });
    }

    let midnight = now.date_naive().and_time(chrono::NaiveTime::MIN).and_utc();

    let (reviews,): (i64,) =
        sqlx::query_as(r#"SELECT COUNT(*) FROM tagging_reviews WHERE reviewed_at >= ?"#)
            .bind(midnight)
            .fetch_one(pool)
            .await?;

    let (avg,): (Option<f64>,) = sqlx::query_as(
        r#"
            SELECT AVG(time_spent) FROM tagging_reviews
            WHERE time_spent IS NOT NULL AND reviewed_at >= ?
        "#,
    )
    .bind(midnight)
    .fetch_one(pool)
    .await?;

    Ok(DailyStats {
        daily_reviews: reviews,
        avg_review_time: avg.map(|v| (v * 10.0).round() / 10.0).unwrap_or(0.0),
    })
}

/// Per-reviewer counts and approval rates, most active first. Admin-only.
pub async fn reviewer_performance(
    pool: &DbPool,
    principal: &Principal,
) -> Result<Vec<ReviewerPerformance>> {
    if !principal.is_admin() {
        return Err(CoreError::Permission { required: "admin" });
    }

    let mut performance = Vec::new();
    for reviewer in users::reviewers(pool).await? {
        let stats = personal(pool, &reviewer.id).await?;
        performance.push(ReviewerPerformance {
            username: reviewer.username,
            review_count: stats.user_reviews,
            approval_rate: percentage(stats.user_approvals, stats.user_reviews),
        });
    }
    performance.sort_by(|a, b| b.review_count.cmp(&a.review_count));

    Ok(performance)
}
