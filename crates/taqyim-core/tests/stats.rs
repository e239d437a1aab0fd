use chrono::Utc;
use taqyim_core::db::{self, DbPool};
use taqyim_core::ingest::persist_records;
use taqyim_core::parser::ParsedRecord;
use taqyim_core::review::{self, ReviewSubmission};
use taqyim_core::types::{Principal, Role};
use taqyim_core::{stats, users, CoreError, Decision};

async fn test_pool() -> DbPool {
    let pool = db::connect_in_memory().await.expect("in-memory pool");
    db::run_migrations(&pool).await.expect("migrations");
    pool
}

async fn seed_items(pool: &DbPool, count: usize) -> Vec<String> {
    let admin = users::create_user(pool, "admin", Role::Admin, None)
        .await
        .expect("create admin");
    let records: Vec<ParsedRecord> = (0..count)
        .map(|i| ParsedRecord {
            text: format!("stats item {i}"),
            original_tags: "{}".to_string(),
            tag_en: "Neutral".to_string(),
            tag_ar: "محايد".to_string(),
        })
        .collect();
    let (processed, failed, _) = persist_records(pool, &records, &admin.id).await;
    assert_eq!((processed as usize, failed), (count, 0));

    let rows: Vec<(String,)> = sqlx::query_as("SELECT id FROM tagging_data ORDER BY text")
        .fetch_all(pool)
        .await
        .expect("ids");
    rows.into_iter().map(|(id,)| id).collect()
}

fn submission(data_id: &str, decision: Decision, time_spent: Option<i64>) -> ReviewSubmission {
    ReviewSubmission {
        data_id: data_id.to_string(),
        decision,
        new_tag_en: Some("Good".to_string()),
        new_tag_ar: None,
        notes: None,
        confidence: None,
        time_spent,
    }
}

#[tokio::test]
async fn overall_counts_and_completion_rate() {
    let pool = test_pool().await;
    let items = seed_items(&pool, 3).await;
    let user = users::create_user(&pool, "r1", Role::Reviewer, None)
        .await
        .unwrap();
    let principal = Principal::new(user.id, Role::Reviewer);

    review::submit_review(&pool, &principal, submission(&items[0], Decision::Approve, None))
        .await
        .unwrap();
    review::submit_review(&pool, &principal, submission(&items[1], Decision::Modify, None))
        .await
        .unwrap();

    let overall = stats::overall(&pool).await.unwrap();
    assert_eq!(overall.total_data, 3);
    assert_eq!(overall.pending_data, 1);
    assert_eq!(overall.reviewed_data, 1);
    assert_eq!(overall.approved_data, 1);
    assert_eq!(overall.completion_rate, 66.67);
}

#[tokio::test]
async fn empty_platform_reports_zero_rate() {
    let pool = test_pool().await;
    let overall = stats::overall(&pool).await.unwrap();
    assert_eq!(overall.total_data, 0);
    assert_eq!(overall.completion_rate, 0.0);
}

#[tokio::test]
async fn personal_stats_track_approval_rate() {
    let pool = test_pool().await;
    let items = seed_items(&pool, 2).await;
    let user = users::create_user(&pool, "r1", Role::Reviewer, None)
        .await
        .unwrap();
    let principal = Principal::new(user.id, Role::Reviewer);

    review::submit_review(&pool, &principal, submission(&items[0], Decision::Approve, None))
        .await
        .unwrap();
    review::submit_review(&pool, &principal, submission(&items[1], Decision::Reject, None))
        .await
        .unwrap();

    let personal = stats::personal(&pool, &principal.id).await.unwrap();
    assert_eq!(personal.user_reviews, 2);
    assert_eq!(personal.user_approvals, 1);
    assert_eq!(personal.user_approval_rate, 50.0);
}

async fn admin_principal(pool: &DbPool) -> Principal {
    let (id,): (String,) = sqlx::query_as("SELECT id FROM users WHERE role = 'admin'")
        .fetch_one(pool)
        .await
        .expect("admin user");
    Principal::new(id, Role::Admin)
}

#[tokio::test]
async fn daily_stats_average_time_spent() {
    let pool = test_pool().await;
    let items = seed_items(&pool, 2).await;
    let user = users::create_user(&pool, "r1", Role::Reviewer, None)
        .await
        .unwrap();
    let principal = Principal::new(user.id, Role::Reviewer);

    review::submit_review(&pool, &principal, submission(&items[0], Decision::Approve, Some(30)))
        .await
        .unwrap();
    review::submit_review(&pool, &principal, submission(&items[1], Decision::Approve, Some(45)))
        .await
        .unwrap();

    let admin = admin_principal(&pool).await;
    let daily = stats::daily(&pool, &admin, Utc::now()).await.unwrap();
    assert_eq!(daily.daily_reviews, 2);
    assert_eq!(daily.avg_review_time, 37.5);
}

#[tokio::test]
async fn daily_stats_is_admin_only() {
    let pool = test_pool().await;
    let user = users::create_user(&pool, "r1", Role::Reviewer, None)
        .await
        .unwrap();
    let principal = Principal::new(user.id, Role::Reviewer);

    let err = stats::daily(&pool, &principal, Utc::now()).await.unwrap_err();
    assert!(matches!(err, CoreError::Permission { .. }));
}

#[tokio::test]
async fn reviewer_performance_sorts_by_activity() {
    let pool = test_pool().await;
    let items = seed_items(&pool, 3).await;
    let admin = Principal::new(
        sqlx::query_as::<_, (String,)>("SELECT id FROM users WHERE role = 'admin'")
            .fetch_one(&pool)
            .await
            .unwrap()
            .0,
        Role::Admin,
    );

    let busy = users::create_user(&pool, "busy", Role::Reviewer, None)
        .await
        .unwrap();
    let busy = Principal::new(busy.id, Role::Reviewer);
    users::create_user(&pool, "idle", Role::Reviewer, None)
        .await
        .unwrap();

    review::submit_review(&pool, &busy, submission(&items[0], Decision::Approve, None))
        .await
        .unwrap();
    review::submit_review(&pool, &busy, submission(&items[1], Decision::Reject, None))
        .await
        .unwrap();

    let performance = stats::reviewer_performance(&pool, &admin).await.unwrap();
    assert_eq!(performance.len(), 2);
    assert_eq!(performance[0].username, "busy");
    assert_eq!(performance[0].review_count, 2);
    assert_eq!(performance[0].approval_rate, 50.0);
    assert_eq!(performance[1].username, "idle");
    assert_eq!(performance[1].review_count, 0);
}

#[tokio::test]
async fn reviewer_performance_is_admin_only() {
    let pool = test_pool().await;
    let user = users::create_user(&pool, "r1", Role::Reviewer, None)
        .await
        .unwrap();
    let principal = Principal::new(user.id, Role::Reviewer);

    let err = stats::reviewer_performance(&pool, &principal)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Permission { .. }));
}
