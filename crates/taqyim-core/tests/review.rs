use taqyim_core::db::{self, DbPool};
use taqyim_core::ingest::persist_records;
use taqyim_core::parser::ParsedRecord;
use taqyim_core::review::{self, ReviewSubmission};
use taqyim_core::types::{Principal, Role, TaggingData};
use taqyim_core::{users, CoreError, Decision};

async fn test_pool() -> DbPool {
    let pool = db::connect_in_memory().await.expect("in-memory pool");
    db::run_migrations(&pool).await.expect("migrations");
    pool
}

async fn reviewer(pool: &DbPool, username: &str) -> Principal {
    let user = users::create_user(pool, username, Role::Reviewer, None)
        .await
        .expect("create reviewer");
    Principal::new(user.id, Role::Reviewer)
}

async fn seed_item(pool: &DbPool, text: &str) -> String {
    let admin = users::create_user(pool, &format!("admin-{text}"), Role::Admin, None)
        .await
        .expect("create admin");
    let record = ParsedRecord {
        text: text.to_string(),
        original_tags: r#"{"ideological_en":"Bad"}"#.to_string(),
        tag_en: "Bad".to_string(),
        tag_ar: "سيء".to_string(),
    };
    let (processed, failed, _) = persist_records(pool, &[record], &admin.id).await;
    assert_eq!((processed, failed), (1, 0));

    let (id,): (String,) = sqlx::query_as("SELECT id FROM tagging_data WHERE text = ?")
        .bind(text)
        .fetch_one(pool)
        .await
        .expect("seeded item");
    id
}

async fn fetch_item(pool: &DbPool, id: &str) -> TaggingData {
    review::get_item(pool, id).await.expect("item")
}

fn submission(data_id: &str, decision: Decision) -> ReviewSubmission {
    ReviewSubmission {
        data_id: data_id.to_string(),
        decision,
        new_tag_en: None,
        new_tag_ar: None,
        notes: None,
        confidence: None,
        time_spent: None,
    }
}

#[tokio::test]
async fn approve_moves_item_to_approved() {
    let pool = test_pool().await;
    let item_id = seed_item(&pool, "approve me").await;
    let principal = reviewer(&pool, "r1").await;

    let review = review::submit_review(&pool, &principal, submission(&item_id, Decision::Approve))
        .await
        .expect("review");
    assert_eq!(review.decision, "approve");

    let item = fetch_item(&pool, &item_id).await;
    assert_eq!(item.status, "approved");
    // Approval never touches the tags.
    assert_eq!(item.tag_en.as_deref(), Some("Bad"));
    assert_eq!(item.tag_ar.as_deref(), Some("سيء"));
}

#[tokio::test]
async fn modify_overwrites_tags_and_marks_reviewed() {
    let pool = test_pool().await;
    let item_id = seed_item(&pool, "modify me").await;
    let principal = reviewer(&pool, "r1").await;

    let mut submission = submission(&item_id, Decision::Modify);
    submission.new_tag_en = Some("Good".to_string());

    review::submit_review(&pool, &principal, submission)
        .await
        .expect("review");

    let item = fetch_item(&pool, &item_id).await;
    assert_eq!(item.status, "reviewed");
    assert_eq!(item.tag_en.as_deref(), Some("Good"));
    // Omitted replacement falls back to the existing value.
    assert_eq!(item.tag_ar.as_deref(), Some("سيء"));
}

#[tokio::test]
async fn reject_records_review_without_moving_item() {
    let pool = test_pool().await;
    let item_id = seed_item(&pool, "reject me").await;
    let principal = reviewer(&pool, "r1").await;

    review::submit_review(&pool, &principal, submission(&item_id, Decision::Reject))
        .await
        .expect("review");

    let (reviews,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tagging_reviews")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(reviews, 1);

    let item = fetch_item(&pool, &item_id).await;
    assert_eq!(item.status, "pending");
}

#[tokio::test]
async fn second_submission_by_same_reviewer_is_rejected() {
    let pool = test_pool().await;
    let item_id = seed_item(&pool, "once only").await;
    let principal = reviewer(&pool, "r1").await;

    review::submit_review(&pool, &principal, submission(&item_id, Decision::Approve))
        .await
        .expect("first review");

    let err = review::submit_review(&pool, &principal, submission(&item_id, Decision::Reject))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::DuplicateReview { .. }));

    let (reviews,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tagging_reviews")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(reviews, 1);

    let item = fetch_item(&pool, &item_id).await;
    assert_eq!(item.status, "approved");
}

#[tokio::test]
async fn different_reviewers_may_review_the_same_item() {
    let pool = test_pool().await;
    let item_id = seed_item(&pool, "shared item").await;
    let first = reviewer(&pool, "r1").await;
    let second = reviewer(&pool, "r2").await;

    review::submit_review(&pool, &first, submission(&item_id, Decision::Reject))
        .await
        .expect("first review");
    review::submit_review(&pool, &second, submission(&item_id, Decision::Approve))
        .await
        .expect("second review");

    let item = fetch_item(&pool, &item_id).await;
    assert_eq!(item.status, "approved");
}

#[tokio::test]
async fn review_of_missing_item_mutates_nothing() {
    let pool = test_pool().await;
    let principal = reviewer(&pool, "r1").await;

    let err = review::submit_review(&pool, &principal, submission("no-such-id", Decision::Approve))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));

    let (reviews,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tagging_reviews")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(reviews, 0);
}

#[tokio::test]
async fn confidence_defaults_and_clamps() {
    let pool = test_pool().await;
    let item_id = seed_item(&pool, "confidence a").await;
    let other_id = seed_item(&pool, "confidence b").await;
    let principal = reviewer(&pool, "r1").await;

    let review_a = review::submit_review(&pool, &principal, submission(&item_id, Decision::Approve))
        .await
        .unwrap();
    assert_eq!(review_a.confidence, 5);

    let mut high = submission(&other_id, Decision::Approve);
    high.confidence = Some(99);
    let review_b = review::submit_review(&pool, &principal, high).await.unwrap();
    assert_eq!(review_b.confidence, 10);
}

#[tokio::test]
async fn pending_queue_excludes_items_already_reviewed_by_the_reviewer() {
    let pool = test_pool().await;
    let first_id = seed_item(&pool, "item one").await;
    let second_id = seed_item(&pool, "item two").await;
    let me = reviewer(&pool, "me").await;
    let other = reviewer(&pool, "other").await;

    // Reject keeps the item pending, but it leaves my queue.
    review::submit_review(&pool, &me, submission(&first_id, Decision::Reject))
        .await
        .expect("review");

    let mine = review::pending_for_reviewer(&pool, &me.id, 1, 10)
        .await
        .expect("my queue");
    assert_eq!(mine.total, 1);
    assert_eq!(mine.items.len(), 1);
    assert_eq!(mine.items[0].id, second_id);

    let theirs = review::pending_for_reviewer(&pool, &other.id, 1, 10)
        .await
        .expect("their queue");
    assert_eq!(theirs.total, 2);
}

#[tokio::test]
async fn status_listing_paginates() {
    let pool = test_pool().await;
    for i in 0..5 {
        seed_item(&pool, &format!("bulk item {i}")).await;
    }

    let page = review::list_by_status(&pool, "pending", 1, 2).await.unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 2);

    let last = review::list_by_status(&pool, "pending", 3, 2).await.unwrap();
    assert_eq!(last.items.len(), 1);
}
