//! Integration tests for marking exercises and meals

mod common;

use chrono::Duration;
use common::{exercise, full_week, wednesday, Failure, FakeBackend, TestClient};
use fittrack_client::services::WorkoutService;
use fittrack_client::ClientError;
use fittrack_shared::{CompletionToggle, DayOfWeek, ReversalPolicy};

const WEEK: u32 = 41;

async fn client_with_week() -> TestClient {
    let mut client = TestClient::logged_in(FakeBackend::with_week(WEEK, full_week(WEEK))).await;
    WorkoutService::load_week(&client.state, &mut client.session, WEEK)
        .await
        .unwrap();
    client
}

#[tokio::test]
async fn test_mark_complete_sends_request_and_records_lock() {
    let mut client = client_with_week().await;
    let now = wednesday();

    let toggle = CompletionToggle::new("mon-squat", true);
    let plan = WorkoutService::toggle_exercise(&client.state, &mut client.session, DayOfWeek::Monday, &toggle, now)
        .await
        .unwrap();

    assert!(plan.is_exercise_completed("mon-squat"));
    assert_eq!(plan.lock_timestamp("mon-squat"), Some(now));

    let data = client.backend.data.lock().unwrap();
    let (day, request) = &data.completions[0];
    assert_eq!(*day, DayOfWeek::Monday);
    assert_eq!(request.exercise_id.as_deref(), Some("mon-squat"));
    assert!(request.completed);
    assert!(request.lock_completion);
    assert_eq!(request.week_number, WEEK);
    drop(data);

    let cached = client.session.cache.day(DayOfWeek::Monday).unwrap();
    assert!(cached.is_exercise_completed("mon-squat"));
    assert_eq!(cached.lock_timestamp("mon-squat"), Some(now));
}

#[tokio::test]
async fn test_backend_assigned_ids_are_accepted_as_is() {
    let exercise_id = format!("übung-{}", "x".repeat(80));
    let mut plans = full_week(WEEK);
    plans[0].exercises.push(exercise(&exercise_id));
    let mut client = TestClient::logged_in(FakeBackend::with_week(WEEK, plans)).await;
    WorkoutService::load_week(&client.state, &mut client.session, WEEK)
        .await
        .unwrap();

    let toggle = CompletionToggle::new(exercise_id.clone(), true);
    let plan = WorkoutService::toggle_exercise(&client.state, &mut client.session, DayOfWeek::Monday, &toggle, wednesday())
        .await
        .unwrap();

    assert!(plan.is_exercise_completed(&exercise_id));
    assert_eq!(client.backend.call_count("complete_item"), 1);
}

#[tokio::test]
async fn test_server_lock_timestamp_is_kept() {
    let mut client = client_with_week().await;
    let server_time = wednesday() - Duration::minutes(5);
    client.backend.data.lock().unwrap().server_lock_time = Some(server_time);

    let toggle = CompletionToggle::new("mon-squat", true);
    let plan = WorkoutService::toggle_exercise(
        &client.state,
        &mut client.session,
        DayOfWeek::Monday,
        &toggle,
        wednesday(),
    )
    .await
    .unwrap();

    assert_eq!(plan.lock_timestamp("mon-squat"), Some(server_time));
}

#[tokio::test]
async fn test_unmark_inside_lock_window_is_rejected_without_request() {
    let mut client = client_with_week().await;
    let now = wednesday();
    let mark = CompletionToggle::new("tue-plank", true);
    WorkoutService::toggle_exercise(&client.state, &mut client.session, DayOfWeek::Tuesday, &mark, now)
        .await
        .unwrap();

    let unmark = CompletionToggle::new("tue-plank", false);
    let later = now + Duration::hours(2);
    let err = WorkoutService::toggle_exercise(&client.state, &mut client.session, DayOfWeek::Tuesday, &unmark, later)
        .await
        .unwrap_err();

    match err {
        ClientError::Locked { exercise_id, unlocks_at } => {
            assert_eq!(exercise_id, "tue-plank");
            assert_eq!(unlocks_at, now + Duration::hours(24));
        }
        other => panic!("expected Locked, got {:?}", other),
    }
    assert_eq!(client.backend.call_count("complete_item"), 1);
    assert!(client
        .session
        .cache
        .day(DayOfWeek::Tuesday)
        .unwrap()
        .is_exercise_completed("tue-plank"));
}

#[tokio::test]
async fn test_unmark_after_window_is_irreversible_by_default() {
    let mut client = client_with_week().await;
    let now = wednesday();
    let mark = CompletionToggle::new("tue-plank", true);
    WorkoutService::toggle_exercise(&client.state, &mut client.session, DayOfWeek::Tuesday, &mark, now)
        .await
        .unwrap();

    let unmark = CompletionToggle::new("tue-plank", false);
    let err = WorkoutService::toggle_exercise(
        &client.state,
        &mut client.session,
        DayOfWeek::Tuesday,
        &unmark,
        now + Duration::hours(25),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ClientError::Irreversible { .. }));
    assert!(err.is_local_rejection());
    assert_eq!(client.backend.call_count("complete_item"), 1);
}

#[tokio::test]
async fn test_unmark_after_window_allowed_by_policy() {
    let mut config = common::test_config();
    config.tracking.reversal_policy = ReversalPolicy::AfterLockWindow;
    let backend = FakeBackend::with_week(WEEK, full_week(WEEK));
    let mut client = TestClient::logged_in_with_config(backend, config).await;
    WorkoutService::load_week(&client.state, &mut client.session, WEEK)
        .await
        .unwrap();

    let now = wednesday();
    let mark = CompletionToggle::new("tue-plank", true);
    WorkoutService::toggle_exercise(&client.state, &mut client.session, DayOfWeek::Tuesday, &mark, now)
        .await
        .unwrap();

    let unmark = CompletionToggle::new("tue-plank", false);
    let plan = WorkoutService::toggle_exercise(
        &client.state,
        &mut client.session,
        DayOfWeek::Tuesday,
        &unmark,
        now + Duration::hours(25),
    )
    .await
    .unwrap();

    assert!(!plan.is_exercise_completed("tue-plank"));
    assert!(plan.lock_timestamp("tue-plank").is_none());
    assert_eq!(client.backend.call_count("complete_item"), 2);
}

#[tokio::test]
async fn test_unmark_incomplete_exercise_makes_no_call() {
    let mut client = client_with_week().await;

    let unmark = CompletionToggle::new("wed-squat", false);
    let plan = WorkoutService::toggle_exercise(
        &client.state,
        &mut client.session,
        DayOfWeek::Wednesday,
        &unmark,
        wednesday(),
    )
    .await
    .unwrap();

    assert!(!plan.is_exercise_completed("wed-squat"));
    assert_eq!(client.backend.call_count("complete_item"), 0);
}

#[tokio::test]
async fn test_unknown_exercise_rejected_locally() {
    let mut client = client_with_week().await;

    let toggle = CompletionToggle::new("not-in-plan", true);
    let err = WorkoutService::toggle_exercise(&client.state, &mut client.session, DayOfWeek::Monday, &toggle, wednesday())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::NotFound(_)));
    assert_eq!(client.backend.call_count("complete_item"), 0);
}

#[tokio::test]
async fn test_failed_write_leaves_cache_untouched() {
    let mut client = client_with_week().await;
    client.backend.fail("complete_item", Failure::Server);
    let before = client.session.cache.day(DayOfWeek::Monday).cloned().unwrap();

    let toggle = CompletionToggle::new("mon-squat", true);
    let err = WorkoutService::toggle_exercise(&client.state, &mut client.session, DayOfWeek::Monday, &toggle, wednesday())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Backend { status: 500, .. }));
    assert_eq!(client.session.cache.day(DayOfWeek::Monday), Some(&before));
    assert!(client.session.is_authenticated());
}

#[tokio::test]
async fn test_unauthorized_write_ends_session() {
    let mut client = client_with_week().await;
    client.backend.fail("complete_item", Failure::Unauthorized);

    let toggle = CompletionToggle::new("mon-squat", true);
    let err = WorkoutService::toggle_exercise(&client.state, &mut client.session, DayOfWeek::Monday, &toggle, wednesday())
        .await
        .unwrap_err();

    assert!(err.requires_login());
    assert!(!client.session.is_authenticated());
    assert!(client.session.cache.week().is_none());
    assert!(!client.persisted_session_exists().await);
}

#[tokio::test]
async fn test_placeholder_week_cannot_be_written() {
    let backend = FakeBackend::new();
    backend.fail("week_plans", Failure::Server);
    let mut client = TestClient::logged_in(backend).await;
    WorkoutService::load_week(&client.state, &mut client.session, WEEK)
        .await
        .unwrap();
    let day = client.session.cache.day(DayOfWeek::Monday).cloned().unwrap();
    let exercise_id = day.exercises[0].id.clone();

    let toggle = CompletionToggle::new(exercise_id, true);
    let err = WorkoutService::toggle_exercise(&client.state, &mut client.session, DayOfWeek::Monday, &toggle, wednesday())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::PlaceholderData(_)));
    assert_eq!(client.backend.call_count("complete_item"), 0);
}

#[tokio::test]
async fn test_meal_can_be_unmarked_freely() {
    let mut client = client_with_week().await;

    let plan = WorkoutService::toggle_meal(&client.state, &mut client.session, DayOfWeek::Friday, "fri-lunch", true)
        .await
        .unwrap();
    assert!(plan.is_meal_completed("fri-lunch"));

    let plan = WorkoutService::toggle_meal(&client.state, &mut client.session, DayOfWeek::Friday, "fri-lunch", false)
        .await
        .unwrap();
    assert!(!plan.is_meal_completed("fri-lunch"));
    assert_eq!(client.backend.call_count("complete_item"), 2);

    let data = client.backend.data.lock().unwrap();
    assert_eq!(data.completions[0].1.meal_id.as_deref(), Some("fri-lunch"));
    assert!(data.completions[0].1.exercise_id.is_none());
}

#[tokio::test]
async fn test_unknown_meal_rejected_locally() {
    let mut client = client_with_week().await;

    let err = WorkoutService::toggle_meal(&client.state, &mut client.session, DayOfWeek::Friday, "mon-lunch", true)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::NotFound(_)));
    assert_eq!(client.backend.call_count("complete_item"), 0);
}

#[tokio::test]
async fn test_toggle_requires_loaded_week() {
    let mut client = TestClient::logged_in(FakeBackend::new()).await;

    let toggle = CompletionToggle::new("mon-squat", true);
    let err = WorkoutService::toggle_exercise(&client.state, &mut client.session, DayOfWeek::Monday, &toggle, wednesday())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::NotFound(_)));
}
