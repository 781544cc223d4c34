use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use consultation_cell::models::{ConsultationError, SlotStatus};
use consultation_cell::services::SlotService;
use shared_utils::test_utils::{MockRows, TestConfig};

const SLOTS: &str = "/rest/v1/consultation_slots";

async fn mount_slot_read(server: &MockServer, code: &str, total: i32, available: i32, times: u64) {
    Mock::given(method("GET"))
        .and(path(SLOTS))
        .and(query_param("code", format!("eq.{}", code)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([MockRows::slot(code, total, available)])),
        )
        .up_to_n_times(times)
        .mount(server)
        .await;
}

async fn mount_seat_swap(server: &MockServer, code: &str, total: i32, expected: i32, new_value: i32) {
    Mock::given(method("PATCH"))
        .and(path(SLOTS))
        .and(query_param("code", format!("eq.{}", code)))
        .and(query_param("available_seats", format!("eq.{}", expected)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([MockRows::slot(code, total, new_value)])),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn reserve_decrements_by_one() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());

    mount_slot_read(&server, "CONS-1", 10, 5, u64::MAX).await;
    mount_seat_swap(&server, "CONS-1", 10, 5, 4).await;

    let slot = SlotService::new(&config).reserve("CONS-1").await.unwrap();
    assert_eq!(slot.available_seats, 4);
}

#[tokio::test]
async fn reserve_with_no_seats_is_rejected_without_write() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());

    mount_slot_read(&server, "CONS-1", 10, 0, u64::MAX).await;

    Mock::given(method("PATCH"))
        .and(path(SLOTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let result = SlotService::new(&config).reserve("CONS-1").await;
    assert_matches!(result, Err(ConsultationError::NoSeatsAvailable));
}

#[tokio::test]
async fn reserve_unknown_slot_is_not_found() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());

    Mock::given(method("GET"))
        .and(path(SLOTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = SlotService::new(&config).reserve("GHOST").await;
    assert_matches!(result, Err(ConsultationError::SlotNotFound));
}

#[tokio::test]
async fn release_increments_by_one() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());

    mount_slot_read(&server, "CONS-1", 10, 4, u64::MAX).await;
    mount_seat_swap(&server, "CONS-1", 10, 4, 5).await;

    let slot = SlotService::new(&config).release("CONS-1").await.unwrap();
    assert_eq!(slot.available_seats, 5);
}

#[tokio::test]
async fn release_at_full_capacity_is_rejected_without_write() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());

    mount_slot_read(&server, "CONS-1", 10, 10, u64::MAX).await;

    Mock::given(method("PATCH"))
        .and(path(SLOTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let result = SlotService::new(&config).release("CONS-1").await;
    assert_matches!(result, Err(ConsultationError::AllSeatsReleased));
}

#[tokio::test]
async fn reserve_then_release_restores_the_counter() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());

    // First read sees 5 seats, the read after the reserve sees 4.
    mount_slot_read(&server, "CONS-1", 10, 5, 1).await;
    mount_seat_swap(&server, "CONS-1", 10, 5, 4).await;
    mount_slot_read(&server, "CONS-1", 10, 4, 1).await;
    mount_seat_swap(&server, "CONS-1", 10, 4, 5).await;

    let service = SlotService::new(&config);
    let reserved = service.reserve("CONS-1").await.unwrap();
    assert_eq!(reserved.available_seats, 4);

    let released = service.release("CONS-1").await.unwrap();
    assert_eq!(released.available_seats, 5);
}

#[tokio::test]
async fn ten_seats_allow_exactly_ten_reservations() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());

    for seats in (1..=10).rev() {
        mount_slot_read(&server, "CONS-1", 10, seats, 1).await;
        mount_seat_swap(&server, "CONS-1", 10, seats, seats - 1).await;
    }
    // Every read after the tenth reservation sees an empty slot.
    mount_slot_read(&server, "CONS-1", 10, 0, u64::MAX).await;

    let service = SlotService::new(&config);
    for expected in (0..10).rev() {
        let slot = service.reserve("CONS-1").await.unwrap();
        assert_eq!(slot.available_seats, expected);
    }

    let eleventh = service.reserve("CONS-1").await;
    assert_matches!(eleventh, Err(ConsultationError::NoSeatsAvailable));
}

#[tokio::test]
async fn lost_seat_race_is_retried_with_fresh_state() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());

    // First attempt reads 5 but another writer got there first: the
    // conditional update matches nothing. The retry reads 4 and succeeds.
    mount_slot_read(&server, "CONS-1", 10, 5, 1).await;
    Mock::given(method("PATCH"))
        .and(path(SLOTS))
        .and(query_param("available_seats", "eq.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    mount_slot_read(&server, "CONS-1", 10, 4, 1).await;
    mount_seat_swap(&server, "CONS-1", 10, 4, 3).await;

    let slot = SlotService::new(&config).reserve("CONS-1").await.unwrap();
    assert_eq!(slot.available_seats, 3);
}

#[tokio::test]
async fn persistent_contention_surfaces_as_conflict() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());

    mount_slot_read(&server, "CONS-1", 10, 5, u64::MAX).await;
    Mock::given(method("PATCH"))
        .and(path(SLOTS))
        .and(query_param("available_seats", "eq.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = SlotService::new(&config).reserve("CONS-1").await;
    assert_matches!(result, Err(ConsultationError::ConcurrentUpdate));
}

#[tokio::test]
async fn seats_overwrite_above_capacity_is_rejected() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());

    mount_slot_read(&server, "CONS-1", 10, 5, u64::MAX).await;

    Mock::given(method("PATCH"))
        .and(path(SLOTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let result = SlotService::new(&config).set_available_seats("CONS-1", 11).await;
    assert_matches!(
        result,
        Err(ConsultationError::SeatsOutOfRange { available: 11, total: 10 })
    );

    let negative = SlotService::new(&config).set_available_seats("CONS-1", -1).await;
    assert_matches!(negative, Err(ConsultationError::SeatsOutOfRange { .. }));
}

#[tokio::test]
async fn seats_overwrite_within_bounds_is_stored() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());

    mount_slot_read(&server, "CONS-1", 10, 5, u64::MAX).await;

    Mock::given(method("PATCH"))
        .and(path(SLOTS))
        .and(query_param("code", "eq.CONS-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([MockRows::slot("CONS-1", 10, 7)])),
        )
        .mount(&server)
        .await;

    let slot = SlotService::new(&config)
        .set_available_seats("CONS-1", 7)
        .await
        .unwrap();
    assert_eq!(slot.available_seats, 7);
}

#[tokio::test]
async fn repeated_cancellation_is_idempotent() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());

    let mut cancelled = MockRows::slot("CONS-1", 10, 5);
    cancelled["status"] = json!("cancelled");

    mount_slot_read(&server, "CONS-1", 10, 5, u64::MAX).await;
    Mock::given(method("PATCH"))
        .and(path(SLOTS))
        .and(query_param("code", "eq.CONS-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([cancelled])))
        .mount(&server)
        .await;

    let service = SlotService::new(&config);
    let first = service
        .update_status("CONS-1", SlotStatus::Cancelled)
        .await
        .unwrap();
    let second = service
        .update_status("CONS-1", SlotStatus::Cancelled)
        .await
        .unwrap();

    assert_eq!(first.status, SlotStatus::Cancelled);
    assert_eq!(second.status, SlotStatus::Cancelled);
}
