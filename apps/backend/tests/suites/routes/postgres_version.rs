use actix_web::http::StatusCode;
use actix_web::test;
use pgprobe::{AppState, ConnectionManager};
use sea_orm::{ConnAcquireErr, DbErr};
use test_support::mock_db::{failing_db, version_db, SAMPLE_BANNER};
use test_support::problem_details::assert_problem_details_from_service_response;

use crate::common::read_json;

#[actix_web::test]
async fn returns_info_matching_the_service() {
    let state = AppState::for_connection(version_db(SAMPLE_BANNER, 2));
    let expected = state.server_info.fetch_server_version(None).await.unwrap();

    let app = crate::test_app!(state);
    let req = test::TestRequest::get().uri("/postgres_version").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let json = read_json(resp).await;
    let body = json.as_object().expect("object body");
    assert_eq!(body.len(), 1, "only the info field is returned: {json}");
    assert_eq!(json["info"], expected);
    assert!(expected.starts_with("PostgreSQL version: "));
    assert!(expected.contains(SAMPLE_BANNER));
}

#[actix_web::test]
async fn query_failure_becomes_a_500_problem() {
    let state = AppState::for_connection(failing_db(DbErr::Custom(
        "server closed the connection unexpectedly".into(),
    )));

    let app = crate::test_app!(state);
    let req = test::TestRequest::get().uri("/postgres_version").to_request();
    let resp = test::call_service(&app, req).await;

    assert_problem_details_from_service_response(resp, "DB_ERROR", StatusCode::INTERNAL_SERVER_ERROR)
        .await;
}

#[actix_web::test]
async fn pool_timeout_becomes_a_503_problem() {
    let state = AppState::for_connection(failing_db(DbErr::ConnectionAcquire(
        ConnAcquireErr::Timeout,
    )));

    let app = crate::test_app!(state);
    let req = test::TestRequest::get().uri("/postgres_version").to_request();
    let resp = test::call_service(&app, req).await;

    assert_problem_details_from_service_response(
        resp,
        "DB_UNAVAILABLE",
        StatusCode::SERVICE_UNAVAILABLE,
    )
    .await;
}

#[actix_web::test]
async fn closed_pool_is_reported_as_unavailable() {
    let manager = ConnectionManager::from_connection(version_db(SAMPLE_BANNER, 1));
    manager.close().await.unwrap();
    let state = AppState::new(manager);

    let app = crate::test_app!(state);
    let req = test::TestRequest::get().uri("/postgres_version").to_request();
    let resp = test::call_service(&app, req).await;

    assert_problem_details_from_service_response(
        resp,
        "DB_UNAVAILABLE",
        StatusCode::SERVICE_UNAVAILABLE,
    )
    .await;
}

#[actix_web::test]
async fn only_get_is_routed() {
    let state = AppState::for_connection(version_db(SAMPLE_BANNER, 1));
    let app = crate::test_app!(state);

    let req = test::TestRequest::post().uri("/postgres_version").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());
}
