use actix_web::http::StatusCode;
use actix_web::test;
use pgprobe::AppState;
use sea_orm::DbErr;
use test_support::mock_db::{failing_db, health_row, postgres};

use crate::common::read_json;

#[actix_web::test]
async fn reports_ok_when_the_probe_query_succeeds() {
    let db = postgres()
        .append_query_results([[health_row()]])
        .into_connection();
    let app = crate::test_app!(AppState::for_connection(db));

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json = read_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db"], "ok");
    assert!(json.get("db_error").is_none());
    assert_eq!(json["app_version"], env!("CARGO_PKG_VERSION"));
}

#[actix_web::test]
async fn reports_db_error_without_failing_the_probe() {
    let db = failing_db(DbErr::Custom("connection refused".into()));
    let app = crate::test_app!(AppState::for_connection(db));

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json = read_json(resp).await;
    assert_eq!(json["db"], "error");
    assert_eq!(json["db_error"], "query failed");
}

#[actix_web::test]
async fn reports_closed_pool() {
    let state = AppState::for_connection(postgres().into_connection());
    state.shutdown().await.unwrap();
    let app = crate::test_app!(state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let json = read_json(test::call_service(&app, req).await).await;
    assert_eq!(json["db"], "error");
    assert_eq!(json["db_error"], "pool closed");
}
