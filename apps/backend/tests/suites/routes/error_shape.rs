use actix_web::http::StatusCode;
use actix_web::{test, web, App, HttpResponse};
use pgprobe::{AppError, RequestTrace};
use test_support::problem_details::assert_problem_details_from_service_response;

async fn misconfigured() -> Result<HttpResponse, AppError> {
    Err(AppError::config("POSTGRES_HOST is missing"))
}

#[actix_web::test]
async fn errors_render_as_problem_details_with_trace_id() {
    let app = test::init_service(
        App::new()
            .wrap(RequestTrace)
            .route("/_test/error", web::get().to(misconfigured)),
    )
    .await;

    let req = test::TestRequest::get().uri("/_test/error").to_request();
    let resp = test::call_service(&app, req).await;

    let request_id = resp
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("x-request-id header");
    let trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("x-trace-id header");
    assert_eq!(request_id, trace_id);

    assert_problem_details_from_service_response(
        resp,
        "CONFIG_ERROR",
        StatusCode::INTERNAL_SERVER_ERROR,
    )
    .await;
}

#[actix_web::test]
async fn config_detail_is_not_exposed_to_clients() {
    let app = test::init_service(
        App::new()
            .wrap(RequestTrace)
            .route("/_test/error", web::get().to(misconfigured)),
    )
    .await;

    let req = test::TestRequest::get().uri("/_test/error").to_request();
    let body = test::read_body(test::call_service(&app, req).await).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(!text.contains("POSTGRES_HOST"));
}

#[actix_web::test]
async fn unmatched_routes_still_carry_a_request_id() {
    let app = crate::test_app!(pgprobe::AppState::for_connection(
        test_support::mock_db::postgres().into_connection()
    ));

    let req = test::TestRequest::get().uri("/no/such/route").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let request_id = resp
        .headers()
        .get(pgprobe::middleware::request_trace::REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .expect("x-request-id header");
    assert!(uuid_like(request_id), "{request_id}");
}

fn uuid_like(s: &str) -> bool {
    s.len() == 36 && s.chars().filter(|c| *c == '-').count() == 4
}
