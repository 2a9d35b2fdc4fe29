//! Tests for HTTP error mapping.

use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::Error;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("already a member"), StatusCode::CONFLICT)]
#[case(
    Error::precondition_failed("proposal has no date"),
    StatusCode::UNPROCESSABLE_ENTITY
)]
#[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

async fn response_payload(
    error: Error,
    expected_status: StatusCode,
    expected_trace_id: Option<&str>,
) -> Error {
    let response = ResponseError::error_response(&error);
    assert_eq!(response.status(), expected_status);

    let header = response.headers().get(TRACE_ID_HEADER);
    match expected_trace_id {
        Some(expected) => {
            let trace_id = header
                .expect("trace id header is set")
                .to_str()
                .expect("trace id is valid UTF-8");
            assert_eq!(trace_id, expected);
        }
        None => assert!(header.is_none(), "trace id header should be absent"),
    }

    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    serde_json::from_slice(&bytes).expect("error JSON deserialises")
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(expected_trace_id: String) {
    let error = Error::internal("proposal repository error: relation missing")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({ "sql": "select 1" }));

    let payload = response_payload(
        error,
        StatusCode::INTERNAL_SERVER_ERROR,
        Some(&expected_trace_id),
    )
    .await;

    assert_eq!(payload.code(), ErrorCode::InternalError);
    assert_eq!(payload.message(), "Internal server error");
    assert!(payload.details().is_none());
}

#[rstest]
#[actix_web::test]
async fn precondition_details_reach_the_client(expected_trace_id: String) {
    let error = Error::precondition_failed("proposal has no assigned date")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({ "missing": "proposalDate" }));

    let payload = response_payload(
        error,
        StatusCode::UNPROCESSABLE_ENTITY,
        Some(&expected_trace_id),
    )
    .await;

    assert_eq!(payload.code(), ErrorCode::PreconditionFailed);
    assert_eq!(payload.details(), Some(&json!({ "missing": "proposalDate" })));
}

#[rstest]
#[actix_web::test]
async fn error_without_trace_id_omits_header() {
    let error = Error::not_found("proposal missing");

    let payload = response_payload(error, StatusCode::NOT_FOUND, None).await;

    assert_eq!(payload.message(), "proposal missing");
    assert_eq!(payload.trace_id(), None);
}

#[rstest]
fn actix_errors_become_redacted_internal_errors() {
    let err: Error = actix_web::error::ErrorBadRequest("boom").into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert_eq!(err.details(), None);
}
