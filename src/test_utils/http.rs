use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};

use crate::{AppState, build_router};

pub(crate) fn get_test_server(state: AppState) -> TestServer {
    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}

#[track_caller]
pub(crate) fn assert_error(response: &TestResponse, status: StatusCode, name: &str) {
    response.assert_status(status);

    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"]["statusCode"], status.as_u16());
    assert_eq!(
        body["error"]["name"], name,
        "want error named {name}, got {body}"
    );
}
