use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use heartbeat_core::HeartbeatError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("心跳服务错误: {0}")]
    Heartbeat(#[from] HeartbeatError),

    #[error("请求参数错误: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::Heartbeat(HeartbeatError::HeartbeatNotFound { .. }) => (
                StatusCode::NOT_FOUND,
                "Heart beat record not found".to_string(),
            ),
            ApiError::Heartbeat(HeartbeatError::EmptyUpdate) => {
                (StatusCode::BAD_REQUEST, "No fields to update".to_string())
            }
            ApiError::Heartbeat(HeartbeatError::InvalidBeatTime { value }) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid beat_time: {value}"),
            ),
            ApiError::Heartbeat(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let error = ApiError::Heartbeat(HeartbeatError::heartbeat_not_found("AA:BB"));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_empty_update_maps_to_400() {
        let error = ApiError::Heartbeat(HeartbeatError::EmptyUpdate);
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_beat_time_maps_to_400() {
        let error = ApiError::Heartbeat(HeartbeatError::invalid_beat_time("garbage"));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_storage_failure_maps_to_500() {
        let error = ApiError::Heartbeat(HeartbeatError::DatabaseOperation(
            "connection refused".to_string(),
        ));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
