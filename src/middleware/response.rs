use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Wrapper for API responses that adds the `{ success, message, result }` envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    pub result: Option<T>,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK carrying `result`
    pub fn success(message: impl Into<String>, result: T) -> Self {
        Self::with_status(message, result, StatusCode::OK)
    }

    pub fn with_status(message: impl Into<String>, result: T, status_code: StatusCode) -> Self {
        Self {
            message: message.into(),
            result: Some(result),
            status_code,
        }
    }

    /// Create a 201 Created response
    pub fn created(message: impl Into<String>, result: T) -> Self {
        Self::with_status(message, result, StatusCode::CREATED)
    }
}

impl ApiResponse<()> {
    /// 200 OK with a message and no result
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            result: None,
            status_code: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let result = match self.result.as_ref().map(serde_json::to_value).transpose() {
            Ok(value) => value.unwrap_or(Value::Null),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "message": "Failed to serialize response data",
                        "code": "INTERNAL_SERVER_ERROR"
                    })),
                )
                    .into_response();
            }
        };

        let mut envelope = json!({
            "success": true,
            "message": self.message,
        });
        if !result.is_null() {
            envelope["result"] = result;
        }

        (self.status_code, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn created_wraps_result() {
        let response = ApiResponse::created("Quote created successfully", json!({ "id": 1 }))
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_of(response).await,
            json!({
                "success": true,
                "message": "Quote created successfully",
                "result": { "id": 1 }
            })
        );
    }

    #[tokio::test]
    async fn message_only_omits_result() {
        let response = ApiResponse::message("Post removed").into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_of(response).await;
        assert_eq!(body["message"], "Post removed");
        assert!(body.get("result").is_none());
    }
}
