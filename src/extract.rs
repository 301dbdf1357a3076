//! Request extractors
//! JSON bodies that fail to parse come back as `ApiError`, not axum's plain-text rejections

use crate::error::ApiError;
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

/// `Json<T>` whose rejection is a 400 `validation_error`
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::RegisterRequest;
    use axum::{
        body::Body,
        http::{header, Request as HttpRequest, StatusCode},
    };

    fn json_request(body: &'static str) -> Request {
        HttpRequest::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_extracts() {
        let req = json_request(r#"{"name":"A","email":"a@x.com","pass":"Abcd123!"}"#);
        let ApiJson(payload) = ApiJson::<RegisterRequest>::from_request(req, &())
            .await
            .unwrap();
        assert_eq!(payload.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_missing_field_is_validation_error() {
        let req = json_request(r#"{"name":"A","email":"a@x.com"}"#);
        let err = match ApiJson::<RegisterRequest>::from_request(req, &()).await {
            Err(err) => err,
            Ok(_) => panic!("body without pass should be rejected"),
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("pass"));
    }

    #[tokio::test]
    async fn test_missing_content_type_is_validation_error() {
        let req = HttpRequest::builder()
            .method("POST")
            .body(Body::from(r#"{"name":"A","email":"a@x.com","pass":"Abcd123!"}"#))
            .unwrap();
        let err = match ApiJson::<RegisterRequest>::from_request(req, &()).await {
            Err(err) => err,
            Ok(_) => panic!("missing content type should be rejected"),
        };
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
