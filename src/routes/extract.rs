//! Request extractors whose rejections render as the JSON error envelope
//! instead of axum's plain-text bodies.

use axum::{
    extract::{
        FromRequest, FromRequestParts, Multipart, Path, Query, Request,
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::request::Parts,
};

use crate::error::AppError;

pub struct AppJson<T>(pub T);

pub struct AppPath<T>(pub T);

pub struct AppQuery<T>(pub T);

pub struct AppMultipart(pub Multipart);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl<T, S> FromRequest<S> for AppJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl<S> FromRequest<S> for AppMultipart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(Multipart::from_request(req, state).await?))
    }
}

impl<T, S> FromRequestParts<S> for AppPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

impl<T, S> FromRequestParts<S> for AppQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{StatusCode, header},
        response::IntoResponse,
    };
    use serde::Deserialize;

    use super::*;
    use crate::routes::params::Pagination;

    #[derive(Debug, Deserialize)]
    struct AgeOnly {
        age: Option<i32>,
    }

    async fn envelope(err: AppError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn bad_json_body_renders_the_error_envelope() {
        let req = Request::builder()
            .method("PUT")
            .uri("/api/profile")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"age":"twenty"}"#))
            .unwrap();

        let Err(err) = AppJson::<AgeOnly>::from_request(req, &()).await else {
            panic!("string age must be rejected");
        };
        let (status, body) = envelope(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("age"));
        assert_eq!(body["data"]["error"], body["message"]);
    }

    #[tokio::test]
    async fn missing_content_type_keeps_its_status() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .body(Body::from("{}"))
            .unwrap();

        let Err(err) = AppJson::<AgeOnly>::from_request(req, &()).await else {
            panic!("body without content type must be rejected");
        };
        assert_eq!(err.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn malformed_query_renders_the_error_envelope() {
        let req = Request::builder()
            .uri("/api/profile/likes?page=abc")
            .body(Body::empty())
            .unwrap();
        let (mut parts, _) = req.into_parts();

        let Err(err) = AppQuery::<Pagination>::from_request_parts(&mut parts, &()).await else {
            panic!("non-numeric page must be rejected");
        };
        let (status, body) = envelope(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn valid_json_body_is_extracted() {
        let req = Request::builder()
            .method("PUT")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"age":21}"#))
            .unwrap();

        let AppJson(value) = AppJson::<AgeOnly>::from_request(req, &()).await.unwrap();
        assert_eq!(value.age, Some(21));
    }
}
