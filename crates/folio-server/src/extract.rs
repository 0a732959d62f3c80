//! Request extractors that reject with [`ApiError`]
//!
//! Binding failures name the offending parameter so the dispatcher can report
//! exactly one field error for them.

use std::collections::HashMap;
use std::str::FromStr;

use axum::Json;
use axum::extract::path::ErrorKind;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use http::{HeaderMap, StatusCode};
use http::request::Parts;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, BindingError};

/// Raw query string parameters, converted on demand
#[derive(Debug, Clone, Default)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    /// Convert a parameter that must be present
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::MissingQuery`] when absent or empty, and
    /// [`BindingError::TypeMismatch`] when the value does not parse as `T`
    pub fn required<T: FromStr>(&self, name: &str) -> Result<T, BindingError> {
        self.optional(name)?
            .ok_or_else(|| BindingError::MissingQuery { name: name.to_owned() })
    }

    /// Convert a parameter that may be absent
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::TypeMismatch`] when the value does not parse as `T`
    pub fn optional<T: FromStr>(&self, name: &str) -> Result<Option<T>, BindingError> {
        self.get(name).map(|raw| convert(name, raw)).transpose()
    }

    /// Raw value of a non-empty parameter
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str).filter(|value| !value.is_empty())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for QueryParams {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| BindingError::MalformedQuery {
                detail: rejection.body_text(),
            })?;

        Ok(Self(params))
    }
}

/// Path variables captured by the matched route
#[derive(Debug, Clone, Default)]
pub struct PathParams {
    values: HashMap<String, String>,
    /// Variable whose percent-decoded value is not UTF-8
    undecodable: Option<String>,
}

impl PathParams {
    /// Convert a captured path variable
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::MissingPath`] when the route captured no such
    /// variable, and [`BindingError::TypeMismatch`] when it does not parse as `T`
    /// or when any captured variable could not be decoded
    pub fn required<T: FromStr>(&self, name: &str) -> Result<T, BindingError> {
        if let Some(key) = &self.undecodable {
            return Err(BindingError::TypeMismatch {
                name: key.clone(),
                value: UNDECODABLE.to_owned(),
                required: if key == name { short_type_name::<T>() } else { "String" },
            });
        }

        let raw = self
            .values
            .get(name)
            .ok_or_else(|| BindingError::MissingPath { name: name.to_owned() })?;

        convert(name, raw)
    }
}

const UNDECODABLE: &str = "<invalid UTF-8>";

impl<S: Send + Sync> FromRequestParts<S> for PathParams {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<HashMap<String, String>>::from_request_parts(parts, state).await {
            Ok(Path(values)) => Ok(Self {
                values,
                undecodable: None,
            }),
            Err(PathRejection::MissingPathParams(_)) => Ok(Self::default()),
            // Reported once the handler asks for a variable, so the expected type is known
            Err(PathRejection::FailedToDeserializePathParams(error)) => match error.kind() {
                ErrorKind::InvalidUtf8InPathParam { key } => Ok(Self {
                    values: HashMap::new(),
                    undecodable: Some(key.clone()),
                }),
                _ => Err(anyhow::anyhow!("failed to read path parameters: {}", error.body_text()).into()),
            },
            Err(rejection) => Err(anyhow::anyhow!("failed to read path parameters: {}", rejection.body_text()).into()),
        }
    }
}

/// JSON request body
///
/// A missing JSON content type is rejected as unsupported, an oversized body
/// as too large, and anything else as unreadable.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state)
            .await
            .map_err(|rejection| body_rejection(&rejection))?;
        Ok(Self(value))
    }
}

fn body_rejection(rejection: &JsonRejection) -> BindingError {
    let detail = rejection.body_text();

    match rejection {
        JsonRejection::MissingJsonContentType(_) => BindingError::UnsupportedMediaType { detail },
        _ if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => BindingError::PayloadTooLarge { detail },
        _ => BindingError::UnreadableBody { detail },
    }
}

/// Read a header that must be present
///
/// # Errors
///
/// Returns [`BindingError::MissingHeader`] when the header is absent or empty,
/// and [`BindingError::TypeMismatch`] when its value is not visible ASCII
pub fn required_header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, BindingError> {
    let value = headers
        .get(name)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| BindingError::MissingHeader { name: name.to_owned() })?;

    value.to_str().map_err(|_| BindingError::TypeMismatch {
        name: name.to_owned(),
        value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
        required: "String",
    })
}

fn convert<T: FromStr>(name: &str, raw: &str) -> Result<T, BindingError> {
    raw.parse().map_err(|_| BindingError::TypeMismatch {
        name: name.to_owned(),
        value: raw.to_owned(),
        required: short_type_name::<T>(),
    })
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use http::header::CONTENT_TYPE;

    use super::*;

    async fn query(uri: &str) -> QueryParams {
        let (mut parts, ()) = http::Request::builder().uri(uri).body(()).unwrap().into_parts();
        QueryParams::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn required_query_parameter() {
        let params = query("/books/page?page=2&size=").await;

        assert_eq!(params.required::<i64>("page").unwrap(), 2);
        assert_eq!(
            params.required::<i64>("size").unwrap_err(),
            BindingError::MissingQuery { name: "size".to_owned() }
        );
        assert_eq!(params.optional::<i64>("sort").unwrap(), None);
    }

    #[tokio::test]
    async fn unparsable_query_parameter_is_a_type_mismatch() {
        let params = query("/books/page?page=first").await;

        assert_eq!(
            params.required::<i64>("page").unwrap_err(),
            BindingError::TypeMismatch {
                name: "page".to_owned(),
                value: "first".to_owned(),
                required: "i64",
            }
        );
    }

    #[test]
    fn path_variable_conversion() {
        let params = PathParams {
            values: HashMap::from([("id".to_owned(), "abc".to_owned())]),
            undecodable: None,
        };

        assert!(matches!(
            params.required::<i64>("id"),
            Err(BindingError::TypeMismatch { required: "i64", .. })
        ));
        assert_eq!(
            params.required::<i64>("authorId").unwrap_err(),
            BindingError::MissingPath {
                name: "authorId".to_owned()
            }
        );
    }

    #[test]
    fn undecodable_path_variable_is_a_type_mismatch() {
        let params = PathParams {
            values: HashMap::new(),
            undecodable: Some("id".to_owned()),
        };

        assert_eq!(
            params.required::<i64>("id").unwrap_err(),
            BindingError::TypeMismatch {
                name: "id".to_owned(),
                value: UNDECODABLE.to_owned(),
                required: "i64",
            }
        );
        assert!(matches!(
            params.required::<i64>("authorId"),
            Err(BindingError::TypeMismatch { ref name, required: "String", .. }) if name == "id"
        ));
    }

    #[test]
    fn header_must_be_present() {
        let mut headers = HeaderMap::new();
        assert_eq!(
            required_header(&headers, "x-client-id").unwrap_err(),
            BindingError::MissingHeader {
                name: "x-client-id".to_owned()
            }
        );

        headers.insert("x-client-id", "catalog-ui".parse().unwrap());
        assert_eq!(required_header(&headers, "x-client-id").unwrap(), "catalog-ui");
    }

    #[test]
    fn short_names_strip_module_paths() {
        assert_eq!(short_type_name::<i64>(), "i64");
        assert_eq!(short_type_name::<String>(), "String");
    }

    #[tokio::test]
    async fn malformed_json_is_unreadable() {
        let request = http::Request::builder()
            .method("POST")
            .uri("/books")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{\"title\":"))
            .unwrap();

        let rejection = JsonBody::<serde_json::Value>::from_request(request, &()).await.unwrap_err();
        assert!(matches!(rejection, ApiError::Binding(BindingError::UnreadableBody { .. })));
    }

    #[tokio::test]
    async fn body_over_the_default_limit_is_too_large() {
        let request = http::Request::builder()
            .method("POST")
            .uri("/books")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(vec![b' '; 3 * 1024 * 1024]))
            .unwrap();

        let rejection = JsonBody::<serde_json::Value>::from_request(request, &()).await.unwrap_err();
        assert!(matches!(rejection, ApiError::Binding(BindingError::PayloadTooLarge { .. })));
    }

    #[tokio::test]
    async fn body_without_json_content_type_is_unsupported() {
        let request = http::Request::builder()
            .method("POST")
            .uri("/books")
            .header(CONTENT_TYPE, "text/plain")
            .body(Body::from("{\"title\":\"Dune\"}"))
            .unwrap();

        let rejection = JsonBody::<serde_json::Value>::from_request(request, &()).await.unwrap_err();
        assert!(matches!(
            rejection,
            ApiError::Binding(BindingError::UnsupportedMediaType { .. })
        ));
    }
}
