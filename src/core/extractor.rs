use axum::{
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Query, Request},
    http::{header, request::Parts},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};

use crate::core::error::AppError;
use crate::shared::validation::LOCALE_TAG_REGEX;

/// Custom JSON extractor that provides consistent error responses
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppJsonRejection;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err(AppJsonRejection(rejection)),
        }
    }
}

pub struct AppJsonRejection(JsonRejection);

impl IntoResponse for AppJsonRejection {
    fn into_response(self) -> Response {
        let message = match self.0 {
            // Unknown node kinds, malformed ids and wrong field types all land here
            JsonRejection::JsonDataError(err) => format!("Invalid address or node payload: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("Invalid JSON syntax: {}", err),
            JsonRejection::MissingJsonContentType(err) => {
                format!("Missing JSON content type: {}", err)
            }
            _ => "Failed to parse JSON body".to_string(),
        };

        AppError::BadRequest(message).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct LocaleQuery {
    locale: Option<String>,
}

/// Locale requested by the caller, taken from `?locale=` or else the first
/// `Accept-Language` tag. Kept as the raw string; resolution against the
/// supported set happens in the translation index. Malformed tags are dropped.
#[derive(Debug, Clone, Default)]
pub struct RequestLocale(pub String);

impl RequestLocale {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for RequestLocale
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<LocaleQuery>::try_from_uri(&parts.uri)
            .map_err(|e| AppError::BadRequest(format!("Invalid query string: {}", e)))?;

        if let Some(locale) = query
            .locale
            .map(|l| l.trim().to_string())
            .filter(|l| LOCALE_TAG_REGEX.is_match(l))
        {
            return Ok(Self(locale));
        }

        let from_header = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|tag| tag.split(';').next())
            .map(str::trim)
            .filter(|tag| LOCALE_TAG_REGEX.is_match(tag))
            .map(str::to_string)
            .unwrap_or_default();

        Ok(Self(from_header))
    }
}
