use crate::modules::models::response::HustleResponse;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::Json;
use http::request::Parts;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Default, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct FetchParameters {
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u32>,
}

/// Query string extractor that rejects unparsable or invalid parameters with 400.
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<HustleResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or_default();
        let value: T = serde_urlencoded::from_str(query).map_err(|rejection| {
            tracing::error!("Parsing error: {}", rejection);
            (
                StatusCode::BAD_REQUEST,
                Json(HustleResponse::error(
                    "invalid format query string",
                    rejection,
                )),
            )
        })?;

        value.validate().map_err(|rejection| {
            tracing::error!("Validation error: {}", rejection);
            (
                StatusCode::BAD_REQUEST,
                Json(HustleResponse::error(
                    "Validation error",
                    rejection.to_string().replace('\n', ", "),
                )),
            )
        })?;

        Ok(ValidatedQuery(value))
    }
}
