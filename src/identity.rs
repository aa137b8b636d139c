use std::fmt;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;

use crate::error::AppError;

pub const GUEST: &str = "guest";
pub const USER_HEADER: &str = "x-user-id";

/// The client-supplied user id that partitions every stored record.
/// Nothing here authenticates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner(String);

impl Owner {
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|value| !value.is_empty()) {
            Some(id) => Self(id.to_string()),
            None => Self(GUEST.to_string()),
        }
    }

    /// Body value first, then whatever the request parts carried.
    pub fn or_body(self, body: Option<&str>) -> Self {
        match body.map(str::trim).filter(|value| !value.is_empty()) {
            Some(id) => Self(id.to_string()),
            None => self,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_guest(&self) -> bool {
        self.0 == GUEST
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnerQuery {
    user_id: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<OwnerQuery>::from_request_parts(parts, state).await?;
        if let Some(id) = query.user_id.as_deref().filter(|v| !v.trim().is_empty()) {
            return Ok(Self::resolve(Some(id)));
        }

        let header = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok());
        Ok(Self::resolve(header))
    }
}
