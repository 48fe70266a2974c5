use std::{ops::Deref, sync::Arc};

use axum::{
    async_trait,
    extract::{rejection::QueryRejection, FromRequestParts, Query},
    http::request,
};
use threadspace_api::{Error as ApiError, Order, Scope};
use threadspace_mock_server::MockServer;

use crate::Error;

#[derive(Clone, axum::extract::FromRef)]
pub struct AppState {
    pub forum: Backend,
}

/// The forum every handler operates on
#[derive(Clone)]
pub struct Backend(Arc<MockServer>);

impl Backend {
    pub fn new(forum: Arc<MockServer>) -> Backend {
        Backend(forum)
    }
}

impl Deref for Backend {
    type Target = MockServer;

    fn deref(&self) -> &MockServer {
        &self.0
    }
}

fn invalid_query(err: QueryRejection) -> ApiError {
    ApiError::InvalidQuery {
        details: err.to_string(),
    }
}

#[derive(serde::Deserialize)]
struct RawFeedQuery {
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    sort: Option<String>,
}

/// `?scope=<all|popular|community:name>&sort=<new|top|hot>`, both optional
///
/// Without `sort` the listing stays in feed order.
pub struct FeedQuery {
    pub scope: Scope,
    pub order: Option<Order>,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for FeedQuery {
    type Rejection = Error;

    async fn from_request_parts(req: &mut request::Parts, state: &S) -> Result<FeedQuery, Error> {
        let Query(raw) = Query::<RawFeedQuery>::from_request_parts(req, state)
            .await
            .map_err(invalid_query)?;
        let scope = match raw.scope {
            Some(s) => s.parse::<Scope>()?,
            None => Scope::All,
        };
        let order = raw.sort.map(|o| o.parse::<Order>()).transpose()?;
        Ok(FeedQuery { scope, order })
    }
}

#[derive(serde::Deserialize)]
struct RawSearchQuery {
    #[serde(default)]
    q: String,
}

/// `?q=<text>`; a missing query searches for nothing
pub struct SearchQuery(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for SearchQuery {
    type Rejection = Error;

    async fn from_request_parts(
        req: &mut request::Parts,
        state: &S,
    ) -> Result<SearchQuery, Error> {
        let Query(raw) = Query::<RawSearchQuery>::from_request_parts(req, state)
            .await
            .map_err(invalid_query)?;
        Ok(SearchQuery(raw.q))
    }
}
