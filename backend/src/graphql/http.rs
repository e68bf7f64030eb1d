//! HTTP handlers for the GraphQL endpoint

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::{ACCEPT, AUTHORIZATION};
use axum::response::IntoResponse;

use crate::AppState;

use super::auth::AuthToken;

/// Raw `Authorization` value; a `Bearer ` prefix is tolerated and stripped
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .map(|h| h.strip_prefix("Bearer ").unwrap_or(h).trim())
        .filter(|h| !h.is_empty())
        .map(str::to_string)
}

/// GraphQL query/mutation handler; the token is verified lazily by resolvers
pub async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let request = req.into_inner().data(AuthToken::new(extract_token(&headers)));
    state.schema.execute(request).await.into()
}

/// GraphiQL interactive playground (only for browsers)
pub async fn graphiql(headers: HeaderMap) -> impl IntoResponse {
    let accepts_html = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("text/html"))
        .unwrap_or(false);

    if accepts_html {
        axum::response::Html(GraphiQLSource::build().endpoint("/graphql").finish()).into_response()
    } else {
        (
            axum::http::StatusCode::METHOD_NOT_ALLOWED,
            axum::Json(serde_json::json!({
                "error": "GET requests are not supported for GraphQL queries. Use POST with Content-Type: application/json"
            })),
        )
            .into_response()
    }
}
