//! HTTP routes for /graphql and /graphql/ws

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLProtocol, GraphQLRequest, GraphQLResponse, GraphQLWebSocket};
use axum::Router;
use axum::extract::{State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::http::header::{ACCEPT, AUTHORIZATION};
use axum::response::IntoResponse;
use axum::routing::get;

use crate::AppState;
use crate::services::Credentials;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route("/graphql/ws", get(graphql_ws_handler))
}

/// Read the `Authorization` header. Values that are not valid UTF-8 are malformed.
fn extract_credentials(headers: &HeaderMap) -> Credentials {
    match headers.get(AUTHORIZATION) {
        None => Credentials::Missing,
        Some(value) => value
            .to_str()
            .map(|v| Credentials::from_header(Some(v)))
            .unwrap_or(Credentials::Malformed),
    }
}

/// GraphiQL interactive playground (only for browsers)
async fn graphiql(headers: HeaderMap) -> impl IntoResponse {
    let accepts_html = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("text/html"))
        .unwrap_or(false);

    if accepts_html {
        axum::response::Html(
            GraphiQLSource::build()
                .endpoint("/graphql")
                .subscription_endpoint("/graphql/ws")
                .finish(),
        )
        .into_response()
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

/// GraphQL query/mutation handler. Multipart requests carry uploads.
async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let request = req.into_inner().data(extract_credentials(&headers));
    state.schema.execute(request).await.into()
}

/// GraphQL WebSocket handler for subscriptions.
///
/// An `Authorization` connection-init parameter overrides the upgrade request's header.
async fn graphql_ws_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    protocol: GraphQLProtocol,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let header_credentials = extract_credentials(&headers);

    ws.protocols(["graphql-transport-ws", "graphql-ws"])
        .on_upgrade(move |socket| {
            GraphQLWebSocket::new(socket, state.schema.clone(), protocol)
                .on_connection_init(move |params| async move {
                    let credentials = params
                        .get("Authorization")
                        .or_else(|| params.get("authorization"))
                        .and_then(|v| v.as_str())
                        .map(|v| Credentials::from_header(Some(v)))
                        .unwrap_or(header_credentials);

                    let mut data = async_graphql::Data::default();
                    data.insert(credentials);
                    Ok(data)
                })
                .serve()
        })
}
