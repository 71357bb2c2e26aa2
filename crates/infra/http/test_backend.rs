use axum::Router;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;

use crate::{
    domain::repositories::token_store::MockTokenStore,
    infra::http::api_client::{ApiClient, ApiClientConfig},
};

/// Serves `router` on an ephemeral local port and returns its base URL.
pub(crate) async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("test backend should bind");
    let addr = listener.local_addr().expect("test backend should have an address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("test backend should serve");
    });

    format!("http://{addr}")
}

pub(crate) fn client(base_url: &str, token: Option<&str>) -> ApiClient {
    build(base_url, token, Duration::from_secs(5))
}

pub(crate) fn client_with_timeout(base_url: &str, timeout: Duration) -> ApiClient {
    build(base_url, None, timeout)
}

fn build(base_url: &str, token: Option<&str>, timeout: Duration) -> ApiClient {
    let mut token_store = MockTokenStore::new();
    token_store
        .expect_token()
        .return_const(token.map(str::to_string));

    ApiClient::new(
        &ApiClientConfig {
            base_url: base_url.to_string(),
            timeout,
        },
        Arc::new(token_store),
    )
    .expect("api client should build")
}
