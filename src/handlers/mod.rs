//! HTTP handlers

pub mod root;
pub mod health;
pub mod info;
pub mod predict;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::service::ServiceState;
    use crate::{create_router, AppState};

    /// Send one request through the real router and decode the JSON body
    pub(crate) async fn send(state: ServiceState, request: Request<Body>) -> (StatusCode, Value) {
        let app = create_router(AppState {
            service: Arc::new(state),
            config: Config::default(),
        });

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    pub(crate) fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    pub(crate) fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }
}
