//! HTTP surface polled by the appliance.
//!
//! Each logical endpoint is reachable under the legacy SOAP-shaped path the
//! firmware was built against and a short alias. Bodies are form-urlencoded
//! with the wire document in an `xml` field; responses are `text/xml`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Form, Router};
use serde::Deserialize;
use tracing::warn;

use crate::service::BridgeService;

const LEGACY_BASE: &str = "/WebServices/SyrConnectLimexWebService.asmx";

/// Form body carrying the wire document.
#[derive(Debug, Deserialize)]
pub struct PollForm {
    pub xml: String,
}

/// Build the appliance-facing router.
pub fn router(service: Arc<BridgeService>) -> Router {
    Router::new()
        .route(&format!("{LEGACY_BASE}/GetBasicCommands"), post(basic_commands))
        .route("/GBC", post(basic_commands))
        .route(&format!("{LEGACY_BASE}/GetAllCommands"), post(all_commands))
        .route("/GAC", post(all_commands))
        .with_state(service)
}

async fn basic_commands(
    State(service): State<Arc<BridgeService>>,
    Form(form): Form<PollForm>,
) -> Response {
    match service.handle_basic_poll(&form.xml).await {
        Ok(document) => xml_response(document),
        Err(e) => {
            warn!("rejecting basic poll: {e}");
            StatusCode::BAD_REQUEST.into_response()
        }
    }
}

async fn all_commands(
    State(service): State<Arc<BridgeService>>,
    Form(form): Form<PollForm>,
) -> Response {
    match service.handle_full_poll(&form.xml).await {
        Ok(document) => xml_response(document),
        Err(e) => {
            warn!("rejecting full poll: {e}");
            StatusCode::BAD_REQUEST.into_response()
        }
    }
}

fn xml_response(document: String) -> Response {
    ([(header::CONTENT_TYPE, "text/xml")], document).into_response()
}
