use hohstartup_core::{RelayResponse, Result, StartupPayload};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::headers::json_headers;
use crate::transport::{HttpRequest, HttpTransport};

pub fn relay_body(payload: &StartupPayload) -> Value {
    json!({ "inGameStartupData": payload.as_base64() })
}

/// Hands the encoded startup payload to the aggregation service.
pub struct RelayForwarder {
    transport: Arc<dyn HttpTransport>,
    url: String,
}

impl RelayForwarder {
    pub fn new(transport: Arc<dyn HttpTransport>, url: &str) -> Self {
        Self {
            transport,
            url: url.to_string(),
        }
    }

    pub async fn forward(&self, payload: &StartupPayload) -> Result<RelayResponse> {
        info!(url = %self.url, encoded_len = payload.as_base64().len(), "Forwarding startup data");

        let request = HttpRequest::post_json(&self.url, json_headers(), &relay_body(payload))?;
        let response = self
            .transport
            .execute(request)
            .await?
            .error_for_status("relay")?;

        let relay: RelayResponse = response.json_body("relay")?;
        info!(has_follow_up = relay.follow_up_url().is_some(), "Relay responded");
        Ok(relay)
    }
}
