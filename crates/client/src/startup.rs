use hohstartup_core::{Error, Result, SessionContext, StartupPayload};
use std::sync::Arc;
use tracing::info;

use crate::headers::startup_headers;
use crate::request_id::RequestIdGenerator;
use crate::transport::{HttpRequest, HttpTransport};

/// Fetches the binary startup payload bound to a negotiated session.
pub struct StartupFetcher {
    transport: Arc<dyn HttpTransport>,
    url: String,
    request_ids: Arc<dyn RequestIdGenerator>,
}

impl StartupFetcher {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        url: &str,
        request_ids: Arc<dyn RequestIdGenerator>,
    ) -> Self {
        Self {
            transport,
            url: url.to_string(),
            request_ids,
        }
    }

    pub async fn fetch(&self, context: &SessionContext) -> Result<StartupPayload> {
        let request_id = self.request_ids.next_id();
        info!(url = %self.url, request_id = %request_id, "Fetching startup data");

        let request = HttpRequest::post(&self.url, startup_headers(context, &request_id), None);
        let response = self
            .transport
            .execute(request)
            .await?
            .error_for_status("startup")?;

        if response.body.is_empty() {
            return Err(Error::Protocol("empty startup payload".to_string()));
        }

        info!(bytes = response.body.len(), "Startup data received");
        Ok(StartupPayload::from_bytes(&response.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use crate::request_id::UuidRequestIds;
    use crate::transport::{HttpResponse, Method};
    use hohstartup_core::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const URL: &str = "https://un1.example/game/startup";

    struct CountingIds(AtomicUsize);

    impl RequestIdGenerator for CountingIds {
        fn next_id(&self) -> String {
            format!("req-{}", self.0.fetch_add(1, Ordering::SeqCst))
        }
    }

    fn ctx() -> SessionContext {
        SessionContext {
            session_id: "sid-1".into(),
            client_version: "9.9.9".into(),
        }
    }

    #[tokio::test]
    async fn test_fetch_encodes_body() {
        let transport = Arc::new(
            MockTransport::new().on(URL, HttpResponse::new(200).with_body(vec![0x01, 0x02])),
        );
        let fetcher = StartupFetcher::new(transport.clone(), URL, Arc::new(UuidRequestIds));
        let payload = fetcher.fetch(&ctx()).await.unwrap();
        assert_eq!(payload.as_base64(), "AQI=");
        assert_eq!(payload.decode().unwrap(), vec![0x01, 0x02]);

        let req = transport.last_request_to(URL).unwrap();
        assert_eq!(req.method, Method::Post);
        assert!(req.body.is_none());
        assert_eq!(req.headers.get("X-AUTH-TOKEN"), Some("sid-1"));
        assert_eq!(req.headers.get("X-ClientVersion"), Some("9.9.9"));
        assert_eq!(req.headers.get("Accept"), Some("application/x-protobuf"));
    }

    #[tokio::test]
    async fn test_fresh_request_id_per_call() {
        let transport =
            Arc::new(MockTransport::new().on(URL, HttpResponse::new(200).with_body(vec![7])));
        let fetcher = StartupFetcher::new(
            transport.clone(),
            URL,
            Arc::new(CountingIds(AtomicUsize::new(0))),
        );
        fetcher.fetch(&ctx()).await.unwrap();
        fetcher.fetch(&ctx()).await.unwrap();

        let ids: Vec<String> = transport
            .requests()
            .iter()
            .filter_map(|r| r.headers.get("X-Request-Id").map(str::to_string))
            .collect();
        assert_eq!(ids, vec!["req-0".to_string(), "req-1".to_string()]);
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let transport = Arc::new(MockTransport::new().on(URL, HttpResponse::new(403)));
        let fetcher = StartupFetcher::new(transport.clone(), URL, Arc::new(UuidRequestIds));
        let err = fetcher.fetch(&ctx()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_body() {
        let transport = Arc::new(MockTransport::new().on(URL, HttpResponse::new(200)));
        let fetcher = StartupFetcher::new(transport, URL, Arc::new(UuidRequestIds));
        let err = fetcher.fetch(&ctx()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }
}
