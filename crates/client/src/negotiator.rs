use hohstartup_core::{
    Credentials, Endpoints, Error, LoginResponse, Result, SessionContext, SessionCookie,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use crate::extract::{extract_client_version, find_session_cookie};
use crate::headers::{json_headers, play_headers, redirect_headers};
use crate::transport::{strip_query, HttpRequest, HttpTransport};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayResponse {
    #[serde(default)]
    session_id: Option<String>,
}

pub fn login_body(credentials: &Credentials) -> Value {
    json!({
        "username": credentials.username,
        "password": credentials.password,
        "useRememberMe": false,
    })
}

pub fn play_body(client_version: &str) -> Value {
    json!({
        "createDeviceToken": false,
        "meta": {
            "clientVersion": client_version,
            "device": "browser",
            "deviceHardware": "browser",
            "deviceManufacturer": "none",
            "deviceName": "browser",
            "locale": "en_DK",
            "networkType": "wlan",
            "operatingSystemName": "browser",
            "operatingSystemVersion": "1",
            "userAgent": "hoh-helper-mobile",
        },
        "network": "BROWSER_SESSION",
        "token": "",
        "worldId": null,
    })
}

/// Turns credentials into a [`SessionContext`] through the login, redirect
/// and account-play exchanges. Every request is made once; the first failure
/// ends the negotiation.
pub struct SessionNegotiator {
    transport: Arc<dyn HttpTransport>,
    endpoints: Endpoints,
}

impl SessionNegotiator {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    pub async fn negotiate(&self, credentials: &Credentials) -> Result<SessionContext> {
        if !credentials.is_complete() {
            return Err(Error::CredentialsMissing(
                "username and password must both be set".to_string(),
            ));
        }

        let redirect_url = self.login(credentials).await?;
        let (cookie, client_version) = self.follow_redirect(&redirect_url).await?;
        let session_id = self.play(&cookie, &client_version).await?;

        info!(client_version = %client_version, "Session negotiated");
        Ok(SessionContext {
            session_id,
            client_version,
        })
    }

    async fn login(&self, credentials: &Credentials) -> Result<String> {
        info!(url = %self.endpoints.login, username = %credentials.username, "Logging in");

        let request =
            HttpRequest::post_json(&self.endpoints.login, json_headers(), &login_body(credentials))?;
        let response = self
            .transport
            .execute(request)
            .await?
            .error_for_status("login")?;

        let login: LoginResponse = response.json_body("login")?;
        login
            .redirect_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| Error::Protocol("missing redirectUrl".to_string()))
    }

    async fn follow_redirect(&self, redirect_url: &str) -> Result<(SessionCookie, String)> {
        debug!(url = %strip_query(redirect_url), "Following login redirect");

        let response = self
            .transport
            .execute(HttpRequest::get(redirect_url, redirect_headers()))
            .await?
            .error_for_status("redirect")?;

        let cookie = find_session_cookie(response.header_values("set-cookie"))?;
        let client_version = extract_client_version(&response.text())?;

        debug!(cookie = ?cookie, client_version = %client_version, "Redirect parsed");
        Ok((cookie, client_version))
    }

    async fn play(&self, cookie: &SessionCookie, client_version: &str) -> Result<String> {
        info!(url = %self.endpoints.account_play, "Requesting play session");

        let request = HttpRequest::post_json(
            &self.endpoints.account_play,
            play_headers(cookie),
            &play_body(client_version),
        )?;
        let response = self
            .transport
            .execute(request)
            .await?
            .error_for_status("account play")?;

        let play: PlayResponse = response.json_body("account play")?;
        play.session_id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Protocol("missing sessionId".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockTransport, Scenario};
    use crate::transport::{HttpResponse, Method};
    use hohstartup_core::ErrorKind;

    fn negotiator(transport: &Arc<MockTransport>) -> SessionNegotiator {
        SessionNegotiator::new(transport.clone(), Endpoints::default())
    }

    fn creds() -> Credentials {
        Credentials::new("alice", "secret")
    }

    #[tokio::test]
    async fn test_negotiate_happy_path() {
        let endpoints = Endpoints::default();
        let transport = Arc::new(Scenario::default().transport(&endpoints));

        let ctx = negotiator(&transport).negotiate(&creds()).await.unwrap();
        assert_eq!(
            ctx,
            SessionContext {
                session_id: "sid-1".into(),
                client_version: "9.9.9".into(),
            }
        );
        assert_eq!(transport.call_count(), 3);
        assert_eq!(transport.calls_to(&endpoints.startup), 0);
    }

    #[tokio::test]
    async fn test_login_request_shape() {
        let endpoints = Endpoints::default();
        let transport = Arc::new(Scenario::default().transport(&endpoints));
        negotiator(&transport).negotiate(&creds()).await.unwrap();

        let login = transport.last_request_to(&endpoints.login).unwrap();
        assert_eq!(login.method, Method::Post);
        assert_eq!(login.headers.len(), 1);
        assert_eq!(login.headers.get("Content-Type"), Some("application/json"));
        assert_eq!(
            login.json_body().unwrap(),
            json!({"username": "alice", "password": "secret", "useRememberMe": false})
        );

        let redirect = transport.last_request_to("https://x/y").unwrap();
        assert_eq!(redirect.method, Method::Get);
        assert!(redirect.headers.is_empty());
        assert!(redirect.body.is_none());
    }

    #[tokio::test]
    async fn test_play_request_shape() {
        let endpoints = Endpoints::default();
        let transport = Arc::new(Scenario::default().transport(&endpoints));
        negotiator(&transport).negotiate(&creds()).await.unwrap();

        let play = transport.last_request_to(&endpoints.account_play).unwrap();
        assert_eq!(play.headers.len(), 2);
        assert_eq!(play.headers.get("Cookie"), Some("SESSION=abc123"));
        let body = play.json_body().unwrap();
        assert_eq!(body, play_body("9.9.9"));
        assert_eq!(body["meta"]["clientVersion"], "9.9.9");
        assert_eq!(body["network"], "BROWSER_SESSION");
        assert!(body["worldId"].is_null());
    }

    #[tokio::test]
    async fn test_missing_redirect_url() {
        let scenario = Scenario {
            login_body: json!({"status": "ok"}),
            ..Scenario::default()
        };
        let transport = Arc::new(scenario.transport(&Endpoints::default()));
        let err = negotiator(&transport).negotiate(&creds()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert!(err.to_string().contains("missing redirectUrl"));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_session_cookie() {
        let scenario = Scenario {
            set_cookies: vec!["OTHER=xyz; Path=/".to_string()],
            ..Scenario::default()
        };
        let endpoints = Endpoints::default();
        let transport = Arc::new(scenario.transport(&endpoints));
        let err = negotiator(&transport).negotiate(&creds()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert!(err.to_string().contains("session cookie not found"));
        assert_eq!(transport.calls_to(&endpoints.account_play), 0);
    }

    #[tokio::test]
    async fn test_missing_client_version() {
        let scenario = Scenario {
            redirect_html: "<script>const clientVersion = ;</script>".to_string(),
            ..Scenario::default()
        };
        let endpoints = Endpoints::default();
        let transport = Arc::new(scenario.transport(&endpoints));
        let err = negotiator(&transport).negotiate(&creds()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert!(err.to_string().contains("client version not found"));
        assert_eq!(transport.calls_to(&endpoints.account_play), 0);
    }

    #[tokio::test]
    async fn test_missing_session_id() {
        let scenario = Scenario {
            play_body: json!({"worlds": []}),
            ..Scenario::default()
        };
        let transport = Arc::new(scenario.transport(&Endpoints::default()));
        let err = negotiator(&transport).negotiate(&creds()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert!(err.to_string().contains("missing sessionId"));
    }

    #[tokio::test]
    async fn test_login_http_error_is_transport() {
        let endpoints = Endpoints::default();
        let transport = Arc::new(
            MockTransport::new().on(&endpoints.login, HttpResponse::new(401).with_body("nope")),
        );
        let err = negotiator(&transport).negotiate(&creds()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_network_failure_is_not_retried() {
        let endpoints = Endpoints::default();
        let transport = Arc::new(MockTransport::new().fail(&endpoints.login, "connection reset"));
        let err = negotiator(&transport).negotiate(&creds()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(transport.calls_to(&endpoints.login), 1);
    }

    #[tokio::test]
    async fn test_incomplete_credentials_make_no_request() {
        let transport = Arc::new(MockTransport::new());
        let err = negotiator(&transport)
            .negotiate(&Credentials::new("alice", ""))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CredentialsMissing);
        assert_eq!(transport.call_count(), 0);
    }
}
