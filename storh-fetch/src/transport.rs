//! Authenticated GET requests with expired-token recovery.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::FetchError;
use crate::host::{HttpApi, HttpResponse};
use crate::session::SessionManager;

/// Issues authenticated requests on behalf of a [`SessionManager`].
///
/// On HTTP 401 the session re-authenticates once and the original request is
/// sent again with the new token; the caller receives that second outcome.
/// A second 401 fails the call instead of starting another round.
pub struct Transport {
    http: Arc<dyn HttpApi>,
    session: Arc<SessionManager>,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl Transport {
    /// Creates a transport sharing `session`.
    pub fn new(http: Arc<dyn HttpApi>, session: Arc<SessionManager>) -> Self {
        Self { http, session }
    }

    /// Fetches `url` and returns the `result` field of the response body.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &Url) -> Result<Value, FetchError> {
        let ticket = self.session.ticket().await;
        let Some(token) = ticket.token.as_deref() else {
            return Err(FetchError::NotAuthenticated);
        };

        let response = self.http.get(url, Some(token)).await?;
        if !response.is_unauthorized() {
            return Self::into_result(&response);
        }

        warn!("Bearer token rejected");
        if !self.session.reauthenticate(&ticket).await {
            return Err(FetchError::AuthenticationFailure(
                "re-authentication was rejected".to_string(),
            ));
        }

        let renewed = self.session.ticket().await;
        debug!(epoch = renewed.epoch, "Re-issuing request with renewed token");
        let response = self.http.get(url, renewed.token.as_deref()).await?;
        if response.is_unauthorized() {
            return Err(FetchError::AuthenticationFailure(
                "token rejected again after re-authentication".to_string(),
            ));
        }
        Self::into_result(&response)
    }

    /// Fetches `url` and decodes its `result` field as `T`.
    pub async fn fetch_result<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        let value = self.fetch(url).await?;
        serde_json::from_value(value).map_err(|e| {
            warn!(error = %e, "Result has unexpected shape");
            FetchError::MalformedResponse(e.to_string())
        })
    }

    fn into_result(response: &HttpResponse) -> Result<Value, FetchError> {
        if !response.is_ok() {
            return Err(FetchError::UnexpectedStatus(response.status));
        }

        let mut body: Value = serde_json::from_str(&response.body)?;
        match body.get_mut("result") {
            Some(result) => Ok(result.take()),
            None => Err(FetchError::MalformedResponse(
                "response has no result field".to_string(),
            )),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::mock::{endpoints, item_payload, MockHttp, MockReply};
    use storh_core::{Credentials, Item};
    use std::time::Duration;

    async fn transport(http: &Arc<MockHttp>) -> Transport {
        let creds = Credentials::new("user@example.com", "hunter2").unwrap();
        let session = Arc::new(SessionManager::new(http.clone(), &endpoints(), creds).unwrap());
        session.login().await.unwrap();
        Transport::new(http.clone(), session)
    }

    fn groups_url() -> Url {
        endpoints().groups().unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_result_field() {
        let http = MockHttp::new();
        http.on_login(MockReply::token("T1"))
            .on_groups(MockReply::ok(serde_json::json!([{"id": "G1"}])));
        let transport = transport(&http).await;

        let value = transport.fetch(&groups_url()).await.unwrap();
        assert_eq!(value, serde_json::json!([{"id": "G1"}]));

        let request = &http.requests_to("group/getgroups")[0];
        assert_eq!(request.bearer.as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn test_fetch_requires_login() {
        let http = MockHttp::new();
        let creds = Credentials::new("user@example.com", "hunter2").unwrap();
        let session = Arc::new(SessionManager::new(http.clone(), &endpoints(), creds).unwrap());
        let transport = Transport::new(http.clone(), session);

        let result = transport.fetch(&groups_url()).await;
        assert!(matches!(result, Err(FetchError::NotAuthenticated)));
        assert!(http.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unexpected_status() {
        let http = MockHttp::new();
        http.on_login(MockReply::token("T1"))
            .on_groups(MockReply::status(500));
        let transport = transport(&http).await;

        let result = transport.fetch(&groups_url()).await;
        assert!(matches!(result, Err(FetchError::UnexpectedStatus(500))));
        assert_eq!(http.login_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_bodies() {
        for body in ["not json", r#"{"data": []}"#] {
            let http = MockHttp::new();
            http.on_login(MockReply::token("T1"))
                .on_groups(MockReply::raw(200, body));
            let transport = transport(&http).await;

            let result = transport.fetch(&groups_url()).await;
            assert!(
                matches!(result, Err(FetchError::MalformedResponse(_))),
                "body {body:?} should be malformed"
            );
        }
    }

    #[tokio::test]
    async fn test_fetch_result_shape_mismatch() {
        let http = MockHttp::new();
        http.on_login(MockReply::token("T1"))
            .on_items(MockReply::ok(serde_json::json!({"items": []})));
        let transport = transport(&http).await;

        let url = endpoints().shopping_list(&"G1".into()).unwrap();
        let result = transport.fetch_result::<Vec<Item>>(&url).await;
        assert!(matches!(result, Err(FetchError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_401_reissues_original_request() {
        let http = MockHttp::new();
        http.on_login(MockReply::token("T1"))
            .on_login(MockReply::token("T2"))
            .on_items(MockReply::status(401))
            .on_items(MockReply::ok(item_payload(2)));
        let transport = transport(&http).await;

        let url = endpoints().shopping_list(&"G1".into()).unwrap();
        let items: Vec<Item> = transport.fetch_result(&url).await.unwrap();

        assert_eq!(items.len(), 2);
        let bearers: Vec<_> = http
            .requests_to("item/getitemsingroup")
            .into_iter()
            .map(|r| r.bearer)
            .collect();
        assert_eq!(bearers, vec![Some("T1".to_string()), Some("T2".to_string())]);
        assert_eq!(http.login_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_reauthentication() {
        let http = MockHttp::new();
        http.on_login(MockReply::token("T1"))
            .on_login(MockReply::status(401))
            .on_groups(MockReply::status(401));
        let transport = transport(&http).await;

        let result = transport.fetch(&groups_url()).await;
        assert!(matches!(result, Err(FetchError::AuthenticationFailure(_))));
        assert_eq!(http.requests_to("group/getgroups").len(), 1);
    }

    #[tokio::test]
    async fn test_persistent_401_stops_after_one_reauthentication() {
        let http = MockHttp::new();
        http.on_login(MockReply::token("T1"))
            .on_login(MockReply::token("T2"))
            .on_groups(MockReply::status(401));
        let transport = transport(&http).await;

        let result = transport.fetch(&groups_url()).await;
        assert!(matches!(result, Err(FetchError::AuthenticationFailure(_))));
        assert_eq!(http.login_count(), 2);
        assert_eq!(http.requests_to("group/getgroups").len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_401s_share_one_login() {
        let http = MockHttp::new();
        http.on_login(MockReply::token("T1"))
            .on_login(MockReply::token("T2").delayed(Duration::from_millis(50)))
            .on_groups(MockReply::status(401))
            .on_groups(MockReply::status(401))
            .on_groups(MockReply::ok(serde_json::json!([{"id": "G1"}])));
        let transport = transport(&http).await;
        let url = groups_url();

        let (a, b) = tokio::join!(transport.fetch(&url), transport.fetch(&url));

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(http.login_count(), 2);
        let retried: Vec<_> = http.requests_to("group/getgroups")[2..]
            .iter()
            .map(|r| r.bearer.clone())
            .collect();
        assert_eq!(retried, vec![Some("T2".to_string()), Some("T2".to_string())]);
    }
}
