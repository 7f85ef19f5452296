//! Group resolution.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use storh_core::{GroupId, GroupSummary};

use crate::endpoints::Endpoints;
use crate::error::FetchError;
use crate::transport::Transport;

/// Discovers the user's group once and keeps it for the process lifetime.
///
/// The first group the service lists wins; the rest are ignored.
#[derive(Debug)]
pub struct GroupResolver {
    transport: Arc<Transport>,
    endpoints: Endpoints,
    group: OnceCell<GroupId>,
}

impl GroupResolver {
    /// Creates a resolver that has not resolved anything yet.
    pub fn new(transport: Arc<Transport>, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
            group: OnceCell::new(),
        }
    }

    /// Returns the resolved group, fetching it on first use.
    ///
    /// A failed resolution is not cached; a successful one is never redone.
    #[instrument(skip(self))]
    pub async fn resolve(&self) -> Result<GroupId, FetchError> {
        self.group
            .get_or_try_init(|| self.fetch_first_group())
            .await
            .cloned()
    }

    /// Returns the group if it has already been resolved.
    pub fn group(&self) -> Option<&GroupId> {
        self.group.get()
    }

    async fn fetch_first_group(&self) -> Result<GroupId, FetchError> {
        let url = self.endpoints.groups()?;
        let groups: Vec<GroupSummary> = self.transport.fetch_result(&url).await?;
        debug!(count = groups.len(), "Fetched groups");

        let first = groups
            .into_iter()
            .next()
            .ok_or(FetchError::NoGroupAvailable)?;
        info!(group = %first.id, name = ?first.name, "Resolved group");
        Ok(first.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::mock::{endpoints, MockHttp, MockReply};
    use crate::session::SessionManager;
    use serde_json::json;
    use storh_core::Credentials;

    async fn resolver(http: &Arc<MockHttp>) -> GroupResolver {
        let creds = Credentials::new("user@example.com", "hunter2").unwrap();
        let session = Arc::new(SessionManager::new(http.clone(), &endpoints(), creds).unwrap());
        session.login().await.unwrap();
        let transport = Arc::new(Transport::new(http.clone(), session));
        GroupResolver::new(transport, endpoints())
    }

    #[tokio::test]
    async fn test_first_group_wins() {
        let http = MockHttp::new();
        http.on_login(MockReply::token("T1"))
            .on_groups(MockReply::ok(json!([{"id": "G1"}, {"id": "G2"}])));
        let resolver = resolver(&http).await;

        assert!(resolver.group().is_none());
        assert_eq!(resolver.resolve().await.unwrap(), GroupId::new("G1"));
        assert_eq!(resolver.group(), Some(&GroupId::new("G1")));
    }

    #[tokio::test]
    async fn test_empty_group_list() {
        let http = MockHttp::new();
        http.on_login(MockReply::token("T1"))
            .on_groups(MockReply::ok(json!([])));
        let resolver = resolver(&http).await;

        assert!(matches!(
            resolver.resolve().await,
            Err(FetchError::NoGroupAvailable)
        ));
        assert!(resolver.group().is_none());
    }

    #[tokio::test]
    async fn test_resolved_once() {
        let http = MockHttp::new();
        http.on_login(MockReply::token("T1"))
            .on_groups(MockReply::ok(json!([{"id": 5}])))
            .on_groups(MockReply::ok(json!([{"id": 6}])));
        let resolver = resolver(&http).await;

        assert_eq!(resolver.resolve().await.unwrap().as_str(), "5");
        assert_eq!(resolver.resolve().await.unwrap().as_str(), "5");
        assert_eq!(http.requests_to("group/getgroups").len(), 1);
    }

    #[tokio::test]
    async fn test_failure_not_cached() {
        let http = MockHttp::new();
        http.on_login(MockReply::token("T1"))
            .on_groups(MockReply::status(503))
            .on_groups(MockReply::ok(json!([{"id": "G1"}])));
        let resolver = resolver(&http).await;

        assert!(matches!(
            resolver.resolve().await,
            Err(FetchError::UnexpectedStatus(503))
        ));
        assert_eq!(resolver.resolve().await.unwrap().as_str(), "G1");
    }
}
