//! Scripted [`HttpApi`] for unit tests.
//!
//! Replies are queued per `(method, path)`. The last queued reply for a
//! route repeats once the queue is down to it, so a route scripted with a
//! single reply answers every request the same way.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use url::Url;

use super::http::{HttpApi, HttpResponse};
use crate::endpoints::Endpoints;
use crate::error::FetchError;

/// Base URL used by all mock-backed tests.
pub(crate) const BASE: &str = "http://storh.test/v1/";

pub(crate) fn endpoints() -> Endpoints {
    Endpoints::new(BASE).unwrap()
}

#[derive(Debug, Clone)]
pub(crate) struct MockReply {
    status: u16,
    body: String,
    delay: Option<Duration>,
}

impl MockReply {
    /// 200 with `{"result": result}`.
    pub(crate) fn ok(result: Value) -> Self {
        Self::raw(200, json!({ "result": result }).to_string())
    }

    /// 200 login reply carrying `token`.
    pub(crate) fn token(token: &str) -> Self {
        Self::ok(json!({ "accessToken": token }))
    }

    /// Empty body with the given status.
    pub(crate) fn status(status: u16) -> Self {
        Self::raw(status, "")
    }

    pub(crate) fn raw(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: None,
        }
    }

    /// Holds the reply back for `delay` before answering.
    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub(crate) method: &'static str,
    pub(crate) path: String,
    pub(crate) url: Url,
    pub(crate) bearer: Option<String>,
    pub(crate) body: Option<Value>,
}

#[derive(Debug, Default)]
pub(crate) struct MockHttp {
    routes: Mutex<HashMap<(&'static str, String), VecDeque<MockReply>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockHttp {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn on(&self, method: &'static str, path: &str, reply: MockReply) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    pub(crate) fn on_login(&self, reply: MockReply) -> &Self {
        self.on("POST", "auth/login", reply)
    }

    pub(crate) fn on_groups(&self, reply: MockReply) -> &Self {
        self.on("GET", "group/getgroups", reply)
    }

    pub(crate) fn on_items(&self, reply: MockReply) -> &Self {
        self.on("GET", "item/getitemsingroup", reply)
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    pub(crate) fn login_count(&self) -> usize {
        self.requests_to("auth/login").len()
    }

    fn route_path(url: &Url) -> String {
        url.path().trim_start_matches("/v1/").to_string()
    }

    async fn answer(
        &self,
        method: &'static str,
        url: &Url,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> HttpResponse {
        let path = Self::route_path(url);
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path: path.clone(),
            url: url.clone(),
            bearer: bearer.map(str::to_string),
            body,
        });

        let reply = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&(method, path)) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        let Some(reply) = reply else {
            return HttpResponse::new(404, "");
        };

        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        HttpResponse::new(reply.status, reply.body)
    }
}

#[async_trait]
impl HttpApi for MockHttp {
    async fn get(&self, url: &Url, bearer: Option<&str>) -> Result<HttpResponse, FetchError> {
        Ok(self.answer("GET", url, bearer, None).await)
    }

    async fn post_json(&self, url: &Url, body: &Value) -> Result<HttpResponse, FetchError> {
        Ok(self.answer("POST", url, None, Some(body.clone())).await)
    }
}

/// `count` items named `Item0..`, as the service would send them.
pub(crate) fn item_payload(count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|i| json!({ "itemManu": format!("Manu{i}"), "itemName": format!("Item{i}"), "count": i + 1 }))
            .collect(),
    )
}
