use std::net::SocketAddr;

use reqwest::StatusCode;
use serde_json::Value;
use tokio::task::JoinHandle;

use folio_common::ContactRecord;
use folio_server::AppState;

use crate::spawn_server;

/// A live server plus an HTTP client pointed at it. The server stops on drop.
pub struct TestServer {
    pub addr: SocketAddr,
    client: reqwest::Client,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(state: AppState) -> Self {
        let (addr, handle) = spawn_server(state).await;
        TestServer {
            addr,
            client: reqwest::Client::new(),
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POST a JSON payload to `/api/contact`.
    pub async fn submit(&self, payload: &Value) -> (StatusCode, Value) {
        let resp = self
            .client
            .post(self.url("/api/contact"))
            .json(payload)
            .send()
            .await
            .expect("POST /api/contact");
        read(resp).await
    }

    /// POST a raw body with a JSON content type.
    pub async fn submit_raw(&self, body: &'static str) -> (StatusCode, Value) {
        let resp = self
            .client
            .post(self.url("/api/contact"))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("POST /api/contact");
        read(resp).await
    }

    /// GET an arbitrary path, optionally with a bearer token.
    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        read(req.send().await.expect("GET request")).await
    }

    /// `GET /api/contacts` parsed into records; panics on a non-200 reply.
    pub async fn contacts(&self, token: Option<&str>) -> Vec<ContactRecord> {
        let (status, body) = self.get("/api/contacts", token).await;
        assert_eq!(status, StatusCode::OK, "listing failed: {body}");
        serde_json::from_value(body).expect("contact list")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn read(resp: reqwest::Response) -> (StatusCode, Value) {
    let status = resp.status();
    let body = resp.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}
