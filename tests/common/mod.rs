//! In-process stand-ins for the geolocation provider and the log source

#![allow(dead_code)]

use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// What the mock provider answers to one batch
pub struct Reply {
    pub status: StatusCode,
    pub remaining: i64,
    pub ttl: u64,
    pub body: String,
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            remaining: 14,
            ttl: 60,
            body: body.to_string(),
        }
    }
}

pub type Responder = dyn Fn(usize, &[String]) -> Reply + Send + Sync;

/// One request as seen by the mock provider
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub ips: Vec<String>,
    pub query: Option<String>,
    pub accept: Option<String>,
    pub content_type: Option<String>,
    pub connection: Option<String>,
}

#[derive(Clone)]
pub struct MockGeo {
    pub seen: Arc<Mutex<Vec<SeenRequest>>>,
    responder: Arc<Responder>,
    log: Arc<String>,
}

impl MockGeo {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(usize, &[String]) -> Reply + Send + Sync + 'static,
    {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
            responder: Arc::new(responder),
            log: Arc::new(String::new()),
        }
    }

    pub fn with_log(mut self, log: &str) -> Self {
        self.log = Arc::new(log.to_string());
        self
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    /// Serve on an ephemeral port and return the base URL
    pub async fn spawn(&self) -> String {
        let router = Router::new()
            .route("/batch", post(batch))
            .route("/likes.log", get(likes_log))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://{addr}")
    }
}

async fn batch(
    State(state): State<MockGeo>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    Json(ips): Json<Vec<String>>,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let index = {
        let mut seen = state.seen.lock().unwrap();
        seen.push(SeenRequest {
            ips: ips.clone(),
            query,
            accept: header("accept"),
            content_type: header("content-type"),
            connection: header("connection"),
        });
        seen.len() - 1
    };

    let reply = (state.responder)(index, &ips);
    (
        reply.status,
        [
            ("x-rl", reply.remaining.to_string()),
            ("x-ttl", reply.ttl.to_string()),
        ],
        reply.body,
    )
        .into_response()
}

async fn likes_log(State(state): State<MockGeo>) -> String {
    state.log.as_ref().clone()
}

/// Successful lookup placing every address in a city named after its first octet
pub fn located(ip: &str) -> Value {
    let octet = ip.split('.').next().unwrap_or(ip);
    json!({
        "status": "success",
        "query": ip,
        "city": format!("City {octet}"),
        "regionName": "Region",
        "country": "Country",
        "continent": "Europe",
        "isp": "Example ISP",
    })
}

pub fn failed(ip: &str, message: &str) -> Value {
    json!({ "status": "fail", "message": message, "query": ip })
}

/// Answer every address with `located`
pub fn locate_all(_: usize, ips: &[String]) -> Reply {
    Reply::ok(Value::Array(ips.iter().map(|ip| located(ip)).collect()))
}
