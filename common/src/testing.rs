//! In-memory API server used by the unit tests.
//!
//! Models what the client relies on: per-object resourceVersion checks,
//! status subresource separation and finalizer-blocked deletion.
use crate::{
    ClientOptions, Codec, DebugModeClient, Error, Result, RetryPolicy, Transport, debugmode::DebugMode,
};
use async_trait::async_trait;
use futures::{StreamExt, stream::BoxStream};
use http::{Method, Request, header::CONTENT_TYPE};
use serde_json::{Value, json};
use std::{
    collections::{BTreeMap, VecDeque},
    sync::{Arc, Mutex},
};

#[derive(Clone, Debug)]
pub(crate) struct Call {
    pub method: Method,
    pub uri: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}
impl Call {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn path(&self) -> &str {
        self.uri.split('?').next().unwrap_or_default()
    }
}

#[derive(Default)]
struct State {
    objects: BTreeMap<String, Value>,
    version: u64,
    calls: Vec<Call>,
    failures: VecDeque<(Option<Method>, Error)>,
    watch_lines: Vec<String>,
}
impl State {
    fn next_version(&mut self) -> String {
        self.version += 1;
        self.version.to_string()
    }
}

fn api_error(verb: &Method, code: u16, reason: &str, message: String) -> Error {
    Error::Api {
        verb: verb.to_string(),
        code,
        reason: reason.to_string(),
        message,
    }
}

fn version_of(obj: &Value) -> Option<&str> {
    obj["metadata"]["resourceVersion"].as_str()
}

#[derive(Clone, Default)]
pub(crate) struct FakeTransport {
    state: Arc<Mutex<State>>,
}

impl FakeTransport {
    pub fn with_objects(objects: Vec<DebugMode>) -> Self {
        let fake = Self::default();
        {
            let mut state = fake.state.lock().unwrap();
            for obj in objects {
                let mut value = serde_json::to_value(&obj).unwrap();
                let rv = state.next_version();
                value["metadata"]["resourceVersion"] = json!(rv);
                let name = value["metadata"]["name"].as_str().unwrap().to_string();
                state.objects.insert(name, value);
            }
        }
        fake
    }

    pub fn client(&self, namespace: &str) -> DebugModeClient {
        let options = ClientOptions {
            retry: RetryPolicy::no_wait(),
            ..ClientOptions::default()
        };
        DebugModeClient::new(Arc::new(self.clone()), Codec::default(), namespace, options)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn stored(&self, name: &str) -> Value {
        self.state.lock().unwrap().objects.get(name).cloned().unwrap_or(Value::Null)
    }

    pub fn stored_object(&self, name: &str) -> DebugMode {
        serde_json::from_value(self.stored(name)).unwrap()
    }

    /// Fail the next request, whatever its verb
    pub fn fail_next(&self, err: Error) {
        self.state.lock().unwrap().failures.push_back((None, err));
    }

    /// Fail the next request sent with `method`
    pub fn fail_next_on(&self, method: Method, err: Error) {
        self.state.lock().unwrap().failures.push_back((Some(method), err));
    }

    pub fn conflict_next_on(&self, method: Method) {
        let err = api_error(
            &method,
            409,
            "Conflict",
            "the object has been modified; please apply your changes to the latest version and try again"
                .to_string(),
        );
        self.fail_next_on(method, err);
    }

    pub fn push_watch_line(&self, line: String) {
        self.state.lock().unwrap().watch_lines.push(line);
    }

    /// Write to the store the way another client would, bumping the resourceVersion
    pub fn modify(&self, name: &str, change: impl FnOnce(&mut DebugMode)) {
        let mut obj = self.stored_object(name);
        change(&mut obj);
        let mut state = self.state.lock().unwrap();
        let mut value = serde_json::to_value(&obj).unwrap();
        value["metadata"]["resourceVersion"] = json!(state.next_version());
        state.objects.insert(name.to_string(), value);
    }

    fn record(&self, request: &Request<Vec<u8>>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call {
            method: request.method().clone(),
            uri: request.uri().to_string(),
            content_type: request
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: request.body().clone(),
        });
        let pos = state
            .failures
            .iter()
            .position(|(m, _)| m.as_ref().is_none_or(|m| m == request.method()));
        match pos.and_then(|p| state.failures.remove(p)) {
            Some((_, err)) => Err(err),
            None => Ok(()),
        }
    }

    fn handle(&self, request: &Request<Vec<u8>>) -> Result<Value> {
        let method = request.method();
        let call = Call {
            method: method.clone(),
            uri: request.uri().to_string(),
            content_type: None,
            body: vec![],
        };
        let segments: Vec<&str> = call.path().split('/').skip(7).collect();
        let name = segments.first().copied();
        let sub = segments.get(1).copied();
        let body: Value = if request.body().is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(request.body())?
        };
        let mut state = self.state.lock().unwrap();
        let not_found = |n: &str| api_error(method, 404, "NotFound", format!("debugmodes \"{n}\" not found"));

        match (method.clone(), name, sub) {
            (Method::GET, Some(name), None) => state.objects.get(name).cloned().ok_or_else(|| not_found(name)),
            (Method::POST, None, None) => {
                let name = body["metadata"]["name"].as_str().unwrap_or_default().to_string();
                if state.objects.contains_key(&name) {
                    return Err(api_error(
                        method,
                        409,
                        "AlreadyExists",
                        format!("debugmodes \"{name}\" already exists"),
                    ));
                }
                let mut created = body;
                created["metadata"]["resourceVersion"] = json!(state.next_version());
                state.objects.insert(name, created.clone());
                Ok(created)
            }
            (Method::PUT, Some(name), sub) => {
                let stored = state.objects.get(name).cloned().ok_or_else(|| not_found(name))?;
                if let Some(rv) = version_of(&body) {
                    if Some(rv) != version_of(&stored) {
                        return Err(api_error(
                            method,
                            409,
                            "Conflict",
                            format!("Operation cannot be fulfilled on debugmodes \"{name}\""),
                        ));
                    }
                }
                let mut next = if sub == Some("status") {
                    let mut next = stored;
                    next["status"] = body.get("status").cloned().unwrap_or(Value::Null);
                    next
                } else {
                    let mut next = body;
                    next["status"] = stored.get("status").cloned().unwrap_or(Value::Null);
                    next
                };
                if next["status"].is_null() {
                    if let Some(map) = next.as_object_mut() {
                        map.remove("status");
                    }
                }
                next["metadata"]["resourceVersion"] = json!(state.next_version());
                state.objects.insert(name.to_string(), next.clone());
                Ok(next)
            }
            (Method::PATCH, Some(name), sub) => {
                let mut stored = state.objects.get(name).cloned().ok_or_else(|| not_found(name))?;
                let content_type = request.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
                if content_type != Some("application/merge-patch+json") {
                    return Err(api_error(method, 415, "UnsupportedMediaType", "only merge patches".to_string()));
                }
                if sub == Some("status") {
                    let patch = json!({"status": body.get("status").cloned().unwrap_or(Value::Null)});
                    json_patch::merge(&mut stored, &patch);
                } else {
                    let mut patch = body;
                    if let Some(map) = patch.as_object_mut() {
                        map.remove("status");
                    }
                    json_patch::merge(&mut stored, &patch);
                }
                stored["metadata"]["resourceVersion"] = json!(state.next_version());
                state.objects.insert(name.to_string(), stored.clone());
                Ok(stored)
            }
            (Method::DELETE, Some(name), None) => {
                let mut stored = state.objects.get(name).cloned().ok_or_else(|| not_found(name))?;
                let blocked = stored["metadata"]["finalizers"]
                    .as_array()
                    .is_some_and(|f| !f.is_empty());
                if blocked {
                    stored["metadata"]["deletionTimestamp"] = json!("2026-10-17T00:00:00Z");
                    stored["metadata"]["resourceVersion"] = json!(state.next_version());
                    state.objects.insert(name.to_string(), stored.clone());
                    Ok(stored)
                } else {
                    state.objects.remove(name);
                    Ok(json!({"kind": "Status", "apiVersion": "v1", "status": "Success"}))
                }
            }
            _ => Err(api_error(method, 405, "MethodNotAllowed", call.uri.clone())),
        }
    }

    /// Finalizer-free objects marked for deletion are dropped, as the server does
    fn collect_garbage(&self) {
        let mut state = self.state.lock().unwrap();
        state.objects.retain(|_, obj| {
            let marked = !obj["metadata"]["deletionTimestamp"].is_null();
            let finalizers = obj["metadata"]["finalizers"].as_array().is_some_and(|f| !f.is_empty());
            !marked || finalizers
        });
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: Request<Vec<u8>>) -> Result<String> {
        self.record(&request)?;
        let result = self.handle(&request)?;
        self.collect_garbage();
        Ok(result.to_string())
    }

    async fn send_lines(&self, request: Request<Vec<u8>>) -> Result<BoxStream<'static, Result<String>>> {
        self.record(&request)?;
        let lines = std::mem::take(&mut self.state.lock().unwrap().watch_lines);
        Ok(futures::stream::iter(lines.into_iter().map(Ok)).boxed())
    }
}

/// Transport whose requests never get an answer.
///
/// With `open_watch` set, watch requests are answered with a stream that
/// never yields, as a quiet watch connection does.
#[derive(Clone, Default)]
pub(crate) struct PendingTransport {
    requests: Arc<Mutex<Vec<String>>>,
    open_watch: bool,
}

impl PendingTransport {
    pub fn with_open_watch() -> Self {
        Self {
            open_watch: true,
            ..Self::default()
        }
    }

    pub fn client(&self, namespace: &str) -> DebugModeClient {
        DebugModeClient::new(
            Arc::new(self.clone()),
            Codec::default(),
            namespace,
            ClientOptions::default(),
        )
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, request: &Request<Vec<u8>>) {
        self.requests
            .lock()
            .unwrap()
            .push(format!("{} {}", request.method(), request.uri()));
    }
}

#[async_trait]
impl Transport for PendingTransport {
    async fn send(&self, request: Request<Vec<u8>>) -> Result<String> {
        self.record(&request);
        futures::future::pending().await
    }

    async fn send_lines(&self, request: Request<Vec<u8>>) -> Result<BoxStream<'static, Result<String>>> {
        self.record(&request);
        if self.open_watch {
            Ok(futures::stream::pending().boxed())
        } else {
            futures::future::pending().await
        }
    }
}
