use crate::{
    Error, Result,
    codec::{Codec, PatchType},
    debugmode::{DebugMode, PLURAL},
    retry::RetryPolicy,
    transport::{ResourcePath, Transport},
};
use futures::{StreamExt, TryStreamExt, future::ready, stream::BoxStream};
use http::{
    Method, Request,
    header::{ACCEPT, CONTENT_TYPE},
};
use kube::{ResourceExt, core::WatchEvent};
use serde::Serialize;
use std::{collections::BTreeMap, fmt, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::debug;

const JSON: &str = "application/json";

/// Settings shared by every request of a client
#[derive(Clone, Debug, PartialEq)]
pub struct ClientOptions {
    /// Field manager sent on writes that do not name one
    pub field_manager: Option<String>,
    /// Conflict retry used by the phase transitions
    pub retry: RetryPolicy,
    /// Whether the resource serves a `status` subresource. Condition upserts
    /// go through `update_status` when set, through `update` otherwise.
    pub status_subresource: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            field_manager: None,
            retry: RetryPolicy::default(),
            status_subresource: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteOptions {
    pub dry_run: bool,
    pub field_manager: Option<String>,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub enum PropagationPolicy {
    Orphan,
    Background,
    Foreground,
}

/// Body of a DELETE request
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace_period_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub propagation_policy: Option<PropagationPolicy>,
}

/// Selection of a watch, passed as query parameters
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListOptions {
    pub label_selector: Option<String>,
    pub field_selector: Option<String>,
    pub resource_version: Option<String>,
    pub timeout_seconds: Option<u32>,
    pub allow_watch_bookmarks: bool,
}

impl ListOptions {
    fn query(&self) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        if let Some(selector) = &self.label_selector {
            params.insert("labelSelector", selector.clone());
        }
        if let Some(selector) = &self.field_selector {
            params.insert("fieldSelector", selector.clone());
        }
        if let Some(version) = &self.resource_version {
            params.insert("resourceVersion", version.clone());
        }
        if let Some(timeout) = self.timeout_seconds {
            params.insert("timeoutSeconds", timeout.to_string());
        }
        if self.allow_watch_bookmarks {
            params.insert("allowWatchBookmarks", "true".to_string());
        }
        params
    }
}

/// Namespaced client of the `debugmodes` resource.
///
/// Cheap to clone. Every call goes to the API server, nothing is cached.
#[derive(Clone)]
pub struct DebugModeClient {
    transport: Arc<dyn Transport>,
    codec: Codec,
    namespace: String,
    paths: ResourcePath,
    pub(crate) options: ClientOptions,
    pub(crate) cancel: CancellationToken,
}

impl fmt::Debug for DebugModeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugModeClient")
            .field("namespace", &self.namespace)
            .field("codec", &self.codec)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl DebugModeClient {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, codec: Codec, namespace: &str, options: ClientOptions) -> Self {
        let paths = ResourcePath::new(codec.api_version(), namespace, PLURAL);
        Self {
            transport,
            codec,
            namespace: namespace.to_string(),
            paths,
            options,
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Same client, with requests and retry waits aborted once `token` is cancelled
    #[must_use]
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        let mut client = self.clone();
        client.cancel = token;
        client
    }

    fn write_query(&self, opts: &WriteOptions) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        if opts.dry_run {
            params.insert("dryRun", "All".to_string());
        }
        if let Some(manager) = opts.field_manager.as_ref().or(self.options.field_manager.as_ref()) {
            params.insert("fieldManager", manager.clone());
        }
        params
    }

    fn classify(name: &str, err: Error) -> Error {
        match err {
            Error::Api { code: 404, .. } => Error::NotFound(name.to_string()),
            Error::Api { code: 409, reason, .. } if reason == "AlreadyExists" => {
                Error::AlreadyExists(name.to_string())
            }
            Error::Api { code: 409, message, .. } => Error::Conflict(name.to_string(), message),
            other => other,
        }
    }

    async fn execute(&self, name: &str, request: Request<Vec<u8>>) -> Result<DebugMode> {
        let body = self.send(name, request).await?;
        self.codec.decode(&body)
    }

    async fn send(&self, name: &str, request: Request<Vec<u8>>) -> Result<String> {
        debug!("{} {}", request.method(), request.uri());
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            res = self.transport.send(request) => res.map_err(|e| Self::classify(name, e)),
        }
    }

    /// An empty name would address the collection instead of one object
    fn check_name(name: &str) -> Result<&str> {
        if name.is_empty() {
            return Err(Error::Other("resource name may not be empty".to_string()));
        }
        Ok(name)
    }

    pub(crate) fn required_name(obj: &DebugMode) -> Result<String> {
        let name = obj.metadata.name.as_deref().unwrap_or_default();
        Self::check_name(name).map(str::to_string)
    }

    pub async fn get(&self, name: &str) -> Result<DebugMode> {
        let name = Self::check_name(name)?;
        let request = Request::get(self.paths.item(name, &[]))
            .header(ACCEPT, JSON)
            .body(vec![])?;
        self.execute(name, request).await
    }

    /// Create the object, the server assigns its resourceVersion
    pub async fn create(&self, obj: &DebugMode, opts: &WriteOptions) -> Result<DebugMode> {
        let uri = ResourcePath::with_query(self.paths.collection(), &self.write_query(opts));
        let request = Request::post(uri)
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON)
            .body(self.codec.encode(obj)?)?;
        self.execute(&obj.name_any(), request).await
    }

    /// Replace the whole object, rejected when `obj` carries a stale resourceVersion
    pub async fn update(&self, obj: &DebugMode, opts: &WriteOptions) -> Result<DebugMode> {
        let name = Self::required_name(obj)?;
        let uri = ResourcePath::with_query(self.paths.item(&name, &[]), &self.write_query(opts));
        let request = Request::put(uri)
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON)
            .body(self.codec.encode(obj)?)?;
        self.execute(&name, request).await
    }

    /// Replace the status subresource only, spec and metadata changes are ignored by the server
    pub async fn update_status(&self, obj: &DebugMode, opts: &WriteOptions) -> Result<DebugMode> {
        let name = Self::required_name(obj)?;
        let uri = ResourcePath::with_query(self.paths.item(&name, &["status"]), &self.write_query(opts));
        let request = Request::put(uri)
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON)
            .body(self.codec.encode(obj)?)?;
        self.execute(&name, request).await
    }

    pub async fn delete(&self, name: &str, opts: &DeleteOptions) -> Result<()> {
        let name = Self::check_name(name)?;
        let request = Request::delete(self.paths.item(name, &[]))
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON)
            .body(self.codec.encode_options(opts)?)?;
        self.send(name, request).await.map(|_| ())
    }

    pub async fn patch(
        &self,
        name: &str,
        patch_type: PatchType,
        data: Vec<u8>,
        opts: &WriteOptions,
        subresources: &[&str],
    ) -> Result<DebugMode> {
        let name = Self::check_name(name)?;
        let params = self.write_query(opts);
        if patch_type == PatchType::Apply && !params.contains_key("fieldManager") {
            return Err(Error::Other("apply patches require a field manager".to_string()));
        }
        let uri = ResourcePath::with_query(self.paths.item(name, subresources), &params);
        let request = Request::builder()
            .method(Method::PATCH)
            .uri(uri)
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, patch_type.content_type())
            .body(data)?;
        self.execute(name, request).await
    }

    /// Watch the objects of the namespace.
    ///
    /// The stream ends when the connection closes, when `timeout_seconds`
    /// elapse or when the client's cancellation token fires. It is not
    /// restarted: watch again from the last seen resourceVersion.
    pub async fn watch(&self, opts: &ListOptions) -> Result<BoxStream<'static, Result<WatchEvent<DebugMode>>>> {
        let mut params = opts.query();
        params.insert("watch", "true".to_string());
        let uri = ResourcePath::with_query(self.paths.collection(), &params);
        let request = Request::get(uri).header(ACCEPT, JSON).body(vec![])?;
        debug!("{} {}", request.method(), request.uri());
        let lines = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(Error::Cancelled),
            res = self.transport.send_lines(request) => res.map_err(|e| Self::classify(&self.namespace, e))?,
        };
        let codec = self.codec.clone();
        let mut events = lines
            .try_filter(|line| ready(!line.trim().is_empty()))
            .and_then(move |line| ready(codec.decode_event(&line)))
            .take_until(self.cancel.clone().cancelled_owned())
            .boxed();
        if let Some(timeout) = opts.timeout_seconds {
            events = events
                .take_until(tokio::time::sleep(Duration::from_secs(timeout.into())))
                .boxed();
        }
        Ok(events)
    }
}
