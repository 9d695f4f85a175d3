use crate::{Error, Result};
use async_trait::async_trait;
use futures::{AsyncBufReadExt, StreamExt, TryStreamExt, stream::BoxStream};
use http::Request;
use std::collections::BTreeMap;

/// Capability performing one HTTP verb against the API server.
///
/// Non-success answers from the server must come back as [`Error::Api`] so the
/// client can classify them (not found, conflict, already exists).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the response body
    async fn send(&self, request: Request<Vec<u8>>) -> Result<String>;

    /// Send a long-running request and return the response body line by line
    async fn send_lines(&self, request: Request<Vec<u8>>) -> Result<BoxStream<'static, Result<String>>>;
}

fn from_kube(verb: String, err: kube::Error) -> Error {
    match err {
        kube::Error::Api(resp) => Error::Api {
            verb,
            code: resp.code,
            reason: resp.reason,
            message: resp.message,
        },
        other => Error::KubeError(other),
    }
}

#[async_trait]
impl Transport for kube::Client {
    async fn send(&self, request: Request<Vec<u8>>) -> Result<String> {
        let verb = request.method().to_string();
        self.request_text(request).await.map_err(|e| from_kube(verb, e))
    }

    async fn send_lines(&self, request: Request<Vec<u8>>) -> Result<BoxStream<'static, Result<String>>> {
        let verb = request.method().to_string();
        let body = self.request_stream(request).await.map_err(|e| from_kube(verb, e))?;
        Ok(body.lines().map_err(Error::Stdio).boxed())
    }
}

/// Percent-encode one path segment. The form encoder writes spaces as `+`,
/// which a path would keep literally, and a literal `+` always comes out as `%2B`.
fn escape_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Builds the namespaced REST paths of one resource type
#[derive(Clone, Debug)]
pub struct ResourcePath {
    base: String,
}

impl ResourcePath {
    #[must_use]
    pub fn new(api_version: &str, namespace: &str, plural: &str) -> Self {
        Self {
            base: format!(
                "/apis/{api_version}/namespaces/{}/{}",
                escape_segment(namespace),
                escape_segment(plural)
            ),
        }
    }

    #[must_use]
    pub fn collection(&self) -> String {
        self.base.clone()
    }

    #[must_use]
    pub fn item(&self, name: &str, subresources: &[&str]) -> String {
        let mut path = format!("{}/{}", self.base, escape_segment(name));
        for sub in subresources.iter().filter(|s| !s.is_empty()) {
            path.push('/');
            path.push_str(&escape_segment(sub));
        }
        path
    }

    /// Append query parameters, keys in lexical order
    #[must_use]
    pub fn with_query(path: String, params: &BTreeMap<&str, String>) -> String {
        if params.is_empty() {
            return path;
        }
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in params {
            query.append_pair(key, value);
        }
        format!("{path}?{}", query.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let paths = ResourcePath::new("k8s.cloudogu.com/v1", "test", "debugmodes");
        assert_eq!(paths.collection(), "/apis/k8s.cloudogu.com/v1/namespaces/test/debugmodes");
        assert_eq!(
            paths.item("myDebugMode", &["status"]),
            "/apis/k8s.cloudogu.com/v1/namespaces/test/debugmodes/myDebugMode/status"
        );
        assert_eq!(
            paths.item("myDebugMode", &[""]),
            "/apis/k8s.cloudogu.com/v1/namespaces/test/debugmodes/myDebugMode"
        );
    }

    #[test]
    fn test_path_segments_are_escaped() {
        let paths = ResourcePath::new("k8s.cloudogu.com/v1", "test", "debugmodes");
        assert_eq!(
            paths.item("a/b c+d", &["status?x"]),
            "/apis/k8s.cloudogu.com/v1/namespaces/test/debugmodes/a%2Fb%20c%2Bd/status%3Fx"
        );
        assert_eq!(
            paths.item("my-debug.mode", &[]),
            "/apis/k8s.cloudogu.com/v1/namespaces/test/debugmodes/my-debug.mode"
        );
    }

    #[test]
    fn test_query_is_sorted_and_encoded() {
        let mut params = BTreeMap::new();
        params.insert("watch", "true".to_string());
        params.insert("timeoutSeconds", "5".to_string());
        params.insert("labelSelector", "app in (a,b)".to_string());
        assert_eq!(
            ResourcePath::with_query("/x".to_string(), &params),
            "/x?labelSelector=app+in+%28a%2Cb%29&timeoutSeconds=5&watch=true"
        );
        assert_eq!(ResourcePath::with_query("/x".to_string(), &BTreeMap::new()), "/x");
    }
}
