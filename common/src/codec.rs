use crate::{
    Error, Result,
    debugmode::{DebugMode, GROUP, KIND, VERSION},
};
use kube::core::WatchEvent;
use serde::Serialize;
use serde_json::Value;

/// Content types accepted on the PATCH verb
#[derive(Eq, PartialEq, Clone, Copy, Debug)]
pub enum PatchType {
    Json,
    Merge,
    StrategicMerge,
    Apply,
}
impl PatchType {
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self {
            PatchType::Json => "application/json-patch+json",
            PatchType::Merge => "application/merge-patch+json",
            PatchType::StrategicMerge => "application/strategic-merge-patch+json",
            PatchType::Apply => "application/apply-patch+yaml",
        }
    }
}

/// Serializer bound to one group/version/kind.
///
/// Built once with the client and owned by it, so nothing has to be
/// registered in a process-wide scheme before requests can be decoded.
#[derive(Clone, Debug)]
pub struct Codec {
    api_version: String,
    kind: String,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(GROUP, VERSION, KIND)
    }
}

impl Codec {
    #[must_use]
    pub fn new(group: &str, version: &str, kind: &str) -> Self {
        Self {
            api_version: format!("{group}/{version}"),
            kind: kind.to_string(),
        }
    }

    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn encode(&self, obj: &DebugMode) -> Result<Vec<u8>> {
        let mut value = serde_json::to_value(obj)?;
        if let Some(map) = value.as_object_mut() {
            map.insert("apiVersion".to_string(), Value::String(self.api_version.clone()));
            map.insert("kind".to_string(), Value::String(self.kind.clone()));
        }
        Ok(serde_json::to_vec(&value)?)
    }

    /// Encode an auxiliary body (options objects) without type stamping
    pub fn encode_options<T: Serialize>(&self, opts: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(opts)?)
    }

    pub fn decode(&self, body: &str) -> Result<DebugMode> {
        let value: Value = serde_json::from_str(body)?;
        self.check_kind(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn decode_event(&self, line: &str) -> Result<WatchEvent<DebugMode>> {
        Ok(serde_json::from_str(line)?)
    }

    fn check_kind(&self, value: &Value) -> Result<()> {
        match value.get("kind").and_then(Value::as_str) {
            Some(kind) if kind != self.kind => Err(Error::Other(format!(
                "expected a {} object, the server returned a {kind}",
                self.kind
            ))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debugmode::DebugModeSpec;

    #[test]
    fn test_encode_stamps_type_meta() {
        let codec = Codec::default();
        let dm = DebugMode::new("dm", DebugModeSpec::default());
        let body = codec.encode(&dm).unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["apiVersion"], "k8s.cloudogu.com/v1");
        assert_eq!(value["kind"], "DebugMode");
        assert_eq!(value["metadata"]["name"], "dm");
    }

    #[test]
    fn test_decode_rejects_other_kinds() {
        let codec = Codec::default();
        let err = codec
            .decode(r#"{"kind":"Status","apiVersion":"v1","metadata":{},"status":"Failure"}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Other(_)));
    }

    #[test]
    fn test_decode_watch_event() {
        let codec = Codec::default();
        let event = codec
            .decode_event(
                r#"{"type":"MODIFIED","object":{"apiVersion":"k8s.cloudogu.com/v1","kind":"DebugMode","metadata":{"name":"dm","resourceVersion":"7"},"spec":{}}}"#,
            )
            .unwrap();
        match event {
            WatchEvent::Modified(dm) => assert_eq!(dm.metadata.resource_version.as_deref(), Some("7")),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_patch_content_types() {
        assert_eq!(PatchType::Merge.content_type(), "application/merge-patch+json");
        assert_eq!(PatchType::Json.content_type(), "application/json-patch+json");
    }
}
