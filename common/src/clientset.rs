use crate::{ClientOptions, Codec, DebugModeClient, Result, Transport};
use kube::{Client, Config};
use std::{fmt, sync::Arc};
use tracing::debug;

/// Clients of the `k8s.cloudogu.com/v1` group
#[derive(Clone)]
pub struct DebugModeV1 {
    transport: Arc<dyn Transport>,
    codec: Codec,
    options: ClientOptions,
}

impl fmt::Debug for DebugModeV1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugModeV1")
            .field("codec", &self.codec)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl DebugModeV1 {
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            codec: Codec::default(),
            options: ClientOptions::default(),
        }
    }

    #[must_use]
    pub fn for_client(client: Client) -> Self {
        Self::with_transport(Arc::new(client))
    }

    #[must_use]
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Resource client bound to `namespace`
    #[must_use]
    pub fn debug_mode(&self, namespace: &str) -> DebugModeClient {
        DebugModeClient::new(
            self.transport.clone(),
            self.codec.clone(),
            namespace,
            self.options.clone(),
        )
    }
}

/// Entry point: a kube client plus the typed DebugMode clients built on it
#[derive(Clone)]
pub struct DebugModeClientSet {
    client: Client,
    v1: DebugModeV1,
}

impl fmt::Debug for DebugModeClientSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugModeClientSet").field("v1", &self.v1).finish_non_exhaustive()
    }
}

impl DebugModeClientSet {
    pub fn new(config: Config) -> Result<Self> {
        debug!("connecting to {}", config.cluster_url);
        let client = Client::try_from(config)?;
        Ok(Self::from_client(client))
    }

    /// Use the local kubeconfig, or the in-cluster service account
    pub async fn try_default() -> Result<Self> {
        let config = Config::infer().await?;
        Self::new(config)
    }

    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self {
            v1: DebugModeV1::for_client(client.clone()),
            client,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.v1 = self.v1.with_options(options);
        self
    }

    #[must_use]
    pub fn debug_mode_v1(&self) -> &DebugModeV1 {
        &self.v1
    }

    /// Underlying client, for the built-in resources
    #[must_use]
    pub fn kube_client(&self) -> Client {
        self.client.clone()
    }
}
