use clap::Args;
use common::{DebugModeClient, DebugModeClientSet, Result, RetryPolicy, context::get_client_options};
use tokio_util::sync::CancellationToken;

/// Where and how the debugmode objects are reached
#[derive(Args, Debug, Clone)]
pub struct Cluster {
    /// Namespace of the debugmode objects
    #[arg(
        short = 'n',
        long = "namespace",
        env = "DEBUGMODE_NAMESPACE",
        value_name = "NAMESPACE",
        default_value = "ecosystem"
    )]
    pub namespace: String,
    /// Field manager recorded on writes, defaults to the binary identity
    #[arg(long = "field-manager", env = "DEBUGMODE_FIELD_MANAGER", value_name = "FIELD_MANAGER")]
    pub field_manager: Option<String>,
    /// Attempts of a phase change before giving up on conflicts
    #[arg(
        long = "retry-attempts",
        env = "DEBUGMODE_RETRY_ATTEMPTS",
        value_name = "RETRY_ATTEMPTS",
        default_value_t = 5
    )]
    pub retry_attempts: u32,
}

impl Cluster {
    /// Connect and return a client that stops on ctrl-c
    pub async fn client(&self) -> Result<DebugModeClient> {
        let mut options = get_client_options();
        if self.field_manager.is_some() {
            options.field_manager = self.field_manager.clone();
        }
        options.retry = RetryPolicy::default().with_max_attempts(self.retry_attempts);
        let set = DebugModeClientSet::try_default().await?.with_options(options);
        let token = CancellationToken::new();
        let on_signal = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, cancelling");
                on_signal.cancel();
            }
        });
        Ok(set.debug_mode_v1().debug_mode(&self.namespace).with_cancellation(token))
    }
}
