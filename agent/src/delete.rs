use clap::Args;
use common::{DeleteOptions, Result, client::PropagationPolicy};

use crate::cluster::Cluster;

#[derive(Args, Debug)]
pub struct Parameters {
    /// DebugMode name
    #[arg(value_name = "NAME")]
    name: String,
    /// Seconds given to dependents before they are removed
    #[arg(long = "grace-period", value_name = "SECONDS")]
    grace_period: Option<u32>,
    /// Wait for dependents to be removed first
    #[arg(long = "foreground")]
    foreground: bool,
    #[command(flatten)]
    cluster: Cluster,
}

pub async fn run(args: &Parameters) -> Result<()> {
    let client = args.cluster.client().await?;
    let opts = DeleteOptions {
        grace_period_seconds: args.grace_period,
        propagation_policy: args.foreground.then_some(PropagationPolicy::Foreground),
    };
    client.delete(&args.name, &opts).await?;
    tracing::info!("debugmode {}/{} deleted", client.namespace(), args.name);
    Ok(())
}
