use chrono::Utc;
use clap::Args;
use common::Result;

use crate::cluster::Cluster;

#[derive(Args, Debug)]
pub struct Parameters {
    /// DebugMode name
    #[arg(value_name = "NAME")]
    name: String,
    #[command(flatten)]
    cluster: Cluster,
}

pub async fn run(args: &Parameters) -> Result<()> {
    let client = args.cluster.client().await?;
    let dm = client.get(&args.name).await?;
    if let Some(until) = dm.spec.deactivate_timestamp {
        let left = until.signed_duration_since(Utc::now());
        if left.num_seconds() > 0 {
            tracing::info!("{} deactivates in {}s", dm.key(), left.num_seconds());
        } else {
            tracing::info!("{} deactivation time has passed", dm.key());
        }
    }
    print!("{}", serde_yaml::to_string(&dm)?);
    Ok(())
}
