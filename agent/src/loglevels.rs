use clap::{ArgAction, Args};
use common::Result;

use crate::cluster::Cluster;

#[derive(Args, Debug)]
pub struct Parameters {
    /// DebugMode name
    #[arg(value_name = "NAME")]
    name: String,
    /// Whether the log levels were applied
    #[arg(value_name = "SET", action = ArgAction::Set)]
    set: bool,
    /// Machine readable reason
    #[arg(short = 'r', long = "reason", default_value = "")]
    reason: String,
    /// Human readable message
    #[arg(short = 'm', long = "message", default_value = "")]
    message: String,
    #[command(flatten)]
    cluster: Cluster,
}

pub async fn run(args: &Parameters) -> Result<()> {
    let client = args.cluster.client().await?;
    let dm = client.get(&args.name).await?;
    let dm = client
        .add_or_update_log_levels_set(&dm, args.set, &args.message, &args.reason)
        .await?;
    if let Some(cond) = dm.condition(common::CONDITION_LOG_LEVELS_SET) {
        println!("{:?} {} {}", cond.status, cond.reason, cond.message);
    }
    Ok(())
}
