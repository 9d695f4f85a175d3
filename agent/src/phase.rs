use clap::{Args, ValueEnum};
use common::Result;

use crate::cluster::Cluster;

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Target {
    /// SetDebugMode
    Set,
    /// WaitForRollback
    WaitForRollback,
    /// Rollback
    Rollback,
    /// Completed
    Completed,
    /// Failed
    Failed,
}

#[derive(Args, Debug)]
pub struct Parameters {
    /// DebugMode name
    #[arg(value_name = "NAME")]
    name: String,
    /// Phase to move to
    #[arg(value_enum, value_name = "PHASE")]
    target: Target,
    #[command(flatten)]
    cluster: Cluster,
}

pub async fn run(args: &Parameters) -> Result<()> {
    let client = args.cluster.client().await?;
    let dm = client.get(&args.name).await?;
    let updated = match args.target {
        Target::Set => client.update_status_debug_mode_set(&dm).await?,
        Target::WaitForRollback => client.update_status_wait_for_rollback(&dm).await?,
        Target::Rollback => client.update_status_rollback(&dm).await?,
        Target::Completed => client.update_status_completed(&dm).await?,
        Target::Failed => client.update_status_failed(&dm).await?,
    };
    if let Some(phase) = updated.phase() {
        println!("{phase}");
    }
    Ok(())
}
