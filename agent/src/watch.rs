use clap::Args;
use common::{DebugMode, ListOptions, Result};
use futures::TryStreamExt;
use kube::{ResourceExt, core::WatchEvent};

use crate::cluster::Cluster;

#[derive(Args, Debug)]
pub struct Parameters {
    /// Label selector
    #[arg(short = 'l', long = "selector", value_name = "SELECTOR")]
    selector: Option<String>,
    /// Stop after this many seconds
    #[arg(short = 't', long = "timeout", value_name = "SECONDS")]
    timeout: Option<u32>,
    #[command(flatten)]
    cluster: Cluster,
}

fn describe(event: &WatchEvent<DebugMode>) -> String {
    let line = |verb: &str, dm: &DebugMode| {
        let phase = dm.phase().map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
        format!("{verb} {} {phase}", dm.name_any())
    };
    match event {
        WatchEvent::Added(dm) => line("ADDED", dm),
        WatchEvent::Modified(dm) => line("MODIFIED", dm),
        WatchEvent::Deleted(dm) => line("DELETED", dm),
        WatchEvent::Bookmark(b) => format!("BOOKMARK {}", b.metadata.resource_version),
        WatchEvent::Error(e) => format!("ERROR {} {}", e.code, e.message),
    }
}

pub async fn run(args: &Parameters) -> Result<()> {
    let client = args.cluster.client().await?;
    let opts = ListOptions {
        label_selector: args.selector.clone(),
        timeout_seconds: args.timeout,
        ..ListOptions::default()
    };
    let mut events = client.watch(&opts).await?;
    while let Some(event) = events.try_next().await? {
        println!("{}", describe(&event));
    }
    Ok(())
}
