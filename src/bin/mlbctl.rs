use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use mlb_staging::lifecycle::signals::spawn_ctrl_c_handler;
use mlb_staging::lifecycle::startup::{self, Runtime};
use mlb_staging::resources::{
    HealthMonitor, Kind, Listener, LoadBalancer, Policy, ResourceKind, Route, Rule, SystemUpdateRef,
    TargetGroup,
};

#[derive(Parser)]
#[command(name = "mlbctl")]
#[command(about = "Staged configuration control for managed load balancers", long_about = None)]
struct Cli {
    /// Configuration file (TOML); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the configuration in effect for a resource
    Show { kind: Kind, id: String },
    /// Apply staged changes and/or a system update to a load balancer
    Reconcile {
        load_balancer_id: String,
        #[arg(long)]
        apply: bool,
        #[arg(long)]
        system_update: Option<String>,
    },
    /// Discard every staged change on a load balancer
    Cancel { load_balancer_id: String },
    /// Delete a resource
    Delete { kind: Kind, id: String },
}

/// Run `$call::<K>(runtime.manager(client), args..)` for the kind named at runtime.
macro_rules! dispatch {
    ($kind:expr, $runtime:expr, $call:ident ( $($arg:expr),* )) => {
        match $kind {
            Kind::LoadBalancer => $call::<LoadBalancer>(&$runtime, $runtime.plane.load_balancers.clone(), $($arg),*).await,
            Kind::HealthMonitor => $call::<HealthMonitor>(&$runtime, $runtime.plane.health_monitors.clone(), $($arg),*).await,
            Kind::Listener => $call::<Listener>(&$runtime, $runtime.plane.listeners.clone(), $($arg),*).await,
            Kind::Policy => $call::<Policy>(&$runtime, $runtime.plane.policies.clone(), $($arg),*).await,
            Kind::Route => $call::<Route>(&$runtime, $runtime.plane.routes.clone(), $($arg),*).await,
            Kind::Rule => $call::<Rule>(&$runtime, $runtime.plane.rules.clone(), $($arg),*).await,
            Kind::TargetGroup => $call::<TargetGroup>(&$runtime, $runtime.plane.target_groups.clone(), $($arg),*).await,
        }
    };
}

type Client<K> = std::sync::Arc<dyn mlb_staging::api::RemoteResourceClient<K>>;
type CliResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() -> CliResult {
    let cli = Cli::parse();
    let runtime = startup::start(cli.config.as_deref())?;
    spawn_ctrl_c_handler(runtime.shutdown.clone());

    match cli.command {
        Commands::Show { kind, id } => dispatch!(kind, runtime, show(&id))?,
        Commands::Delete { kind, id } => dispatch!(kind, runtime, delete(&id))?,
        Commands::Reconcile {
            load_balancer_id,
            apply,
            system_update,
        } => {
            let update = system_update.map(SystemUpdateRef::new);
            let result = runtime
                .orchestrator()
                .reconcile(&load_balancer_id, apply, update.as_ref())
                .await?;
            print_json(&result)?;
        }
        Commands::Cancel { load_balancer_id } => {
            let result = runtime.orchestrator().cancel(&load_balancer_id).await?;
            print_json(&result)?;
        }
    }

    Ok(())
}

async fn show<K: ResourceKind>(runtime: &Runtime, client: Client<K>, id: &str) -> CliResult {
    let view = runtime.manager(client).read(id).await?;
    print_json(&view)
}

async fn delete<K: ResourceKind>(runtime: &Runtime, client: Client<K>, id: &str) -> CliResult {
    let outcome = runtime.manager(client).delete(id).await?;
    println!("{} {}: {:?}", K::KIND, id, outcome);
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
