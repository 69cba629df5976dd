//! gridhookd — the gridhook extender daemon.
//!
//! Single binary that assembles the extension-point service: a route table
//! holding the stock decision functions, served over axum with graceful
//! shutdown. The stock functions are deliberately trivial — the extender's
//! value is the protocol surface; operators replace them with real logic.
//!
//! # Usage
//!
//! ```text
//! LOG_LEVEL=debug gridhookd --port 8080
//! ```
//!
//! `LOG_LEVEL` is one of TRACE/DEBUG/INFO/WARNING/ERROR/ALERT
//! (case-insensitive, INFO on anything else); `RUST_LOG` overrides it with
//! full filter syntax.

use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};

use clap::Parser;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

use gridhook_api::{BUILD_VERSION, Bind, Predicate, Preemption, Prioritize, RouteTable};
use gridhook_protocol::{
    CandidateNode, HostPriority, HostPriorityList, MetaVictims, NodeName, Victims, WorkloadUnit,
};

#[derive(Parser)]
#[command(name = "gridhookd", about = "Scheduler extension-point daemon")]
struct Cli {
    /// Port to listen on.
    #[arg(long, default_value = "80")]
    port: u16,

    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    bind_addr: IpAddr,
}

// ── Stock decision functions ───────────────────────────────────────

fn always_true(_unit: &WorkloadUnit, _node: &CandidateNode) -> anyhow::Result<bool> {
    Ok(true)
}

fn zero_score(_unit: &WorkloadUnit, nodes: &[CandidateNode]) -> anyhow::Result<HostPriorityList> {
    Ok(nodes
        .iter()
        .map(|node| HostPriority { host: node.name.clone(), score: 0 })
        .collect())
}

fn no_bind(_name: &str, _namespace: &str, _uid: &str, _node: &str) -> anyhow::Result<()> {
    anyhow::bail!("this extender does not support bind; leave the bind verb unset in the scheduler policy")
}

fn echo_preemption(
    _unit: &WorkloadUnit,
    _victims: &BTreeMap<NodeName, Victims>,
    meta_victims: &BTreeMap<NodeName, MetaVictims>,
) -> BTreeMap<NodeName, MetaVictims> {
    meta_victims.clone()
}

/// Assemble the full route table. Registration order is bootstrap-only
/// detail; the table is frozen before the listener starts.
fn build_routes() -> RouteTable {
    let mut table = RouteTable::new();
    table.add_version(BUILD_VERSION);
    table.add_predicate(Predicate::new("always_true", always_true));
    table.add_prioritize(Prioritize::new("zero_score", zero_score));
    table.add_bind(Bind::new(no_bind));
    table.add_preemption(Preemption::new(echo_preemption));
    table
}

/// Map an operator-supplied level name onto a tracing level.
fn parse_log_level(value: &str) -> Option<Level> {
    match value.to_ascii_uppercase().as_str() {
        "TRACE" => Some(Level::TRACE),
        "DEBUG" => Some(Level::DEBUG),
        "INFO" => Some(Level::INFO),
        "WARNING" => Some(Level::WARN),
        "ERROR" => Some(Level::ERROR),
        "ALERT" => Some(Level::ERROR),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let level_value = std::env::var("LOG_LEVEL").unwrap_or_default();
    let level = parse_log_level(&level_value);
    let default_level = level.unwrap_or(Level::INFO);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level.to_string())),
        )
        .init();

    if level.is_none() {
        warn!(value = %level_value, "LOG_LEVEL is empty or invalid, falling back to INFO");
    }
    info!(level = %default_level, "log level set");

    let cli = Cli::parse();
    run(cli.bind_addr, cli.port).await
}

async fn run(bind_addr: IpAddr, port: u16) -> anyhow::Result<()> {
    info!(version = BUILD_VERSION, "gridhook extender starting");

    let router = build_routes().into_router();

    let addr = SocketAddr::from((bind_addr, port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "extender listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C handler");
            info!("shutdown signal received");
        })
        .await?;

    info!("gridhook extender stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_parsing_is_case_insensitive() {
        assert_eq!(parse_log_level("debug"), Some(Level::DEBUG));
        assert_eq!(parse_log_level("WARNING"), Some(Level::WARN));
        assert_eq!(parse_log_level("Alert"), Some(Level::ERROR));
        assert_eq!(parse_log_level("trace"), Some(Level::TRACE));
    }

    #[test]
    fn unrecognized_log_level_falls_back() {
        assert_eq!(parse_log_level(""), None);
        assert_eq!(parse_log_level("verbose"), None);
        assert_eq!(parse_log_level("").unwrap_or(Level::INFO), Level::INFO);
    }

    #[test]
    fn stock_routes_cover_every_extension_point() {
        let table = build_routes();
        assert_eq!(table.len(), 5);
        assert!(table.get("/version").is_some());
        assert!(table.get("/scheduler/predicates/always_true").is_some());
        assert!(table.get("/scheduler/priorities/zero_score").is_some());
        assert!(table.get("/scheduler/bind").is_some());
        assert!(table.get("/scheduler/preemption").is_some());
    }

    #[test]
    fn zero_score_covers_every_node() {
        let nodes = vec![
            CandidateNode { name: "a".into(), metadata: Default::default() },
            CandidateNode { name: "b".into(), metadata: Default::default() },
        ];
        let list = zero_score(&WorkloadUnit::default(), &nodes).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|p| p.score == 0));
    }
}
