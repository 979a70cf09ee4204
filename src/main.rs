mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::CliArgs;
use crd_browser::config::BrowserConfig;
use crd_browser::{CatalogState, CatalogStore, HttpTransport, NamespaceScope};
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    if let Err(error) = run(args).await {
        eprintln!("{}", compact_error(&error));
        std::process::exit(1);
    }
}

async fn run(args: CliArgs) -> Result<()> {
    init_tracing(&args.log_filter)?;

    let mut config = match &args.config {
        Some(path) => BrowserConfig::load(path)?,
        None => BrowserConfig::discover()?,
    };
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.trim().to_string();
    }

    let transport = HttpTransport::new(&config.base_url, config.request_timeout)
        .context("failed to initialize HTTP transport")?;
    let mut store =
        CatalogStore::new(transport).with_fallback_namespaces(config.fallback_namespaces.clone());
    info!(
        base_url = store.transport().base_url(),
        config = config.source.as_deref().unwrap_or("-"),
        "connecting"
    );

    store.refresh().await;
    if let Some(error) = store.state().error() {
        anyhow::bail!("{error}");
    }

    let Some(token) = args.kind.as_deref() else {
        print_catalog(store.state());
        return Ok(());
    };

    let Some(kind) = store.state().resolve_kind(token).cloned() else {
        anyhow::bail!("Resource kind '{token}' was not found in the catalog");
    };
    let scope = NamespaceScope::parse(&args.namespace);
    if !kind.namespaced && scope != NamespaceScope::All {
        warn!(%kind, "kind is cluster-scoped, namespace filter is ignored by the backend");
    }

    store.select(kind);
    store.set_scope(scope);
    store.load_resource_namespaces().await;
    store.load_objects().await;
    print_objects(store.state(), &args);

    let Some(refresh_ms) = args.refresh_ms else {
        return Ok(());
    };

    let mut ticker = interval(Duration::from_millis(refresh_ms.max(500)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                store.load_objects().await;
                print_objects(store.state(), &args);
            }
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for Ctrl-C")?;
                break;
            }
        }
    }

    Ok(())
}

fn init_tracing(level_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level_filter)
        .or_else(|_| EnvFilter::try_new("info"))
        .context("failed to initialize tracing filter")?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .try_init();

    Ok(())
}

fn print_catalog(state: &CatalogState) {
    println!(
        "{:<40} {:<10} {:<40} {:<28} NAMESPACED",
        "GROUP", "VERSION", "NAME", "KIND"
    );
    for kind in state.sorted_resources() {
        println!(
            "{:<40} {:<10} {:<40} {:<28} {}",
            kind.group_segment(),
            kind.version,
            kind.name,
            if kind.kind.is_empty() { "-" } else { kind.kind.as_str() },
            kind.namespaced
        );
    }
    println!();
    println!("namespaces: {}", state.namespaces().join(", "));
}

fn print_objects(state: &CatalogState, args: &CliArgs) {
    let Some(kind) = state.selected() else {
        return;
    };

    if let Some(error) = state.error() {
        println!("{error}");
        return;
    }

    let query = args.filter.as_deref().unwrap_or_default();
    let objects = state.visible_objects(query);
    println!(
        "{kind} in {} ({} of {} objects)",
        state.scope(),
        objects.len(),
        state.objects().len()
    );
    if !state.resource_namespaces().is_empty() {
        println!("present in: {}", state.resource_namespaces().join(", "));
    }

    println!("{:<48} {:<24} AGE", "NAME", "NAMESPACE");
    for object in objects {
        let summary = object.summary();
        let columns = summary.columns();
        println!("{:<48} {:<24} {}", columns[0], columns[1], columns[2]);
        if args.detail {
            println!("{}", object.yaml_detail());
        }
    }
}

fn compact_error(error: &anyhow::Error) -> String {
    let mut out = Vec::new();
    for (index, cause) in error.chain().enumerate() {
        if index == 0 {
            out.push(cause.to_string());
        } else if index <= 2 {
            out.push(format!("caused by: {cause}"));
        } else {
            break;
        }
    }

    out.join("\n")
}
