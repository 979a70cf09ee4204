use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "crd-browser",
    version,
    about = "Browse built-in and custom Kubernetes resources through a crds-objects API."
)]
pub struct CliArgs {
    /// Backend base URL (overrides the config file)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Config file path (defaults to CRD_BROWSER_CONFIG or crd-browser.yaml discovery)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Resource kind to browse: group/version/name, version/name or a bare name
    #[arg(short, long)]
    pub kind: Option<String>,

    /// Namespace scope for object listing ("all" for every namespace)
    #[arg(short, long, default_value = "all")]
    pub namespace: String,

    /// Only show objects whose name or namespace contains this text
    #[arg(long)]
    pub filter: Option<String>,

    /// Print the full YAML of each listed object
    #[arg(long)]
    pub detail: bool,

    /// Keep reloading objects at this interval in milliseconds
    #[arg(long)]
    pub refresh_ms: Option<u64>,

    /// tracing filter (for example: info,debug,trace)
    #[arg(long, default_value = "info")]
    pub log_filter: String,
}
