use anyhow::{Context, Result};
use clap::Parser;
use paramap::shared::{ObservabilitySystem, ParamapConfig, ResolutionMetrics, ResolutionTimer};
use paramap::{Metadata, MappingOption, MappingResolver, ParameterDescriptor, QueryDefinition};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// List the fields and template tags a dashboard parameter can be mapped to.
#[derive(Parser, Debug)]
#[clap(version, about)]
struct Cli {
    /// Metadata JSON describing tables and fields
    #[clap(short, long)]
    metadata: PathBuf,

    /// Parameter type, for example `date/single` or `string/=`
    #[clap(short = 't', long)]
    parameter_type: String,

    /// Query definition JSON (structured or native)
    #[clap(short, long)]
    query: PathBuf,

    /// TOML configuration file
    #[clap(short, long, env = "PARAMAP_CONFIG", default_value = "paramap.toml")]
    config: PathBuf,

    /// Pretty-print the JSON output
    #[clap(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ParamapConfig::load_from_file(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    ObservabilitySystem::init(&config.observability)?;

    let options = run(&cli, &config)?;
    let output = if cli.pretty {
        serde_json::to_string_pretty(&options)?
    } else {
        serde_json::to_string(&options)?
    };
    println!("{output}");
    Ok(())
}

fn run(cli: &Cli, config: &ParamapConfig) -> Result<Vec<MappingOption>> {
    let metadata: Metadata = read_json(&cli.metadata)?;
    let query: QueryDefinition = read_json(&cli.query)?;
    let parameter = ParameterDescriptor::new(cli.parameter_type.as_str());

    let resolver = MappingResolver::new().with_options(config.resolver_options());
    let kind = query.kind();

    let _timer = ResolutionTimer::start(kind);
    match resolver.resolve(&metadata, &parameter, &query) {
        Ok(options) => {
            ResolutionMetrics::resolution_completed(kind, options.len());
            info!(
                parameter_type = %parameter.parameter_type,
                query = kind,
                options = options.len(),
                "Resolved mapping options"
            );
            Ok(options)
        }
        Err(e) => {
            ResolutionMetrics::resolution_failed(kind, e.kind());
            error!(query = kind, error = %e, "Mapping resolution failed");
            Err(e).context("resolving mapping options")
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}
