mod config;
mod deps;
mod tools;

use std::path::PathBuf;

use clap::Parser;
use tioc::BasicContainer;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::LayeredConfig;
use crate::deps::Dependency;

#[derive(Debug, Parser)]
#[command(name = "agent-tools", about = "Load agent tools through type-directed injection")]
struct Args {
    /// Log registrations and injections
    #[arg(short, long)]
    verbose: bool,

    /// Also show manual construction next to container construction
    #[arg(short, long)]
    comparison: bool,

    /// Extra TOML layer merged over the defaults
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Leave a dependency unregistered
    #[arg(long, value_enum)]
    skip: Vec<Dependency>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let settings = config::load(args.config.as_deref())?;
    debug!(config = %settings, "effective configuration");

    let container = seed(&settings, &args.skip)?;
    println!("Registered: {}", container.registry().type_names().join(", "));

    let loaded = tools::load_all(&container);
    for tool in &loaded.tools {
        println!("\n{} created", tool.name());
        for dependency in tool.dependencies() {
            println!("  - {}", dependency);
        }
    }
    for failure in &loaded.failures {
        println!("\nSkipped: {}", failure);
    }

    println!();
    for tool in &loaded.tools {
        println!("{}", tool.run_sample());
    }

    if args.comparison {
        print_comparison();
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Registers every dependency the configuration describes, except `skip`.
fn seed(settings: &LayeredConfig, skip: &[Dependency]) -> anyhow::Result<BasicContainer> {
    let container = BasicContainer::new();
    if !skip.contains(&Dependency::Config) {
        container.register(settings.config()?);
    }
    if !skip.contains(&Dependency::Runtime) {
        container.register(settings.runtime()?);
    }
    if !skip.contains(&Dependency::Approval) {
        container.register(settings.approval()?);
    }
    Ok(container)
}

fn print_comparison() {
    println!(
        r#"
Manual wiring passes every dependency by hand:

    let read = ReadFileTool {{ config: config.clone(), approval: approval.clone() }};
    let write = WriteFileTool {{ config, approval, runtime }};

With the container each tool only declares what it needs:

    container.register(config);
    container.register(runtime);
    container.register(approval);

    let read: ReadFileTool = container.construct()?;
    let write: WriteFileTool = container.construct()?;
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps::Runtime;

    #[test]
    fn test_args() {
        let args = Args::parse_from(["agent-tools", "-v", "--skip", "runtime", "--skip", "approval"]);
        assert!(args.verbose);
        assert!(!args.comparison);
        assert_eq!(args.skip, vec![Dependency::Runtime, Dependency::Approval]);
    }

    #[test]
    fn test_seed_honours_skip() {
        let settings = LayeredConfig::defaults().unwrap();
        let container = seed(&settings, &[Dependency::Runtime]).unwrap();
        assert!(container.lookup::<Runtime>().is_none());
        assert_eq!(container.registry().type_names(), vec!["Approval", "Config"]);
    }
}
