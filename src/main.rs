use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};
use devstrap::application::dto::{InstallationReportDto, PackageDto, SystemInfoDto};
use devstrap::application::{Installer, UseCaseContainer};
use devstrap::domain::context::Context;
use devstrap::domain::entities::{InstallMethod, InstallationResult, Package};
use devstrap::domain::ports::{CommandRunner, FileManager, NetworkClient, SystemDetector};
use devstrap::infrastructure::{
    CatalogRepository, ConfigRepository, HttpNetworkClient, LocalFileManager, OsSystemDetector,
    ProcessCommandRunner,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::Level;

#[derive(Parser)]
#[command(name = "devstrap", version, about = "Provision a Linux workstation")]
struct Cli {
    /// Print what would happen without changing anything
    #[arg(long, global = true)]
    dry_run: bool,

    /// Machine-readable output
    #[arg(long, global = true)]
    json: bool,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Install applications with the method that suits this system
    Install {
        /// `name` or `name=source`
        #[arg(required = true)]
        applications: Vec<String>,
    },
    /// Install one package with an explicit method
    Add {
        name: String,
        source: Option<String>,
        #[arg(short, long)]
        method: InstallMethod,
        #[arg(long)]
        version: Option<String>,
    },
    Remove {
        name: String,
        source: Option<String>,
        #[arg(short, long)]
        method: InstallMethod,
    },
    /// Report whether a package is installed and how
    Check {
        name: String,
        #[arg(short, long)]
        method: Option<InstallMethod>,
    },
    List,
    System,
    /// Install every entry of a JSON catalog
    Apply { catalog: PathBuf },
}

fn init_tracing(verbose: bool) {
    let level = if verbose || cfg!(feature = "verbose-logging") {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_application(entry: &str) -> (String, String) {
    match entry.split_once('=') {
        Some((name, source)) => (name.to_string(), source.to_string()),
        None => (entry.to_string(), entry.to_string()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report(results: &[InstallationResult], json: bool) -> Result<bool> {
    let report = InstallationReportDto::from_results(results);
    if json {
        print_json(&report)?;
    } else {
        for result in &report.results {
            match &result.error {
                Some(error) => println!("✗ {}: {}", result.package.name, error),
                None => println!("✓ {}: {}", result.package.name, result.outcome),
            }
        }
        println!("{} succeeded, {} failed", report.succeeded, report.failed);
    }
    Ok(report.all_succeeded())
}

async fn run(cli: Cli, ctx: Context) -> Result<bool> {
    let mut config = ConfigRepository::new().load()?;
    config.dry_run |= cli.dry_run;
    let paths = ConfigRepository::resolve_paths(&config)?;

    let runner: Arc<dyn CommandRunner> = Arc::new(ProcessCommandRunner::new());
    let files: Arc<dyn FileManager> = Arc::new(LocalFileManager::new());
    let network: Arc<dyn NetworkClient> = Arc::new(HttpNetworkClient::new(&config)?);
    let detector: Arc<dyn SystemDetector> = Arc::new(OsSystemDetector::new(Arc::clone(&runner)));
    let installer = Arc::new(Installer::new(runner, files, network, paths, config));
    let use_cases = UseCaseContainer::new(installer, detector);

    match cli.command {
        Command::Install { applications } => {
            let applications: BTreeMap<String, String> =
                applications.iter().map(|entry| parse_application(entry)).collect();
            let results = use_cases.install_applications.execute(&ctx, &applications).await?;
            report(&results, cli.json)
        }
        Command::Add {
            name,
            source,
            method,
            version,
        } => {
            let source = source.unwrap_or_else(|| name.clone());
            let mut package = Package::new(name, source, method);
            if let Some(version) = version {
                package = package.with_version(version);
            }
            let result = use_cases.install.execute(&ctx, package).await;
            report(&[result], cli.json)
        }
        Command::Remove {
            name,
            source,
            method,
        } => {
            let source = source.unwrap_or_else(|| name.clone());
            let package = Package::new(name, source, method);
            use_cases.remove.execute(&ctx, package).await?;
            Ok(true)
        }
        Command::Check { name, method } => {
            let found = match method {
                Some(method) => use_cases
                    .check
                    .by_method(&ctx, &name, method)
                    .await?
                    .then_some(method),
                None => use_cases.check.execute(&ctx, &name).await,
            };
            if cli.json {
                print_json(&serde_json::json!({
                    "name": name,
                    "installed": found.is_some(),
                    "method": found.map(|m| m.to_string()),
                }))?;
            } else {
                match found {
                    Some(method) => println!("{} is installed ({})", name, method),
                    None => println!("{} is not installed", name),
                }
            }
            Ok(found.is_some())
        }
        Command::List => {
            let packages = use_cases.list.execute(&ctx).await?;
            if cli.json {
                let packages: Vec<PackageDto> = packages.into_iter().map(Into::into).collect();
                print_json(&packages)?;
            } else {
                for package in &packages {
                    println!("{:<32} {:<10} {}", package.name, package.method.as_str(), package.version);
                }
            }
            Ok(true)
        }
        Command::System => {
            let info = use_cases.detect_system.execute().await?;
            let dto = SystemInfoDto::from(&info);
            if cli.json {
                print_json(&dto)?;
            } else {
                println!("Distribution:    {} {} ({})", dto.distribution, dto.version, dto.family);
                println!("Package manager: {} -> {}", dto.package_manager, dto.preferred_method);
                println!(
                    "Desktop:         {}",
                    dto.desktop_environment.as_deref().unwrap_or("none")
                );
                println!("Architecture:    {}", dto.architecture);
                println!("Kernel:          {}", dto.kernel);
            }
            Ok(true)
        }
        Command::Apply { catalog } => {
            let catalog = CatalogRepository::new()
                .load(&catalog)
                .await
                .with_context(|| format!("Failed to load catalog {}", catalog.display()))?;
            if catalog.total_count() == 0 {
                bail!("catalog has no entries");
            }
            let results = use_cases.apply_catalog.execute(&ctx, &catalog).await?;
            report(&results, cli.json)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (ctx, cancel) = Context::with_cancel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping");
            cancel.cancel();
        }
    });

    match run(cli, ctx).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
