use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::config::BuildConfig;
use crate::download::HttpFetcher;
use crate::pipeline::{build, provision_only, resolve_filename};
use crate::platform::PlatformDescriptor;
use crate::provision::read_manifest;

/// CLI for build-pdf: compile the portfolio résumé to PDF.
#[derive(Parser)]
#[clap(
    name = "build-pdf",
    version,
    about = "Compile the portfolio résumé to PDF, provisioning Typst when it is not installed"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct SiteArgs {
    /// Site root; defaults to the current directory
    #[clap(long)]
    pub root: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile the résumé into the public directory
    Build {
        #[clap(flatten)]
        site: SiteArgs,
        /// Résumé data file [default: <root>/data/resume.yaml]
        #[clap(long)]
        resume: Option<PathBuf>,
        /// Typst source document [default: <root>/typst/cv.typ]
        #[clap(long)]
        source: Option<PathBuf>,
        /// Destination directory [default: <root>/public]
        #[clap(long)]
        output_dir: Option<PathBuf>,
        /// Compiler cache directory [default: <root>/bin]
        #[clap(long)]
        bin_dir: Option<PathBuf>,
        /// Skip the system Typst and always use the cached copy
        #[clap(long)]
        no_system: bool,
    },
    /// Print the PDF file name derived from the résumé data
    Filename {
        #[clap(flatten)]
        site: SiteArgs,
        #[clap(long)]
        resume: Option<PathBuf>,
    },
    /// Download Typst into the cache directory without compiling
    Provision {
        #[clap(flatten)]
        site: SiteArgs,
        #[clap(long)]
        bin_dir: Option<PathBuf>,
    },
}

fn base_config(site: &SiteArgs) -> Result<BuildConfig> {
    let root = match &site.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let config = BuildConfig::for_root(root).with_env_overrides()?;
    Ok(config)
}

/// Async CLI entrypoint shared by main() and the integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Build {
            site,
            resume,
            source,
            output_dir,
            bin_dir,
            no_system,
        } => {
            let mut config = base_config(&site)?;
            if let Some(resume) = resume {
                config.resume_file = resume;
            }
            if let Some(source) = source {
                config.source_file = source;
            }
            if let Some(output_dir) = output_dir {
                config.output_dir = output_dir;
            }
            if let Some(bin_dir) = bin_dir {
                config.bin_dir = bin_dir;
            }
            config.prefer_system = !no_system;
            config.trace_loaded();

            let platform = PlatformDescriptor::current();
            let fetcher = HttpFetcher::new(config.download_timeout)?;
            let report = build(&config, &platform, &fetcher).await?;
            println!("PDF generated at {}", report.artifact.path.display());
            Ok(())
        }
        Commands::Filename { site, resume } => {
            let mut config = base_config(&site)?;
            if let Some(resume) = resume {
                config.resume_file = resume;
            }
            println!("{}", resolve_filename(&config)?);
            Ok(())
        }
        Commands::Provision { site, bin_dir } => {
            let mut config = base_config(&site)?;
            if let Some(bin_dir) = bin_dir {
                config.bin_dir = bin_dir;
            }
            config.trace_loaded();

            let platform = PlatformDescriptor::current();
            let fetcher = HttpFetcher::new(config.download_timeout)?;
            let path = provision_only(&config, &platform, &fetcher).await?;
            println!("Typst available at {}", path.display());
            if let Some(manifest) = read_manifest(&config.bin_dir) {
                println!("{}", serde_json::to_string_pretty(&manifest)?);
            }
            Ok(())
        }
    }
}
