//! High-level pipeline: résumé data → file name → compiler → PDF.
//!
//! Each step fails fast; the first error is returned unchanged so the CLI can
//! report it and exit non-zero.
//!
//! # Navigation
//! - Main entrypoint: [`build`]
//! - Subcommand helpers: [`resolve_filename`], [`provision_only`]

use std::path::PathBuf;

use tracing::{error, info};

use crate::compile::compile_document;
use crate::config::BuildConfig;
use crate::contract::{ArchiveFetcher, BuildReport, CompileRequest};
use crate::error::Result;
use crate::filename::synthesize_filename;
use crate::locate::resolve_tool;
use crate::platform::PlatformDescriptor;
use crate::provision::Provisioner;
use crate::resume::load_resume;

/// Loads the résumé record and returns the synthesized PDF file name.
pub fn resolve_filename(config: &BuildConfig) -> Result<String> {
    let record = load_resume(&config.resume_file)?;
    let file_name = synthesize_filename(&record);
    info!(file_name = %file_name, "Synthesized output file name");
    Ok(file_name)
}

/// Provisions the local compiler without probing the system one or compiling.
pub async fn provision_only(
    config: &BuildConfig,
    platform: &PlatformDescriptor,
    fetcher: &dyn ArchiveFetcher,
) -> Result<PathBuf> {
    Provisioner::new(config, platform.clone(), fetcher)
        .provision()
        .await
}

/// Runs the full build.
pub async fn build(
    config: &BuildConfig,
    platform: &PlatformDescriptor,
    fetcher: &dyn ArchiveFetcher,
) -> Result<BuildReport> {
    info!(platform = %platform, "[BUILD] Starting PDF build");

    let file_name = resolve_filename(config)?;
    let destination = config.output_dir.join(&file_name);

    let tool = resolve_tool(config, platform, fetcher).await.map_err(|e| {
        error!(error = %e, "[BUILD][ERROR] No usable Typst compiler");
        e
    })?;

    let request = CompileRequest {
        source: config.source_file.clone(),
        destination,
        root: config.root_dir.clone(),
    };
    let artifact = compile_document(&tool, &request, config.compile_timeout)
        .await
        .map_err(|e| {
            error!(error = %e, "[BUILD][ERROR] Compile step failed");
            e
        })?;

    info!(path = %artifact.path.display(), "[BUILD] Complete");
    Ok(BuildReport {
        file_name,
        artifact,
        tool,
    })
}
