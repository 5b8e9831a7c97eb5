#![cfg(unix)]

mod common;

use build_pdf::config::BuildConfig;
use build_pdf::contract::{MockArchiveFetcher, ToolInstallation};
use build_pdf::pipeline::{build, resolve_filename};
use build_pdf::platform::{Arch, Os, PlatformDescriptor};
use build_pdf::Error;
use tempfile::tempdir;

fn linux_x86_64() -> PlatformDescriptor {
    PlatformDescriptor {
        os: Os::Linux,
        arch: Arch::X86_64,
    }
}

#[tokio::test]
async fn system_compiler_is_used_when_probe_succeeds() {
    let site = tempdir().unwrap();
    common::write_site(site.path(), common::ADA_RESUME);
    let typst = common::write_script(&site.path().join("tools").join("typst"), common::FAKE_TYPST);

    let mut config = BuildConfig::for_root(site.path());
    config.tool_command = typst.to_string_lossy().into_owned();

    let mut fetcher = MockArchiveFetcher::new();
    fetcher.expect_fetch().times(0);

    let report = build(&config, &linux_x86_64(), &fetcher).await.expect("build");
    assert_eq!(report.file_name, "Ada-Lovelace_Data-Scientist_1-1_Graduate.pdf");
    assert_eq!(report.tool, ToolInstallation::System(config.tool_command.clone()));
    assert_eq!(
        report.artifact.path,
        site.path().join("public").join(&report.file_name)
    );
    assert!(report.artifact.path.is_file());
    assert!(!config.bin_dir.exists(), "system tool must not touch the cache");
}

#[tokio::test]
async fn cached_compiler_is_used_when_system_is_missing() {
    let site = tempdir().unwrap();
    common::write_site(site.path(), common::ADA_RESUME);

    let mut config = BuildConfig::for_root(site.path());
    config.tool_command = "build-pdf-no-such-compiler".into();
    let cached = common::write_script(&config.bin_dir.join("typst"), common::FAKE_TYPST);

    let mut fetcher = MockArchiveFetcher::new();
    fetcher.expect_fetch().times(0);

    let report = build(&config, &linux_x86_64(), &fetcher).await.expect("build");
    assert_eq!(report.tool, ToolInstallation::Local(cached));
    assert!(report.artifact.path.is_file());
}

#[tokio::test]
async fn no_system_flag_skips_the_probe() {
    let site = tempdir().unwrap();
    common::write_site(site.path(), common::ADA_RESUME);
    let system = common::write_script(&site.path().join("tools").join("typst"), common::FAILING_TYPST);

    let mut config = BuildConfig::for_root(site.path());
    config.tool_command = system.to_string_lossy().into_owned();
    config.prefer_system = false;
    let cached = common::write_script(&config.bin_dir.join("typst"), common::FAKE_TYPST);

    let fetcher = MockArchiveFetcher::new();
    let report = build(&config, &linux_x86_64(), &fetcher).await.expect("build");
    assert_eq!(report.tool, ToolInstallation::Local(cached));
}

#[tokio::test]
async fn compile_failure_surfaces_as_error() {
    let site = tempdir().unwrap();
    common::write_site(site.path(), common::ADA_RESUME);
    let typst = common::write_script(&site.path().join("tools").join("typst"), common::FAILING_TYPST);

    let mut config = BuildConfig::for_root(site.path());
    config.tool_command = typst.to_string_lossy().into_owned();

    let fetcher = MockArchiveFetcher::new();
    let err = build(&config, &linux_x86_64(), &fetcher).await.unwrap_err();
    assert!(matches!(err, Error::Compile(_)), "got {err:?}");
}

#[tokio::test]
async fn bad_resume_stops_before_tool_resolution() {
    let site = tempdir().unwrap();
    common::write_site(site.path(), "title: Data Scientist\n");

    let config = BuildConfig::for_root(site.path());
    let mut fetcher = MockArchiveFetcher::new();
    fetcher.expect_fetch().times(0);

    let err = build(&config, &linux_x86_64(), &fetcher).await.unwrap_err();
    assert!(matches!(err, Error::Config(_)), "got {err:?}");
    assert!(!config.bin_dir.exists());
    assert!(!config.output_dir.exists());
}

#[test]
fn filename_only_needs_resume_data() {
    let site = tempdir().unwrap();
    common::write_site(site.path(), "name: Grace Brewster Hopper\ntitle: Rear Admiral\n");
    let config = BuildConfig::for_root(site.path());
    assert_eq!(
        resolve_filename(&config).unwrap(),
        "Grace-Hopper_Rear-Admiral_1-1_Graduate.pdf"
    );
    assert!(!site.path().join("public").exists());
}

#[tokio::test]
async fn unknown_os_with_system_compiler_still_builds() {
    let site = tempdir().unwrap();
    common::write_site(site.path(), common::ADA_RESUME);
    let typst = common::write_script(&site.path().join("tools").join("typst"), common::FAKE_TYPST);

    let mut config = BuildConfig::for_root(site.path());
    config.tool_command = typst.to_string_lossy().into_owned();

    let mut fetcher = MockArchiveFetcher::new();
    fetcher.expect_fetch().times(0);

    let freebsd = PlatformDescriptor::parse("freebsd", "x86_64");
    let report = build(&config, &freebsd, &fetcher).await.expect("build");
    assert_eq!(report.tool, ToolInstallation::System(config.tool_command.clone()));
    assert!(report.artifact.path.is_file());
}

#[tokio::test]
async fn unknown_os_without_compiler_is_unsupported() {
    let site = tempdir().unwrap();
    common::write_site(site.path(), common::ADA_RESUME);

    let mut config = BuildConfig::for_root(site.path());
    config.tool_command = "build-pdf-no-such-compiler".into();

    let mut fetcher = MockArchiveFetcher::new();
    fetcher.expect_fetch().times(0);

    let freebsd = PlatformDescriptor::parse("freebsd", "x86_64");
    let err = build(&config, &freebsd, &fetcher).await.unwrap_err();
    assert!(matches!(err, Error::UnsupportedPlatform { .. }), "got {err:?}");
}
