use std::env;
use std::time::Duration;

use build_pdf::config::{BuildConfig, ENV_DOWNLOAD_TIMEOUT, ENV_TYPST, ENV_TYPST_VERSION};
use serial_test::serial;

fn clear() {
    for key in [ENV_TYPST, ENV_TYPST_VERSION, ENV_DOWNLOAD_TIMEOUT] {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn process_env_overrides_defaults() {
    clear();
    env::set_var(ENV_TYPST, "/usr/local/bin/typst");
    env::set_var(ENV_TYPST_VERSION, "0.12.0");
    env::set_var(ENV_DOWNLOAD_TIMEOUT, "15");

    let config = BuildConfig::for_root("/srv/portfolio")
        .with_env_overrides()
        .expect("overrides parse");
    clear();

    assert_eq!(config.tool_command, "/usr/local/bin/typst");
    assert_eq!(config.typst_version, "0.12.0");
    assert_eq!(config.download_timeout, Duration::from_secs(15));
}

#[test]
#[serial]
fn unset_env_keeps_defaults() {
    clear();
    let config = BuildConfig::for_root("/srv/portfolio")
        .with_env_overrides()
        .expect("no overrides");
    assert_eq!(config.tool_command, "typst");
    assert_eq!(config.typst_version, "0.11.0");
}
