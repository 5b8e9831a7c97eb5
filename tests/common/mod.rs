#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Stand-in compiler: answers `--version`, and `compile SRC DEST ...` copies SRC to DEST.
pub const FAKE_TYPST: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  echo "typst 0.11.0 (fake)"
  exit 0
fi
if [ "$1" = "compile" ]; then
  cp "$2" "$3"
  exit $?
fi
exit 2
"#;

/// Stand-in compiler whose compile step always fails.
pub const FAILING_TYPST: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  exit 0
fi
echo "error: unknown variable: resume" >&2
exit 1
"#;

/// Stand-in compiler that reports success without writing anything.
pub const SILENT_TYPST: &str = "#!/bin/sh\nexit 0\n";

#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, body).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
    path.to_path_buf()
}

/// Lays out a minimal portfolio site: résumé data plus a Typst source.
pub fn write_site(root: &Path, resume_yaml: &str) {
    fs::create_dir_all(root.join("data")).unwrap();
    fs::create_dir_all(root.join("typst")).unwrap();
    fs::write(root.join("data").join("resume.yaml"), resume_yaml).unwrap();
    fs::write(
        root.join("typst").join("cv.typ"),
        "#let data = yaml(\"/data/resume.yaml\")\n= #data.name\n",
    )
    .unwrap();
}

pub const ADA_RESUME: &str = "name: Ada Lovelace\ntitle: Data Scientist\nemail: ada@example.com\n";

/// Builds an uncompressed tarball shaped like a Typst release:
/// `<dir_name>/typst` plus a LICENSE next to it.
#[cfg(unix)]
pub fn release_tarball(work: &Path, dir_name: &str, binary_body: &str) -> PathBuf {
    let src = work.join("release-src");
    let release_dir = src.join(dir_name);
    fs::create_dir_all(&release_dir).unwrap();
    write_script(&release_dir.join("typst"), binary_body);
    fs::write(release_dir.join("LICENSE"), "Apache-2.0\n").unwrap();

    let tarball = work.join("release.tar");
    let status = std::process::Command::new("tar")
        .arg("-cf")
        .arg(&tarball)
        .arg("-C")
        .arg(&src)
        .arg(dir_name)
        .status()
        .expect("tar must be available for this test");
    assert!(status.success(), "building test tarball failed");
    tarball
}
