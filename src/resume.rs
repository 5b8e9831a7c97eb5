//! Loading of the résumé data file shared with the static site.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use crate::error::{Error, Result};

/// The fields of `resume.yaml` the PDF build depends on.
///
/// The site keeps much more in the same file (experience, projects, links);
/// those keys are ignored here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResumeRecord {
    /// Full name, "First ... Last".
    pub name: String,
    pub title: String,
}

/// Reads and validates the résumé record at `path`.
pub fn load_resume<P: AsRef<Path>>(path: P) -> Result<ResumeRecord> {
    let path_ref = path.as_ref();
    info!(resume_path = ?path_ref, "Loading resume data from file");

    let content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, resume_path = ?path_ref, "Failed to read resume file");
            return Err(Error::Config(format!(
                "Failed to read resume file {}: {e}",
                path_ref.display()
            )));
        }
    };

    let record = parse_resume(&content).map_err(|e| {
        error!(error = %e, resume_path = ?path_ref, "Rejected resume data");
        e
    })?;

    info!(name = %record.name, title = %record.title, "Resume data loaded");
    Ok(record)
}

/// Parses résumé YAML from a string. Blank `name` or `title` is rejected.
pub fn parse_resume(content: &str) -> Result<ResumeRecord> {
    let record: ResumeRecord = serde_yaml::from_str(content)
        .map_err(|e| Error::Config(format!("Failed to parse resume YAML: {e}")))?;

    if record.name.trim().is_empty() {
        return Err(Error::Config("resume field `name` is empty".into()));
    }
    if record.title.trim().is_empty() {
        return Err(Error::Config("resume field `title` is empty".into()));
    }
    Ok(record)
}
