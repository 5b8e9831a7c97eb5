#![doc = "build-pdf: builds the portfolio site's PDF résumé with Typst."]

//! The pipeline reads `data/resume.yaml`, derives a recruiter-friendly file
//! name, finds a Typst compiler (system install or a cached download under
//! `bin/`) and compiles `typst/cv.typ` into `public/`.

pub mod catalog;
pub mod cli;
pub mod compile;
pub mod config;
pub mod contract;
pub mod download;
pub mod error;
pub mod extract;
pub mod filename;
pub mod locate;
pub mod lock;
pub mod pipeline;
pub mod platform;
pub mod provision;
pub mod resume;

pub use error::{Error, Result};
