use crate::config::ExtractConfig;
use crate::pipeline::{collect_reports, list_archive_pages};
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct HarnessOptions {
    pub archive_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarnessReport {
    pub pages_found: usize,
    pub first_pass_parsed: usize,
    pub first_pass_failed: usize,
    pub second_pass_parsed: usize,
    pub second_pass_failed: usize,
    pub identical: bool,
}

pub fn run_harness(options: &HarnessOptions, config: &ExtractConfig) -> Result<HarnessReport> {
    let pages_found = list_archive_pages(&options.archive_dir)?.len();

    let (first_reports, first_failed) = collect_reports(&options.archive_dir, config)?;
    let (second_reports, second_failed) = collect_reports(&options.archive_dir, config)?;

    let identical = first_reports == second_reports && first_failed == second_failed;
    if identical {
        info!(pages = pages_found, "both passes produced identical reports");
    } else {
        warn!(pages = pages_found, "passes diverged");
    }

    Ok(HarnessReport {
        pages_found,
        first_pass_parsed: first_reports.len(),
        first_pass_failed: first_failed.len(),
        second_pass_parsed: second_reports.len(),
        second_pass_failed: second_failed.len(),
        identical,
    })
}
