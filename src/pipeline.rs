use crate::config::{ExtractConfig, load_config};
use crate::model::{BatchSummary, PageFailure, TourReport};
use crate::report::extract_report;
use crate::store::save_reports;
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub archive_dir: PathBuf,
    pub out_path: PathBuf,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct ValidateOptions {
    pub config_path: Option<PathBuf>,
}

pub fn process_archive(options: &BatchOptions, config: &ExtractConfig) -> Result<BatchSummary> {
    let pages = list_archive_pages(&options.archive_dir)?;
    info!(
        archive = %options.archive_dir.display(),
        pages = pages.len(),
        "batch start"
    );

    let (reports, failed) = extract_pages(&options.archive_dir, &pages, config)?;

    let mut summary = BatchSummary {
        pages_found: pages.len(),
        parsed: reports.len(),
        failed,
        out_path: None,
    };

    if !options.dry_run {
        save_reports(&options.out_path, &reports)?;
        info!(out = %options.out_path.display(), reports = reports.len(), "reports written");
        summary.out_path = Some(options.out_path.clone());
    } else {
        info!("dry run enabled; reports not persisted");
    }

    info!(
        parsed = summary.parsed,
        failed = summary.failed.len(),
        "batch complete"
    );
    Ok(summary)
}

pub fn collect_reports(
    archive_dir: &Path,
    config: &ExtractConfig,
) -> Result<(Vec<TourReport>, Vec<PageFailure>)> {
    let pages = list_archive_pages(archive_dir)?;
    extract_pages(archive_dir, &pages, config)
}

pub fn list_archive_pages(archive_dir: &Path) -> Result<Vec<PathBuf>> {
    if !archive_dir.exists() {
        bail!("archive dir does not exist: {}", archive_dir.display());
    }

    let mut pages = Vec::new();
    for entry in WalkDir::new(archive_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_html = entry
            .path()
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));
        if is_html {
            pages.push(entry.path().to_path_buf());
        }
    }

    pages.sort();
    Ok(pages)
}

fn extract_pages(
    archive_dir: &Path,
    pages: &[PathBuf],
    config: &ExtractConfig,
) -> Result<(Vec<TourReport>, Vec<PageFailure>)> {
    let mut reports = Vec::new();
    let mut failed = Vec::new();

    for path in pages {
        let source = path
            .strip_prefix(archive_dir)
            .unwrap_or(path)
            .display()
            .to_string();
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read archived page {}", path.display()))?;
        let html = String::from_utf8_lossy(&bytes);

        match extract_report(&html, &source, config) {
            Ok(report) => {
                debug!(
                    source = %source,
                    waypoints = report.waypoints.as_ref().map_or(0, Vec::len),
                    peaks = report.peaks.len(),
                    "page parsed"
                );
                reports.push(report);
            }
            Err(err) => {
                let error = format!("{err:#}");
                warn!(source = %source, error = %error, "page failed; skipping");
                failed.push(PageFailure { source, error });
            }
        }
    }

    Ok((reports, failed))
}

pub fn validate_config(options: &ValidateOptions) -> Result<Vec<String>> {
    let config = load_config(options.config_path.as_deref())?;

    let origin = options
        .config_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in defaults".to_string());

    let mut messages = vec![format!("OK {origin}")];
    messages.push(format!("months: {}", config.locale.months.join(", ")));
    messages.push(format!("day words: {}", config.locale.day_words.join(", ")));
    for (field, label) in config.labels.named() {
        messages.push(format!("label {field}: {label}"));
    }
    for label in &config.labels.extra {
        messages.push(format!("extra label: {label}"));
    }
    messages.push(format!("icon base url: {}", config.page.icon_base_url));
    Ok(messages)
}
