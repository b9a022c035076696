use crate::model::TourReport;
use anyhow::{Context, Result};
use std::path::Path;

pub fn load_reports(path: &Path) -> Result<Vec<TourReport>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read reports file {}", path.display()))?;
    let reports = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse reports file {}", path.display()))?;
    Ok(reports)
}

pub fn save_reports(path: &Path, reports: &[TourReport]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {}", parent.display()))?;
    }

    let serialized = serde_json::to_string_pretty(reports)?;
    std::fs::write(path, serialized)
        .with_context(|| format!("failed to write reports file {}", path.display()))?;
    Ok(())
}
