use anyhow::{Context, Result, anyhow, bail};
use scraper::Selector;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "configs/hikr.toml";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ExtractConfig {
    #[serde(default)]
    pub locale: LocaleConfig,
    #[serde(default)]
    pub labels: LabelConfig,
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl ExtractConfig {
    pub fn validate(&self) -> Result<()> {
        if self.locale.months.len() != 12 {
            bail!(
                "locale.months must list 12 month names, got {}",
                self.locale.months.len()
            );
        }
        if let Some(pos) = self.locale.months.iter().position(|m| m.trim().is_empty()) {
            bail!("locale.months[{pos}] must not be empty");
        }
        if self.locale.day_words.iter().all(|w| w.trim().is_empty()) {
            bail!("locale.day_words must contain at least one word");
        }

        for (field, label) in self.labels.named() {
            if label.trim().is_empty() {
                bail!("labels.{field} must not be empty");
            }
        }
        if self.labels.extra.iter().any(|l| l.trim().is_empty()) {
            bail!("labels.extra must not contain empty labels");
        }
        self.labels.selector()?;

        if self.page.partner_marker.trim().is_empty() {
            bail!("page.partner_marker must not be empty");
        }
        if self.page.partner_container_class.trim().is_empty() {
            bail!("page.partner_container_class must not be empty");
        }
        Url::parse(&self.page.icon_base_url)
            .with_context(|| format!("invalid page.icon_base_url {}", self.page.icon_base_url))?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocaleConfig {
    #[serde(default = "default_months")]
    pub months: Vec<String>,
    #[serde(default = "default_day_words")]
    pub day_words: Vec<String>,
}

impl LocaleConfig {
    pub fn month_number(&self, name: &str) -> Option<u32> {
        let name = name.trim();
        self.months
            .iter()
            .position(|m| m.to_lowercase() == name.to_lowercase())
            .and_then(|idx| u32::try_from(idx + 1).ok())
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            months: default_months(),
            day_words: default_day_words(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelConfig {
    #[serde(default = "default_label_selector")]
    pub label_selector: String,
    #[serde(default = "default_tour_date_label")]
    pub tour_date: String,
    #[serde(default = "default_region_label")]
    pub region: String,
    #[serde(default = "default_waypoints_label")]
    pub waypoints: String,
    #[serde(default = "default_hiking_label")]
    pub hiking_difficulty: String,
    #[serde(default = "default_climbing_label")]
    pub climbing_difficulty: String,
    #[serde(default = "default_mountain_bike_label")]
    pub mountain_bike_difficulty: String,
    #[serde(default = "default_snowshoe_label")]
    pub snowshoe_difficulty: String,
    #[serde(default = "default_high_tour_label")]
    pub high_tour_difficulty: String,
    #[serde(default = "default_via_ferrata_label")]
    pub via_ferrata_difficulty: String,
    #[serde(default = "default_ski_label")]
    pub ski_difficulty: String,
    #[serde(default = "default_duration_label")]
    pub duration: String,
    #[serde(default = "default_ascent_label")]
    pub ascent: String,
    #[serde(default = "default_descent_label")]
    pub descent: String,
    #[serde(default = "default_extra_labels")]
    pub extra: Vec<String>,
}

impl LabelConfig {
    pub fn named(&self) -> [(&'static str, &str); 13] {
        [
            ("tour_date", self.tour_date.as_str()),
            ("region", self.region.as_str()),
            ("waypoints", self.waypoints.as_str()),
            ("hiking_difficulty", self.hiking_difficulty.as_str()),
            ("climbing_difficulty", self.climbing_difficulty.as_str()),
            ("mountain_bike_difficulty", self.mountain_bike_difficulty.as_str()),
            ("snowshoe_difficulty", self.snowshoe_difficulty.as_str()),
            ("high_tour_difficulty", self.high_tour_difficulty.as_str()),
            ("via_ferrata_difficulty", self.via_ferrata_difficulty.as_str()),
            ("ski_difficulty", self.ski_difficulty.as_str()),
            ("duration", self.duration.as_str()),
            ("ascent", self.ascent.as_str()),
            ("descent", self.descent.as_str()),
        ]
    }

    pub fn all_labels(&self) -> Vec<&str> {
        self.named()
            .into_iter()
            .map(|(_, label)| label)
            .chain(self.extra.iter().map(String::as_str))
            .collect()
    }

    pub fn selector(&self) -> Result<Selector> {
        Selector::parse(&self.label_selector)
            .map_err(|err| anyhow!("invalid labels.label_selector {}: {err:?}", self.label_selector))
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            label_selector: default_label_selector(),
            tour_date: default_tour_date_label(),
            region: default_region_label(),
            waypoints: default_waypoints_label(),
            hiking_difficulty: default_hiking_label(),
            climbing_difficulty: default_climbing_label(),
            mountain_bike_difficulty: default_mountain_bike_label(),
            snowshoe_difficulty: default_snowshoe_label(),
            high_tour_difficulty: default_high_tour_label(),
            via_ferrata_difficulty: default_via_ferrata_label(),
            ski_difficulty: default_ski_label(),
            duration: default_duration_label(),
            ascent: default_ascent_label(),
            descent: default_descent_label(),
            extra: default_extra_labels(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_icon_base_url")]
    pub icon_base_url: String,
    #[serde(default = "default_partner_container_class")]
    pub partner_container_class: String,
    #[serde(default = "default_partner_marker")]
    pub partner_marker: String,
    #[serde(default = "default_page_view_style")]
    pub page_view_style: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            icon_base_url: default_icon_base_url(),
            partner_container_class: default_partner_container_class(),
            partner_marker: default_partner_marker(),
            page_view_style: default_page_view_style(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u8,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            headers: BTreeMap::new(),
            timeout_secs: default_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            user_agent: None,
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<ExtractConfig> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ExtractConfig>(&text)
                .with_context(|| format!("failed to parse toml in {}", path.display()))?
        }
        None => ExtractConfig::default(),
    };

    config.validate().with_context(|| match path {
        Some(path) => format!("invalid config {}", path.display()),
        None => "invalid built-in config".to_string(),
    })?;
    Ok(config)
}

// An explicit `--config` always wins; the shipped file is only used when present.
pub fn resolve_config_path(explicit: Option<PathBuf>, default_path: &Path) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }
    if default_path.is_file() {
        return Some(default_path.to_path_buf());
    }
    debug!(path = %default_path.display(), "no config file; using built-in defaults");
    None
}

pub fn sanitize_for_path(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect::<String>()
        .trim_matches('-')
        .to_string()
}

fn default_months() -> Vec<String> {
    [
        "Januar",
        "Februar",
        "März",
        "April",
        "Mai",
        "Juni",
        "Juli",
        "August",
        "September",
        "Oktober",
        "November",
        "Dezember",
    ]
    .into_iter()
    .map(ToString::to_string)
    .collect()
}

fn default_day_words() -> Vec<String> {
    ["Tage", "Tag", "days", "day"]
        .into_iter()
        .map(ToString::to_string)
        .collect()
}

fn default_label_selector() -> String {
    "td, th, dt".to_string()
}

fn default_tour_date_label() -> String {
    "Tour Datum:".to_string()
}

fn default_region_label() -> String {
    "Region:".to_string()
}

fn default_waypoints_label() -> String {
    "Wegpunkte:".to_string()
}

fn default_hiking_label() -> String {
    "Wandern Schwierigkeit:".to_string()
}

fn default_climbing_label() -> String {
    "Klettern Schwierigkeit:".to_string()
}

fn default_mountain_bike_label() -> String {
    "Mountainbike Schwierigkeit:".to_string()
}

fn default_snowshoe_label() -> String {
    "Schneeshuhtouren Schwierigkeit:".to_string()
}

fn default_high_tour_label() -> String {
    "Hochtouren Schwierigkeit:".to_string()
}

fn default_via_ferrata_label() -> String {
    "Klettersteig Schwierigkeit:".to_string()
}

fn default_ski_label() -> String {
    "Ski Schwierigkeit:".to_string()
}

fn default_duration_label() -> String {
    "Zeitbedarf:".to_string()
}

fn default_ascent_label() -> String {
    "Aufstieg:".to_string()
}

fn default_descent_label() -> String {
    "Abstieg:".to_string()
}

fn default_extra_labels() -> Vec<String> {
    [
        "Strecke:",
        "Zufahrt zum Ausgangspunkt:",
        "Zufahrt zum Ankunftspunkt:",
        "Unterkunftmöglichkeiten:",
        "Kartennummer:",
        "Geo-Tags:",
    ]
    .into_iter()
    .map(ToString::to_string)
    .collect()
}

fn default_icon_base_url() -> String {
    "https://s.hikr.org/r4icons/".to_string()
}

fn default_partner_container_class() -> String {
    "div15".to_string()
}

fn default_partner_marker() -> String {
    "Tourengänger:".to_string()
}

fn default_page_view_style() -> String {
    "text-align:center;color:#666;font-size:0.814em".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_retry_attempts() -> u8 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}
