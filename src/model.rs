use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

const ICON_TABLE: [(&str, WaypointCategory); 13] = [
    ("ico2_point_s.png", WaypointCategory::Other),
    ("ico2_ruin_s.png", WaypointCategory::Ruin),
    ("ico2_cave_s.png", WaypointCategory::Cave),
    ("ico2_ort_s.png", WaypointCategory::Location),
    ("ico2_bridg_s.png", WaypointCategory::Bridge),
    ("ico2_pass_s.png", WaypointCategory::Pass),
    ("ico2_viafe_s.png", WaypointCategory::ViaFerrata),
    ("ico2_climb_s.png", WaypointCategory::Climb),
    ("ico2_wand_s.png", WaypointCategory::Wall),
    ("ico2_lake_s.png", WaypointCategory::Lake),
    ("ico2_peak_s.png", WaypointCategory::Peak),
    ("ico2_hut_s.png", WaypointCategory::Hut),
    ("ico2_eisfa_s.png", WaypointCategory::Icefall),
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WaypointCategory {
    Other,
    Ruin,
    Cave,
    Location,
    Bridge,
    Pass,
    ViaFerrata,
    Climb,
    Wall,
    Lake,
    Peak,
    Hut,
    Icefall,
    Unknown,
}

impl WaypointCategory {
    pub fn from_icon_url(icon_url: &str, icon_base_url: &str) -> Self {
        let Some(file_name) = icon_url.strip_prefix(icon_base_url) else {
            return WaypointCategory::Unknown;
        };

        ICON_TABLE
            .iter()
            .find(|(icon, _)| *icon == file_name)
            .map(|(_, category)| *category)
            .unwrap_or(WaypointCategory::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WaypointCategory::Other => "other",
            WaypointCategory::Ruin => "ruin",
            WaypointCategory::Cave => "cave",
            WaypointCategory::Location => "location",
            WaypointCategory::Bridge => "bridge",
            WaypointCategory::Pass => "pass",
            WaypointCategory::ViaFerrata => "via_ferrata",
            WaypointCategory::Climb => "climb",
            WaypointCategory::Wall => "wall",
            WaypointCategory::Lake => "lake",
            WaypointCategory::Peak => "peak",
            WaypointCategory::Hut => "hut",
            WaypointCategory::Icefall => "icefall",
            WaypointCategory::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Waypoint {
    pub image: Option<String>,
    pub name_raw: String,
    pub category: WaypointCategory,
    pub waypoint_url: Option<String>,
    pub height: Option<u32>,
    pub name: Option<String>,
    pub peak_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discipline {
    Hiking,
    Climbing,
    MountainBike,
    Snowshoe,
}

impl Discipline {
    pub fn grade_prefix(&self) -> &'static str {
        match self {
            Discipline::Hiking => "T",
            Discipline::Climbing => "K",
            Discipline::MountainBike => "S",
            Discipline::Snowshoe => "WT",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Discipline::Hiking => "hiking",
            Discipline::Climbing => "climbing",
            Discipline::MountainBike => "mountain_bike",
            Discipline::Snowshoe => "snowshoe",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GradedDifficulty {
    pub grade: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Peak {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub height: u32,
    pub id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TourPartner {
    pub name: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegionLevel {
    pub label: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Region {
    pub levels: Vec<RegionLevel>,
}

impl Region {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.levels
            .iter()
            .find(|level| level.label == label)
            .map(|level| level.name.as_str())
    }

    pub fn country(&self) -> Option<&str> {
        self.get("country")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TourDuration {
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
}

impl TourDuration {
    pub fn total_minutes(&self) -> u64 {
        u64::from(self.days) * 24 * 60 + u64::from(self.hours) * 60 + u64::from(self.minutes)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TourReport {
    pub source: String,
    pub report_id: Option<String>,
    pub tour_date: Option<NaiveDate>,
    pub region: Option<Region>,
    pub waypoints: Option<Vec<Waypoint>>,
    pub hiking_difficulty: Option<GradedDifficulty>,
    pub climbing_difficulty: Option<GradedDifficulty>,
    pub mountain_bike_difficulty: Option<GradedDifficulty>,
    pub snowshoe_difficulty: Option<GradedDifficulty>,
    pub high_tour_difficulty: Option<String>,
    pub via_ferrata_difficulty: Option<String>,
    pub ski_difficulty: Option<String>,
    pub duration: Option<TourDuration>,
    pub ascent: Option<u32>,
    pub descent: Option<u32>,
    pub extra: BTreeMap<String, String>,
    pub peaks: Vec<Peak>,
    pub tour_partners: Vec<TourPartner>,
    pub page_views: u64,
    pub photo_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageFailure {
    pub source: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct BatchSummary {
    pub pages_found: usize,
    pub parsed: usize,
    pub failed: Vec<PageFailure>,
    pub out_path: Option<PathBuf>,
}
