use crate::config::{LocaleConfig, PageConfig};
use crate::model::{
    Discipline, GradedDifficulty, Peak, Region, RegionLevel, TourDuration, TourPartner, Waypoint,
    WaypointCategory,
};
use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

const PEAK_MARKER: &str = "pizs.push";

pub fn parse_tour_date(raw: Option<&str>, locale: &LocaleConfig) -> Result<Option<NaiveDate>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let re = Regex::new(r"^\s*(\d{1,2})\s+(\S+)\s+(\d{4})\s*$")
        .expect("tour date regex must compile");
    let caps = re
        .captures(raw)
        .with_context(|| format!("tour date {raw:?} does not read \"<day> <month> <year>\""))?;

    let day = caps[1]
        .parse::<u32>()
        .with_context(|| format!("invalid day in tour date {raw:?}"))?;
    let month = locale
        .month_number(&caps[2])
        .with_context(|| format!("unknown month name {:?} in tour date {raw:?}", &caps[2]))?;
    let year = caps[3]
        .parse::<i32>()
        .with_context(|| format!("invalid year in tour date {raw:?}"))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .map(Some)
        .with_context(|| format!("tour date {raw:?} is not a calendar date"))
}

/// `"[<days> <day word>] [H:MM]"`; text without any digit is absent.
pub fn parse_duration(raw: Option<&str>, locale: &LocaleConfig) -> Option<TourDuration> {
    let raw = raw?;
    if !raw.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let mut day_words = locale
        .day_words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>();
    // "Tage" must be tried before "Tag".
    day_words.sort_by_key(|w| std::cmp::Reverse(w.len()));
    let day_words = day_words
        .into_iter()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");

    let pattern = format!(r"(?i)(?:(\d+)\s*(?:{day_words})\b\s*)?(?:(\d{{1,2}}):(\d{{2}}))?");
    let re = Regex::new(&pattern).ok()?;

    let preceded_by_digit =
        |at: usize| raw[..at].chars().next_back().is_some_and(|c| c.is_ascii_digit());
    let followed_by_digit =
        |at: usize| raw[at..].chars().next().is_some_and(|c| c.is_ascii_digit());

    // Both digit groups must stand on their own: "100:30" is not "00:30".
    let Some(caps) = re.captures_iter(raw).find(|caps| {
        let matched = caps.get(1).is_some() || caps.get(2).is_some();
        let start = caps.get(0).map_or(0, |m| m.start());
        let clock_end_clear = caps.get(3).is_none_or(|m| !followed_by_digit(m.end()));
        matched && !preceded_by_digit(start) && clock_end_clear
    }) else {
        warn!(duration = %raw, "duration text does not match \"<days> <day word> H:MM\"");
        return None;
    };

    let number = |idx: usize| caps.get(idx).map_or(Ok(0), |m| m.as_str().parse::<u32>());
    match (number(1), number(2), number(3)) {
        (Ok(days), Ok(hours), Ok(minutes)) => Some(TourDuration {
            days,
            hours,
            minutes,
        }),
        _ => {
            warn!(duration = %raw, "duration number out of range");
            None
        }
    }
}

pub fn parse_ascent(raw: Option<&str>) -> Result<Option<u32>> {
    parse_elevation_meters(raw).context("failed to parse ascent")
}

pub fn parse_descent(raw: Option<&str>) -> Result<Option<u32>> {
    parse_elevation_meters(raw).context("failed to parse descent")
}

/// Reads the integer before the first space, e.g. `"1200 m"`. Thousands separators are rejected.
pub fn parse_elevation_meters(raw: Option<&str>) -> Result<Option<u32>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let token = raw.trim().split(' ').next().unwrap_or_default().trim();
    let meters = token
        .parse::<u32>()
        .with_context(|| format!("{raw:?} does not start with an integer meter count"))?;
    Ok(Some(meters))
}

pub fn count_photos(body: &str) -> usize {
    let re = Regex::new(r"photo_id:(\d+)").expect("photo id regex must compile");
    re.find_iter(body).count()
}

pub fn parse_hiking_difficulty(raw: Option<&str>) -> Result<Option<GradedDifficulty>> {
    parse_graded_difficulty(raw, Discipline::Hiking)
}

pub fn parse_climbing_difficulty(raw: Option<&str>) -> Result<Option<GradedDifficulty>> {
    parse_graded_difficulty(raw, Discipline::Climbing)
}

pub fn parse_mountain_bike_difficulty(raw: Option<&str>) -> Result<Option<GradedDifficulty>> {
    parse_graded_difficulty(raw, Discipline::MountainBike)
}

pub fn parse_snowshoe_difficulty(raw: Option<&str>) -> Result<Option<GradedDifficulty>> {
    parse_graded_difficulty(raw, Discipline::Snowshoe)
}

pub fn parse_graded_difficulty(
    raw: Option<&str>,
    discipline: Discipline,
) -> Result<Option<GradedDifficulty>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let text = single_link_text(raw, discipline.as_str())?;
    let pattern = format!(
        r"({}\d[+-]?)\s*-\s*(.*)",
        regex::escape(discipline.grade_prefix())
    );
    let re = Regex::new(&pattern).with_context(|| format!("invalid grade pattern {pattern}"))?;

    let Some(caps) = re.captures(&text) else {
        debug!(
            discipline = discipline.as_str(),
            text = %text,
            "difficulty link does not read \"<grade> - <description>\""
        );
        return Ok(None);
    };

    Ok(Some(GradedDifficulty {
        grade: caps[1].to_string(),
        description: caps[2].trim().to_string(),
    }))
}

pub fn parse_high_tour_difficulty(raw: Option<&str>) -> Result<Option<String>> {
    raw.map(|raw| single_link_text(raw, "high_tour")).transpose()
}

pub fn parse_via_ferrata_difficulty(raw: Option<&str>) -> Result<Option<String>> {
    raw.map(|raw| single_link_text(raw, "via_ferrata")).transpose()
}

pub fn parse_ski_difficulty(raw: Option<&str>) -> Result<Option<String>> {
    raw.map(|raw| single_link_text(raw, "ski")).transpose()
}

fn single_link_text(fragment: &str, field: &str) -> Result<String> {
    let document = Html::parse_fragment(fragment);
    let links = document.select(&link_selector()).collect::<Vec<_>>();
    if links.len() != 1 {
        bail!(
            "{field} difficulty must contain exactly one link, found {}",
            links.len()
        );
    }
    Ok(element_text(links[0]))
}

pub fn parse_region(raw: Option<&str>) -> Option<Region> {
    let raw = raw?;
    let document = Html::parse_fragment(raw);

    let levels = document
        .select(&link_selector())
        .enumerate()
        .map(|(idx, link)| RegionLevel {
            label: if idx == 1 {
                "country".to_string()
            } else {
                format!("region_{idx}_content")
            },
            name: element_text(link),
        })
        .collect::<Vec<_>>();

    if levels.len() < 2 {
        debug!(links = levels.len(), "region trail has no country level");
    }

    Some(Region { levels })
}

pub fn parse_waypoints(raw: Option<&str>, icon_base_url: &str) -> Option<Vec<Waypoint>> {
    let raw = raw?;
    let document = Html::parse_fragment(raw);

    let item_selector =
        Selector::parse("li:not([class])").expect("waypoint item selector must parse");
    let image_selector = Selector::parse("img").expect("image selector must parse");
    let name_height = Regex::new(r"(.*?)\s+(\d+)\s+m").expect("waypoint name regex must compile");
    let digits = Regex::new(r"\d+").expect("digits regex must compile");

    let mut out = Vec::new();
    for item in document.select(&item_selector) {
        let Some(link) = item.select(&link_selector()).next() else {
            warn!(item = %element_text(item), "waypoint entry without link; skipping");
            continue;
        };

        let name_raw = link.text().collect::<String>().trim().to_string();
        let image = item
            .select(&image_selector)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(ToString::to_string);
        let waypoint_url = link.value().attr("href").map(ToString::to_string);
        let peak_id = waypoint_url
            .as_deref()
            .and_then(|href| digits.find(href))
            .map(|m| m.as_str().to_string());

        let (name, height) = name_height
            .captures(&name_raw)
            .and_then(|caps| {
                let height = caps[2].parse::<u32>().ok()?;
                Some((Some(caps[1].trim().to_string()), Some(height)))
            })
            .unwrap_or((None, None));

        let category = match image.as_deref() {
            Some(src) => {
                let category = WaypointCategory::from_icon_url(src, icon_base_url);
                if category == WaypointCategory::Unknown {
                    warn!(icon = %src, waypoint = %name_raw, "unknown waypoint icon");
                }
                category
            }
            None => {
                warn!(waypoint = %name_raw, "image not found for waypoint");
                WaypointCategory::Unknown
            }
        };

        out.push(Waypoint {
            image,
            name_raw,
            category,
            waypoint_url,
            height,
            name,
            peak_id,
        });
    }

    Some(out)
}

/// One record per `pizs.push({piz_lat:46.1,piz_lon:7.6,piz_name:"Name",piz_height:4478,piz_id:123})`.
pub fn parse_peak_map(body: &str) -> Vec<Peak> {
    let re = Regex::new(
        r#"(?s)pizs\.push\(\{.*?piz_lat:(-?[\d.]+),.*?piz_lon:(-?[\d.]+),.*?piz_name:"(.*?)",.*?piz_height:(\d+),.*?piz_id:(\d+).*?\}\)"#,
    )
    .expect("peak map regex must compile");

    let mut peaks = Vec::new();
    for caps in re.captures_iter(body) {
        match peak_from_fields(&caps[1], &caps[2], &caps[3], &caps[4], &caps[5]) {
            Ok(peak) => peaks.push(peak),
            Err(err) => warn!(error = %err, "skipping malformed peak record"),
        }
    }

    if peaks.is_empty() {
        if body.contains(PEAK_MARKER) {
            warn!("page contains peak map records but none matched the expected format");
        } else {
            debug!("page has no peak map");
        }
    }

    peaks
}

fn peak_from_fields(lat: &str, lon: &str, name: &str, height: &str, id: &str) -> Result<Peak> {
    Ok(Peak {
        latitude: lat
            .parse()
            .with_context(|| format!("invalid latitude {lat:?}"))?,
        longitude: lon
            .parse()
            .with_context(|| format!("invalid longitude {lon:?}"))?,
        name: name.to_string(),
        height: height
            .parse()
            .with_context(|| format!("invalid height {height:?}"))?,
        id: id.parse().with_context(|| format!("invalid peak id {id:?}"))?,
    })
}

pub fn parse_tour_partners(body: &str, page: &PageConfig) -> Vec<TourPartner> {
    let document = Html::parse_document(body);
    let div_selector = Selector::parse("div").expect("div selector must parse");
    let bold_selector = Selector::parse("b").expect("bold selector must parse");

    // Nested matches are possible; the innermost one comes last in document order.
    let container = document
        .select(&div_selector)
        .filter(|div| {
            div.value()
                .attr("class")
                .is_some_and(|class| class.contains(&page.partner_container_class))
        })
        .filter(|div| {
            div.select(&bold_selector)
                .any(|b| element_text(b).contains(&page.partner_marker))
        })
        .last();

    let Some(container) = container else {
        debug!(marker = %page.partner_marker, "no tour partner block");
        return Vec::new();
    };

    container
        .select(&link_selector())
        .filter_map(|link| {
            let href = link.value().attr("href")?;
            let Some(user_id) = user_id_from_profile_url(href) else {
                warn!(href, "tour partner link has no user segment");
                return None;
            };
            Some(TourPartner {
                name: element_text(link),
                user_id,
            })
        })
        .collect()
}

/// Second-to-last `/` segment, e.g. `https://www.hikr.org/user/Bergfex/` → `Bergfex`.
pub fn user_id_from_profile_url(href: &str) -> Option<String> {
    let segments = href.split('/').collect::<Vec<_>>();
    if segments.len() < 2 {
        return None;
    }
    let user_id = segments[segments.len() - 2].trim();
    if user_id.is_empty() {
        return None;
    }
    Some(user_id.to_string())
}

pub fn parse_page_views(body: &str, page: &PageConfig) -> Result<u64> {
    let document = Html::parse_document(body);
    let css = format!(r#"div[style="{}"]"#, page.page_view_style);
    let counter_selector =
        Selector::parse(&css).map_err(|err| anyhow!("invalid page view selector {css}: {err:?}"))?;
    let bold_selector = Selector::parse("b").expect("bold selector must parse");

    let counter = document
        .select(&counter_selector)
        .next()
        .context("page view counter not found")?;
    let count = counter
        .select(&bold_selector)
        .next()
        .context("page view counter has no bold count")?;

    let text = element_text(count);
    text.parse::<u64>()
        .with_context(|| format!("page view count {text:?} is not an integer"))
}

pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn link_selector() -> Selector {
    Selector::parse("a").expect("link selector must parse")
}
