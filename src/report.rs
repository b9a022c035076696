use crate::config::{ExtractConfig, LabelConfig};
use crate::model::TourReport;
use crate::parser::{
    count_photos, element_text, parse_ascent, parse_climbing_difficulty, parse_descent,
    parse_duration, parse_high_tour_difficulty, parse_hiking_difficulty,
    parse_mountain_bike_difficulty, parse_page_views, parse_peak_map, parse_region,
    parse_ski_difficulty, parse_snowshoe_difficulty, parse_tour_date, parse_tour_partners,
    parse_via_ferrata_difficulty, parse_waypoints,
};
use anyhow::{Context, Result};
use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

pub fn field_fragments(document: &Html, labels: &LabelConfig) -> Result<BTreeMap<String, String>> {
    let selector = labels.selector()?;
    let wanted = labels.all_labels();

    let mut fragments = BTreeMap::new();
    for cell in document.select(&selector) {
        let text = element_text(cell);
        let Some(label) = wanted.iter().find(|label| label.trim() == text) else {
            continue;
        };
        if fragments.contains_key(*label) {
            continue;
        }

        let Some(value) = cell.next_siblings().find_map(ElementRef::wrap) else {
            debug!(label, "label cell has no value element");
            continue;
        };
        fragments.insert(label.to_string(), value.inner_html());
    }

    Ok(fragments)
}

pub fn fragment_text(fragment: &str) -> String {
    element_text(Html::parse_fragment(fragment).root_element())
}

/// Digits of the archived file name, e.g. `tour/post24156.html` → `24156`.
pub fn report_id_from_source(source: &str) -> Option<String> {
    let stem = Path::new(source).file_stem()?.to_str()?;
    let re = Regex::new(r"\d+").expect("report id regex must compile");
    re.find(stem).map(|m| m.as_str().to_string())
}

pub fn extract_report(html: &str, source: &str, config: &ExtractConfig) -> Result<TourReport> {
    let document = Html::parse_document(html);
    let fragments = field_fragments(&document, &config.labels)?;
    let labels = &config.labels;

    let fragment = |label: &str| fragments.get(label).map(String::as_str);
    let text = |label: &str| fragments.get(label).map(|f| fragment_text(f));
    let field = |label: &str| format!("failed to parse field {label}");

    let tour_date = parse_tour_date(text(&labels.tour_date).as_deref(), &config.locale)
        .with_context(|| field(&labels.tour_date))?;
    let region = parse_region(fragment(&labels.region));
    let waypoints = parse_waypoints(fragment(&labels.waypoints), &config.page.icon_base_url);

    let hiking_difficulty = parse_hiking_difficulty(fragment(&labels.hiking_difficulty))
        .with_context(|| field(&labels.hiking_difficulty))?;
    let climbing_difficulty = parse_climbing_difficulty(fragment(&labels.climbing_difficulty))
        .with_context(|| field(&labels.climbing_difficulty))?;
    let mountain_bike_difficulty =
        parse_mountain_bike_difficulty(fragment(&labels.mountain_bike_difficulty))
            .with_context(|| field(&labels.mountain_bike_difficulty))?;
    let snowshoe_difficulty = parse_snowshoe_difficulty(fragment(&labels.snowshoe_difficulty))
        .with_context(|| field(&labels.snowshoe_difficulty))?;
    let high_tour_difficulty = parse_high_tour_difficulty(fragment(&labels.high_tour_difficulty))
        .with_context(|| field(&labels.high_tour_difficulty))?;
    let via_ferrata_difficulty =
        parse_via_ferrata_difficulty(fragment(&labels.via_ferrata_difficulty))
            .with_context(|| field(&labels.via_ferrata_difficulty))?;
    let ski_difficulty = parse_ski_difficulty(fragment(&labels.ski_difficulty))
        .with_context(|| field(&labels.ski_difficulty))?;

    let duration = parse_duration(text(&labels.duration).as_deref(), &config.locale);
    let ascent =
        parse_ascent(text(&labels.ascent).as_deref()).with_context(|| field(&labels.ascent))?;
    let descent =
        parse_descent(text(&labels.descent).as_deref()).with_context(|| field(&labels.descent))?;

    let extra = labels
        .extra
        .iter()
        .filter_map(|label| {
            let value = text(label)?;
            let key = label.trim().trim_end_matches(':').trim().to_string();
            Some((key, value))
        })
        .collect::<BTreeMap<_, _>>();

    let page_views = parse_page_views(html, &config.page).context("failed to parse page views")?;

    Ok(TourReport {
        source: source.to_string(),
        report_id: report_id_from_source(source),
        tour_date,
        region,
        waypoints,
        hiking_difficulty,
        climbing_difficulty,
        mountain_bike_difficulty,
        snowshoe_difficulty,
        high_tour_difficulty,
        via_ferrata_difficulty,
        ski_difficulty,
        duration,
        ascent,
        descent,
        extra,
        peaks: parse_peak_map(html),
        tour_partners: parse_tour_partners(html, &config.page),
        page_views,
        photo_count: count_photos(html),
    })
}
