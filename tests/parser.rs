use anyhow::Result;
use chrono::NaiveDate;
use hikr_report::config::{LocaleConfig, PageConfig};
use hikr_report::model::{Discipline, TourDuration, WaypointCategory};
use hikr_report::parser::{
    count_photos, parse_ascent, parse_climbing_difficulty, parse_descent, parse_duration,
    parse_graded_difficulty, parse_high_tour_difficulty, parse_hiking_difficulty,
    parse_mountain_bike_difficulty, parse_page_views, parse_peak_map, parse_region,
    parse_ski_difficulty, parse_snowshoe_difficulty, parse_tour_date, parse_tour_partners,
    parse_via_ferrata_difficulty, parse_waypoints, user_id_from_profile_url,
};

const ICON_BASE: &str = "https://s.hikr.org/r4icons/";

#[test]
fn hiking_difficulty_splits_grade_and_description() -> Result<()> {
    let parsed = parse_hiking_difficulty(Some(r#"<a href="/d/">T3+ - steep alpine terrain</a>"#))?
        .expect("grade must match");

    assert_eq!(parsed.grade, "T3+");
    assert_eq!(parsed.description, "steep alpine terrain");
    Ok(())
}

#[test]
fn each_discipline_uses_its_own_grade_prefix() -> Result<()> {
    let climbing = parse_climbing_difficulty(Some("<a>K4- - schwierig</a>"))?.expect("K grade");
    assert_eq!(climbing.grade, "K4-");

    let bike = parse_mountain_bike_difficulty(Some("<a>S2 - mittel</a>"))?.expect("S grade");
    assert_eq!(bike.grade, "S2");
    assert_eq!(bike.description, "mittel");

    let snowshoe = parse_snowshoe_difficulty(Some("<a>WT3 - anspruchsvoll</a>"))?.expect("WT");
    assert_eq!(snowshoe.grade, "WT3");
    assert_eq!(snowshoe.description, "anspruchsvoll");

    assert!(parse_climbing_difficulty(Some("<a>T3 - wandern</a>"))?.is_none());
    Ok(())
}

#[test]
fn graded_difficulty_without_grade_shape_is_absent() -> Result<()> {
    assert!(parse_hiking_difficulty(Some("<a>leicht</a>"))?.is_none());
    Ok(())
}

#[test]
fn difficulty_fragments_need_exactly_one_link() {
    let none = "<span>T3 - no link</span>";
    let two = "<a>T2 - a</a><a>T3 - b</a>";

    for discipline in [
        Discipline::Hiking,
        Discipline::Climbing,
        Discipline::MountainBike,
        Discipline::Snowshoe,
    ] {
        assert!(parse_graded_difficulty(Some(none), discipline).is_err());
        assert!(parse_graded_difficulty(Some(two), discipline).is_err());
    }

    assert!(parse_high_tour_difficulty(Some(two)).is_err());
    assert!(parse_via_ferrata_difficulty(Some(none)).is_err());
    assert!(parse_ski_difficulty(Some(two)).is_err());
}

#[test]
fn verbatim_difficulties_return_trimmed_link_text() -> Result<()> {
    assert_eq!(
        parse_high_tour_difficulty(Some("<a>  ZS- </a>"))?.as_deref(),
        Some("ZS-")
    );
    assert_eq!(
        parse_via_ferrata_difficulty(Some(r#"<a href="/k/">K4 - schwierig</a>"#))?.as_deref(),
        Some("K4 - schwierig")
    );
    assert_eq!(parse_ski_difficulty(Some("<a>WS+</a>"))?.as_deref(), Some("WS+"));
    Ok(())
}

#[test]
fn absent_input_is_absent_everywhere() -> Result<()> {
    let locale = LocaleConfig::default();

    assert!(parse_tour_date(None, &locale)?.is_none());
    assert!(parse_duration(None, &locale).is_none());
    assert!(parse_ascent(None)?.is_none());
    assert!(parse_descent(None)?.is_none());
    assert!(parse_hiking_difficulty(None)?.is_none());
    assert!(parse_climbing_difficulty(None)?.is_none());
    assert!(parse_mountain_bike_difficulty(None)?.is_none());
    assert!(parse_snowshoe_difficulty(None)?.is_none());
    assert!(parse_high_tour_difficulty(None)?.is_none());
    assert!(parse_via_ferrata_difficulty(None)?.is_none());
    assert!(parse_ski_difficulty(None)?.is_none());
    assert!(parse_region(None).is_none());
    assert!(parse_waypoints(None, ICON_BASE).is_none());
    Ok(())
}

#[test]
fn duration_reads_days_and_clock_time() {
    let locale = LocaleConfig::default();

    assert_eq!(
        parse_duration(Some("2 Tage 5:30"), &locale),
        Some(TourDuration {
            days: 2,
            hours: 5,
            minutes: 30
        })
    );
    assert_eq!(
        parse_duration(Some("3:15"), &locale),
        Some(TourDuration {
            days: 0,
            hours: 3,
            minutes: 15
        })
    );
    assert_eq!(
        parse_duration(Some("1 Tag"), &locale),
        Some(TourDuration {
            days: 1,
            hours: 0,
            minutes: 0
        })
    );
    assert_eq!(parse_duration(Some("keine Angabe"), &locale), None);
    assert_eq!(
        parse_duration(Some("ca. 4:30 h"), &locale),
        Some(TourDuration {
            days: 0,
            hours: 4,
            minutes: 30
        })
    );
}

#[test]
fn duration_with_unrecognised_shape_is_absent() {
    let locale = LocaleConfig::default();

    assert_eq!(parse_duration(Some("5 Std"), &locale), None);
    assert_eq!(parse_duration(Some("100:30"), &locale), None);
    assert_eq!(parse_duration(Some("2 Tage 5:305"), &locale), None);
    assert_eq!(parse_duration(Some("99999999999 Tage"), &locale), None);
}

#[test]
fn duration_total_minutes() {
    let duration = TourDuration {
        days: 1,
        hours: 2,
        minutes: 5,
    };
    assert_eq!(duration.total_minutes(), 24 * 60 + 125);
}

#[test]
fn tour_date_uses_locale_month_names() -> Result<()> {
    let german = LocaleConfig::default();
    assert_eq!(
        parse_tour_date(Some("12 März 2023"), &german)?,
        NaiveDate::from_ymd_opt(2023, 3, 12)
    );
    assert_eq!(
        parse_tour_date(Some("1 dezember 2019"), &german)?,
        NaiveDate::from_ymd_opt(2019, 12, 1)
    );

    let english = LocaleConfig {
        months: [
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ]
        .into_iter()
        .map(ToString::to_string)
        .collect(),
        ..LocaleConfig::default()
    };
    assert_eq!(
        parse_tour_date(Some("3 March 2021"), &english)?,
        NaiveDate::from_ymd_opt(2021, 3, 3)
    );
    assert!(parse_tour_date(Some("3 März 2021"), &english).is_err());
    Ok(())
}

#[test]
fn malformed_tour_dates_fail() {
    let locale = LocaleConfig::default();
    assert!(parse_tour_date(Some("2023-03-12"), &locale).is_err());
    assert!(parse_tour_date(Some("12 Mars 2023"), &locale).is_err());
    assert!(parse_tour_date(Some("31 Februar 2023"), &locale).is_err());
}

#[test]
fn ascent_takes_leading_integer() -> Result<()> {
    assert_eq!(parse_ascent(Some("1200 m"))?, Some(1200));
    assert_eq!(parse_descent(Some("850 m"))?, Some(850));
    assert!(parse_ascent(Some("1'200 m")).is_err());
    assert!(parse_descent(Some("ca. 800 m")).is_err());
    Ok(())
}

#[test]
fn photos_are_counted_by_marker() {
    let body = "a photo_id:1 b photo_id:22 c photo_id: d photo_id:333";
    assert_eq!(count_photos(body), 3);
    assert_eq!(count_photos("<html></html>"), 0);
}

#[test]
fn region_labels_country_at_second_position() {
    let region = parse_region(Some(
        r#"<a href="/1/">Welt</a> &raquo; <a href="/2/"> Schweiz </a> &raquo; <a href="/3/">Graubünden</a>"#,
    ))
    .expect("region present");

    let labels = region
        .levels
        .iter()
        .map(|l| (l.label.as_str(), l.name.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        labels,
        vec![
            ("region_0_content", "Welt"),
            ("country", "Schweiz"),
            ("region_2_content", "Graubünden"),
        ]
    );
    assert_eq!(region.country(), Some("Schweiz"));
}

#[test]
fn short_region_trail_has_no_country() {
    let region = parse_region(Some("<a>Welt</a>")).expect("region present");
    assert_eq!(region.levels.len(), 1);
    assert_eq!(region.country(), None);
}

#[test]
fn waypoints_skip_classed_entries() {
    let fragment = r#"
        <ul>
          <li><img src="https://s.hikr.org/r4icons/ico2_peak_s.png"> <a href="https://www.hikr.org/peak/12345.html">Matterhorn 4478 m</a></li>
          <li class="sub"><img src="https://s.hikr.org/r4icons/ico2_hut_s.png"> <a href="https://www.hikr.org/hut/9.html">Solvay 4003 m</a></li>
        </ul>"#;

    let waypoints = parse_waypoints(Some(fragment), ICON_BASE).expect("waypoints present");
    assert_eq!(waypoints.len(), 1);

    let matterhorn = &waypoints[0];
    assert_eq!(matterhorn.name.as_deref(), Some("Matterhorn"));
    assert_eq!(matterhorn.height, Some(4478));
    assert_eq!(matterhorn.peak_id.as_deref(), Some("12345"));
    assert_eq!(matterhorn.name_raw, "Matterhorn 4478 m");
    assert_eq!(matterhorn.category, WaypointCategory::Peak);
    assert_eq!(
        matterhorn.waypoint_url.as_deref(),
        Some("https://www.hikr.org/peak/12345.html")
    );
}

#[test]
fn waypoint_raw_name_keeps_inner_spacing() {
    let fragment = r#"<ul><li><img src="https://s.hikr.org/r4icons/ico2_peak_s.png"><a href="/peak/77/">  Piz   Bernina  4048 m </a></li></ul>"#;

    let waypoints = parse_waypoints(Some(fragment), ICON_BASE).expect("waypoints present");
    assert_eq!(waypoints[0].name_raw, "Piz   Bernina  4048 m");
    assert_eq!(waypoints[0].name.as_deref(), Some("Piz   Bernina"));
    assert_eq!(waypoints[0].height, Some(4048));
}

#[test]
fn waypoint_without_height_has_neither_name_nor_height() {
    let fragment = r#"<ul><li><img src="https://s.hikr.org/r4icons/ico2_lake_s.png"><a href="/dir/See_42/">Lago Bianco</a></li></ul>"#;

    let waypoints = parse_waypoints(Some(fragment), ICON_BASE).expect("waypoints present");
    assert_eq!(waypoints.len(), 1);
    assert_eq!(waypoints[0].name, None);
    assert_eq!(waypoints[0].height, None);
    assert_eq!(waypoints[0].category, WaypointCategory::Lake);
    assert_eq!(waypoints[0].peak_id.as_deref(), Some("42"));
}

#[test]
fn unknown_or_missing_icons_map_to_unknown() {
    let fragment = r#"<ul>
        <li><img src="https://s.hikr.org/r4icons/ico2_ufo_s.png"><a href="/x/1/">Irgendwo 100 m</a></li>
        <li><a href="/x/2/">Ohne Bild 200 m</a></li>
    </ul>"#;

    let waypoints = parse_waypoints(Some(fragment), ICON_BASE).expect("waypoints present");
    assert_eq!(waypoints.len(), 2);
    assert!(
        waypoints
            .iter()
            .all(|w| w.category == WaypointCategory::Unknown)
    );
    assert_eq!(waypoints[1].image, None);
}

#[test]
fn waypoint_list_without_entries_is_empty() {
    let waypoints = parse_waypoints(Some("<ul></ul>"), ICON_BASE).expect("waypoints present");
    assert!(waypoints.is_empty());
}

#[test]
fn icon_lookup_covers_every_category() {
    let table = [
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
    for (icon, expected) in table {
        let url = format!("{ICON_BASE}{icon}");
        assert_eq!(WaypointCategory::from_icon_url(&url, ICON_BASE), expected);
    }

    assert_eq!(
        WaypointCategory::from_icon_url("https://example.org/ico2_peak_s.png", ICON_BASE),
        WaypointCategory::Unknown
    );
    assert_eq!(WaypointCategory::ViaFerrata.as_str(), "via_ferrata");
}

#[test]
fn peak_map_reads_pushed_records() {
    let body = r#"<script>pizs.push({piz_lat:45.9,piz_lon:7.6,piz_name:"Matterhorn",piz_height:4478,piz_id:12345})</script>"#;

    let peaks = parse_peak_map(body);
    assert_eq!(peaks.len(), 1);
    assert_eq!(peaks[0].latitude, 45.9);
    assert_eq!(peaks[0].longitude, 7.6);
    assert_eq!(peaks[0].name, "Matterhorn");
    assert_eq!(peaks[0].height, 4478);
    assert_eq!(peaks[0].id, 12345);
}

#[test]
fn peak_map_spans_lines_and_records() {
    let body = r#"
        pizs.push({
          piz_lat:46.4,
          piz_lon:9.9,
          piz_name:"Piz Bernina",
          piz_height:4048,
          piz_id:1
        });
        pizs.push({piz_lat:46.5,piz_lon:9.8,piz_name:"Piz Palü",piz_height:3900,piz_id:2});
    "#;

    let peaks = parse_peak_map(body);
    let names = peaks.iter().map(|p| p.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["Piz Bernina", "Piz Palü"]);
}

#[test]
fn peak_map_without_records_is_empty() {
    assert!(parse_peak_map("<html><body>nothing</body></html>").is_empty());
    assert!(parse_peak_map("pizs.push({lat:1})").is_empty());
}

#[test]
fn peak_map_skips_unconvertible_records() {
    let body = r#"<script>
        pizs.push({piz_lat:45.9.1,piz_lon:7.65,piz_name:"Kaputt",piz_height:4000,piz_id:1});
        pizs.push({piz_lat:45.97,piz_lon:7.66,piz_name:"Matterhorn",piz_height:4478,piz_id:12345});
    </script>"#;

    let peaks = parse_peak_map(body);
    assert_eq!(peaks.len(), 1);
    assert_eq!(peaks[0].name, "Matterhorn");
    assert_eq!(peaks[0].id, 12345);
}

#[test]
fn tour_partners_come_from_marked_block() {
    let body = r#"<html><body>
        <div class="div15 small"><b>Tourengänger:</b>
          <a href="https://www.hikr.org/user/Bergfex/">Bergfex</a>,
          <a href="https://www.hikr.org/user/Alpendohle/">Alpendohle</a>
        </div>
        <div class="div15"><b>Kommentare:</b> <a href="https://www.hikr.org/user/Leser/">Leser</a></div>
    </body></html>"#;

    let partners = parse_tour_partners(body, &PageConfig::default());
    let pairs = partners
        .iter()
        .map(|p| (p.name.as_str(), p.user_id.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        pairs,
        vec![("Bergfex", "Bergfex"), ("Alpendohle", "Alpendohle")]
    );
}

#[test]
fn tour_partners_missing_block_is_empty() {
    let body = r#"<html><body><div class="div15"><b>Kommentare:</b></div></body></html>"#;
    assert!(parse_tour_partners(body, &PageConfig::default()).is_empty());
}

#[test]
fn profile_url_user_segment() {
    assert_eq!(
        user_id_from_profile_url("https://www.hikr.org/user/Bergfex/").as_deref(),
        Some("Bergfex")
    );
    assert_eq!(user_id_from_profile_url("Bergfex"), None);
}

#[test]
fn page_views_read_bold_counter() -> Result<()> {
    let body = r#"<div style="text-align:center;color:#666;font-size:0.814em">Seitenaufrufe: <b>1523</b></div>"#;
    assert_eq!(parse_page_views(body, &PageConfig::default())?, 1523);
    Ok(())
}

#[test]
fn page_views_without_counter_fail() {
    let page = PageConfig::default();
    assert!(parse_page_views("<div>no counter</div>", &page).is_err());
    assert!(
        parse_page_views(
            r#"<div style="text-align:center;color:#666;font-size:0.814em">no bold</div>"#,
            &page
        )
        .is_err()
    );
}

#[test]
fn parsers_are_repeatable() -> Result<()> {
    let locale = LocaleConfig::default();
    let fragment = r#"<ul><li><img src="https://s.hikr.org/r4icons/ico2_pass_s.png"><a href="/p/7/">Flüelapass 2383 m</a></li></ul>"#;

    assert_eq!(
        parse_waypoints(Some(fragment), ICON_BASE),
        parse_waypoints(Some(fragment), ICON_BASE)
    );
    assert_eq!(
        parse_duration(Some("4:45"), &locale),
        parse_duration(Some("4:45"), &locale)
    );
    assert_eq!(
        parse_hiking_difficulty(Some("<a>T4 - Alpinwandern</a>"))?,
        parse_hiking_difficulty(Some("<a>T4 - Alpinwandern</a>"))?
    );
    Ok(())
}
