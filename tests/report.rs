use chrono::NaiveDate;

use propedge::report::{render_html, sort_scored, write_report};
use propedge::state::{
    GameDetail, GameOutcome, Market, PropLine, PropMetrics, ScoredProp,
};

fn scored(player: &str, score: f64, hit_rate: f64) -> ScoredProp {
    let hits = (hit_rate * 10.0).round() as usize;
    ScoredProp {
        prop: PropLine {
            event_id: "evt-1".to_string(),
            player: player.to_string(),
            market: Market::Points,
            line: 24.5,
            over_odds: -110,
            home_team: "Boston Celtics".to_string(),
            away_team: "Miami Heat".to_string(),
            bookmaker: "DraftKings".to_string(),
        },
        metrics: PropMetrics {
            hits,
            nears: 1,
            games: 10,
            hit_rate,
            near_rate: 0.1,
            avg_margin: 1.4,
            std_dev: 4.2,
            last5_avg_margin: 2.0,
            score,
        },
        details: vec![GameDetail {
            date: "JAN 10, 2026".to_string(),
            matchup: "BOS @ NYK".to_string(),
            minutes: 35.0,
            value: 30.0,
            margin: 5.5,
            outcome: GameOutcome::Hit,
        }],
    }
}

fn report_time() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 10)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

#[test]
fn props_sort_descending_by_score() {
    let mut props = vec![
        scored("Low", 40.0, 0.4),
        scored("High", 70.0, 0.7),
        scored("Mid", 55.0, 0.5),
    ];
    sort_scored(&mut props);
    let order: Vec<&str> = props.iter().map(|p| p.prop.player.as_str()).collect();
    assert_eq!(order, ["High", "Mid", "Low"]);
    assert!(
        props
            .windows(2)
            .all(|w| w[0].metrics.score >= w[1].metrics.score)
    );
}

#[test]
fn ties_break_by_hit_rate_then_player_name() {
    let mut props = vec![
        scored("Zeke", 55.0, 0.5),
        scored("Abel", 55.0, 0.5),
        scored("Cade", 55.0, 0.7),
    ];
    sort_scored(&mut props);
    let order: Vec<&str> = props.iter().map(|p| p.prop.player.as_str()).collect();
    // Higher hit rate first, then alphabetical.
    assert_eq!(order, ["Cade", "Abel", "Zeke"]);
}

#[test]
fn sorting_identical_input_twice_is_stable() {
    let build = || {
        vec![
            scored("Zeke", 55.0, 0.5),
            scored("Abel", 55.0, 0.5),
            scored("High", 70.0, 0.7),
        ]
    };
    let mut a = build();
    let mut b = build();
    sort_scored(&mut a);
    sort_scored(&mut b);
    assert_eq!(a, b);
}

#[test]
fn report_contains_all_metrics_and_details() {
    let mut props = vec![scored("Jayson Tatum", 61.2, 0.6)];
    sort_scored(&mut props);
    let html = render_html(&props, report_time());
    assert!(html.contains("Jayson Tatum"));
    assert!(html.contains("Miami Heat @ Boston Celtics"));
    assert!(html.contains("6/10")); // k/N display pair
    assert!(html.contains("61.2"));
    assert!(html.contains("BOS @ NYK")); // per-game detail row
    assert!(html.contains("HIT"));
    assert!(html.contains("1 top picks"));
}

#[test]
fn empty_run_still_renders_a_valid_document() {
    let html = render_html(&[], report_time());
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("No props scored"));
    assert!(html.ends_with("</html>\n"));
}

#[test]
fn report_file_is_named_with_the_run_timestamp() {
    let dir = std::env::temp_dir().join("propedge_report_test");
    std::fs::create_dir_all(&dir).expect("temp dir");
    let path = write_report(&dir, &[], report_time()).expect("report should write");
    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("propedge_20260110_093000.html")
    );
    let body = std::fs::read_to_string(&path).expect("report should be readable");
    assert!(body.contains("PropEdge"));
    std::fs::remove_file(path).ok();
}
