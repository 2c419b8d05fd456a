use std::collections::HashMap;

use propedge::join::join_props;
use propedge::state::{GameLog, Market, PropLine};

fn log(date: &str, points: f64) -> GameLog {
    GameLog {
        date: date.to_string(),
        matchup: "MEM vs. DAL".to_string(),
        minutes: 32.0,
        points,
        rebounds: 6.0,
        assists: 3.0,
        steals: 1.0,
        blocks: 2.0,
    }
}

fn history(n: usize) -> Vec<GameLog> {
    (0..n)
        .map(|i| log(&format!("JAN {:02}, 2026", 20 - i), 20.0 + i as f64))
        .collect()
}

fn prop(player: &str) -> PropLine {
    PropLine {
        event_id: "evt-1".to_string(),
        player: player.to_string(),
        market: Market::Points,
        line: 19.5,
        over_odds: -110,
        home_team: "Memphis Grizzlies".to_string(),
        away_team: "Dallas Mavericks".to_string(),
        bookmaker: "FanDuel".to_string(),
    }
}

#[test]
fn resolvable_props_are_joined_with_their_history() {
    let logs: HashMap<String, Vec<GameLog>> =
        HashMap::from([("Jaren Jackson Jr.".to_string(), history(8))]);
    let joined = join_props(&[prop("Jaren Jackson")], &logs, 5);
    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0].prop.player, "Jaren Jackson");
    assert_eq!(joined[0].logs.len(), 8);
}

#[test]
fn short_history_is_dropped_without_error() {
    // Three available, five required: excluded, never scored with partial
    // data.
    let logs: HashMap<String, Vec<GameLog>> =
        HashMap::from([("Jaren Jackson Jr.".to_string(), history(3))]);
    let joined = join_props(&[prop("Jaren Jackson Jr.")], &logs, 5);
    assert!(joined.is_empty());
}

#[test]
fn unresolvable_player_is_dropped_silently() {
    let logs: HashMap<String, Vec<GameLog>> =
        HashMap::from([("Jaren Jackson Jr.".to_string(), history(8))]);
    let joined = join_props(&[prop("Victor Wembanyama")], &logs, 5);
    assert!(joined.is_empty());
}

#[test]
fn name_formatting_differences_are_tolerated() {
    let logs: HashMap<String, Vec<GameLog>> = HashMap::from([
        ("Luka Doncic".to_string(), history(10)),
        ("Jaren Jackson Jr.".to_string(), history(10)),
    ]);
    let props = vec![prop("Luka Dončić"), prop("jaren jackson, jr.")];
    let joined = join_props(&props, &logs, 5);
    assert_eq!(joined.len(), 2);
}

#[test]
fn same_named_players_bind_to_their_own_history() {
    // Father and son on the board at once: the suffix must decide, not the
    // map's iteration order.
    let logs: HashMap<String, Vec<GameLog>> = HashMap::from([
        ("Tim Hardaway".to_string(), history(6)),
        ("Tim Hardaway Jr.".to_string(), history(9)),
    ]);
    for _ in 0..10 {
        let joined = join_props(&[prop("Tim Hardaway Jr.")], &logs, 5);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].logs.len(), 9);

        let joined = join_props(&[prop("Tim Hardaway")], &logs, 5);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].logs.len(), 6);
    }
}

#[test]
fn one_bad_prop_does_not_drag_down_the_rest() {
    let logs: HashMap<String, Vec<GameLog>> =
        HashMap::from([("Luka Doncic".to_string(), history(10))]);
    let props = vec![prop("Nobody Real"), prop("Luka Doncic")];
    let joined = join_props(&props, &logs, 5);
    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0].prop.player, "Luka Doncic");
}
