use serde::{Deserialize, Serialize};

/// The fixed set of prop markets the pipeline understands.
///
/// Combination markets (Pts+Reb etc.) are always evaluated per game by
/// summing the base stats for that game, never by combining aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
    PointsReboundsAssists,
    PointsRebounds,
    PointsAssists,
    ReboundsAssists,
}

impl Market {
    pub const ALL: [Market; 9] = [
        Market::Points,
        Market::Rebounds,
        Market::Assists,
        Market::Steals,
        Market::Blocks,
        Market::PointsReboundsAssists,
        Market::PointsRebounds,
        Market::PointsAssists,
        Market::ReboundsAssists,
    ];

    /// The Odds API market key for this market.
    pub fn odds_api_key(self) -> &'static str {
        match self {
            Market::Points => "player_points",
            Market::Rebounds => "player_rebounds",
            Market::Assists => "player_assists",
            Market::Steals => "player_steals",
            Market::Blocks => "player_blocks",
            Market::PointsReboundsAssists => "player_points_rebounds_assists",
            Market::PointsRebounds => "player_points_rebounds",
            Market::PointsAssists => "player_points_assists",
            Market::ReboundsAssists => "player_rebounds_assists",
        }
    }

    pub fn from_odds_api_key(key: &str) -> Option<Market> {
        Market::ALL.into_iter().find(|m| m.odds_api_key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            Market::Points => "Points",
            Market::Rebounds => "Rebounds",
            Market::Assists => "Assists",
            Market::Steals => "Steals",
            Market::Blocks => "Blocks",
            Market::PointsReboundsAssists => "Pts+Reb+Ast",
            Market::PointsRebounds => "Pts+Reb",
            Market::PointsAssists => "Pts+Ast",
            Market::ReboundsAssists => "Reb+Ast",
        }
    }

    pub fn components(self) -> &'static [StatCategory] {
        use StatCategory::*;
        match self {
            Market::Points => &[Points],
            Market::Rebounds => &[Rebounds],
            Market::Assists => &[Assists],
            Market::Steals => &[Steals],
            Market::Blocks => &[Blocks],
            Market::PointsReboundsAssists => &[Points, Rebounds, Assists],
            Market::PointsRebounds => &[Points, Rebounds],
            Market::PointsAssists => &[Points, Assists],
            Market::ReboundsAssists => &[Rebounds, Assists],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatCategory {
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
}

/// One player's line in one past game, validated at the provider boundary.
/// Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameLog {
    pub date: String,
    pub matchup: String,
    pub minutes: f64,
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    pub blocks: f64,
}

impl GameLog {
    fn stat(&self, category: StatCategory) -> f64 {
        match category {
            StatCategory::Points => self.points,
            StatCategory::Rebounds => self.rebounds,
            StatCategory::Assists => self.assists,
            StatCategory::Steals => self.steals,
            StatCategory::Blocks => self.blocks,
        }
    }

    /// Per-game value for a market, summing base stats for combination
    /// markets.
    pub fn market_value(&self, market: Market) -> f64 {
        market.components().iter().map(|c| self.stat(*c)).sum()
    }
}

/// One sportsbook-offered prop line. Immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropLine {
    pub event_id: String,
    pub player: String,
    pub market: Market,
    pub line: f64,
    pub over_odds: i32,
    pub home_team: String,
    pub away_team: String,
    pub bookmaker: String,
}

impl PropLine {
    pub fn matchup(&self) -> String {
        format!("{} @ {}", self.away_team, self.home_team)
    }
}

/// Classification of one past game against the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Hit,
    Near,
    Miss,
}

impl GameOutcome {
    pub fn label(self) -> &'static str {
        match self {
            GameOutcome::Hit => "HIT",
            GameOutcome::Near => "NEAR",
            GameOutcome::Miss => "MISS",
        }
    }
}

/// One per-game row backing a scored prop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDetail {
    pub date: String,
    pub matchup: String,
    pub minutes: f64,
    pub value: f64,
    pub margin: f64,
    pub outcome: GameOutcome,
}

/// Metrics derived from the last N games against one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropMetrics {
    pub hits: usize,
    pub nears: usize,
    /// Number of games actually scored; the N of the k/N display pair.
    pub games: usize,
    pub hit_rate: f64,
    pub near_rate: f64,
    pub avg_margin: f64,
    /// Population standard deviation of the per-game market values.
    pub std_dev: f64,
    /// Mean margin over the five most recent games.
    pub last5_avg_margin: f64,
    /// Composite confidence score in [0, 100].
    pub score: f64,
}

/// A prop joined with its history and computed metrics. Never mutated after
/// creation; `details` is guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProp {
    pub prop: PropLine,
    pub metrics: PropMetrics,
    pub details: Vec<GameDetail>,
}
