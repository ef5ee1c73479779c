use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

/// A tracked statistical event type. Each one is retrieved as its own asset list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    FieldGoalAttempts,
    Rebounds,
    Assists,
    Steals,
    Turnovers,
    Blocks,
    PersonalFouls,
    FreeThrowAttempts,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::FieldGoalAttempts,
        Category::Rebounds,
        Category::Assists,
        Category::Steals,
        Category::Turnovers,
        Category::Blocks,
        Category::PersonalFouls,
        Category::FreeThrowAttempts,
    ];

    /// Categories compiled when the caller does not pick any.
    pub const DEFAULT_TRACKED: [Category; 6] = [
        Category::FieldGoalAttempts,
        Category::Rebounds,
        Category::Assists,
        Category::Steals,
        Category::Turnovers,
        Category::Blocks,
    ];

    /// The provider's `ContextMeasure` query value.
    pub fn context_measure(self) -> &'static str {
        match self {
            Category::FieldGoalAttempts => "FGA",
            Category::Rebounds => "REB",
            Category::Assists => "AST",
            Category::Steals => "STL",
            Category::Turnovers => "TOV",
            Category::Blocks => "BLK",
            Category::PersonalFouls => "PF",
            Category::FreeThrowAttempts => "FTA",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.context_measure())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.context_measure().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let known: Vec<_> = Category::ALL.iter().map(|c| c.context_measure()).collect();
                format!("unknown category '{wanted}' (expected one of {})", known.join(", "))
            })
    }
}

/// One clip description as returned by the provider.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawAsset {
    pub event_id: Option<u64>,
    pub period: Option<u32>,
    pub description: String,
    pub large_url: Option<String>,
    pub medium_url: Option<String>,
    pub small_url: Option<String>,
}

impl RawAsset {
    /// First non-empty URL in large, medium, small order.
    pub fn best_url(&self) -> Option<&str> {
        [&self.large_url, &self.medium_url, &self.small_url]
            .into_iter()
            .filter_map(|u| u.as_deref())
            .find(|u| !u.trim().is_empty())
    }

    pub fn is_playable(&self) -> bool {
        self.best_url().is_some()
    }
}

/// Box-score numbers that are not a tracked [`Category`] but feed the statline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatLine {
    pub minutes: f64,
    pub points: u32,
    pub field_goals_made: u32,
    pub threes_made: u32,
    pub threes_attempted: u32,
    pub free_throws_made: u32,
    pub plus_minus: i32,
}

/// Immutable identifiers and totals for one player's game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameContext {
    pub game_id: String,
    pub player_id: u64,
    pub team_id: u64,
    pub player_name: String,
    pub team_name: String,
    pub matchup: String,
    pub game_date: NaiveDate,
    pub totals: BTreeMap<Category, u32>,
    pub line: StatLine,
}

impl GameContext {
    /// Box-score total for a category; absent categories count as zero.
    pub fn total(&self, category: Category) -> u32 {
        self.totals.get(&category).copied().unwrap_or(0)
    }

    /// Season label used by the provider, e.g. `2024-25` for a game in Jan 2025.
    pub fn season(&self) -> String {
        use chrono::Datelike;

        let start = if self.game_date.month() >= 10 {
            self.game_date.year()
        } else {
            self.game_date.year() - 1
        };
        format!("{}-{:02}", start, (start + 1).rem_euclid(100))
    }
}
