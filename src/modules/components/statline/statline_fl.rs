use crate::modules::api::models::{Category, GameContext};

/// `"<player> | <matchup> <MM.DD.YYYY>"`
pub fn title(game: &GameContext) -> String {
    format!(
        "{} | {} {}",
        game.player_name,
        game.matchup,
        game.game_date.format("%m.%d.%Y")
    )
}

/// Human readable box score line, e.g.
/// `"26 Points, 3 Rebounds, 8 Assists, 9-20 FG (45%), +12 in 36 minutes"`.
pub fn stat_line(game: &GameContext) -> String {
    let line = &game.line;
    let counts = [
        (line.points, "Point"),
        (game.total(Category::Rebounds), "Rebound"),
        (game.total(Category::Assists), "Assist"),
        (game.total(Category::Steals), "Steal"),
        (game.total(Category::Blocks), "Block"),
        (game.total(Category::PersonalFouls), "Personal Foul"),
        (game.total(Category::Turnovers), "Turnover"),
    ];

    let mut parts: Vec<String> = counts
        .iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, label)| {
            let plural = if *n > 1 { "s" } else { "" };
            format!("{n} {label}{plural}")
        })
        .collect();

    let shooting = [
        (
            line.field_goals_made,
            game.total(Category::FieldGoalAttempts),
            "FG",
        ),
        (line.threes_made, line.threes_attempted, "3PT"),
        (
            line.free_throws_made,
            game.total(Category::FreeThrowAttempts),
            "FT",
        ),
    ];
    for (made, attempted, label) in shooting {
        if attempted > 0 {
            parts.push(format!(
                "{made}-{attempted} {label} ({})",
                percentage(made, attempted)
            ));
        }
    }

    let sign = if line.plus_minus >= 0 { "+" } else { "" };
    parts.push(format!(
        "{sign}{} in {} minutes",
        line.plus_minus,
        line.minutes.trunc() as i64
    ));

    parts.join(", ")
}

/// Shortest of 0, 1 or 2 decimals that represents the value exactly, else 2.
fn percentage(made: u32, attempted: u32) -> String {
    let pct = f64::from(made) * 100.0 / f64::from(attempted);
    if pct.fract() == 0.0 {
        format!("{pct:.0}%")
    } else if (pct * 10.0).fract() == 0.0 {
        format!("{pct:.1}%")
    } else {
        format!("{pct:.2}%")
    }
}
