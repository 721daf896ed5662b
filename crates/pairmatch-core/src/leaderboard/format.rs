//! Console formatting for rankings

use std::fmt::Write as _;

use owo_colors::OwoColorize;

use super::LeaderboardEntry;

/// Format seconds as `mm:ss`
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Medal for the first three places, a generic badge after that
pub fn rank_badge(rank: usize) -> &'static str {
    match rank {
        1 => "🥇",
        2 => "🥈",
        3 => "🥉",
        _ => "🏅",
    }
}

/// Render the ranking as a plain table, one line per entry
pub fn format_leaderboard(entries: &[LeaderboardEntry]) -> String {
    let mut output = String::new();
    if entries.is_empty() {
        let _ = writeln!(output, "  No records yet. Be the first!");
        return output;
    }

    for (index, entry) in entries.iter().enumerate() {
        let rank = index + 1;
        let _ = writeln!(
            output,
            "{} {:>2}. {:<20} {:>6} pts  {}  {:>3} moves  {}",
            rank_badge(rank),
            rank,
            entry.player_name.as_str(),
            entry.score,
            format_time(u64::from(entry.time_seconds)),
            entry.moves,
            entry.created_at.format("%Y-%m-%d")
        );
    }
    output
}

/// Render the ranking with a colored header and highlighted podium
pub fn format_leaderboard_console(entries: &[LeaderboardEntry]) -> String {
    let mut output = String::new();
    let border: String = "━".repeat(56);

    let _ = writeln!(output, "{}", border.dimmed());
    let _ = writeln!(output, "  🏆 {}", "LEADERBOARD".bold());
    let _ = writeln!(output, "{}", border.dimmed());

    for (index, line) in format_leaderboard(entries).lines().enumerate() {
        if index < 3 && !entries.is_empty() {
            let _ = writeln!(output, "{}", line.yellow());
        } else {
            let _ = writeln!(output, "{}", line);
        }
    }

    let _ = writeln!(output, "{}", border.dimmed());
    output
}
