//! Interactive play mode.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{Context, Result};
use pairmatch_core::cache::{last_player_name, remember_player_name};
use pairmatch_core::leaderboard::format::{format_leaderboard_console, format_time};
use pairmatch_core::{LocalCache, PlayerName, Round, RoundEvent, RoundOrchestrator, SessionEvent};

use super::migrate;
use crate::cli_utils;
use crate::settings::Settings;

const BOARD_COLUMNS: usize = 4;

#[derive(Debug, PartialEq, Eq)]
enum Input {
    /// Zero-based board position
    Flip(usize),
    Restart,
    Quit,
    Invalid,
}

pub fn run(settings: &Settings, name: Option<&str>) -> Result<()> {
    let store = cli_utils::open_store(settings);
    let cache = cli_utils::open_cache(settings);

    migrate::run_quietly(Arc::clone(&cache), Arc::clone(&store));

    let Some(player) = choose_player(cache.as_ref(), name)? else {
        return Ok(());
    };
    remember_player_name(cache.as_ref(), &player);

    print!("{}", format_leaderboard_console(&store.top()));

    let orchestrator = RoundOrchestrator::builder(store)
        .config(settings.game.clone())
        .build()
        .context("Invalid game settings")?;
    orchestrator.add_listener(print_event);
    orchestrator.start(player);

    loop {
        let round = orchestrator.snapshot();
        print!("{}", render_board(&round, orchestrator.elapsed_seconds()));

        if round.is_completed() {
            match cli_utils::prompt("Play again? [y/N] ")? {
                Some(answer) if answer.eq_ignore_ascii_case("y") => {
                    orchestrator.restart()?;
                    continue;
                }
                _ => break,
            }
        }

        let Some(line) = cli_utils::prompt("Card number (r = restart, q = quit): ")? else {
            break;
        };
        match parse_input(&line, round.cards().len()) {
            Input::Quit => break,
            Input::Restart => {
                orchestrator.restart()?;
            }
            Input::Flip(position) => {
                let card_id = round.cards()[position].id;
                if !orchestrator.flip(card_id) {
                    println!("That card cannot be flipped right now.");
                    continue;
                }
                let after = orchestrator.snapshot();
                if after.phase().is_evaluating() {
                    print!("{}", render_board(&after, orchestrator.elapsed_seconds()));
                    orchestrator.wait_idle();
                }
            }
            Input::Invalid => {
                println!("Enter a card number between 1 and {}.", round.cards().len());
            }
        }
    }

    orchestrator.wait_idle();
    Ok(())
}

fn choose_player(cache: &dyn LocalCache, name: Option<&str>) -> Result<Option<PlayerName>> {
    if let Some(name) = name {
        return Ok(Some(PlayerName::parse(name)?));
    }

    let saved = last_player_name(cache);
    loop {
        let message = match &saved {
            Some(saved) => format!("Player name [{}]: ", saved),
            None => "Player name: ".to_string(),
        };
        let Some(input) = cli_utils::prompt(&message)? else {
            return Ok(None);
        };
        if input.is_empty()
            && let Some(saved) = &saved
        {
            return Ok(Some(saved.clone()));
        }
        match PlayerName::parse(&input) {
            Ok(player) => return Ok(Some(player)),
            Err(e) => println!("{}", e),
        }
    }
}

fn parse_input(line: &str, card_count: usize) -> Input {
    match line.trim() {
        "q" | "Q" => Input::Quit,
        "r" | "R" => Input::Restart,
        other => match other.parse::<usize>() {
            Ok(n) if (1..=card_count).contains(&n) => Input::Flip(n - 1),
            _ => Input::Invalid,
        },
    }
}

fn render_board(round: &Round, elapsed_seconds: u64) -> String {
    let mut output = String::new();
    let _ = writeln!(output);

    for (row_index, cards) in round.cards().chunks(BOARD_COLUMNS).enumerate() {
        let mut line = String::new();
        for (column, card) in cards.iter().enumerate() {
            let position = row_index * BOARD_COLUMNS + column + 1;
            if card.is_flipped {
                let _ = write!(line, " [ {} ]", card.symbol);
            } else {
                let _ = write!(line, " [{:>3}]", position);
            }
        }
        let _ = writeln!(output, "{}", line);
    }

    let _ = writeln!(
        output,
        "\n Score {}  Moves {}  Pairs {}/{}  Time {}",
        round.score(),
        round.moves(),
        round.matched_pairs(),
        round.total_pairs(),
        format_time(elapsed_seconds)
    );
    output
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::Round(RoundEvent::Matched { symbol, score, .. }) => {
            println!("Match! {} (score {})", symbol, score);
        }
        SessionEvent::Round(RoundEvent::Mismatched { .. }) => println!("No match."),
        SessionEvent::Round(RoundEvent::Completed(summary)) => {
            println!(
                "Round complete in {} with {} moves. Final score {} (time bonus {}).",
                format_time(summary.elapsed_seconds),
                summary.moves,
                summary.final_score,
                summary.time_bonus
            );
        }
        SessionEvent::Recorded(entry) => {
            println!("Saved {} pts for {} to the leaderboard.", entry.score, entry.player_name);
        }
        SessionEvent::RecordFailed { reason, .. } => {
            println!("Could not save your score: {}", reason);
        }
        SessionEvent::LeaderboardRefreshed(entries) => {
            print!("{}", format_leaderboard_console(entries));
        }
    }
}
