//! CLI argument parsing tests.
//!
//! These tests verify that command-line arguments are parsed correctly
//! without actually executing the commands (which would need a terminal
//! and, for remote stores, the network).

use clap::Parser;

// Re-create Args structure for testing since it's not publicly exported
#[derive(Parser)]
#[command(name = "pairmatch")]
struct Args {
    #[arg(long, value_name = "FILE")]
    config: Option<String>,

    #[arg(long)]
    endpoint: Option<String>,

    #[arg(long)]
    api_key: Option<String>,

    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Subcommand)]
enum Command {
    Play {
        #[arg(long)]
        name: Option<String>,
    },
    Leaderboard {
        #[arg(long)]
        limit: Option<usize>,
    },
    Watch {
        #[arg(long)]
        limit: Option<usize>,
    },
    Migrate,
    Debug {
        #[command(subcommand)]
        action: DebugAction,
    },
}

#[derive(clap::Subcommand)]
enum DebugAction {
    Get,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        score: u32,
    },
}

#[test]
fn test_parse_no_args() {
    let args = Args::try_parse_from(["pairmatch"]).unwrap();
    assert!(args.command.is_none());
    assert!(args.config.is_none());
    assert!(!args.verbose);
}

#[test]
fn test_parse_play_with_name() {
    let args = Args::try_parse_from(["pairmatch", "play", "--name", "Ann"]).unwrap();
    match args.command {
        Some(Command::Play { name }) => assert_eq!(name.as_deref(), Some("Ann")),
        _ => panic!("Expected Play command"),
    }
}

#[test]
fn test_parse_leaderboard_limit() {
    let args = Args::try_parse_from(["pairmatch", "leaderboard", "--limit", "5"]).unwrap();
    match args.command {
        Some(Command::Leaderboard { limit }) => assert_eq!(limit, Some(5)),
        _ => panic!("Expected Leaderboard command"),
    }
}

#[test]
fn test_parse_watch_default_limit() {
    let args = Args::try_parse_from(["pairmatch", "watch"]).unwrap();
    match args.command {
        Some(Command::Watch { limit }) => assert!(limit.is_none()),
        _ => panic!("Expected Watch command"),
    }
}

#[test]
fn test_parse_migrate() {
    let args = Args::try_parse_from(["pairmatch", "migrate"]).unwrap();
    assert!(matches!(args.command, Some(Command::Migrate)));
}

#[test]
fn test_parse_debug_add() {
    let args =
        Args::try_parse_from(["pairmatch", "debug", "add", "--name", "Tester", "--score", "420"])
            .unwrap();
    match args.command {
        Some(Command::Debug {
            action: DebugAction::Add { name, score },
        }) => {
            assert_eq!(name, "Tester");
            assert_eq!(score, 420);
        }
        _ => panic!("Expected Debug Add command"),
    }
}

#[test]
fn test_parse_debug_get() {
    let args = Args::try_parse_from(["pairmatch", "debug", "get"]).unwrap();
    assert!(matches!(
        args.command,
        Some(Command::Debug {
            action: DebugAction::Get
        })
    ));
}

#[test]
fn test_parse_global_store_flags() {
    let args = Args::try_parse_from([
        "pairmatch",
        "--endpoint",
        "https://example.supabase.co",
        "--api-key",
        "anon",
        "-v",
        "leaderboard",
    ])
    .unwrap();
    assert_eq!(args.endpoint.as_deref(), Some("https://example.supabase.co"));
    assert_eq!(args.api_key.as_deref(), Some("anon"));
    assert!(args.verbose);
}

#[test]
fn test_debug_add_requires_score() {
    let result = Args::try_parse_from(["pairmatch", "debug", "add", "--name", "Tester"]);
    assert!(result.is_err());
}

#[test]
fn test_negative_score_rejected() {
    let result =
        Args::try_parse_from(["pairmatch", "debug", "add", "--name", "T", "--score", "-5"]);
    assert!(result.is_err());
}

#[test]
fn test_invalid_command_fails() {
    let result = Args::try_parse_from(["pairmatch", "invalid-command"]);
    assert!(result.is_err());
}
