use clap::Parser;
use forgekit::cli::{Cli, Commands};

#[test]
fn test_parse_run_as_player() {
    let cli = Cli::try_parse_from([
        "forgekit",
        "run",
        "heal --amount 5",
        "--as",
        "steve",
        "--looking-at",
        "3,4",
        "--grant",
        "forgekit.heal",
    ])
    .unwrap();

    match cli.command {
        Commands::Run {
            line,
            as_player,
            looking_at,
            grant,
        } => {
            assert_eq!(line, "heal --amount 5");
            assert_eq!(as_player.as_deref(), Some("steve"));
            assert_eq!(looking_at, vec![3, 4]);
            assert_eq!(grant, vec!["forgekit.heal"]);
        }
        other => panic!("Wrong command: {other:?}"),
    }
    assert!(!cli.json);
}

#[test]
fn test_parse_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["forgekit", "commands", "--json", "--config", "plugin.yaml"]).unwrap();

    assert!(matches!(cli.command, Commands::List));
    assert!(cli.json);
    assert_eq!(cli.config.unwrap().to_str(), Some("plugin.yaml"));
}

#[test]
fn test_parse_check() {
    let cli = Cli::try_parse_from(["forgekit", "check"]).unwrap();
    assert!(matches!(cli.command, Commands::Check));
}

#[test]
fn test_run_requires_line() {
    assert!(Cli::try_parse_from(["forgekit", "run"]).is_err());
    assert!(Cli::try_parse_from(["forgekit", "list"]).is_err());
}
