// Legend for various fix-this comments:
//   * "TODO" - bug or missing crucial feature.
//   * "Improvement potential" - missing nice-to-have feature or an opportunity
//       to make code better or faster.

#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

mod board_main;
mod client_config;
mod client_main;
mod network;
mod tui;

use clap::{ArgAction, Command, arg};


fn main() -> anyhow::Result<()> {
    // Stdout belongs to the game screen.
    env_logger::Builder::new()
        .target(env_logger::Target::Stderr)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config_arg = || {
        arg!(-c --"config" <config_file> "Path to a yaml-serialized ClientConfig file.")
            .required(false)
    };
    let server_arg = || {
        arg!(-s --"server" <server_url> "Game server URL. Overrides the config file.")
            .required(false)
    };

    let matches = Command::new("Buckshot")
        .version(clap::crate_version!())
        .about("Buckshot roulette console client")
        .subcommand_required(true)
        .subcommand(
            Command::new("client")
                .about("Play in the terminal")
                .arg(config_arg())
                .arg(server_arg()),
        )
        .subcommand(
            Command::new("modify-board")
                .about("Overwrite the board state on the server and print the server's reply")
                .arg(config_arg())
                .arg(server_arg())
                .arg(arg!(-b --"board" <board_file> "JSON board to start from").required(false))
                .arg(
                    arg!(--"set" <assignment> "Form field override, e.g. p1_beer=2")
                        .required(false)
                        .action(ArgAction::Append),
                )
                .arg(arg!(--"dry-run" "Print the form body instead of sending it")),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("client", sub_matches)) => client_main::run(client_config::load_config(
            sub_matches.get_one("config"),
            sub_matches.get_one("server"),
        )?),
        Some(("modify-board", sub_matches)) => board_main::run(board_main::BoardConfig {
            client: client_config::load_config(
                sub_matches.get_one("config"),
                sub_matches.get_one("server"),
            )?,
            board_file: sub_matches.get_one::<String>("board").cloned(),
            assignments: sub_matches
                .get_many::<String>("set")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
            dry_run: sub_matches.get_flag("dry-run"),
        }),
        _ => unreachable!("Exhausted list of subcommands and subcommand_required prevents `None`"),
    }
}
