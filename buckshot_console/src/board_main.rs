use anyhow::Context;
use buckshot_client::board_edit::{BoardEditState, BoardSnapshot};
use log::info;

use crate::client_config::ClientConfig;
use crate::network::GameServer;


pub struct BoardConfig {
    pub client: ClientConfig,
    // JSON board to start from. Without it only the overrides are sent.
    pub board_file: Option<String>,
    // "name=value" overrides, applied in order.
    pub assignments: Vec<String>,
    pub dry_run: bool,
}

pub fn build_state(config: &BoardConfig) -> anyhow::Result<BoardEditState> {
    let mut state = match &config.board_file {
        Some(filename) => {
            let contents = std::fs::read_to_string(filename)
                .with_context(|| format!("Reading board file '{filename}'"))?;
            let board = BoardSnapshot::from_json(&contents)
                .with_context(|| format!("Parsing board file '{filename}'"))?;
            BoardEditState::from_board(&board)
        }
        None => BoardEditState::new(),
    };
    for assignment in &config.assignments {
        state.apply_assignment(assignment)?;
    }
    Ok(state)
}

pub fn run(config: BoardConfig) -> anyhow::Result<()> {
    let state = build_state(&config)?;
    if config.dry_run {
        println!("{}", state.to_form_body());
        return Ok(());
    }
    info!("Modifying board: {}", state);
    let response = GameServer::new(config.client.server_url.clone()).modify_board(&state)?;
    println!("{}", response);
    Ok(())
}
