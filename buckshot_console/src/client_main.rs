use std::fmt;
use std::io;
use std::sync::mpsc;
use std::thread;

use buckshot_client::client::{ClientState, NotableEvent, PollOutcome};
use buckshot_client::display::ItemSlotView;
use buckshot_client::request::PlayerAction;
use buckshot_client::side::Side;
use buckshot_client::snapshot::GameSnapshot;
use crossterm::{cursor, event as term_event, execute, style, terminal};
use instant::Instant;
use log::{error, info, warn};
use scopeguard::defer;

use crate::client_config::ClientConfig;
use crate::network::{self, GameServer};
use crate::tui;


const HELP: &str =
    "[s] shoot yourself  [o] shoot opponent  [1-8] use item  [u] unlock  [h] toggle hide  [q] quit";

enum IncomingEvent {
    Network(anyhow::Result<GameSnapshot>),
    Terminal(term_event::Event),
    Tick,
}

enum Command {
    Shoot(Side),
    UseSlot(usize),
    Unlock,
    ToggleHide,
    Quit,
}

impl Command {
    fn from_key(code: term_event::KeyCode) -> Option<Command> {
        match code {
            term_event::KeyCode::Char('s') => Some(Command::Shoot(Side::Local)),
            term_event::KeyCode::Char('o') => Some(Command::Shoot(Side::Opponent)),
            term_event::KeyCode::Char('u') => Some(Command::Unlock),
            term_event::KeyCode::Char('h') => Some(Command::ToggleHide),
            term_event::KeyCode::Char('q') | term_event::KeyCode::Esc => Some(Command::Quit),
            term_event::KeyCode::Char(ch @ '1'..='8') => {
                Some(Command::UseSlot(ch as usize - '1' as usize))
            }
            _ => None,
        }
    }
}

fn writeln_raw(stdout: &mut io::Stdout, v: impl fmt::Display) -> io::Result<()> {
    let s = v.to_string();
    // Note. Not using `lines()` because it removes trailing new line.
    for line in s.split('\n') {
        execute!(stdout, style::Print(line), cursor::MoveToNextLine(1), cursor::Hide)?;
    }
    Ok(())
}

fn render(
    stdout: &mut io::Stdout, client_state: &ClientState, status: &Option<String>,
) -> io::Result<()> {
    execute!(stdout, cursor::MoveTo(0, 0), terminal::Clear(terminal::ClearType::All))?;
    match client_state.view() {
        Some(view) => writeln_raw(
            stdout,
            tui::render_game_view(&view, client_state.hide(), client_state.animation()),
        )?,
        None => writeln_raw(stdout, "Waiting for the server...")?,
    }
    writeln_raw(stdout, format!("\n{}", HELP))?;
    if let Some(status) = status {
        writeln_raw(stdout, status)?;
    }
    Ok(())
}

// Returns a line to show under the board, if the command needs one.
fn execute_command(client_state: &mut ClientState, command: Command) -> Option<String> {
    match command {
        Command::Shoot(target) => {
            if client_state.shoot_at(target, Instant::now()) {
                None
            } else {
                Some("Not your turn".to_owned())
            }
        }
        Command::UseSlot(index) => {
            let slot = client_state
                .view()
                .and_then(|view| view.item_slots[Side::Local].get(index).copied());
            match slot {
                Some(ItemSlotView::Usable(item)) => {
                    client_state.act(PlayerAction::UseItem(item));
                    None
                }
                Some(ItemSlotView::Inert(item)) => Some(format!("Cannot use {} now", item)),
                _ => Some(format!("Slot {} is empty", index + 1)),
            }
        }
        Command::Unlock => {
            client_state.unlock();
            None
        }
        Command::ToggleHide => {
            client_state.toggle_hide();
            None
        }
        Command::Quit => unreachable!("Quit is handled by the event loop"),
    }
}

pub fn run(config: ClientConfig) -> anyhow::Result<()> {
    info!("Connecting to {}...", config.server_url);
    let server = GameServer::new(config.server_url.clone());

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    defer! { let _ = terminal::disable_raw_mode(); };
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;
    defer! { let _ = execute!(io::stdout(), terminal::LeaveAlternateScreen, cursor::Show); };

    let (tx, rx) = mpsc::channel();
    let tx_net = tx.clone();
    let tx_local = tx.clone();
    let tx_tick = tx;
    let poll_server = server.clone();
    let poll_interval = config.poll_interval;
    thread::spawn(move || {
        loop {
            if tx_net.send(IncomingEvent::Network(poll_server.fetch_snapshot())).is_err() {
                return;
            }
            thread::sleep(poll_interval);
        }
    });
    thread::spawn(move || {
        loop {
            match term_event::read() {
                Ok(ev) => {
                    if tx_local.send(IncomingEvent::Terminal(ev)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    error!("Cannot read terminal input: {}", err);
                    return;
                }
            }
        }
    });
    let tick_interval = config.tick_interval;
    thread::spawn(move || {
        loop {
            thread::sleep(tick_interval);
            if tx_tick.send(IncomingEvent::Tick).is_err() {
                return;
            }
        }
    });

    let (server_tx, server_rx) = mpsc::channel();
    network::spawn_request_dispatcher(server, server_rx);

    let mut client_state = ClientState::with_timings(server_tx, config.shot_timings());
    let mut status = None;
    let mut needs_render = true;
    for event in rx {
        match event {
            IncomingEvent::Network(Ok(snapshot)) => {
                let outcome = client_state.process_snapshot(snapshot, Instant::now());
                if outcome == PollOutcome::Unlocked {
                    info!("Server was waiting, unlock requested");
                }
            }
            IncomingEvent::Network(Err(err)) => {
                // The next poll is the retry.
                warn!("{:#}", err);
            }
            IncomingEvent::Terminal(term_event::Event::Key(key)) => {
                if key.kind != term_event::KeyEventKind::Press {
                    continue;
                }
                match Command::from_key(key.code) {
                    Some(Command::Quit) => return Ok(()),
                    Some(command) => {
                        status = execute_command(&mut client_state, command);
                        needs_render = true;
                    }
                    None => {}
                }
            }
            IncomingEvent::Terminal(term_event::Event::Resize(..)) => needs_render = true,
            IncomingEvent::Terminal(_) => {}
            IncomingEvent::Tick => {}
        }
        client_state.refresh(Instant::now());
        while let Some(event) = client_state.next_notable_event() {
            match event {
                NotableEvent::ViewUpdated
                | NotableEvent::ShotgunAimed(_)
                | NotableEvent::ShotgunLowered => needs_render = true,
            }
        }
        if needs_render {
            render(&mut stdout, &client_state, &status)?;
            needs_render = false;
        }
    }
    anyhow::bail!("Unexpected end of events stream")
}
