use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use buckshot_client::board_edit::BoardEditState;
use buckshot_client::request::{DATA_PATH, MODIFY_BOARD_PATH, ServerRequest};
use buckshot_client::snapshot::GameSnapshot;
use log::warn;
use url::Url;


#[derive(Clone)]
pub struct GameServer {
    base_url: Url,
    client: reqwest::blocking::Client,
}

impl GameServer {
    pub fn new(base_url: Url) -> Self {
        GameServer { base_url, client: reqwest::blocking::Client::new() }
    }

    fn endpoint(&self, path: &str) -> anyhow::Result<Url> {
        self.base_url.join(path).with_context(|| format!("Bad endpoint path '{path}'"))
    }

    pub fn fetch_snapshot(&self) -> anyhow::Result<GameSnapshot> {
        let url = self.endpoint(DATA_PATH)?;
        let body = self
            .client
            .get(url.clone())
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .with_context(|| format!("GET {url}"))?;
        GameSnapshot::from_json(&body).with_context(|| format!("Decoding {url}"))
    }

    // Unlock and action endpoints only acknowledge, so the body is dropped.
    pub fn send(&self, request: ServerRequest) -> anyhow::Result<()> {
        let url = self.endpoint(&request.path())?;
        self.client
            .get(url.clone())
            .send()
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("GET {url}"))?;
        Ok(())
    }

    pub fn modify_board(&self, state: &BoardEditState) -> anyhow::Result<String> {
        let url = self.endpoint(MODIFY_BOARD_PATH)?;
        self.client
            .post(url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(state.to_form_body())
            .send()
            .and_then(|response| response.text())
            .with_context(|| format!("POST {url}"))
    }
}

// Sends every request on its own thread. The server holds `/action` open until it gets
// `/unlock`, so the two must never wait on each other.
pub fn spawn_request_dispatcher(
    server: GameServer, requests: mpsc::Receiver<ServerRequest>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for request in requests {
            let server = server.clone();
            thread::spawn(move || {
                if let Err(err) = server.send(request) {
                    warn!("{:#}", err);
                }
            });
        }
    })
}


#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::{Arc, Condvar, Mutex};
    use std::time::Duration;

    use buckshot_client::item::Item;
    use buckshot_client::request::PlayerAction;
    use pretty_assertions::assert_eq;

    use super::*;

    type UnlockFlag = Arc<(Mutex<bool>, Condvar)>;

    // Answers like the game server: `/action` only returns after `/unlock` has been received.
    fn serve_connection(stream: TcpStream, unlocked: UnlockFlag, answered: mpsc::Sender<String>) {
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        let path = request_line.split_whitespace().nth(1).unwrap().to_owned();
        loop {
            let mut header = String::new();
            if reader.read_line(&mut header).unwrap() == 0 || header.trim().is_empty() {
                break;
            }
        }
        let (lock, cvar) = &*unlocked;
        if path.starts_with("/unlock") {
            *lock.lock().unwrap() = true;
            cvar.notify_all();
        } else {
            let guard = lock.lock().unwrap();
            let _ = cvar.wait_timeout_while(guard, Duration::from_secs(10), |u| !*u).unwrap();
        }
        let mut stream = stream;
        stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
            .unwrap();
        let _ = answered.send(path);
    }

    fn start_locking_server() -> (Url, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = Url::parse(&format!("http://{}/", listener.local_addr().unwrap())).unwrap();
        let (answered_tx, answered_rx) = mpsc::channel();
        let unlocked = UnlockFlag::default();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let (unlocked, answered_tx) = (unlocked.clone(), answered_tx.clone());
                thread::spawn(move || serve_connection(stream.unwrap(), unlocked, answered_tx));
            }
        });
        (url, answered_rx)
    }

    #[test]
    fn endpoints_are_resolved_against_server_root() {
        let server = GameServer::new(Url::parse("http://game.local:5000/lobby/").unwrap());
        let request = ServerRequest::Action(PlayerAction::UseItem(Item::MagnifyingGlass));
        assert_eq!(
            server.endpoint(&request.path()).unwrap().as_str(),
            "http://game.local:5000/action?action=magnifying_glass"
        );
        assert_eq!(
            server.endpoint(DATA_PATH).unwrap().as_str(),
            "http://game.local:5000/data"
        );
    }

    #[test]
    fn unlock_is_not_queued_behind_action() {
        let (url, answered) = start_locking_server();
        let (requests_tx, requests_rx) = mpsc::channel();
        let dispatcher = spawn_request_dispatcher(GameServer::new(url), requests_rx);
        requests_tx.send(ServerRequest::Action(PlayerAction::ShootOpponent)).unwrap();
        requests_tx.send(ServerRequest::Unlock).unwrap();
        drop(requests_tx);
        dispatcher.join().unwrap();

        // Well under the HTTP client timeout, which is what a serial queue would wait for.
        let timeout = Duration::from_secs(5);
        let mut paths = vec![
            answered.recv_timeout(timeout).unwrap(),
            answered.recv_timeout(timeout).unwrap(),
        ];
        paths.sort();
        assert_eq!(paths, vec!["/action?action=op".to_owned(), "/unlock".to_owned()]);
    }
}
