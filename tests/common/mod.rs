// Rust-upgrade (https://github.com/rust-lang/rust/issues/46379):
//   remove `#[allow(dead_code)]` before public functions.

use std::sync::mpsc;
use std::time::Duration;

use buckshot_client::client::{ClientState, NotableEvent, PollOutcome};
use buckshot_client::request::ServerRequest;
use buckshot_client::snapshot::GameSnapshot;
use instant::Instant;


// Game server stand-in: hands out whatever snapshot the test put there and remembers every
// request it got.
pub struct FakeServer {
    pub snapshot: GameSnapshot,
    pub requests: Vec<ServerRequest>,
}

// A client driven by a manual clock.
pub struct World {
    pub server: FakeServer,
    pub client: ClientState,
    requests_rx: mpsc::Receiver<ServerRequest>,
    start: Instant,
    elapsed: Duration,
    pub renders: usize,
    pub events: Vec<NotableEvent>,
}

impl World {
    pub fn new(snapshot: GameSnapshot) -> Self {
        let (requests_tx, requests_rx) = mpsc::channel();
        World {
            server: FakeServer { snapshot, requests: vec![] },
            client: ClientState::new(requests_tx),
            requests_rx,
            start: Instant::now(),
            elapsed: Duration::ZERO,
            renders: 0,
            events: vec![],
        }
    }

    pub fn now(&self) -> Instant { self.start + self.elapsed }

    // One poll tick: fetch, hand the snapshot to the client, deliver its requests.
    pub fn poll(&mut self) -> PollOutcome {
        let now = self.now();
        let outcome = self.client.process_snapshot(self.server.snapshot.clone(), now);
        self.flush();
        outcome
    }

    // Lets time pass, refreshing the client on the usual cadence.
    pub fn advance(&mut self, duration: Duration) {
        let step = Duration::from_millis(100);
        let target = self.elapsed + duration;
        while self.elapsed < target {
            self.elapsed = (self.elapsed + step).min(target);
            let now = self.now();
            self.client.refresh(now);
        }
        self.flush();
    }

    pub fn flush(&mut self) {
        self.server.requests.extend(self.requests_rx.try_iter());
        while let Some(event) = self.client.next_notable_event() {
            if event == NotableEvent::ViewUpdated {
                self.renders += 1;
            }
            self.events.push(event);
        }
    }

    #[allow(dead_code)]
    pub fn take_requests(&mut self) -> Vec<ServerRequest> {
        std::mem::take(&mut self.server.requests)
    }

    #[allow(dead_code)]
    pub fn unlock_count(&self) -> usize {
        self.server.requests.iter().filter(|r| **r == ServerRequest::Unlock).count()
    }
}
