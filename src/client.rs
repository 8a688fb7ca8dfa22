use std::collections::VecDeque;
use std::sync::mpsc;
use std::time::Duration;

use instant::Instant;
use log::{debug, info, warn};

use crate::animation::{ShotAnimation, ShotPhase, ShotProgress, ShotTimings};
use crate::display::GameView;
use crate::request::{PlayerAction, ServerRequest};
use crate::side::Side;
use crate::snapshot::{GameSnapshot, TurnId};


// How often front ends fetch `/data`.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);
// How often front ends should call `ClientState::refresh`. Bounds animation timing error.
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(100);

// Things the front end has to show. The view itself is always taken from `ClientState::view`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NotableEvent {
    // The game view must be redrawn.
    ViewUpdated,
    // Rotate the shotgun towards a side of the table.
    ShotgunAimed(Side),
    // Rotate the shotgun back to rest.
    ShotgunLowered,
}

#[must_use]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PollOutcome {
    // New turn: the view was updated.
    Rendered,
    // Same turn, but the server was waiting for us: unlock requested.
    Unlocked,
    // Same turn, nothing to do.
    Unchanged,
}

pub struct ClientState {
    requests_tx: mpsc::Sender<ServerRequest>,
    timings: ShotTimings,
    // Latest snapshot received.
    snapshot: Option<GameSnapshot>,
    // Turn of the latest rendered snapshot.
    rendered_turn: Option<TurnId>,
    // An animation or action for the current turn is in flight.
    executing: bool,
    // Hide the remaining shells.
    hide: bool,
    animation: Option<ShotAnimation>,
    next_generation: u64,
    notable_events: VecDeque<NotableEvent>,
}

impl ClientState {
    pub fn new(requests_tx: mpsc::Sender<ServerRequest>) -> Self {
        Self::with_timings(requests_tx, ShotTimings::default())
    }

    pub fn with_timings(requests_tx: mpsc::Sender<ServerRequest>, timings: ShotTimings) -> Self {
        ClientState {
            requests_tx,
            timings,
            snapshot: None,
            rendered_turn: None,
            executing: false,
            hide: true,
            animation: None,
            next_generation: 1,
            notable_events: VecDeque::new(),
        }
    }

    pub fn snapshot(&self) -> Option<&GameSnapshot> { self.snapshot.as_ref() }
    pub fn executing(&self) -> bool { self.executing }
    pub fn hide(&self) -> bool { self.hide }
    pub fn animation(&self) -> Option<&ShotAnimation> { self.animation.as_ref() }

    pub fn view(&self) -> Option<GameView> {
        self.snapshot.as_ref().map(|snapshot| GameView::new(snapshot, self.hide))
    }

    pub fn next_notable_event(&mut self) -> Option<NotableEvent> { self.notable_events.pop_front() }

    pub fn unlock(&mut self) { self.send(ServerRequest::Unlock); }

    pub fn act(&mut self, action: PlayerAction) { self.send(ServerRequest::Action(action)); }

    // Handles a freshly fetched snapshot. The snapshot always becomes current, but the view is
    // only redrawn when the turn changes.
    pub fn process_snapshot(&mut self, snapshot: GameSnapshot, now: Instant) -> PollOutcome {
        let new_turn = self.rendered_turn.as_ref() != Some(&snapshot.turn_id);
        let lock = snapshot.lock;
        if new_turn {
            debug!("New turn {}", snapshot.turn_id);
            self.rendered_turn = Some(snapshot.turn_id.clone());
            self.snapshot = Some(snapshot);
            self.notable_events.push_back(NotableEvent::ViewUpdated);
            self.react(now);
            self.executing = true;
            PollOutcome::Rendered
        } else {
            self.snapshot = Some(snapshot);
            if lock && !self.executing {
                self.unlock();
                PollOutcome::Unlocked
            } else {
                PollOutcome::Unchanged
            }
        }
    }

    // Replays the opponent's shot, if that is what just happened, and lets the server go on.
    fn react(&mut self, now: Instant) {
        let Some(snapshot) = &self.snapshot else {
            return;
        };
        if !(snapshot.lock || self.executing) {
            return;
        }
        let opponent_shot_target = snapshot.last_action.opponent_shot_target();
        let animated = match opponent_shot_target {
            Some(target) => self.shoot(Side::Opponent, target, now),
            None => false,
        };
        // A running animation unlocks when it completes.
        if !animated {
            self.executing = false;
            self.unlock();
        }
    }

    // Local player fires at the given side of the table.
    pub fn shoot_at(&mut self, target: Side, now: Instant) -> bool {
        self.shoot(Side::Local, target, now)
    }

    // Starts a shot sequence: aim now, lower after `return_delay`, unlock after
    // `complete_delay`. Replaces any sequence still running. Only plays on the local player's
    // turn; returns whether the sequence started.
    pub fn shoot(&mut self, by: Side, target: Side, now: Instant) -> bool {
        let Some(snapshot) = &self.snapshot else {
            return false;
        };
        if snapshot.turn != Side::Local {
            debug!("Ignoring shot by {:?}: not our turn", by);
            return false;
        }
        self.executing = true;
        let generation = self.next_generation;
        self.next_generation += 1;
        if let Some(cancelled) = self.animation.replace(ShotAnimation::new(generation, target, now))
        {
            debug!("Shot #{} cancelled by shot #{}", cancelled.generation(), generation);
        }
        self.notable_events.push_back(NotableEvent::ShotgunAimed(target));
        if by == Side::Local {
            self.act(PlayerAction::shoot_at(target));
        }
        true
    }

    pub fn toggle_hide(&mut self) {
        self.hide = !self.hide;
        if self.snapshot.is_some() {
            self.notable_events.push_back(NotableEvent::ViewUpdated);
        }
    }

    // Advances the running shot sequence. Should be called every `REFRESH_INTERVAL` or so.
    pub fn refresh(&mut self, now: Instant) {
        let Some(animation) = &mut self.animation else {
            return;
        };
        let was_aimed = animation.phase() == ShotPhase::Aimed;
        match animation.advance(now, &self.timings) {
            ShotProgress::Pending => {}
            ShotProgress::Lowered => {
                self.notable_events.push_back(NotableEvent::ShotgunLowered);
            }
            ShotProgress::Complete => {
                if was_aimed {
                    self.notable_events.push_back(NotableEvent::ShotgunLowered);
                }
                debug!("Shot #{} complete", animation.generation());
                self.animation = None;
                self.executing = false;
                self.unlock();
            }
        }
    }

    fn send(&mut self, request: ServerRequest) {
        info!("Sending {:?}", request);
        if self.requests_tx.send(request).is_err() {
            warn!("Request channel closed, dropping {:?}", request);
        }
    }
}
