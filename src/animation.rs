use std::time::Duration;

use instant::Instant;

use crate::side::Side;


// Time from the start of a shot until the shotgun goes back to rest.
pub const SHOT_RETURN_DELAY: Duration = Duration::from_millis(3000);
// Time from the start of a shot until the client unlocks the server.
pub const SHOT_COMPLETE_DELAY: Duration = Duration::from_millis(5000);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ShotTimings {
    pub return_delay: Duration,
    pub complete_delay: Duration,
}

impl Default for ShotTimings {
    fn default() -> Self {
        ShotTimings {
            return_delay: SHOT_RETURN_DELAY,
            complete_delay: SHOT_COMPLETE_DELAY,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ShotPhase {
    Aimed,
    AtRest,
}

#[must_use]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ShotProgress {
    // Nothing to do yet.
    Pending,
    // The shotgun should be rotated back to rest.
    Lowered,
    // The animation is over: unlock the server and clear the `executing` guard.
    Complete,
}

// One shot sequence. Each sequence gets a fresh generation number; a client keeps at most one
// sequence alive, so replacing it cancels whatever the old one still had scheduled.
#[derive(Clone, Debug)]
pub struct ShotAnimation {
    generation: u64,
    target: Side,
    started_at: Instant,
    phase: ShotPhase,
}

impl ShotAnimation {
    pub fn new(generation: u64, target: Side, now: Instant) -> Self {
        ShotAnimation {
            generation,
            target,
            started_at: now,
            phase: ShotPhase::Aimed,
        }
    }

    pub fn generation(&self) -> u64 { self.generation }
    pub fn target(&self) -> Side { self.target }
    pub fn phase(&self) -> ShotPhase { self.phase }

    // Rotation of the shotgun sprite while aimed, in degrees.
    pub fn aim_rotation(target: Side) -> i32 {
        match target {
            Side::Local => 90,
            Side::Opponent => -90,
        }
    }

    pub fn advance(&mut self, now: Instant, timings: &ShotTimings) -> ShotProgress {
        let elapsed = if now > self.started_at {
            now.duration_since(self.started_at)
        } else {
            Duration::ZERO
        };
        if elapsed >= timings.complete_delay {
            self.phase = ShotPhase::AtRest;
            ShotProgress::Complete
        } else if elapsed >= timings.return_delay && self.phase == ShotPhase::Aimed {
            self.phase = ShotPhase::AtRest;
            ShotProgress::Lowered
        } else {
            ShotProgress::Pending
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_follow_timings() {
        let t0 = Instant::now();
        let timings = ShotTimings::default();
        let at = |millis| t0 + Duration::from_millis(millis);
        let mut shot = ShotAnimation::new(1, Side::Opponent, t0);
        assert_eq!(shot.advance(at(2999), &timings), ShotProgress::Pending);
        assert_eq!(shot.advance(at(3000), &timings), ShotProgress::Lowered);
        assert_eq!(shot.phase(), ShotPhase::AtRest);
        assert_eq!(shot.advance(at(4000), &timings), ShotProgress::Pending);
        assert_eq!(shot.advance(at(5000), &timings), ShotProgress::Complete);
    }

    #[test]
    fn late_refresh_completes_directly() {
        let t0 = Instant::now();
        let mut shot = ShotAnimation::new(1, Side::Local, t0);
        assert_eq!(
            shot.advance(t0 + Duration::from_secs(10), &ShotTimings::default()),
            ShotProgress::Complete
        );
    }

    #[test]
    fn aim_direction() {
        assert_eq!(ShotAnimation::aim_rotation(Side::Local), 90);
        assert_eq!(ShotAnimation::aim_rotation(Side::Opponent), -90);
    }
}
