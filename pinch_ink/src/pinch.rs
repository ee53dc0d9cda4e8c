//! Pinch-to-toggle detection.
//!
//! A toggle fires on the rising edge of "thumb tip within `threshold` of the
//! index fingertip", and only once the cooldown since the previous toggle has
//! elapsed.  Holding the pinch never re-fires; losing the hand clears the
//! pinched flag without firing.

use std::time::{Duration, Instant};

use hand_landmarks::Hand;
use tracing::debug;

/// Mutable per-session pinch state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PinchState {
    pub is_pinched:  bool,
    /// `None` until the first toggle of the session.
    pub last_toggle: Option<Instant>,
}

/// What the detector made of one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchReading {
    /// Thumb–index distance, `None` when no hand was seen.
    pub distance: Option<f32>,
    pub pinched:  bool,
    /// True on the single frame a toggle fires.
    pub toggled:  bool,
}

/// Edge-triggered pinch detector with a refractory period.
#[derive(Clone, Debug)]
pub struct PinchDetector {
    threshold: f32,
    cooldown:  Duration,
    state:     PinchState,
}

impl PinchDetector {
    pub fn new(threshold: f32, cooldown: Duration) -> Self {
        PinchDetector { threshold, cooldown, state: PinchState::default() }
    }

    pub fn cooldown(&self) -> Duration { self.cooldown }

    /// Cooldown differs per application mode; the controller swaps it.
    pub fn set_cooldown(&mut self, cooldown: Duration) { self.cooldown = cooldown; }

    pub fn state(&self) -> PinchState { self.state }

    /// Feed one frame.  `hand` is the primary hand, if any.
    pub fn update(&mut self, hand: Option<&Hand>, now: Instant) -> PinchReading {
        let Some(hand) = hand else {
            self.state.is_pinched = false;
            return PinchReading { distance: None, pinched: false, toggled: false };
        };

        let distance    = hand.pinch_distance();
        let pinched_now = distance < self.threshold;
        let rising      = pinched_now && !self.state.is_pinched;

        let cooled = match self.state.last_toggle {
            None       => true,
            Some(last) => now.saturating_duration_since(last) > self.cooldown,
        };

        let toggled = rising && cooled;
        if toggled {
            self.state.last_toggle = Some(now);
            debug!(distance, "pinch toggle");
        } else if rising {
            debug!(distance, "pinch ignored inside cooldown");
        }

        // Recorded even when suppressed, so a held pinch cannot fire later.
        self.state.is_pinched = pinched_now;

        PinchReading { distance: Some(distance), pinched: pinched_now, toggled }
    }

    /// Forget everything; called when a detection session ends.
    pub fn reset(&mut self) { self.state = PinchState::default(); }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_landmarks::{landmark, Point, LANDMARK_COUNT};

    fn hand_with_gap(gap: f32) -> Hand {
        let mut pts = [Point::new(0.5, 0.5); LANDMARK_COUNT];
        pts[landmark::THUMB_TIP]        = Point::new(0.40, 0.40);
        pts[landmark::INDEX_FINGER_TIP] = Point::new(0.40 + gap, 0.40);
        Hand::new(pts)
    }

    fn detector() -> PinchDetector { PinchDetector::new(0.03, Duration::from_millis(300)) }

    fn ms(base: Instant, n: u64) -> Instant { base + Duration::from_millis(n) }

    #[test]
    fn no_hand_never_toggles() {
        let mut d = detector();
        let t0 = Instant::now();
        for i in 0..100 {
            let r = d.update(None, ms(t0, i * 16));
            assert!(!r.toggled);
            assert_eq!(r.distance, None);
        }
        assert_eq!(d.state(), PinchState::default());
    }

    #[test]
    fn first_pinch_toggles_once() {
        let mut d = detector();
        let t0 = Instant::now();
        assert!(!d.update(Some(&hand_with_gap(0.10)), t0).toggled);
        assert!( d.update(Some(&hand_with_gap(0.01)), ms(t0, 16)).toggled);
        // Held: no re-fire, even well past the cooldown.
        assert!(!d.update(Some(&hand_with_gap(0.01)), ms(t0, 32)).toggled);
        assert!(!d.update(Some(&hand_with_gap(0.01)), ms(t0, 2_000)).toggled);
    }

    #[test]
    fn second_pinch_inside_cooldown_is_ignored() {
        let mut d = detector();
        let t0 = Instant::now();
        assert!( d.update(Some(&hand_with_gap(0.01)), t0).toggled);
        assert!(!d.update(Some(&hand_with_gap(0.10)), ms(t0, 50)).toggled);
        assert!(!d.update(Some(&hand_with_gap(0.01)), ms(t0, 100)).toggled);
    }

    #[test]
    fn second_pinch_after_cooldown_toggles() {
        let mut d = detector();
        let t0 = Instant::now();
        assert!( d.update(Some(&hand_with_gap(0.01)), t0).toggled);
        assert!(!d.update(Some(&hand_with_gap(0.10)), ms(t0, 100)).toggled);
        assert!( d.update(Some(&hand_with_gap(0.01)), ms(t0, 400)).toggled);
    }

    #[test]
    fn cooldown_boundary_is_exclusive() {
        let mut d = detector();
        let t0 = Instant::now();
        assert!( d.update(Some(&hand_with_gap(0.01)), t0).toggled);
        d.update(Some(&hand_with_gap(0.10)), ms(t0, 100));
        assert!(!d.update(Some(&hand_with_gap(0.01)), ms(t0, 300)).toggled);
    }

    #[test]
    fn pinch_started_inside_cooldown_does_not_fire_late() {
        let mut d = detector();
        let t0 = Instant::now();
        assert!( d.update(Some(&hand_with_gap(0.01)), t0).toggled);
        d.update(Some(&hand_with_gap(0.10)), ms(t0, 50));
        assert!(!d.update(Some(&hand_with_gap(0.01)), ms(t0, 100)).toggled);
        assert!(!d.update(Some(&hand_with_gap(0.01)), ms(t0, 500)).toggled);
    }

    #[test]
    fn hand_lost_mid_pinch_resets_without_toggle() {
        let mut d = detector();
        let t0 = Instant::now();
        assert!(d.update(Some(&hand_with_gap(0.01)), t0).toggled);
        let r = d.update(None, ms(t0, 16));
        assert!(!r.toggled);
        assert!(!d.state().is_pinched);
        // Hand returns pinched after the cooldown: that is a fresh edge.
        assert!(d.update(Some(&hand_with_gap(0.01)), ms(t0, 400)).toggled);
    }

    #[test]
    fn coincident_tips_pinch_without_panicking() {
        let mut d = detector();
        let r = d.update(Some(&hand_with_gap(0.0)), Instant::now());
        assert_eq!(r.distance, Some(0.0));
        assert!(r.pinched && r.toggled);
    }

    #[test]
    fn reset_allows_immediate_toggle() {
        let mut d = detector();
        let t0 = Instant::now();
        assert!(d.update(Some(&hand_with_gap(0.01)), t0).toggled);
        d.reset();
        assert!(d.update(Some(&hand_with_gap(0.01)), ms(t0, 10)).toggled);
    }
}
