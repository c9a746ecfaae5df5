//! Idle behaviour: when to speak up unprompted, and what to say.

use rand::Rng;
use std::time::Duration;

pub const IDLE_THOUGHTS: [&str; 8] = [
    "I wonder what clouds taste like... do you think they're sweet? ☁️",
    "Do you have a favorite animal? I want to learn about animals!",
    "What's the coolest thing you saw today? 🌟",
    "I was thinking about stars... have you ever seen a shooting star?",
    "Do you like to read books? What's your favorite story?",
    "I'm curious... what makes you laugh the most? 😄",
    "If you could have any superpower, what would it be?",
    "Do you have any pets? I'd love to hear about them! 🐕",
];

/// A time-gated coin flip.
#[derive(Debug, Clone, Copy)]
pub struct IdlePolicy {
    /// Silence must last longer than this
    pub threshold: Duration,
    /// Chance of speaking once past the threshold
    pub probability: f64,
}

impl Default for IdlePolicy {
    fn default() -> Self {
        Self {
            threshold: Duration::from_secs(30),
            probability: 0.3,
        }
    }
}

impl IdlePolicy {
    pub fn should_speak_up(&self, idle_for: Duration) -> bool {
        let roll = rand::rng().random::<f64>();
        self.decide(idle_for, roll)
    }

    /// Deterministic core: `roll` is a uniform sample from `[0, 1)`.
    pub fn decide(&self, idle_for: Duration, roll: f64) -> bool {
        idle_for > self.threshold && roll < self.probability
    }
}

/// One canned thought, uniformly at random.
pub fn idle_thought() -> &'static str {
    let idx = rand::rng().random_range(0..IDLE_THOUGHTS.len());
    IDLE_THOUGHTS[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_before_threshold() {
        let policy = IdlePolicy::default();
        assert!(!policy.decide(Duration::from_secs(29), 0.0));
        assert!(!policy.decide(Duration::from_secs(30), 0.0));
        for _ in 0..100 {
            assert!(!policy.should_speak_up(Duration::from_secs(5)));
        }
    }

    #[test]
    fn past_threshold_depends_on_roll() {
        let policy = IdlePolicy::default();
        let idle = Duration::from_secs(31);
        assert!(policy.decide(idle, 0.29));
        assert!(!policy.decide(idle, 0.3));
        assert!(!policy.decide(idle, 0.9));
    }

    #[test]
    fn roughly_thirty_percent_when_idle() {
        let policy = IdlePolicy::default();
        let hits = (0..10_000)
            .filter(|_| policy.should_speak_up(Duration::from_secs(60)))
            .count();
        assert!((2_500..3_500).contains(&hits), "got {hits}");
    }

    #[test]
    fn thoughts_come_from_the_list() {
        for _ in 0..50 {
            assert!(IDLE_THOUGHTS.contains(&idle_thought()));
        }
    }
}
