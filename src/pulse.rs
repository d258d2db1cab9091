use std::time::Instant;

use crate::config::PulseConfig;
use crate::detector::HitEvent;

/// Scale of an element that jumps up on every hit and falls back to rest
/// (`1.0`) within the configured duration.
///
/// Only one pulse is alive at a time: a new hit restarts the pulse with the
/// new power.
#[derive(Debug, Clone)]
pub struct PulseAnimator {
    config: PulseConfig,
    active: Option<Pulse>,
}

#[derive(Debug, Clone, Copy)]
struct Pulse {
    started: Instant,
    peak: f32,
}

impl PulseAnimator {
    pub fn new(config: PulseConfig) -> Self {
        Self {
            config,
            active: None,
        }
    }

    pub fn trigger(&mut self, hit: HitEvent, now: Instant) {
        self.active = Some(Pulse {
            started: now,
            peak: self.peak_scale(hit.power),
        });
    }

    /// Peak scale reached by a hit of the given power (0 - 255).
    pub fn peak_scale(&self, power: f32) -> f32 {
        let strength = (power / 255.).clamp(0., 1.);
        1. + (self.config.max_scale - 1.) * strength
    }

    pub fn scale_at(&self, now: Instant) -> f32 {
        let Some(pulse) = self.active else {
            return 1.;
        };

        let duration = self.config.duration();
        let elapsed = now.saturating_duration_since(pulse.started);
        if elapsed >= duration {
            return 1.;
        }

        let remaining = 1. - elapsed.as_secs_f32() / duration.as_secs_f32();
        1. + (pulse.peak - 1.) * remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn animator() -> PulseAnimator {
        PulseAnimator::new(PulseConfig::default())
    }

    #[test]
    fn rests_without_hits() {
        let animator = animator();
        let now = Instant::now();

        assert_eq!(animator.scale_at(now), 1.);
    }

    #[test]
    fn peak_grows_with_power_and_is_clamped() {
        let animator = animator();
        let max = PulseConfig::default().max_scale;

        assert!(animator.peak_scale(170.) < animator.peak_scale(220.));
        assert_eq!(animator.peak_scale(255.), max);
        assert_eq!(animator.peak_scale(1000.), max);
    }

    #[test]
    fn decays_back_to_rest_within_duration() {
        let mut animator = animator();
        let start = Instant::now();
        animator.trigger(HitEvent { power: 255. }, start);

        let peak = animator.scale_at(start);
        let halfway = animator.scale_at(start + Duration::from_millis(60));
        let end = animator.scale_at(start + Duration::from_millis(120));

        assert_eq!(peak, PulseConfig::default().max_scale);
        assert!(1. < halfway && halfway < peak);
        assert_eq!(end, 1.);
    }

    #[test]
    fn new_hit_restarts_with_new_power() {
        let mut animator = animator();
        let start = Instant::now();

        animator.trigger(HitEvent { power: 255. }, start);
        let later = start + Duration::from_millis(100);
        animator.trigger(HitEvent { power: 170. }, later);

        assert_eq!(animator.scale_at(later), animator.peak_scale(170.));
        // the first pulse would be over by now, the restarted one isn't
        assert!(animator.scale_at(start + Duration::from_millis(150)) > 1.);
    }
}
