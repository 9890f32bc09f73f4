//! Per-frame colour generators.
//!
//! Every effect satisfies the same contract: `start` pins the start time,
//! `frame` overwrites every pixel of the buffer for the given instant and
//! reports whether the effect has finished. Effects never append.

use std::time::{Duration, Instant};

use crate::color::space::{blend_lab, blend_rgb};
use crate::foundation::core::Rgba8;

#[derive(Clone, Debug)]
enum Kind {
    /// Static colour; finishes after `duration` when one is set.
    Solid {
        color: Rgba8,
        duration: Option<Duration>,
    },
    /// Lab-linear ramp between two colours over `duration`.
    ///
    /// With `sample_current` set, the first frame samples pixel 0 of the
    /// buffer as the start colour (alpha forced opaque so an uninitialised
    /// buffer converts cleanly) before ramping.
    Interpolate {
        start_color: Rgba8,
        end_color: Rgba8,
        duration: Duration,
        sample_current: bool,
    },
    /// Endless sinusoidal pulse between two colours.
    Pulse {
        c1: Rgba8,
        c2: Rgba8,
        period: Duration,
    },
}

/// A parameterised colour generator bound to a start time.
#[derive(Clone, Debug)]
pub struct Effect {
    kind: Kind,
    started_at: Option<Instant>,
}

impl Effect {
    /// Static colour that never finishes.
    pub fn solid(color: Rgba8) -> Self {
        Self {
            kind: Kind::Solid {
                color,
                duration: None,
            },
            started_at: None,
        }
    }

    /// Static colour held for `duration`.
    pub fn timed_solid(color: Rgba8, duration: Duration) -> Self {
        Self {
            kind: Kind::Solid {
                color,
                duration: Some(duration),
            },
            started_at: None,
        }
    }

    /// Lab ramp from `start_color` to `end_color` over `duration`.
    pub fn interpolate_solid(start_color: Rgba8, end_color: Rgba8, duration: Duration) -> Self {
        Self {
            kind: Kind::Interpolate {
                start_color,
                end_color,
                duration,
                sample_current: false,
            },
            started_at: None,
        }
    }

    /// Lab ramp from whatever the universe currently shows to `end_color`.
    pub fn interpolate_to_current(end_color: Rgba8, duration: Duration) -> Self {
        Self {
            kind: Kind::Interpolate {
                start_color: Rgba8::BLACK,
                end_color,
                duration,
                sample_current: true,
            },
            started_at: None,
        }
    }

    /// Endless pulse between `c1` and `c2` with the given full-cycle period.
    pub fn pulse(c1: Rgba8, c2: Rgba8, period: Duration) -> Self {
        Self {
            kind: Kind::Pulse { c1, c2, period },
            started_at: None,
        }
    }

    /// Pulse between `color` and a dimmer version of itself.
    ///
    /// `dimming_ratio` 0.0 dims to black, 1.0 keeps the colour. The dim
    /// endpoint shares the colour's chroma, so a straight RGB blend is used
    /// to compute it.
    pub fn dimming_pulse(color: Rgba8, dimming_ratio: f64, period: Duration) -> Self {
        let dim = blend_rgb(color, Rgba8::BLACK, 1.0 - dimming_ratio);
        Self::pulse(color, dim, period)
    }

    /// Pin the effect's start time.
    pub fn start(&mut self, start_time: Instant) {
        self.started_at = Some(start_time);
    }

    /// The hold duration of a solid effect, when it has one.
    pub fn solid_duration(&self) -> Option<Duration> {
        match self.kind {
            Kind::Solid { duration, .. } => duration,
            _ => None,
        }
    }

    /// Rewrite the hold duration of a solid effect. No-op for other kinds.
    pub fn set_solid_duration(&mut self, new_duration: Duration) -> bool {
        if let Kind::Solid { duration, .. } = &mut self.kind {
            *duration = Some(new_duration);
            true
        } else {
            false
        }
    }

    /// Generate one frame into `buf` for instant `now`; returns `true` when
    /// the effect has run its course.
    pub fn frame(&mut self, buf: &mut [Rgba8], now: Instant) -> bool {
        let start = *self.started_at.get_or_insert(now);
        let elapsed = now.saturating_duration_since(start);

        match &mut self.kind {
            Kind::Solid { color, duration } => {
                if let Some(d) = duration {
                    if elapsed >= *d {
                        return true;
                    }
                }
                buf.fill(*color);
                false
            }
            Kind::Interpolate {
                start_color,
                end_color,
                duration,
                sample_current,
            } => {
                if elapsed > *duration {
                    return true;
                }
                if *sample_current {
                    if let Some(first) = buf.first() {
                        let mut sampled = *first;
                        // A zero alpha marks an unwritten buffer; force it
                        // opaque so the Lab conversion sees a real colour.
                        sampled.a = 0xff;
                        *start_color = sampled;
                    }
                    *sample_current = false;
                }
                let completion = if duration.is_zero() {
                    1.0
                } else {
                    elapsed.as_secs_f64() / duration.as_secs_f64()
                };
                buf.fill(blend_lab(*start_color, *end_color, completion));
                false
            }
            Kind::Pulse { c1, c2, period } => {
                let phase = if period.is_zero() {
                    0.0
                } else {
                    (elapsed.as_secs_f64() % period.as_secs_f64()) / period.as_secs_f64()
                };
                let position = (1.0 - (std::f64::consts::TAU * phase).cos()) / 2.0;
                buf.fill(blend_rgb(*c1, *c2, position));
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/effect.rs"]
mod tests;
