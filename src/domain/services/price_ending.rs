//! Price-ending snapping and small numeric helpers.
//!
//! Every price the optimizer emits is a value of the form `n + ending`
//! (for example `84.99`) rounded to cents, or a plain cent-rounded price when
//! snapping is disabled.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction used when snapping a price onto the `.ending` grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndingPolicy {
    /// Largest `.ending` price at or below `p`.
    #[default]
    Down,
    /// Smallest `.ending` price strictly above `p`.
    Up,
    /// Closer of the down/up candidates; ties go up.
    Nearest,
}

impl EndingPolicy {
    /// Resolves a policy name, case-insensitive. Unknown names map to `Down`.
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or_default()
    }

    /// Strict variant of [`EndingPolicy::from_name`].
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "down" => Some(EndingPolicy::Down),
            "up" => Some(EndingPolicy::Up),
            "nearest" => Some(EndingPolicy::Nearest),
            _ => None,
        }
    }
}

impl fmt::Display for EndingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndingPolicy::Down => write!(f, "down"),
            EndingPolicy::Up => write!(f, "up"),
            EndingPolicy::Nearest => write!(f, "nearest"),
        }
    }
}

/// Two-decimal rounding, half to even (0.125 -> 0.12, 0.375 -> 0.38).
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[inline]
pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    x.max(lo).min(hi)
}

fn snap_down(p: f64, ending: f64) -> f64 {
    let base = p.floor();
    let snapped = base + ending;
    if snapped > p {
        // never below the ending itself
        ending.max(base - 1.0 + ending)
    } else {
        snapped
    }
}

fn snap_up(p: f64, ending: f64) -> f64 {
    let up_base = p.ceil();
    let snapped = up_base + ending;
    if snapped <= p {
        up_base + 1.0 + ending
    } else {
        snapped
    }
}

/// Snaps `p` onto the `n + ending` grid according to `policy`, rounded to cents.
pub fn round_to_price_ending(p: f64, ending: f64, policy: EndingPolicy) -> f64 {
    let snapped = match policy {
        EndingPolicy::Down => snap_down(p, ending),
        EndingPolicy::Up => snap_up(p, ending),
        EndingPolicy::Nearest => {
            let down = snap_down(p, ending);
            let up = snap_up(p, ending);
            if (p - down).abs() < (up - p).abs() {
                down
            } else {
                up
            }
        }
    };
    round2(snapped)
}
