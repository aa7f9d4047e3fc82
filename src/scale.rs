//! Linear mapping from a data domain onto a pixel range.

use serde::{Deserialize, Serialize};

/// Maps `domain` linearly onto `range`. Values outside the domain are
/// extrapolated unless `clamp` is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
    #[serde(default)]
    pub clamp: bool,
}

impl Default for LinearScale {
    fn default() -> Self {
        Self::new([0.0, 100.0], [0.0, 200.0])
    }
}

impl LinearScale {
    pub const fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            domain,
            range,
            clamp: false,
        }
    }

    pub fn clamped(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    /// Domain value → range value. A degenerate domain maps everything to `range[0]`.
    pub fn map(&self, v: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let t = unit(v, d0, d1, self.clamp);
        r0 + t * (r1 - r0)
    }

    /// Range value → domain value. A degenerate range maps everything to `domain[0]`.
    pub fn invert(&self, y: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let t = unit(y, r0, r1, self.clamp);
        d0 + t * (d1 - d0)
    }

    /// Length of a span of `v` domain units, e.g. a bar width.
    pub fn span(&self, v: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        if d1 == d0 {
            return 0.0;
        }
        v * (r1 - r0) / (d1 - d0)
    }
}

fn unit(v: f64, a: f64, b: f64, clamp: bool) -> f64 {
    let width = b - a;
    if width == 0.0 || !width.is_finite() {
        return 0.0;
    }
    let t = (v - a) / width;
    if clamp {
        t.clamp(0.0, 1.0)
    } else {
        t
    }
}
