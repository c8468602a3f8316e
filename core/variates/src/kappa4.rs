//! Four-parameter kappa distribution
//!
//! Sampled by inverse transform of its closed-form quantile function.

use rand::Rng;
use rand_distr::{Distribution, Open01};

use crate::VariateError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kappa4 {
    h: f64,
    k: f64,
    loc: f64,
    scale: f64,
}

impl Kappa4 {
    pub fn new(h: f64, k: f64, loc: f64, scale: f64) -> Result<Self, VariateError> {
        if !(h.is_finite() && k.is_finite() && loc.is_finite()) {
            return Err(VariateError::InvalidParameters {
                distribution: "kappa4",
                reason: format!("non-finite shape or location (h={h}, k={k}, loc={loc})"),
            });
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(VariateError::InvalidParameters {
                distribution: "kappa4",
                reason: format!("scale must be positive, got {scale}"),
            });
        }

        Ok(Self { h, k, loc, scale })
    }

    /// Quantile function, `u` in (0, 1)
    pub fn quantile(&self, u: f64) -> f64 {
        let (h, k) = (self.h, self.k);
        let standard = match (h != 0.0, k != 0.0) {
            (true, true) => (1.0 - ((1.0 - u.powf(h)) / h).powf(k)) / k,
            (true, false) => -((1.0 - u.powf(h)) / h).ln(),
            (false, true) => (1.0 - (-u.ln()).powf(k)) / k,
            (false, false) => -(-u.ln()).ln(),
        };
        self.loc + self.scale * standard
    }
}

impl Distribution<f64> for Kappa4 {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u: f64 = rng.sample(Open01);
        self.quantile(u)
    }
}
