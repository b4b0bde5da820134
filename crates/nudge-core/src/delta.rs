//! The random draw behind each adjustment, and the seam that controls it.

use crate::error::InputError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inclusive lower bound of a drawn magnitude.
pub const MIN_MAGNITUDE: f64 = 0.01;
/// Exclusive upper bound of a drawn magnitude.
pub const MAX_MAGNITUDE: f64 = 0.1;

// ---------------------------------------------------------------------------
// Sign
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sign {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

impl Sign {
    pub fn as_str(self) -> &'static str {
        match self {
            Sign::Plus => "+",
            Sign::Minus => "-",
        }
    }

    pub fn factor(self) -> f64 {
        match self {
            Sign::Plus => 1.0,
            Sign::Minus => -1.0,
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sign {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" | "plus" => Ok(Sign::Plus),
            "-" | "minus" => Ok(Sign::Minus),
            other => Err(InputError::InvalidSign(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Delta
// ---------------------------------------------------------------------------

/// One magnitude/sign pair, shared by every cell touched in a single adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub magnitude: f64,
    pub sign: Sign,
}

impl Delta {
    pub fn new(magnitude: f64, sign: Sign) -> Result<Self, InputError> {
        if !magnitude.is_finite() || magnitude < 0.0 {
            return Err(InputError::InvalidMagnitude(magnitude));
        }
        Ok(Self { magnitude, sign })
    }

    /// `+magnitude` or `-magnitude`.
    pub fn signed(&self) -> f64 {
        self.sign.factor() * self.magnitude
    }

    /// Draw a magnitude uniformly from `[MIN_MAGNITUDE, MAX_MAGNITUDE)` and a fair sign.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let magnitude = rng.gen_range(MIN_MAGNITUDE..MAX_MAGNITUDE);
        let sign = if rng.gen_bool(0.5) {
            Sign::Plus
        } else {
            Sign::Minus
        };
        Self { magnitude, sign }
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.sign, self.magnitude)
    }
}

// ---------------------------------------------------------------------------
// DeltaSource
// ---------------------------------------------------------------------------

/// Where an [`Adjuster`](crate::adjust::Adjuster) gets its delta from.
pub trait DeltaSource {
    fn draw(&mut self) -> Delta;
}

impl<S: DeltaSource + ?Sized> DeltaSource for Box<S> {
    fn draw(&mut self) -> Delta {
        (**self).draw()
    }
}

impl<S: DeltaSource + ?Sized> DeltaSource for &mut S {
    fn draw(&mut self) -> Delta {
        (**self).draw()
    }
}

/// Fresh entropy on every draw.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSource;

impl DeltaSource for ThreadRngSource {
    fn draw(&mut self) -> Delta {
        Delta::sample(&mut rand::thread_rng())
    }
}

/// Reproducible sequence of draws from a fixed seed.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: StdRng,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DeltaSource for SeededSource {
    fn draw(&mut self) -> Delta {
        Delta::sample(&mut self.rng)
    }
}

/// Always yields the same delta.
#[derive(Debug, Clone, Copy)]
pub struct FixedSource(pub Delta);

impl DeltaSource for FixedSource {
    fn draw(&mut self) -> Delta {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
