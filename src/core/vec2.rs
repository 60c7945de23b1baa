//! Integer Grid Vector
//!
//! 2D vector over grid cells, used for positions, velocities and
//! accelerations. Integer-only so movement is reproducible bit for bit.

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};
use serde::{Serialize, Deserialize};

/// 2D vector with integer components (cells, or cells per turn).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct GridVec2 {
    /// X component (grows to the right)
    pub x: i32,
    /// Y component (grows downward)
    pub y: i32,
}

impl GridVec2 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Unit vector pointing right (+X)
    pub const RIGHT: Self = Self { x: 1, y: 0 };

    /// Unit vector pointing down the screen (+Y)
    pub const DOWN: Self = Self { x: 0, y: 1 };

    /// Unit vector pointing left (-X)
    pub const LEFT: Self = Self { x: -1, y: 0 };

    /// Unit vector pointing up the screen (-Y)
    pub const UP: Self = Self { x: 0, y: -1 };

    /// Create a new vector.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise absolute value.
    #[inline]
    pub fn abs(self) -> Self {
        Self {
            x: self.x.abs(),
            y: self.y.abs(),
        }
    }

    /// Component-wise sign (-1, 0 or 1).
    #[inline]
    pub fn signum(self) -> Self {
        Self {
            x: self.x.signum(),
            y: self.y.signum(),
        }
    }

    /// Chebyshev length: the larger of the absolute components.
    ///
    /// This is the number of steps the rasterizer takes for a velocity.
    #[inline]
    pub fn max_abs(self) -> i32 {
        self.x.abs().max(self.y.abs())
    }

    /// Check if either component is negative.
    #[inline]
    pub fn any_negative(self) -> bool {
        self.x < 0 || self.y < 0
    }

    /// Check if both components are zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Scale by `num / den`, truncating each component toward zero.
    ///
    /// Integer counterpart of `(v * num as f64 / den as f64) as i32`.
    /// `den` must be non-zero.
    #[inline]
    pub fn scale_trunc(self, num: i32, den: i32) -> Self {
        Self {
            x: self.x * num / den,
            y: self.y * num / den,
        }
    }
}

impl Add for GridVec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl AddAssign for GridVec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for GridVec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Neg for GridVec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl From<(i32, i32)> for GridVec2 {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<[i32; 2]> for GridVec2 {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// =============================================================================
// TESTS
// =============================================================================
