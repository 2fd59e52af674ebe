//! Packed middlegame/endgame score pair.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// A middlegame and an endgame value packed into one `i32`.
///
/// The middlegame half lives in the upper 16 bits and the endgame half in the
/// lower 16, so addition and subtraction work directly on the packed value.
/// Reading the middlegame half adds `0x8000` first to undo the borrow a
/// negative endgame half leaves in the upper bits.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Score(i32);

impl Score {
    pub const ZERO: Score = Score(0);

    #[inline]
    pub const fn new(mg: i16, eg: i16) -> Score {
        Score(((mg as i32) << 16).wrapping_add(eg as i32))
    }

    #[inline]
    pub fn mg(self) -> i16 {
        (self.0.wrapping_add(0x8000) >> 16) as i16
    }

    #[inline]
    pub fn eg(self) -> i16 {
        self.0 as i16
    }

    /// Interpolate between the two halves.
    ///
    /// `phase` runs from 0.0 (opening material) to 1.0 (bare endgame); the
    /// fractional part is truncated toward zero.
    #[inline]
    pub fn taper(self, phase: f32) -> i32 {
        let mg = i32::from(self.mg());
        let eg = i32::from(self.eg());
        mg + ((eg - mg) as f32 * phase) as i32
    }
}

/// Shorthand for [`Score::new`], the usual notation in evaluation tables.
#[allow(non_snake_case)]
#[inline]
pub const fn S(mg: i16, eg: i16) -> Score {
    Score::new(mg, eg)
}

impl Add for Score {
    type Output = Score;

    #[inline]
    fn add(self, rhs: Score) -> Score {
        Score(self.0 + rhs.0)
    }
}

impl AddAssign for Score {
    #[inline]
    fn add_assign(&mut self, rhs: Score) {
        self.0 += rhs.0;
    }
}

impl Sub for Score {
    type Output = Score;

    #[inline]
    fn sub(self, rhs: Score) -> Score {
        Score(self.0 - rhs.0)
    }
}

impl SubAssign for Score {
    #[inline]
    fn sub_assign(&mut self, rhs: Score) {
        self.0 -= rhs.0;
    }
}

impl Neg for Score {
    type Output = Score;

    #[inline]
    fn neg(self) -> Score {
        Score::new(-self.mg(), -self.eg())
    }
}

impl Mul<i16> for Score {
    type Output = Score;

    #[inline]
    fn mul(self, rhs: i16) -> Score {
        Score::new(self.mg() * rhs, self.eg() * rhs)
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S({}, {})", self.mg(), self.eg())
    }
}
