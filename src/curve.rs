//! Analog response curve.
//!
//! Raw analog samples arrive as unsigned bytes (`0..=255`, center near 128)
//! and have to be reported as signed 16-bit axis positions. The shape of
//! that mapping is defined by a cubic Bezier curve over four control
//! points; [`CurveTable::build`] evaluates the curve once for the upper
//! half of the byte range and mirrors it, producing a 256-entry lookup
//! table that is immutable afterwards and cheap to share.

use serde::{Deserialize, Serialize};

/// One control point of the cubic Bezier response curve.
///
/// `x` is in raw-sample units (half range, `0..=128`), `y` in output axis
/// units. The default curve runs from `(0, 0)` to `(128, 32767)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub x: i32,
    pub y: i32,
}

impl ControlPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

// Truncating integer lerp; rounding toward zero is part of the table's
// stable output, so no round-to-nearest here.
fn lerp(first: ControlPoint, second: ControlPoint, t: f32) -> ControlPoint {
    ControlPoint {
        x: first.x + ((second.x - first.x) as f32 * t) as i32,
        y: first.y + ((second.y - first.y) as f32 * t) as i32,
    }
}

// De Casteljau evaluation of the curve's y coordinate at t in [0, 1].
fn bezier_y(a: ControlPoint, b: ControlPoint, c: ControlPoint, d: ControlPoint, t: f32) -> i32 {
    let ab = lerp(a, b, t);
    let bc = lerp(b, c, t);
    let cd = lerp(c, d, t);
    let abbc = lerp(ab, bc, t);
    let bccd = lerp(bc, cd, t);
    lerp(abbc, bccd, t).y
}

/// Precomputed raw-byte to axis-value mapping.
///
/// The table is antisymmetric around the byte midpoint:
/// `lookup(255 - i) == -lookup(i)` for every `i`. The lower half is
/// defined as the negation of the evaluated upper half rather than a
/// second curve evaluation, which guarantees a clean zero crossing at the
/// center regardless of float rounding inside the evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurveTable {
    table: [i16; 256],
}

impl CurveTable {
    /// Build the table from four control points. Never fails; control
    /// points whose `y` leaves `-32768..=32767` wrap on the cast and are
    /// a configuration mistake, not a runtime condition.
    pub fn build(a: ControlPoint, b: ControlPoint, c: ControlPoint, d: ControlPoint) -> Self {
        let mut table = [0i16; 256];
        for i in 0..128usize {
            let t = i as f32 / 127.0;
            let y = bezier_y(a, b, c, d, t) as i16;
            table[i + 128] = y;
            table[127 - i] = -y;
        }
        Self { table }
    }

    /// Axis value for one raw sample byte.
    #[inline]
    pub fn lookup(&self, raw: u8) -> i16 {
        self.table[raw as usize]
    }
}

impl Default for CurveTable {
    /// Linear response over the full axis range.
    ///
    /// The two inner control points coincide with the terminal anchor, a
    /// degenerate but valid Bezier that keeps the response close to
    /// linear for pads with plenty of analog travel.
    fn default() -> Self {
        Self::build(
            ControlPoint::new(0, 0),
            ControlPoint::new(0, 0),
            ControlPoint::new(128, 32767),
            ControlPoint::new(128, 32767),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn antisymmetric_around_midpoint() {
        let table = CurveTable::default();
        for i in 0..=255u8 {
            assert_eq!(
                table.lookup(255 - i),
                -table.lookup(i),
                "mirror mismatch at raw byte {i}"
            );
        }
    }

    #[test]
    fn endpoints_reach_full_range() {
        let table = CurveTable::default();
        assert_eq!(table.lookup(255), 32767);
        assert_eq!(table.lookup(0), -32767);
        assert_eq!(table.lookup(0), -table.lookup(255));
        for i in 0..=255u8 {
            assert!(table.lookup(i).unsigned_abs() <= 32767);
        }
    }

    #[test]
    fn zero_crossing_at_center() {
        let table = CurveTable::default();
        assert_eq!(table.lookup(127), 0);
        assert_eq!(table.lookup(128), 0);
    }

    #[test]
    fn default_curve_is_monotonic_on_upper_half() {
        let table = CurveTable::default();
        for i in 128..255u8 {
            assert!(
                table.lookup(i + 1) >= table.lookup(i),
                "dip between {} and {}",
                i,
                i + 1
            );
        }
    }

    #[test]
    fn custom_shape_keeps_antisymmetry() {
        // Soft center, steep edge, as a non-linear deadzone curve would use.
        let table = CurveTable::build(
            ControlPoint::new(0, 0),
            ControlPoint::new(96, 0),
            ControlPoint::new(128, 32767),
            ControlPoint::new(128, 32767),
        );
        for i in 0..=255u8 {
            assert_eq!(table.lookup(255 - i), -table.lookup(i));
        }
        assert_eq!(table.lookup(255), 32767);
        assert_eq!(table.lookup(128), 0);
    }
}
