//! Fixed-point math utilities for deterministic simulation.
//!
//! All simulation state uses fixed-point arithmetic so that a given
//! seed always reproduces the same arena and the same fight, tick for
//! tick. Headings are stored as fixed-point radians; the trigonometric
//! conversions at the edges go through `f32`, which is stable for a
//! single build of the simulation.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// π as a fixed-point constant (raw I32F32 bits).
pub const PI: Fixed = Fixed::from_bits(0x3_243F_6A88);

/// 2π as a fixed-point constant (raw I32F32 bits).
pub const TAU: Fixed = Fixed::from_bits(0x6_487E_D511);

/// √2 as a fixed-point constant (raw I32F32 bits).
pub const SQRT_2: Fixed = Fixed::from_bits(0x1_6A09_E667);

/// Fixed-point 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Serde support for `Option<Fixed>`.
///
/// Serializes optional fixed-point numbers via their raw bit representation,
/// preserving `None` as a serialized `None` value.
pub mod option_fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize an optional fixed-point number.
    pub fn serialize<S>(value: &Option<Fixed>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => v.to_bits().serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional fixed-point number.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<i64>::deserialize(deserializer)?;
        Ok(opt.map(Fixed::from_bits))
    }
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Calculate squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Calculate Euclidean distance.
    #[must_use]
    pub fn distance(self, other: Self) -> Fixed {
        fixed_sqrt(self.distance_squared(other))
    }

    /// Vector length.
    #[must_use]
    pub fn length(self) -> Fixed {
        fixed_sqrt(self.dot(self))
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> Fixed {
        self.x * other.x + self.y * other.y
    }

    /// Linearly interpolate between two vectors.
    #[must_use]
    pub fn lerp(self, other: Self, t: Fixed) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Scale by a scalar.
    #[must_use]
    pub fn scale(self, factor: Fixed) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Normalize vector using fixed-point math.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len_sq = self.dot(self);

        if len_sq == Fixed::ZERO {
            return Self::ZERO;
        }

        let len = fixed_sqrt(len_sq);
        if len == Fixed::ZERO {
            return Self::ZERO;
        }

        Self::new(self.x / len, self.y / len)
    }
}

/// Computes the square root of a fixed-point number using binary search.
#[must_use]
pub fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    let mut low = Fixed::ZERO;
    let mut high = if value > Fixed::from_num(1) {
        value
    } else {
        Fixed::from_num(1)
    };

    for _ in 0..32 {
        let mid = (low + high) / Fixed::from_num(2);
        let mid_sq = mid.saturating_mul(mid);

        if mid_sq <= value {
            low = mid;
        } else {
            high = mid;
        }
    }

    low
}

/// Wrap an angle into the `(-π, π]` range.
#[must_use]
pub fn wrap_angle(angle: Fixed) -> Fixed {
    let mut a = angle;
    while a > PI {
        a -= TAU;
    }
    while a <= -PI {
        a += TAU;
    }
    a
}

/// Heading (radians) of the vector pointing from `from` to `to`.
///
/// Zero heading points along +x; the degenerate `from == to` case
/// returns zero.
#[must_use]
pub fn heading_between(from: Vec2Fixed, to: Vec2Fixed) -> Fixed {
    let dx = (to.x - from.x).to_num::<f32>();
    let dy = (to.y - from.y).to_num::<f32>();
    Fixed::from_num(dy.atan2(dx))
}

/// Unit vector pointing along a heading (radians).
#[must_use]
pub fn unit_from_heading(heading: Fixed) -> Vec2Fixed {
    let rad = heading.to_num::<f32>();
    Vec2Fixed::new(Fixed::from_num(rad.cos()), Fixed::from_num(rad.sin()))
}

/// Convert degrees to fixed-point radians.
#[must_use]
pub fn deg_to_rad(degrees: Fixed) -> Fixed {
    degrees * PI / Fixed::from_num(180)
}

impl std::ops::Add for Vec2Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Neg for Vec2Fixed {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_distance_squared() {
        let a = Vec2Fixed::new(Fixed::from_num(3), Fixed::from_num(0));
        let b = Vec2Fixed::new(Fixed::from_num(0), Fixed::from_num(4));
        // 3² + 4² = 25
        assert_eq!(a.distance_squared(b), Fixed::from_num(25));
    }

    #[test]
    fn test_vec2_distance() {
        let a = Vec2Fixed::ZERO;
        let b = Vec2Fixed::new(Fixed::from_num(3), Fixed::from_num(4));
        let epsilon = Fixed::from_num(1) / Fixed::from_num(10000);
        assert!((a.distance(b) - Fixed::from_num(5)).abs() < epsilon);
    }

    #[test]
    fn test_fixed_determinism() {
        // Same operations must produce identical results
        let a = Fixed::from_num(1) / Fixed::from_num(3);
        let b = Fixed::from_num(1) / Fixed::from_num(3);
        assert_eq!(a, b);

        let result1 = a * Fixed::from_num(7);
        let result2 = b * Fixed::from_num(7);
        assert_eq!(result1, result2);
    }

    #[test]
    fn test_vec2_dot() {
        let a = Vec2Fixed::new(Fixed::from_num(2), Fixed::from_num(3));
        let b = Vec2Fixed::new(Fixed::from_num(4), Fixed::from_num(-1));
        assert_eq!(a.dot(b), Fixed::from_num(5));
    }

    #[test]
    fn test_vec2_normalize() {
        let v = Vec2Fixed::new(Fixed::from_num(3), Fixed::from_num(4));
        let norm = v.normalize();

        let len_sq = norm.dot(norm);
        let one = Fixed::from_num(1);
        let epsilon = one / Fixed::from_num(10000);
        assert!(
            (len_sq - one).abs() < epsilon,
            "normalized vector length² should be ~1, got {len_sq:?}"
        );
    }

    #[test]
    fn test_angle_constants() {
        let epsilon = Fixed::from_num(1) / Fixed::from_num(100_000);
        assert!((PI * Fixed::from_num(2) - TAU).abs() < epsilon);
        assert!((SQRT_2 * SQRT_2 - Fixed::from_num(2)).abs() < epsilon);
    }

    #[test]
    fn test_wrap_angle() {
        let epsilon = Fixed::from_num(1) / Fixed::from_num(1000);
        assert_eq!(wrap_angle(Fixed::ZERO), Fixed::ZERO);
        // 3π wraps to π
        assert!((wrap_angle(PI * Fixed::from_num(3)) - PI).abs() < epsilon);
        // -3π/2 wraps to π/2
        let three_half = -PI * Fixed::from_num(3) / Fixed::from_num(2);
        let half = PI / Fixed::from_num(2);
        assert!((wrap_angle(three_half) - half).abs() < epsilon);
    }

    #[test]
    fn test_heading_between() {
        let epsilon = Fixed::from_num(1) / Fixed::from_num(1000);
        let origin = Vec2Fixed::ZERO;
        let east = Vec2Fixed::new(Fixed::from_num(10), Fixed::ZERO);
        let south = Vec2Fixed::new(Fixed::ZERO, Fixed::from_num(10));

        assert!(heading_between(origin, east).abs() < epsilon);
        let quarter = PI / Fixed::from_num(2);
        assert!((heading_between(origin, south) - quarter).abs() < epsilon);
        // Degenerate zero-length case
        assert_eq!(heading_between(origin, origin), Fixed::ZERO);
    }

    #[test]
    fn test_unit_from_heading_roundtrip() {
        let epsilon = Fixed::from_num(1) / Fixed::from_num(1000);
        let heading = deg_to_rad(Fixed::from_num(37));
        let unit = unit_from_heading(heading);
        let back = heading_between(Vec2Fixed::ZERO, unit);
        assert!((back - heading).abs() < epsilon);
    }
}
