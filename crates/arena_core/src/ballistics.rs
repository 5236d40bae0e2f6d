//! Continuous projectile/wall collision and reflection.
//!
//! Projectiles can cross more than their own radius in one tick, so a
//! discrete overlap test would tunnel through thin walls. Instead the
//! segment swept between the previous and current position is clipped
//! against every candidate obstacle; the earliest crossing wins, the
//! contact normal is classified from the rectangle edge it lies on, and
//! velocity is reflected with an energy loss factor.

use serde::{Deserialize, Serialize};

use crate::math::{Fixed, Vec2Fixed};

/// Default restitution: fraction of speed kept per bounce (raw bits of 0.95).
pub const RESTITUTION: Fixed = Fixed::from_bits(0xF333_3333);

/// Edge-classification tolerance in world units (raw bits of 0.5).
const EDGE_EPSILON: Fixed = Fixed::from_bits(0x8000_0000);

/// Extra clearance beyond the projectile radius when pushing a contact
/// point out of a wall (raw bits of 0.5).
const PUSH_EPSILON: Fixed = Fixed::from_bits(0x8000_0000);

/// Displacement components smaller than this (raw bits of 2^-20) are
/// treated as axis-parallel to keep slab divisions in range.
const DELTA_EPSILON: Fixed = Fixed::from_bits(0x1000);

/// An axis-aligned world-space obstacle rectangle.
///
/// Derived 1:1 from wall cells once per map generation and never
/// mutated in place afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Obstacle {
    /// Rectangle center.
    pub center: Vec2Fixed,
    /// Full width.
    #[serde(with = "crate::math::fixed_serde")]
    pub width: Fixed,
    /// Full height.
    #[serde(with = "crate::math::fixed_serde")]
    pub height: Fixed,
}

impl Obstacle {
    /// Create a new obstacle rectangle.
    #[must_use]
    pub const fn new(center: Vec2Fixed, width: Fixed, height: Fixed) -> Self {
        Self {
            center,
            width,
            height,
        }
    }

    /// Left edge x.
    #[must_use]
    pub fn min_x(&self) -> Fixed {
        self.center.x - self.width / Fixed::from_num(2)
    }

    /// Right edge x.
    #[must_use]
    pub fn max_x(&self) -> Fixed {
        self.center.x + self.width / Fixed::from_num(2)
    }

    /// Top edge y.
    #[must_use]
    pub fn min_y(&self) -> Fixed {
        self.center.y - self.height / Fixed::from_num(2)
    }

    /// Bottom edge y.
    #[must_use]
    pub fn max_y(&self) -> Fixed {
        self.center.y + self.height / Fixed::from_num(2)
    }

    /// Whether a point lies inside the rectangle (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Vec2Fixed) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= self.min_y()
            && point.y <= self.max_y()
    }
}

/// One tick of projectile motion, as seen by the reflector.
///
/// Transient input; nothing here is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionSample {
    /// Position at the start of the tick.
    pub prev: Vec2Fixed,
    /// Position at the end of the tick.
    pub cur: Vec2Fixed,
    /// Projectile radius.
    pub radius: Fixed,
    /// Velocity at the end of the tick.
    pub velocity: Vec2Fixed,
}

/// Result of a resolved wall bounce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reflection {
    /// Corrected position, pushed clear of the wall.
    pub position: Vec2Fixed,
    /// Reflected velocity.
    pub velocity: Vec2Fixed,
    /// The contact point on the obstacle boundary.
    pub contact: Vec2Fixed,
    /// Outward unit normal at the contact.
    pub normal: Vec2Fixed,
}

/// Entry time of the swept segment into an obstacle, if any.
///
/// Slab clipping: the segment `origin + t * delta` for `t` in `[0, 1]`
/// is intersected with both axis slabs. Segments starting inside the
/// rectangle report no entry.
fn entry_time(origin: Vec2Fixed, delta: Vec2Fixed, obstacle: &Obstacle) -> Option<Fixed> {
    let mut t_enter = Fixed::MIN;
    let mut t_exit = Fixed::MAX;

    for (pos, d, lo, hi) in [
        (origin.x, delta.x, obstacle.min_x(), obstacle.max_x()),
        (origin.y, delta.y, obstacle.min_y(), obstacle.max_y()),
    ] {
        if d.abs() < DELTA_EPSILON {
            if pos < lo || pos > hi {
                return None;
            }
            continue;
        }
        let t1 = (lo - pos) / d;
        let t2 = (hi - pos) / d;
        let (near, far) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        t_enter = t_enter.max(near);
        t_exit = t_exit.min(far);
    }

    if t_enter > t_exit || t_enter < Fixed::ZERO || t_enter > Fixed::ONE {
        return None;
    }
    Some(t_enter)
}

/// Classify the outward unit normal at a contact point on an obstacle.
///
/// A point lying on exactly one axis-aligned edge (within a small
/// tolerance) takes that edge's outward normal. Corner contacts fall
/// back to the axis with the larger-magnitude offset from the rectangle
/// center.
fn contact_normal(point: Vec2Fixed, obstacle: &Obstacle) -> Vec2Fixed {
    let on_left = (point.x - obstacle.min_x()).abs() < EDGE_EPSILON;
    let on_right = (point.x - obstacle.max_x()).abs() < EDGE_EPSILON;
    let on_top = (point.y - obstacle.min_y()).abs() < EDGE_EPSILON;
    let on_bottom = (point.y - obstacle.max_y()).abs() < EDGE_EPSILON;

    let matches = u32::from(on_left) + u32::from(on_right) + u32::from(on_top) + u32::from(on_bottom);
    if matches == 1 {
        if on_left {
            return Vec2Fixed::new(Fixed::from_num(-1), Fixed::ZERO);
        }
        if on_right {
            return Vec2Fixed::new(Fixed::from_num(1), Fixed::ZERO);
        }
        if on_top {
            return Vec2Fixed::new(Fixed::ZERO, Fixed::from_num(-1));
        }
        return Vec2Fixed::new(Fixed::ZERO, Fixed::from_num(1));
    }

    // Corner (or ambiguous) contact: larger offset from center decides.
    let dx = point.x - obstacle.center.x;
    let dy = point.y - obstacle.center.y;
    if dx.abs() > dy.abs() {
        Vec2Fixed::new(dx.signum(), Fixed::ZERO)
    } else {
        Vec2Fixed::new(Fixed::ZERO, dy.signum())
    }
}

/// Resolve the earliest wall crossing of one tick of projectile motion.
///
/// Scans every obstacle for a swept-segment crossing, keeps the one
/// nearest the previous position, pushes the projectile back out along
/// the contact normal by `radius + ε`, and reflects velocity with
/// `v' = (v − 2(v·n)n) × restitution`. Returns `None` when nothing was
/// crossed, or when the tick had zero displacement.
#[must_use]
pub fn reflect_projectile(
    sample: &MotionSample,
    obstacles: &[Obstacle],
    restitution: Fixed,
) -> Option<Reflection> {
    let delta = sample.cur - sample.prev;
    if delta == Vec2Fixed::ZERO {
        return None;
    }

    let mut earliest: Option<(Fixed, &Obstacle)> = None;
    for obstacle in obstacles {
        if let Some(t) = entry_time(sample.prev, delta, obstacle) {
            let closer = match earliest {
                Some((best, _)) => t < best,
                None => true,
            };
            if closer {
                earliest = Some((t, obstacle));
            }
        }
    }

    let (t, obstacle) = earliest?;
    let contact = sample.prev + delta.scale(t);
    let normal = contact_normal(contact, obstacle);

    let position = contact + normal.scale(sample.radius + PUSH_EPSILON);
    let dot = sample.velocity.dot(normal);
    let velocity = (sample.velocity - normal.scale(dot * Fixed::from_num(2))).scale(restitution);

    Some(Reflection {
        position,
        velocity,
        contact,
        normal,
    })
}

/// Nudge a spawn point clear of any obstacle it overlaps.
///
/// Used when a projectile activates ahead of a muzzle that sits close
/// to wall geometry: the point is moved out through the nearest edge of
/// each containing rectangle, offset by the projectile radius.
#[must_use]
pub fn push_out_of_obstacles(
    point: Vec2Fixed,
    radius: Fixed,
    obstacles: &[Obstacle],
) -> Vec2Fixed {
    let mut safe = point;
    for obstacle in obstacles {
        if !obstacle.contains(safe) {
            continue;
        }
        let to_left = safe.x - obstacle.min_x();
        let to_right = obstacle.max_x() - safe.x;
        let to_top = safe.y - obstacle.min_y();
        let to_bottom = obstacle.max_y() - safe.y;

        let min_dist = to_left.min(to_right).min(to_top).min(to_bottom);
        if min_dist == to_left {
            safe.x = obstacle.min_x() - radius;
        } else if min_dist == to_right {
            safe.x = obstacle.max_x() + radius;
        } else if min_dist == to_top {
            safe.y = obstacle.min_y() - radius;
        } else {
            safe.y = obstacle.max_y() + radius;
        }
    }
    safe
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(n: i32) -> Fixed {
        Fixed::from_num(n)
    }

    fn fixed_f(n: f64) -> Fixed {
        Fixed::from_num(n)
    }

    fn vec2(x: i32, y: i32) -> Vec2Fixed {
        Vec2Fixed::new(fixed(x), fixed(y))
    }

    fn tile_obstacle(center_x: i32, center_y: i32) -> Obstacle {
        Obstacle::new(vec2(center_x, center_y), fixed(32), fixed(32))
    }

    fn epsilon() -> Fixed {
        Fixed::from_num(1) / Fixed::from_num(1000)
    }

    #[test]
    fn test_head_on_reflection_negates_normal_component() {
        // Wall tile spanning x in [100, 132]; shot travelling +x along its center row
        let wall = tile_obstacle(116, 16);
        let sample = MotionSample {
            prev: vec2(80, 16),
            cur: vec2(110, 16),
            radius: fixed(4),
            velocity: vec2(250, 0),
        };

        let reflection = reflect_projectile(&sample, &[wall], RESTITUTION).unwrap();

        assert_eq!(reflection.normal, vec2(-1, 0));
        // Normal component negated and scaled by restitution
        assert!((reflection.velocity.x - fixed_f(-237.5)).abs() < epsilon());
        // Tangential component was zero and stays zero
        assert_eq!(reflection.velocity.y, Fixed::ZERO);
        // Contact lies on the left face
        assert!((reflection.contact.x - fixed(100)).abs() < epsilon());
        // Pushed back out along the normal by radius + clearance
        assert!(reflection.position.x < fixed(100) - sample.radius);
    }

    #[test]
    fn test_oblique_reflection_keeps_tangential_direction() {
        let wall = tile_obstacle(116, 16);
        // Perfectly elastic so the tangential component must be bit-preserved
        let sample = MotionSample {
            prev: vec2(80, 0),
            cur: vec2(110, 30),
            radius: fixed(4),
            velocity: vec2(200, 200),
        };

        let reflection = reflect_projectile(&sample, &[wall], Fixed::ONE).unwrap();

        assert_eq!(reflection.normal, vec2(-1, 0));
        assert_eq!(reflection.velocity.x, fixed(-200));
        assert_eq!(reflection.velocity.y, fixed(200));
    }

    #[test]
    fn test_earliest_obstacle_wins() {
        let near = tile_obstacle(116, 16);
        let far = tile_obstacle(216, 16);
        let sample = MotionSample {
            prev: vec2(0, 16),
            cur: vec2(300, 16),
            radius: fixed(4),
            velocity: vec2(250, 0),
        };

        // Listed far-first to make sure selection is by distance, not order
        let reflection = reflect_projectile(&sample, &[far, near], RESTITUTION).unwrap();
        assert!((reflection.contact.x - fixed(100)).abs() < epsilon());
    }

    #[test]
    fn test_zero_displacement_is_ignored() {
        let wall = tile_obstacle(16, 16);
        let sample = MotionSample {
            prev: vec2(16, 16),
            cur: vec2(16, 16),
            radius: fixed(4),
            velocity: Vec2Fixed::ZERO,
        };
        assert!(reflect_projectile(&sample, &[wall], RESTITUTION).is_none());
    }

    #[test]
    fn test_miss_returns_none() {
        let wall = tile_obstacle(116, 116);
        let sample = MotionSample {
            prev: vec2(0, 16),
            cur: vec2(300, 16),
            radius: fixed(4),
            velocity: vec2(250, 0),
        };
        assert!(reflect_projectile(&sample, &[wall], RESTITUTION).is_none());
    }

    #[test]
    fn test_corner_contact_uses_larger_offset() {
        let wall = tile_obstacle(116, 116);
        // Diagonal shot aimed exactly at the top-left corner (100, 100)
        let sample = MotionSample {
            prev: vec2(80, 80),
            cur: vec2(120, 120),
            radius: fixed(4),
            velocity: vec2(100, 100),
        };

        let reflection = reflect_projectile(&sample, &[wall], RESTITUTION).unwrap();
        // Exact corner: both offsets tie at half extent, the fallback
        // must still produce an axis-aligned unit normal.
        let n = reflection.normal;
        let axis_unit = (n.x.abs() == Fixed::ONE && n.y == Fixed::ZERO)
            || (n.y.abs() == Fixed::ONE && n.x == Fixed::ZERO);
        assert!(axis_unit, "normal should be an axis unit vector, got {n:?}");
    }

    #[test]
    fn test_vertical_shot_hits_horizontal_face() {
        let wall = tile_obstacle(16, 116);
        let sample = MotionSample {
            prev: vec2(16, 60),
            cur: vec2(16, 110),
            radius: fixed(4),
            velocity: vec2(0, 250),
        };

        let reflection = reflect_projectile(&sample, &[wall], RESTITUTION).unwrap();
        assert_eq!(reflection.normal, vec2(0, -1));
        assert!(reflection.velocity.y < Fixed::ZERO);
        assert_eq!(reflection.velocity.x, Fixed::ZERO);
    }

    #[test]
    fn test_push_out_of_obstacles() {
        let wall = tile_obstacle(116, 116);
        // Point just inside the left face
        let inside = vec2(101, 116);
        let safe = push_out_of_obstacles(inside, fixed(4), &[wall]);
        assert_eq!(safe, Vec2Fixed::new(fixed(100) - fixed(4), fixed(116)));

        // Points outside are untouched
        let outside = vec2(50, 50);
        assert_eq!(push_out_of_obstacles(outside, fixed(4), &[wall]), outside);
    }

    #[test]
    fn test_obstacle_extents() {
        let wall = tile_obstacle(116, 16);
        assert_eq!(wall.min_x(), fixed(100));
        assert_eq!(wall.max_x(), fixed(132));
        assert!(wall.contains(vec2(100, 16)));
        assert!(!wall.contains(vec2(99, 16)));
    }
}
