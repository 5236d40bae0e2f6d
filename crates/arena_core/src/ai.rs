//! Enemy decision engine: periodic behavior selection, per-frame
//! steering, and fire gating.
//!
//! AI runs on two independent cadences. The slow decision tick picks a
//! behavior (chase, roam, or idle) and a movement target, requesting a
//! route from the pathfinder when chasing. The per-frame steering tick
//! turns the hull toward the current waypoint at a capped angular rate
//! and scales drive speed down while the hull is still turning, which
//! produces turn-then-drive motion instead of instant reorientation.
//!
//! Everything here is free functions over plain data plus read-only
//! spatial queries; there is no entity base class to inherit from.

use serde::{Deserialize, Serialize};

use crate::components::EntitySnapshot;
use crate::grid::OccupancyGrid;
use crate::math::{deg_to_rad, heading_between, wrap_angle, Fixed, Vec2Fixed, PI};
use crate::rng::SeededPrng;

/// Read-only spatial capabilities the decision engine needs.
///
/// The occupancy grid implements this directly; tests may substitute
/// their own geometry.
pub trait NavQuery {
    /// Cheapest route between two world points, as world waypoints.
    fn find_path_world(&self, from: Vec2Fixed, to: Vec2Fixed) -> Option<Vec<Vec2Fixed>>;
    /// Straight-line visibility between two world points.
    fn has_line_of_sight(&self, from: Vec2Fixed, to: Vec2Fixed) -> bool;
    /// Whether the cell under a world point is wall.
    fn is_blocked_world(&self, point: Vec2Fixed) -> bool;
    /// Arena extents in world units.
    fn world_size(&self) -> Vec2Fixed;
}

impl NavQuery for OccupancyGrid {
    fn find_path_world(&self, from: Vec2Fixed, to: Vec2Fixed) -> Option<Vec<Vec2Fixed>> {
        crate::pathfinding::find_path_world(self, from, to)
    }

    fn has_line_of_sight(&self, from: Vec2Fixed, to: Vec2Fixed) -> bool {
        OccupancyGrid::has_line_of_sight(self, from, to)
    }

    fn is_blocked_world(&self, point: Vec2Fixed) -> bool {
        OccupancyGrid::is_blocked_world(self, point)
    }

    fn world_size(&self) -> Vec2Fixed {
        Vec2Fixed::new(
            Fixed::from_num(self.cols()) * self.tile_size(),
            Fixed::from_num(self.rows()) * self.tile_size(),
        )
    }
}

/// Discrete AI mode, re-rolled every decision tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Behavior {
    /// Pursue the tracked target, by route when one exists.
    Chase,
    /// Wander to a random clear point.
    Roam,
    /// Hold position.
    #[default]
    Idle,
}

/// Tuning for decisions, steering, and fire gating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiParams {
    /// Ticks between behavior decisions.
    pub decision_interval_ticks: u64,
    /// Decision rolls below this (of 100) chase.
    pub chase_threshold: i32,
    /// Decision rolls below this (of 100) roam; the rest idle.
    pub roam_threshold: i32,
    /// Per-frame fire probability, in percent.
    pub fire_chance_percent: i32,
    /// Jitter radius around the target for fallback waypoints.
    #[serde(with = "crate::math::fixed_serde")]
    pub noise_radius: Fixed,
    /// Distance at which a waypoint counts as reached.
    #[serde(with = "crate::math::fixed_serde")]
    pub waypoint_tolerance: Fixed,
    /// Maximum turn rate in radians per second.
    #[serde(with = "crate::math::fixed_serde")]
    pub turn_rate: Fixed,
    /// Heading error below which the hull snaps onto the target angle.
    #[serde(with = "crate::math::fixed_serde")]
    pub snap_tolerance: Fixed,
    /// Heading error within which a shot may be released.
    #[serde(with = "crate::math::fixed_serde")]
    pub aim_tolerance: Fixed,
    /// Lower clamp on the turning speed scale.
    #[serde(with = "crate::math::fixed_serde")]
    pub min_speed_factor: Fixed,
    /// Roam speed as a fraction of chase speed.
    #[serde(with = "crate::math::fixed_serde")]
    pub roam_speed_factor: Fixed,
    /// Border margin for roam destinations.
    #[serde(with = "crate::math::fixed_serde")]
    pub roam_margin: Fixed,
    /// Minimum roam distance from the tracked target.
    #[serde(with = "crate::math::fixed_serde")]
    pub roam_target_clearance: Fixed,
    /// Corridor half-width for the friendly-fire check.
    #[serde(with = "crate::math::fixed_serde")]
    pub friendly_margin: Fixed,
    /// Attempts to find a clear jittered chase waypoint.
    pub chase_jitter_attempts: u32,
    /// Attempts to find a clear roam destination.
    pub roam_attempts: u32,
}

impl Default for AiParams {
    fn default() -> Self {
        Self {
            decision_interval_ticks: 30,
            chase_threshold: 65,
            roam_threshold: 80,
            fire_chance_percent: 4,
            noise_radius: Fixed::from_num(24),
            waypoint_tolerance: Fixed::from_num(18),
            turn_rate: PI,
            snap_tolerance: deg_to_rad(Fixed::from_num(2)),
            aim_tolerance: deg_to_rad(Fixed::from_num(12)),
            min_speed_factor: Fixed::from_num(0.3),
            roam_speed_factor: Fixed::from_num(0.8),
            roam_margin: Fixed::from_num(50),
            roam_target_clearance: Fixed::from_num(80),
            friendly_margin: Fixed::from_num(14),
            chase_jitter_attempts: 8,
            roam_attempts: 12,
        }
    }
}

/// Decision and steering state for one AI entity.
///
/// Created at spawn, mutated by the periodic decision tick and the
/// per-frame steering tick, destroyed with the owning entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AiState {
    /// Current behavior mode.
    pub behavior: Behavior,
    /// Current movement target, if any.
    pub target_pos: Option<Vec2Fixed>,
    /// Active route waypoints, if following one.
    pub path: Option<Vec<Vec2Fixed>>,
    /// Index of the waypoint currently being driven toward.
    pub path_cursor: usize,
    /// Commanded drive speed.
    #[serde(with = "crate::math::fixed_serde")]
    pub desired_speed: Fixed,
    /// Heading the hull is turning toward.
    #[serde(with = "crate::math::fixed_serde")]
    pub desired_heading: Fixed,
    /// Last aim angle computed against a visible target.
    #[serde(with = "crate::math::option_fixed_serde")]
    pub aim_heading: Option<Fixed>,
    /// Simulation tick of the next behavior decision.
    pub next_decision_tick: u64,
}

impl AiState {
    /// Create idle AI state with the first decision scheduled.
    #[must_use]
    pub fn new(first_decision_tick: u64) -> Self {
        Self {
            behavior: Behavior::Idle,
            target_pos: None,
            path: None,
            path_cursor: 0,
            desired_speed: Fixed::ZERO,
            desired_heading: Fixed::ZERO,
            aim_heading: None,
            next_decision_tick: first_decision_tick,
        }
    }
}

/// Per-frame steering command for the kinematic integrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SteerOutput {
    /// New hull heading in radians.
    pub heading: Fixed,
    /// Drive speed in world units per second.
    pub speed: Fixed,
    /// Whether a shot was requested this frame.
    pub fire: bool,
}

/// Run one periodic behavior decision.
///
/// Rolls chase (weighted majority), roam, or idle. Chase requests a
/// route to the target and falls back to a jittered direct point when
/// no route exists; roam picks a random clear point away from walls
/// and the target; idle clears the movement target.
pub fn decide_behavior(
    state: &mut AiState,
    me: &EntitySnapshot,
    target: Option<&EntitySnapshot>,
    nav: &impl NavQuery,
    rng: &mut SeededPrng,
    params: &AiParams,
    move_speed: Fixed,
) -> Behavior {
    let roll = rng.next_int(0, 100);
    let live_target = target.filter(|t| t.active);

    if roll < params.chase_threshold && live_target.is_some() {
        let quarry = live_target.map_or(Vec2Fixed::ZERO, |t| t.position);
        state.behavior = Behavior::Chase;
        state.desired_speed = move_speed;

        match nav.find_path_world(me.position, quarry) {
            Some(path) if path.len() > 1 => {
                let waypoint = path[1];
                state.path = Some(path);
                state.path_cursor = 1;
                state.target_pos = Some(waypoint);
                state.desired_heading = heading_between(me.position, waypoint);
            }
            _ => {
                let point = jittered_point_near(
                    quarry,
                    params.noise_radius,
                    params.chase_jitter_attempts,
                    nav,
                    rng,
                );
                state.path = None;
                state.path_cursor = 0;
                state.target_pos = Some(point);
                state.desired_heading = heading_between(me.position, point);
            }
        }
    } else if roll < params.roam_threshold {
        state.behavior = Behavior::Roam;
        state.desired_speed = move_speed * params.roam_speed_factor;
        state.path = None;
        state.path_cursor = 0;

        let size = nav.world_size();
        let mut point = me.position;
        for _ in 0..params.roam_attempts {
            point = Vec2Fixed::new(
                rng.next_range(params.roam_margin, size.x - params.roam_margin),
                rng.next_range(params.roam_margin, size.y - params.roam_margin),
            );
            let near_target = live_target
                .map_or(false, |t| point.distance(t.position) < params.roam_target_clearance);
            if !nav.is_blocked_world(point) && !near_target {
                break;
            }
        }
        state.target_pos = Some(point);
        state.desired_heading = heading_between(me.position, point);
    } else {
        state.behavior = Behavior::Idle;
        state.desired_speed = Fixed::ZERO;
        state.path = None;
        state.path_cursor = 0;
        state.target_pos = None;
    }

    tracing::trace!(entity = me.id, behavior = ?state.behavior, "behavior decision");
    state.behavior
}

/// Run one per-frame steering update.
///
/// Handles fire gating, turn-rate-limited rotation, waypoint
/// advancement, and heading-error speed scaling. The caller applies the
/// returned heading and speed to the entity's kinematics.
pub fn steer(
    state: &mut AiState,
    me: &EntitySnapshot,
    target: Option<&EntitySnapshot>,
    teammates: &[EntitySnapshot],
    nav: &impl NavQuery,
    rng: &mut SeededPrng,
    params: &AiParams,
    dt: Fixed,
) -> SteerOutput {
    let live_target = target.filter(|t| t.active);

    // Fire gating runs against the hull heading as of this frame's
    // start, independent of the movement update below.
    let mut fire = false;
    if let Some(quarry) = live_target {
        if rng.next_int(0, 100) < params.fire_chance_percent
            && nav.has_line_of_sight(me.position, quarry.position)
        {
            let aim = heading_between(me.position, quarry.position);
            state.aim_heading = Some(aim);
            if state.path.is_none() || state.behavior != Behavior::Chase {
                state.desired_heading = aim;
            }

            let blocked_by_friend =
                has_friendly_between(me, quarry.position, teammates, params.friendly_margin);
            let aim_error = wrap_angle(aim - me.heading);
            if aim_error.abs() <= params.aim_tolerance && !blocked_by_friend {
                fire = true;
            }
        }
    }

    // Turn-rate-limited rotation; never snap across more than the
    // dead-zone tolerance in one frame.
    let heading_error = wrap_angle(state.desired_heading - me.heading);
    let heading = if heading_error.abs() < params.snap_tolerance {
        state.desired_heading
    } else {
        let step = heading_error.abs().min(params.turn_rate * dt);
        wrap_angle(me.heading + step * heading_error.signum())
    };

    // Waypoint advancement and speed scaling.
    let mut speed = Fixed::ZERO;
    if state.desired_speed > Fixed::ZERO {
        if let Some(target_pos) = state.target_pos {
            if me.position.distance(target_pos) < params.waypoint_tolerance {
                advance_waypoint(state, me, live_target, rng, params);
            }
        }

        if state.target_pos.is_some() {
            let remaining = wrap_angle(state.desired_heading - heading).abs();
            let factor = (Fixed::ONE - (remaining / PI).min(Fixed::ONE))
                .clamp(params.min_speed_factor, Fixed::ONE);
            speed = state.desired_speed * factor;
        }
    }

    SteerOutput {
        heading,
        speed,
        fire,
    }
}

/// Move to the next waypoint after reaching the current one.
///
/// A finished route while chasing synthesizes a fresh jittered waypoint
/// near the live target, which keeps the pursuit going without a new
/// route query every frame. Otherwise the entity stops.
fn advance_waypoint(
    state: &mut AiState,
    me: &EntitySnapshot,
    target: Option<&EntitySnapshot>,
    rng: &mut SeededPrng,
    params: &AiParams,
) {
    let mut next_waypoint = None;
    if let Some(path) = &state.path {
        if state.path_cursor + 1 < path.len() {
            next_waypoint = Some(path[state.path_cursor + 1]);
        }
    }

    if let Some(waypoint) = next_waypoint {
        state.path_cursor += 1;
        state.target_pos = Some(waypoint);
        state.desired_heading = heading_between(me.position, waypoint);
        return;
    }

    if state.behavior == Behavior::Chase {
        if let Some(quarry) = target {
            let point = quarry.position
                + Vec2Fixed::new(
                    rng.next_range(-params.noise_radius, params.noise_radius),
                    rng.next_range(-params.noise_radius, params.noise_radius),
                );
            state.path = None;
            state.path_cursor = 0;
            state.target_pos = Some(point);
            state.desired_heading = heading_between(me.position, point);
            return;
        }
    }

    state.target_pos = None;
    state.desired_speed = Fixed::ZERO;
}

/// Sample a point near `center`, preferring unblocked cells.
///
/// Bounded retries; the last candidate is returned even when every
/// attempt landed on wall, matching the recover-don't-fail policy for
/// spatial queries.
fn jittered_point_near(
    center: Vec2Fixed,
    radius: Fixed,
    attempts: u32,
    nav: &impl NavQuery,
    rng: &mut SeededPrng,
) -> Vec2Fixed {
    let mut candidate = center;
    for _ in 0..attempts {
        candidate = center
            + Vec2Fixed::new(
                rng.next_range(-radius, radius),
                rng.next_range(-radius, radius),
            );
        if !nav.is_blocked_world(candidate) {
            break;
        }
    }
    candidate
}

/// Whether any teammate stands within `margin` of the shooter→target
/// segment.
///
/// Uses the perpendicular distance to the segment with the projection
/// clamped to its ends; the shooter itself and inactive teammates are
/// ignored.
#[must_use]
pub fn has_friendly_between(
    shooter: &EntitySnapshot,
    target: Vec2Fixed,
    teammates: &[EntitySnapshot],
    margin: Fixed,
) -> bool {
    let segment = target - shooter.position;
    let len_sq = segment.dot(segment);
    if len_sq == Fixed::ZERO {
        return false;
    }

    for mate in teammates {
        if mate.id == shooter.id || !mate.active {
            continue;
        }
        let to_mate = mate.position - shooter.position;
        let t = (to_mate.dot(segment) / len_sq).clamp(Fixed::ZERO, Fixed::ONE);
        let closest = shooter.position + segment.scale(t);
        if mate.position.distance(closest) <= margin {
            return true;
        }
    }
    false
}
