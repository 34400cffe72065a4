//! Reference physics collaborator: circles in an open-topped box
//!
//! Just enough rigid-body behaviour to stack cats and report when two of them
//! start touching. Each step is split into substeps of position-based
//! dynamics: predict under gravity, push overlapping circles apart (mass ∝ r²),
//! derive velocity from the distance actually moved, then settle contact
//! velocities. Position corrections therefore never inject speed, so a full
//! box comes to rest. Velocities are px/s, y grows downward.

use std::collections::BTreeSet;

use glam::Vec2;

use super::rank::{RankIndex, RankTable};
use super::state::EntityId;
use super::world::PhysicsWorld;

/// Downward acceleration (px/s²)
pub const GRAVITY: f32 = 1000.0;
/// Fraction of approach speed returned on impact
pub const RESTITUTION: f32 = 0.2;
/// Approach speeds below this do not bounce at all (px/s)
pub const BOUNCE_THRESHOLD: f32 = 60.0;
/// Velocity lost to air per second
pub const AIR_DAMPING: f32 = 0.6;
/// Share of sideways slip removed at each contact per substep
pub const CONTACT_FRICTION: f32 = 0.02;
/// Substeps per `step`
pub const SUBSTEPS: u32 = 4;
/// Positional correction passes per substep
pub const SOLVER_ITERATIONS: u32 = 4;
/// Gap still treated as contact
pub const CONTACT_SLOP: f32 = 1.0;

/// Result of a contact check
#[derive(Debug, Clone)]
pub struct Contact {
    /// Whether the shapes overlap
    pub hit: bool,
    /// Unit normal from the first shape toward the second
    pub normal: Vec2,
    /// Overlap depth
    pub penetration: f32,
}

impl Contact {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Overlap between two circles
pub fn circle_circle_contact(pos_a: Vec2, radius_a: f32, pos_b: Vec2, radius_b: f32) -> Contact {
    let delta = pos_b - pos_a;
    let dist = delta.length();
    let reach = radius_a + radius_b;
    if dist >= reach {
        return Contact::miss();
    }
    // Concentric circles: push straight up
    let normal = if dist > f32::EPSILON {
        delta / dist
    } else {
        Vec2::NEG_Y
    };
    Contact {
        hit: true,
        normal,
        penetration: reach - dist,
    }
}

/// Separating speed a contact keeps after solving.
///
/// `approach` is the normal speed before the positional pass, negative when
/// closing. Fast impacts bounce with `restitution`, slow ones stop dead, and
/// contacts that were already separating keep their speed.
#[inline]
pub fn resolved_normal_speed(approach: f32, restitution: f32) -> f32 {
    if -approach >= BOUNCE_THRESHOLD {
        -approach * restitution
    } else {
        approach.max(0.0)
    }
}

#[derive(Debug, Clone)]
struct Body {
    id: EntityId,
    rank: RankIndex,
    radius: f32,
    pos: Vec2,
    vel: Vec2,
    /// Position at the start of the substep
    prev_pos: Vec2,
    /// Velocity after prediction, before constraints
    predicted_vel: Vec2,
}

impl Body {
    #[inline]
    fn inv_mass(&self) -> f32 {
        1.0 / (self.radius * self.radius)
    }
}

/// Circle world with a floor and two side walls
#[derive(Debug, Clone)]
pub struct CircleWorld {
    ranks: RankTable,
    width: f32,
    height: f32,
    /// Bodies in id order
    bodies: Vec<Body>,
    touching: BTreeSet<(EntityId, EntityId)>,
    collision_starts: Vec<(EntityId, EntityId)>,
    next_id: u32,
}

impl CircleWorld {
    pub fn new(ranks: RankTable, width: f32, height: f32) -> Self {
        Self {
            ranks,
            width,
            height,
            bodies: Vec::new(),
            touching: BTreeSet::new(),
            collision_starts: Vec::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Rank of a body, if it exists
    pub fn rank_of(&self, id: EntityId) -> Option<RankIndex> {
        self.find(id).map(|b| b.rank)
    }

    fn find(&self, id: EntityId) -> Option<&Body> {
        self.bodies
            .binary_search_by_key(&id, |b| b.id)
            .ok()
            .map(|i| &self.bodies[i])
    }

    /// Advance by one fixed timestep, collecting collision starts
    pub fn step(&mut self, dt: f32) {
        let h = dt / SUBSTEPS as f32;
        let damping = (1.0 - AIR_DAMPING * h).max(0.0);

        for _ in 0..SUBSTEPS {
            for body in &mut self.bodies {
                body.vel.y += GRAVITY * h;
                body.vel *= damping;
                body.prev_pos = body.pos;
                body.predicted_vel = body.vel;
                body.pos += body.vel * h;
            }

            for _ in 0..SOLVER_ITERATIONS {
                self.separate_pairs();
                self.clamp_to_walls();
            }

            for body in &mut self.bodies {
                body.vel = (body.pos - body.prev_pos) / h;
            }
            self.settle_pair_velocities();
            self.settle_wall_velocities();
        }

        self.detect_collision_starts();
    }

    fn separate_pairs(&mut self) {
        let count = self.bodies.len();
        for i in 0..count {
            for j in (i + 1)..count {
                let (left, right) = self.bodies.split_at_mut(j);
                let a = &mut left[i];
                let b = &mut right[0];

                let contact = circle_circle_contact(a.pos, a.radius, b.pos, b.radius);
                if !contact.hit {
                    continue;
                }

                // Split by inverse mass so small cats give way
                let inv_a = a.inv_mass();
                let inv_b = b.inv_mass();
                let correction = contact.normal * (contact.penetration / (inv_a + inv_b));
                a.pos -= correction * inv_a;
                b.pos += correction * inv_b;
            }
        }
    }

    fn clamp_to_walls(&mut self) {
        for body in &mut self.bodies {
            let r = body.radius;
            body.pos.x = body.pos.x.max(r).min(self.width - r);
            body.pos.y = body.pos.y.min(self.height - r);
        }
    }

    fn settle_pair_velocities(&mut self) {
        let count = self.bodies.len();
        for i in 0..count {
            for j in (i + 1)..count {
                let (left, right) = self.bodies.split_at_mut(j);
                let a = &mut left[i];
                let b = &mut right[0];

                let delta = b.pos - a.pos;
                let dist = delta.length();
                if dist <= f32::EPSILON || dist > a.radius + b.radius + CONTACT_SLOP {
                    continue;
                }
                let normal = delta / dist;

                let relative = b.vel - a.vel;
                let speed = relative.dot(normal);
                let target = resolved_normal_speed(
                    (b.predicted_vel - a.predicted_vel).dot(normal),
                    RESTITUTION,
                );
                let slip = relative - normal * speed;
                let change = normal * (target - speed) - slip * CONTACT_FRICTION;

                let inv_a = a.inv_mass();
                let inv_b = b.inv_mass();
                let inv_sum = inv_a + inv_b;
                a.vel -= change * (inv_a / inv_sum);
                b.vel += change * (inv_b / inv_sum);
            }
        }
    }

    fn settle_wall_velocities(&mut self) {
        for body in &mut self.bodies {
            let r = body.radius;
            let walls = [
                (body.pos.x - r <= CONTACT_SLOP, Vec2::X),
                (body.pos.x + r >= self.width - CONTACT_SLOP, Vec2::NEG_X),
                (body.pos.y + r >= self.height - CONTACT_SLOP, Vec2::NEG_Y),
            ];
            for (touching, normal) in walls {
                if !touching {
                    continue;
                }
                let speed = body.vel.dot(normal);
                let target = resolved_normal_speed(body.predicted_vel.dot(normal), RESTITUTION);
                let slip = body.vel - normal * speed;
                body.vel += normal * (target - speed) - slip * CONTACT_FRICTION;
            }
        }
    }

    fn detect_collision_starts(&mut self) {
        let mut now_touching = BTreeSet::new();
        for (i, a) in self.bodies.iter().enumerate() {
            for b in &self.bodies[i + 1..] {
                let reach = a.radius + b.radius + CONTACT_SLOP;
                if a.pos.distance_squared(b.pos) <= reach * reach {
                    now_touching.insert((a.id, b.id));
                }
            }
        }
        for pair in &now_touching {
            if !self.touching.contains(pair) {
                self.collision_starts.push(*pair);
            }
        }
        self.touching = now_touching;
    }
}

impl PhysicsWorld for CircleWorld {
    fn create_entity(&mut self, rank: RankIndex, position: Vec2) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        // ids are monotonic, so pushing keeps the list sorted
        self.bodies.push(Body {
            id,
            rank,
            radius: self.ranks.radius(rank),
            pos: position,
            vel: Vec2::ZERO,
            prev_pos: position,
            predicted_vel: Vec2::ZERO,
        });
        id
    }

    fn remove_entity(&mut self, id: EntityId) {
        if let Ok(i) = self.bodies.binary_search_by_key(&id, |b| b.id) {
            self.bodies.remove(i);
            self.touching.retain(|(a, b)| *a != id && *b != id);
        }
    }

    fn position(&self, id: EntityId) -> Option<Vec2> {
        self.find(id).map(|b| b.pos)
    }

    fn velocity(&self, id: EntityId) -> Option<Vec2> {
        self.find(id).map(|b| b.vel)
    }

    fn take_collision_starts(&mut self) -> Vec<(EntityId, EntityId)> {
        std::mem::take(&mut self.collision_starts)
    }
}
