//! Collision queries for hit resolution
//!
//! The simulation never moves colliders itself. Each tick the orchestrator
//! rebuilds the dynamic colliders from committed actor positions and then
//! asks two questions through [`PhysicsQuery`]:
//! - linear probe: first collider along a swept segment
//! - overlap: any collider touching a circle (ground checks, pickups)

use std::ops::{BitOr, BitOrAssign};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::ActorId;

/// Which side an entity fights for. Used to skip self/ally hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    Player,
    Enemy,
    #[default]
    Scenery,
}

/// Collidable category, one bit each in a [`CategoryMask`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Solid,
    Player,
    Enemy,
    Prop,
}

impl Category {
    #[inline]
    pub const fn bit(self) -> u32 {
        match self {
            Category::Solid => 1 << 0,
            Category::Player => 1 << 1,
            Category::Enemy => 1 << 2,
            Category::Prop => 1 << 3,
        }
    }
}

/// Set of categories. Serialized as a list of names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Category>", into = "Vec<Category>")]
pub struct CategoryMask(u32);

impl CategoryMask {
    pub const NONE: Self = Self(0);
    pub const SOLID: Self = Self(Category::Solid.bit());
    pub const PLAYER: Self = Self(Category::Player.bit());
    pub const ENEMY: Self = Self(Category::Enemy.bit());
    pub const PROP: Self = Self(Category::Prop.bit());
    pub const ALL: Self = Self(
        Category::Solid.bit() | Category::Player.bit() | Category::Enemy.bit() | Category::Prop.bit(),
    );

    /// True if the two masks share any category
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl From<Category> for CategoryMask {
    fn from(c: Category) -> Self {
        Self(c.bit())
    }
}

impl From<Vec<Category>> for CategoryMask {
    fn from(list: Vec<Category>) -> Self {
        list.into_iter().fold(Self::NONE, |acc, c| acc | c.into())
    }
}

impl From<CategoryMask> for Vec<Category> {
    fn from(mask: CategoryMask) -> Self {
        [Category::Solid, Category::Player, Category::Enemy, Category::Prop]
            .into_iter()
            .filter(|c| mask.intersects((*c).into()))
            .collect()
    }
}

impl BitOr for CategoryMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CategoryMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Collider geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Shape {
    Circle { center: Vec2, radius: f32 },
    Rect { min: Vec2, max: Vec2 },
}

impl Shape {
    /// Distance along `dir` (unit) from `origin` to the first surface point.
    /// Origins already inside the shape hit at distance 0.
    pub fn ray_distance(&self, origin: Vec2, dir: Vec2, max_distance: f32) -> Option<f32> {
        let t = match *self {
            Shape::Circle { center, radius } => ray_circle(origin, dir, center, radius)?,
            Shape::Rect { min, max } => ray_rect(origin, dir, min, max, max_distance)?,
        };
        (t <= max_distance).then_some(t)
    }

    /// True if a circle at `point` with `radius` touches this shape
    pub fn overlaps_circle(&self, point: Vec2, radius: f32) -> bool {
        match *self {
            Shape::Circle { center, radius: r } => {
                point.distance_squared(center) <= (r + radius) * (r + radius)
            }
            Shape::Rect { min, max } => {
                let closest = point.clamp(min, max);
                point.distance_squared(closest) <= radius * radius
            }
        }
    }
}

fn ray_circle(origin: Vec2, dir: Vec2, center: Vec2, radius: f32) -> Option<f32> {
    let m = origin - center;
    let c = m.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    let b = m.dot(dir);
    if b > 0.0 {
        return None; // Outside and pointing away
    }
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    Some((-b - disc.sqrt()).max(0.0))
}

fn ray_rect(origin: Vec2, dir: Vec2, min: Vec2, max: Vec2, max_distance: f32) -> Option<f32> {
    let mut t_min = 0.0_f32;
    let mut t_max = max_distance;

    for axis in 0..2 {
        let (o, d, lo, hi) = (origin[axis], dir[axis], min[axis], max[axis]);
        if d.abs() < 1e-8 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t1 = (lo - o) * inv;
        let mut t2 = (hi - o) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }
    Some(t_min)
}

/// A collidable body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collider {
    pub shape: Shape,
    pub category: CategoryMask,
    pub faction: Faction,
    /// Set when the collider belongs to something that can take damage
    pub actor: Option<ActorId>,
}

impl Collider {
    /// Static scenery (walls, ground)
    pub fn solid(shape: Shape) -> Self {
        Self {
            shape,
            category: CategoryMask::SOLID,
            faction: Faction::Scenery,
            actor: None,
        }
    }

    /// Damageable actor body
    pub fn actor(id: ActorId, shape: Shape, category: CategoryMask, faction: Faction) -> Self {
        Self {
            shape,
            category,
            faction,
            actor: Some(id),
        }
    }
}

/// Restricts which colliders a probe may strike
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeFilter {
    pub mask: CategoryMask,
    /// Colliders of this faction are passed through
    pub ignore: Option<Faction>,
}

impl ProbeFilter {
    pub fn new(mask: CategoryMask) -> Self {
        Self { mask, ignore: None }
    }

    pub fn ignoring(mut self, faction: Faction) -> Self {
        self.ignore = Some(faction);
        self
    }

    #[inline]
    fn accepts(&self, collider: &Collider) -> bool {
        collider.category.intersects(self.mask) && self.ignore != Some(collider.faction)
    }
}

/// First collider struck by a probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    pub point: Vec2,
    pub distance: f32,
    pub faction: Faction,
    /// Damage-receiving capability (None = scenery)
    pub actor: Option<ActorId>,
}

/// Physics collaborator used by projectiles and actors
pub trait PhysicsQuery {
    /// Cast a segment from `origin` along unit `direction` for `max_distance`
    fn probe(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        filter: ProbeFilter,
    ) -> Option<ProbeHit>;

    /// Any collider in `mask` touching the circle
    fn overlap(&self, point: Vec2, radius: f32, mask: CategoryMask) -> Option<&Collider>;
}

/// Flat list of static and per-tick dynamic colliders
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollisionWorld {
    statics: Vec<Collider>,
    #[serde(skip)]
    dynamics: Vec<Collider>,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_static(&mut self, collider: Collider) {
        self.statics.push(collider);
    }

    /// Replace all actor colliders (called once at the start of each tick)
    pub fn set_dynamics(&mut self, colliders: impl IntoIterator<Item = Collider>) {
        self.dynamics.clear();
        self.dynamics.extend(colliders);
    }

    pub fn statics(&self) -> &[Collider] {
        &self.statics
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collider> {
        self.statics.iter().chain(self.dynamics.iter())
    }
}

impl PhysicsQuery for CollisionWorld {
    fn probe(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        filter: ProbeFilter,
    ) -> Option<ProbeHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec2::ZERO || max_distance < 0.0 {
            return None;
        }

        let mut best: Option<(f32, &Collider)> = None;
        for collider in self.iter().filter(|c| filter.accepts(c)) {
            if let Some(t) = collider.shape.ray_distance(origin, dir, max_distance) {
                // Strict less-than keeps the earliest collider on ties (stable order)
                if best.is_none_or(|(best_t, _)| t < best_t) {
                    best = Some((t, collider));
                }
            }
        }

        best.map(|(t, collider)| ProbeHit {
            point: origin + dir * t,
            distance: t,
            faction: collider.faction,
            actor: collider.actor,
        })
    }

    fn overlap(&self, point: Vec2, radius: f32, mask: CategoryMask) -> Option<&Collider> {
        self.iter()
            .filter(|c| c.category.intersects(mask))
            .find(|c| c.shape.overlaps_circle(point, radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_at(x: f32) -> Collider {
        Collider::solid(Shape::Rect {
            min: Vec2::new(x, -5.0),
            max: Vec2::new(x + 0.5, 5.0),
        })
    }

    #[test]
    fn test_probe_hits_thin_wall_inside_step() {
        let mut world = CollisionWorld::new();
        world.add_static(wall_at(4.0));

        let hit = world
            .probe(Vec2::ZERO, Vec2::X, 10.0, ProbeFilter::new(CategoryMask::ALL))
            .expect("wall should be struck");
        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert!((hit.point - Vec2::new(4.0, 0.0)).length() < 1e-5);
        assert_eq!(hit.actor, None);
    }

    #[test]
    fn test_probe_respects_max_distance() {
        let mut world = CollisionWorld::new();
        world.add_static(wall_at(12.0));
        assert!(world
            .probe(Vec2::ZERO, Vec2::X, 10.0, ProbeFilter::new(CategoryMask::ALL))
            .is_none());
    }

    #[test]
    fn test_probe_picks_nearest() {
        let mut world = CollisionWorld::new();
        world.add_static(wall_at(8.0));
        world.set_dynamics([Collider::actor(
            7,
            Shape::Circle {
                center: Vec2::new(3.0, 0.0),
                radius: 0.5,
            },
            CategoryMask::ENEMY,
            Faction::Enemy,
        )]);

        let hit = world
            .probe(Vec2::ZERO, Vec2::X, 10.0, ProbeFilter::new(CategoryMask::ALL))
            .unwrap();
        assert_eq!(hit.actor, Some(7));
        assert!((hit.distance - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_probe_mask_and_faction_filter() {
        let mut world = CollisionWorld::new();
        world.add_static(wall_at(8.0));
        world.set_dynamics([Collider::actor(
            1,
            Shape::Circle {
                center: Vec2::ZERO,
                radius: 0.5,
            },
            CategoryMask::PLAYER,
            Faction::Player,
        )]);

        // Player's own body is skipped, the wall behind is still found
        let hit = world
            .probe(
                Vec2::ZERO,
                Vec2::X,
                10.0,
                ProbeFilter::new(CategoryMask::ALL).ignoring(Faction::Player),
            )
            .unwrap();
        assert_eq!(hit.faction, Faction::Scenery);

        // Mask without SOLID ignores the wall entirely
        assert!(world
            .probe(
                Vec2::ZERO,
                Vec2::X,
                10.0,
                ProbeFilter::new(CategoryMask::ENEMY),
            )
            .is_none());
    }

    #[test]
    fn test_ray_circle_pointing_away_misses() {
        let shape = Shape::Circle {
            center: Vec2::new(-3.0, 0.0),
            radius: 1.0,
        };
        assert_eq!(shape.ray_distance(Vec2::ZERO, Vec2::X, 10.0), None);
    }

    #[test]
    fn test_overlap_circle_rect() {
        let mut world = CollisionWorld::new();
        world.add_static(Collider::solid(Shape::Rect {
            min: Vec2::new(-10.0, -1.0),
            max: Vec2::new(10.0, 0.0),
        }));
        assert!(world
            .overlap(Vec2::new(0.0, 0.1), 0.15, CategoryMask::SOLID)
            .is_some());
        assert!(world
            .overlap(Vec2::new(0.0, 0.5), 0.15, CategoryMask::SOLID)
            .is_none());
        assert!(world
            .overlap(Vec2::new(0.0, 0.1), 0.15, CategoryMask::ENEMY)
            .is_none());
    }

    #[test]
    fn test_mask_serializes_as_names() {
        let mask = CategoryMask::SOLID | CategoryMask::ENEMY;
        let json = serde_json::to_string(&mask).unwrap();
        assert_eq!(json, r#"["solid","enemy"]"#);
        let back: CategoryMask = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mask);
    }
}
