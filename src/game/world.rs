//! World collaborators
//!
//! The core only sees the world through two narrow interfaces: a height
//! query over the ground plane and a snapshot of static circular colliders.
//! Terrain and layout implementations here are the ones the headless runner
//! and tests plug in.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::game::constants::{terrain, world};
use crate::util::vec2::Vec2;
use crate::util::vec3::Vec3;

/// Ground elevation lookup
pub trait HeightQuery {
    /// Ground height at (x, z). Must be deterministic for a static terrain.
    fn height_at(&self, x: f32, z: f32) -> f32;

    /// Unit surface normal at (x, z) from central differences
    fn normal_at(&self, x: f32, z: f32) -> Vec3 {
        let e = terrain::NORMAL_EPSILON;
        let dx = (self.height_at(x + e, z) - self.height_at(x - e, z)) / (2.0 * e);
        let dz = (self.height_at(x, z + e) - self.height_at(x, z - e)) / (2.0 * e);
        Vec3::new(-dx, 1.0, -dz).normalize_or(Vec3::UP)
    }
}

/// Level ground at a fixed height
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatGround {
    pub height: f32,
}

impl HeightQuery for FlatGround {
    fn height_at(&self, _x: f32, _z: f32) -> f32 {
        self.height
    }

    fn normal_at(&self, _x: f32, _z: f32) -> Vec3 {
        Vec3::UP
    }
}

/// Inclined plane rising along `direction` at `slope_deg`
#[derive(Debug, Clone, Copy)]
pub struct SlopedGround {
    pub base_height: f32,
    pub slope_deg: f32,
    /// Uphill direction on the ground plane
    pub direction: Vec2,
}

impl SlopedGround {
    pub fn new(slope_deg: f32, direction: Vec2) -> Self {
        Self {
            base_height: 0.0,
            slope_deg,
            direction: direction.normalize_or(Vec2::X),
        }
    }
}

impl HeightQuery for SlopedGround {
    fn height_at(&self, x: f32, z: f32) -> f32 {
        let rise = self.slope_deg.to_radians().tan();
        self.base_height + Vec2::new(x, z).dot(self.direction) * rise
    }
}

/// Seeded gradient-noise terrain (three octaves)
#[derive(Debug, Clone)]
pub struct NoiseTerrain {
    perm: Vec<u8>,
    max_height: f32,
}

impl NoiseTerrain {
    pub fn new(seed: u32, max_height: f32) -> Self {
        let mut perm: Vec<u8> = (0..=255u8).collect();
        // Park-Miller shuffle so a given seed always yields the same field
        let mut state = u64::from(seed.max(1));
        for i in (1..256usize).rev() {
            state = (state * 16_807) % 2_147_483_647;
            let n = ((state as f64 / 2_147_483_647.0) * (i as f64 + 1.0)) as usize;
            perm.swap(i, n.min(i));
        }
        let doubled: Vec<u8> = perm.iter().chain(perm.iter()).copied().collect();
        Self {
            perm: doubled,
            max_height,
        }
    }

    fn noise(&self, x: f32, y: f32) -> f32 {
        let xi = (x.floor() as i64 & 255) as usize;
        let yi = (y.floor() as i64 & 255) as usize;
        let x = x - x.floor();
        let y = y - y.floor();
        let u = fade(x);
        let v = fade(y);
        let p = &self.perm;
        let a = p[xi] as usize + yi;
        let b = p[xi + 1] as usize + yi;
        lerp(
            lerp(grad(p[a], x, y), grad(p[b], x - 1.0, y), u),
            lerp(grad(p[a + 1], x, y - 1.0), grad(p[b + 1], x - 1.0, y - 1.0), u),
            v,
        )
    }
}

impl Default for NoiseTerrain {
    fn default() -> Self {
        Self::new(terrain::SEED, terrain::MAX_HEIGHT)
    }
}

impl HeightQuery for NoiseTerrain {
    fn height_at(&self, x: f32, z: f32) -> f32 {
        let h = self.noise(x * 0.02, z * 0.02) * 0.6
            + self.noise(x * 0.05, z * 0.05) * 0.25
            + self.noise(x * 0.1, z * 0.1) * 0.1;
        h * self.max_height
    }
}

#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

#[inline]
fn grad(hash: u8, x: f32, y: f32) -> f32 {
    match hash & 3 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        _ => -x - y,
    }
}

/// Stable identifier of a trigger collider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColliderTag(pub u32);

/// What a static collider represents (reporting only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColliderKind {
    Grave,
    Tree,
    Statue,
    Pumpkin,
}

/// Immovable circle on the ground plane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticCollider {
    pub center: Vec2,
    pub radius: f32,
    pub kind: ColliderKind,
    /// Present only on trigger colliders
    pub tag: Option<ColliderTag>,
    /// Set once, on the first player touch of a trigger collider
    pub triggered: bool,
}

impl StaticCollider {
    pub fn new(center: Vec2, radius: f32, kind: ColliderKind) -> Self {
        Self {
            center,
            radius,
            kind,
            tag: None,
            triggered: false,
        }
    }

    pub fn trigger(center: Vec2, radius: f32, kind: ColliderKind, tag: ColliderTag) -> Self {
        Self {
            tag: Some(tag),
            ..Self::new(center, radius, kind)
        }
    }

    pub fn is_trigger(&self) -> bool {
        self.tag.is_some()
    }
}

/// Supplier of the static collider layout
pub trait ColliderSource {
    fn colliders_snapshot(&self) -> Vec<StaticCollider>;
}

impl ColliderSource for Vec<StaticCollider> {
    fn colliders_snapshot(&self) -> Vec<StaticCollider> {
        self.clone()
    }
}

/// Static colliders for a round; only trigger flags change
#[derive(Debug, Clone, Default)]
pub struct ColliderSet {
    colliders: Vec<StaticCollider>,
}

impl ColliderSet {
    pub fn from_source(source: &dyn ColliderSource) -> Self {
        Self {
            colliders: source.colliders_snapshot(),
        }
    }

    pub fn as_slice(&self) -> &[StaticCollider] {
        &self.colliders
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [StaticCollider] {
        &mut self.colliders
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Re-arm every trigger collider
    pub fn reset_triggers(&mut self) {
        for collider in &mut self.colliders {
            collider.triggered = false;
        }
    }

    pub fn trigger_count(&self) -> usize {
        self.colliders.iter().filter(|c| c.is_trigger()).count()
    }

    pub fn triggered_count(&self) -> usize {
        self.colliders.iter().filter(|c| c.triggered).count()
    }
}

/// Seeded random scatter of graves, trees, statues and trigger pumpkins
#[derive(Debug, Clone)]
pub struct ScatterLayout {
    pub seed: u64,
    pub world_radius: f32,
    pub grave_count: usize,
    pub tree_count: usize,
    pub statue_count: usize,
    pub pumpkin_count: usize,
    /// Keep this disc around the origin free for the player spawn
    pub spawn_clearance: f32,
}

impl Default for ScatterLayout {
    fn default() -> Self {
        Self {
            seed: 2025,
            world_radius: world::RADIUS,
            grave_count: world::GRAVE_COUNT,
            tree_count: world::TREE_COUNT,
            statue_count: world::STATUE_COUNT,
            pumpkin_count: world::PUMPKIN_COUNT,
            spawn_clearance: 2.0,
        }
    }
}

impl ScatterLayout {
    /// Uniform point in the scatter disc whose footprint of `radius`
    /// stays out of the spawn clearance
    fn random_point(&self, rng: &mut StdRng, max_radius: f32, radius: f32) -> Vec2 {
        let clearance = self.spawn_clearance + radius;
        loop {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let distance = max_radius.max(clearance) * rng.gen::<f32>().sqrt();
            let point = Vec2::from_angle(angle) * distance;
            if point.length() >= clearance {
                return point;
            }
        }
    }

    pub fn total(&self) -> usize {
        self.grave_count + self.tree_count + self.statue_count + self.pumpkin_count
    }
}

impl ColliderSource for ScatterLayout {
    fn colliders_snapshot(&self) -> Vec<StaticCollider> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let scatter_radius = (self.world_radius - world::GRAVE_MARGIN).max(self.spawn_clearance * 2.0);
        let mut colliders = Vec::with_capacity(self.total());

        for _ in 0..self.grave_count {
            let center = self.random_point(&mut rng, scatter_radius, world::GRAVE_RADIUS);
            colliders.push(StaticCollider::new(center, world::GRAVE_RADIUS, ColliderKind::Grave));
        }

        let (min_scale, max_scale) = world::TREE_SCALE;
        for _ in 0..self.tree_count {
            let radius = world::TREE_RADIUS * rng.gen_range(min_scale..=max_scale);
            let center = self.random_point(&mut rng, scatter_radius, radius);
            colliders.push(StaticCollider::new(center, radius, ColliderKind::Tree));
        }

        for _ in 0..self.statue_count {
            let center = self.random_point(&mut rng, scatter_radius, world::STATUE_RADIUS);
            colliders.push(StaticCollider::new(center, world::STATUE_RADIUS, ColliderKind::Statue));
        }

        for i in 0..self.pumpkin_count {
            let center = self.random_point(&mut rng, scatter_radius, world::PUMPKIN_RADIUS);
            colliders.push(StaticCollider::trigger(
                center,
                world::PUMPKIN_RADIUS,
                ColliderKind::Pumpkin,
                ColliderTag(i as u32),
            ));
        }

        colliders
    }
}

/// Everything the simulation needs from world-init
pub struct World {
    pub terrain: Box<dyn HeightQuery + Send + Sync>,
    pub colliders: ColliderSet,
}

impl World {
    pub fn new(terrain: Box<dyn HeightQuery + Send + Sync>, source: &dyn ColliderSource) -> Self {
        Self {
            terrain,
            colliders: ColliderSet::from_source(source),
        }
    }

    /// Flat ground with no obstacles
    pub fn flat() -> Self {
        Self {
            terrain: Box::new(FlatGround::default()),
            colliders: ColliderSet::default(),
        }
    }

    #[inline]
    pub fn height_at(&self, p: Vec2) -> f32 {
        self.terrain.height_at(p.x, p.z)
    }
}
