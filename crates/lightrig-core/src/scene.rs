//! # Scene Query Service
//!
//! Raycasts and bounds over immutable scene geometry.
//!
//! ## Table of Contents
//! - `Ray` / `ObjectId` / `SceneSnapshot`
//! - `SceneQuery` - the trait hosts implement over their own geometry
//! - `PrimitiveScene` - reference implementation (spheres, boxes, quads, triangles)
//!
//! A ray that hits nothing is not an error: it yields a snapshot with every
//! hit field `None`. Reported normals are unit length and face the incoming
//! ray, so back-face hits are flipped.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::math;

/// Hits closer than this along the ray are ignored to avoid self-intersection.
const HIT_EPSILON: f32 = 1e-5;

// ============================================================================
// Core Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length, or zero for a degenerate ray.
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction: direction.normalize_or_zero() }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    pub fn is_degenerate(&self) -> bool {
        !self.direction.is_finite() || self.direction.length_squared() < math::ZERO_LENGTH_SQ
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u32);

/// Result of one raycast. Immutable; recomputed on every pointer move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub ray: Ray,
    pub hit_point: Option<Vec3>,
    pub normal: Option<Vec3>,
    pub distance: Option<f32>,
    pub object: Option<ObjectId>,
}

impl SceneSnapshot {
    pub fn miss(ray: Ray) -> Self {
        Self { ray, hit_point: None, normal: None, distance: None, object: None }
    }

    pub fn hit(ray: Ray, distance: f32, normal: Vec3, object: ObjectId) -> Self {
        Self {
            ray,
            hit_point: Some(ray.at(distance)),
            normal: Some(normal),
            distance: Some(distance),
            object: Some(object),
        }
    }

    pub fn is_hit(&self) -> bool {
        self.hit_point.is_some()
    }
}

// ============================================================================
// SceneQuery Trait
// ============================================================================

/// Read-only geometry access. Implementations hold no mutable state.
pub trait SceneQuery {
    /// Nearest hit along the ray within `max_distance`, skipping `exclude`.
    fn query_excluding(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: &[ObjectId],
    ) -> SceneSnapshot;

    /// All object ids in the scene.
    fn objects(&self) -> Vec<ObjectId>;

    /// Center of the combined bounds of `objects` (`Vec3::ZERO` when empty).
    fn bounding_center(&self, objects: &[ObjectId]) -> Vec3;

    /// Half-diagonal of the combined bounds of `objects` (`0.0` when empty).
    fn bounding_radius(&self, objects: &[ObjectId]) -> f32;

    fn query(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> SceneSnapshot {
        self.query_excluding(origin, direction, max_distance, &[])
    }

    fn cast(&self, ray: &Ray, max_distance: f32) -> SceneSnapshot {
        self.query(ray.origin, ray.direction, max_distance)
    }

    /// Bounds center of the whole scene, or `None` for an empty scene.
    fn scene_center(&self) -> Option<Vec3> {
        let objects = self.objects();
        if objects.is_empty() {
            None
        } else {
            Some(self.bounding_center(&objects))
        }
    }
}

// ============================================================================
// Primitives
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Primitive {
    Sphere { center: Vec3, radius: f32 },
    /// Axis-aligned box
    Aabb { min: Vec3, max: Vec3 },
    /// Parallelogram spanned by two edges from `corner`
    Quad { corner: Vec3, edge_u: Vec3, edge_v: Vec3 },
    Triangle { a: Vec3, b: Vec3, c: Vec3 },
}

impl Primitive {
    /// Ray parameter and raw (not yet ray-facing) unit normal of the first hit.
    fn intersect(&self, ray: &Ray) -> Option<(f32, Vec3)> {
        match *self {
            Primitive::Sphere { center, radius } => intersect_sphere(ray, center, radius),
            Primitive::Aabb { min, max } => intersect_aabb(ray, min, max),
            Primitive::Quad { corner, edge_u, edge_v } => intersect_quad(ray, corner, edge_u, edge_v),
            Primitive::Triangle { a, b, c } => intersect_triangle(ray, a, b, c),
        }
    }

    pub fn bounds(&self) -> (Vec3, Vec3) {
        match *self {
            Primitive::Sphere { center, radius } => (center - Vec3::splat(radius), center + Vec3::splat(radius)),
            Primitive::Aabb { min, max } => (min.min(max), min.max(max)),
            Primitive::Quad { corner, edge_u, edge_v } => {
                math::calculate_aabb(&[corner, corner + edge_u, corner + edge_v, corner + edge_u + edge_v])
            }
            Primitive::Triangle { a, b, c } => math::calculate_aabb(&[a, b, c]),
        }
    }
}

fn intersect_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<(f32, Vec3)> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let mut t = -b - sqrt_disc;
    if t < HIT_EPSILON {
        t = -b + sqrt_disc;
    }
    if t < HIT_EPSILON {
        return None;
    }
    let normal = (ray.at(t) - center).try_normalize()?;
    Some((t, normal))
}

/// Slab test that also reports which face was crossed.
fn intersect_aabb(ray: &Ray, min: Vec3, max: Vec3) -> Option<(f32, Vec3)> {
    let (min, max) = (min.min(max), min.max(max));
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;
    let mut near_axis = 0;
    let mut far_axis = 0;

    for axis in 0..3 {
        let o = ray.origin[axis];
        let d = ray.direction[axis];
        if d.abs() < 1e-9 {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let t1 = (min[axis] - o) / d;
        let t2 = (max[axis] - o) / d;
        let (t1, t2) = if t1 > t2 { (t2, t1) } else { (t1, t2) };
        if t1 > t_near {
            t_near = t1;
            near_axis = axis;
        }
        if t2 < t_far {
            t_far = t2;
            far_axis = axis;
        }
        if t_near > t_far {
            return None;
        }
    }

    let (t, axis) = if t_near >= HIT_EPSILON {
        (t_near, near_axis)
    } else if t_far >= HIT_EPSILON {
        (t_far, far_axis)
    } else {
        return None;
    };

    let mut normal = Vec3::ZERO;
    normal[axis] = 1.0;
    Some((t, normal))
}

fn intersect_quad(ray: &Ray, corner: Vec3, edge_u: Vec3, edge_v: Vec3) -> Option<(f32, Vec3)> {
    let normal = edge_u.cross(edge_v).try_normalize()?;
    let t = math::ray_plane_intersection(ray.origin, ray.direction, corner, normal)?;
    if t < HIT_EPSILON {
        return None;
    }
    let local = ray.at(t) - corner;
    let s = local.dot(edge_u) / edge_u.length_squared();
    let r = local.dot(edge_v) / edge_v.length_squared();
    if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&r) {
        Some((t, normal))
    } else {
        None
    }
}

/// Möller–Trumbore.
fn intersect_triangle(ray: &Ray, a: Vec3, b: Vec3, c: Vec3) -> Option<(f32, Vec3)> {
    let e1 = b - a;
    let e2 = c - a;
    let p = ray.direction.cross(e2);
    let det = e1.dot(p);
    if det.abs() < 1e-8 {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(q) * inv_det;
    if t < HIT_EPSILON {
        return None;
    }
    let normal = e1.cross(e2).try_normalize()?;
    Some((t, normal))
}

// ============================================================================
// PrimitiveScene
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: ObjectId,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub primitive: Primitive,
}

/// In-memory scene of analytic primitives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveScene {
    #[serde(default)]
    pub objects: Vec<SceneObject>,
}

impl PrimitiveScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a primitive and return its freshly allocated id.
    pub fn add(&mut self, name: impl Into<String>, primitive: Primitive) -> ObjectId {
        let id = ObjectId(self.objects.iter().map(|o| o.id.0 + 1).max().unwrap_or(0));
        self.objects.push(SceneObject { id, name: name.into(), primitive });
        id
    }

    pub fn with(mut self, name: impl Into<String>, primitive: Primitive) -> Self {
        self.add(name, primitive);
        self
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    fn combined_bounds(&self, ids: &[ObjectId]) -> Option<(Vec3, Vec3)> {
        self.objects
            .iter()
            .filter(|o| ids.contains(&o.id))
            .map(|o| o.primitive.bounds())
            .reduce(|(amin, amax), (bmin, bmax)| (amin.min(bmin), amax.max(bmax)))
    }
}

impl SceneQuery for PrimitiveScene {
    fn query_excluding(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: &[ObjectId],
    ) -> SceneSnapshot {
        let ray = Ray::new(origin, direction);
        if ray.is_degenerate() || !origin.is_finite() {
            return SceneSnapshot::miss(ray);
        }

        let nearest = self
            .objects
            .iter()
            .filter(|o| !exclude.contains(&o.id))
            .filter_map(|o| o.primitive.intersect(&ray).map(|(t, n)| (t, n, o.id)))
            .filter(|(t, _, _)| *t <= max_distance)
            .min_by(|a, b| a.0.total_cmp(&b.0));

        match nearest {
            Some((t, normal, id)) => {
                let facing = if normal.dot(ray.direction) > 0.0 { -normal } else { normal };
                SceneSnapshot::hit(ray, t, facing, id)
            }
            None => SceneSnapshot::miss(ray),
        }
    }

    fn objects(&self) -> Vec<ObjectId> {
        self.objects.iter().map(|o| o.id).collect()
    }

    fn bounding_center(&self, objects: &[ObjectId]) -> Vec3 {
        self.combined_bounds(objects)
            .map(|(min, max)| (min + max) * 0.5)
            .unwrap_or(Vec3::ZERO)
    }

    fn bounding_radius(&self, objects: &[ObjectId]) -> f32 {
        self.combined_bounds(objects)
            .map(|(min, max)| (max - min).length() * 0.5)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> Primitive {
        Primitive::Quad {
            corner: Vec3::new(-5.0, 0.0, 5.0),
            edge_u: Vec3::new(10.0, 0.0, 0.0),
            edge_v: Vec3::new(0.0, 0.0, -10.0),
        }
    }

    #[test]
    fn test_empty_scene_misses() {
        let scene = PrimitiveScene::new();
        let snap = scene.query(Vec3::ZERO, Vec3::NEG_Z, f32::MAX);
        assert!(!snap.is_hit());
        assert!(snap.normal.is_none());
        assert!(snap.distance.is_none());
        assert!(snap.object.is_none());
        assert_eq!(scene.bounding_center(&[]), Vec3::ZERO);
        assert_eq!(scene.bounding_radius(&[]), 0.0);
    }

    #[test]
    fn test_zero_direction_misses() {
        let scene = PrimitiveScene::new().with("ball", Primitive::Sphere { center: Vec3::ZERO, radius: 1.0 });
        assert!(!scene.query(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 100.0).is_hit());
    }

    #[test]
    fn test_sphere_hit_point_and_normal() {
        let scene = PrimitiveScene::new().with("ball", Primitive::Sphere { center: Vec3::ZERO, radius: 1.0 });
        let snap = scene.query(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, 100.0);
        assert!((snap.hit_point.unwrap() - Vec3::Z).length() < 1e-5);
        assert!((snap.normal.unwrap() - Vec3::Z).length() < 1e-5);
        assert!((snap.distance.unwrap() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_nearest_hit_wins_and_exclusion() {
        let mut scene = PrimitiveScene::new();
        let front = scene.add("front", Primitive::Aabb { min: Vec3::new(-1.0, -1.0, 1.0), max: Vec3::new(1.0, 1.0, 2.0) });
        let back = scene.add("back", Primitive::Sphere { center: Vec3::new(0.0, 0.0, -3.0), radius: 1.0 });

        let snap = scene.query(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z, 100.0);
        assert_eq!(snap.object, Some(front));
        assert!((snap.hit_point.unwrap().z - 2.0).abs() < 1e-5);
        assert!((snap.normal.unwrap() - Vec3::Z).length() < 1e-5);

        let snap = scene.query_excluding(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z, 100.0, &[front]);
        assert_eq!(snap.object, Some(back));
    }

    #[test]
    fn test_back_face_normal_faces_ray() {
        let scene = PrimitiveScene::new().with("floor", floor());
        let from_below = scene.query(Vec3::new(0.0, -3.0, 0.0), Vec3::Y, 100.0);
        assert!((from_below.normal.unwrap() - Vec3::NEG_Y).length() < 1e-5);
        let from_above = scene.query(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Y, 100.0);
        assert!((from_above.normal.unwrap() - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_max_distance_limits_hits() {
        let scene = PrimitiveScene::new().with("floor", floor());
        assert!(!scene.query(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Y, 2.0).is_hit());
    }

    #[test]
    fn test_triangle_hit_and_miss() {
        let tri = Primitive::Triangle { a: Vec3::ZERO, b: Vec3::X, c: Vec3::Y };
        let scene = PrimitiveScene::new().with("tri", tri);
        assert!(scene.query(Vec3::new(0.2, 0.2, 1.0), Vec3::NEG_Z, 10.0).is_hit());
        assert!(!scene.query(Vec3::new(0.8, 0.8, 1.0), Vec3::NEG_Z, 10.0).is_hit());
    }

    #[test]
    fn test_bounding_center_and_radius() {
        let mut scene = PrimitiveScene::new();
        let a = scene.add("a", Primitive::Aabb { min: Vec3::ZERO, max: Vec3::splat(2.0) });
        let b = scene.add("b", Primitive::Sphere { center: Vec3::new(4.0, 1.0, 1.0), radius: 1.0 });
        assert_eq!(scene.bounding_center(&[a]), Vec3::ONE);
        assert_eq!(scene.bounding_center(&[a, b]), Vec3::new(2.5, 1.0, 1.0));
        assert!((scene.bounding_radius(&[a]) - 3f32.sqrt()).abs() < 1e-5);
        assert_eq!(scene.scene_center(), Some(Vec3::new(2.5, 1.0, 1.0)));
    }
}
