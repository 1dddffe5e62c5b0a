//! Primitive collision shapes and sweep algorithms
//!
//! Provides the geometric primitives (rays, spheres, planes) and the
//! swept-sphere intersection tests the simulation integrates against.

use crate::foundation::math::Vec3;

/// Penetration tolerance for sweeps that start in shallow contact
///
/// A bounced object lands exactly at contact distance up to floating-point
/// error; sweeps within this tolerance report a zero-distance hit instead
/// of tunneling through.
const CONTACT_SKIN: f32 = 1e-3;

/// A ray for casting queries
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (should be normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a swept-sphere cast
#[derive(Debug, Clone, Copy)]
pub struct SphereCastHit {
    /// Distance the sphere's center traveled before contact
    pub distance: f32,
    /// The contact point on the hit surface in world space
    pub point: Vec3,
    /// The surface normal at the contact point
    pub normal: Vec3,
}

/// A sphere volume for collision detection
#[derive(Debug, Clone, Copy)]
pub struct BoundingSphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Test ray intersection with this sphere
    ///
    /// Returns (distance, hit_point, normal) if hit, None otherwise.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, Vec3, Vec3)> {
        // Vector from ray origin to sphere center
        let oc = ray.origin - self.center;

        // Quadratic formula coefficients for ray-sphere intersection
        // Solve: |origin + t*direction - center|^2 = radius^2
        let a = ray.direction.dot(&ray.direction); // Should be 1.0 if normalized
        let b = 2.0 * oc.dot(&ray.direction);
        let c = oc.dot(&oc) - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;

        if discriminant < 0.0 {
            return None; // No intersection
        }

        // Calculate both intersection points
        let sqrt_discriminant = discriminant.sqrt();
        let t1 = (-b - sqrt_discriminant) / (2.0 * a);
        let t2 = (-b + sqrt_discriminant) / (2.0 * a);

        // Use the closest positive intersection
        let t = if t1 > 0.0 {
            t1
        } else if t2 > 0.0 {
            t2
        } else {
            return None; // Ray pointing away from sphere
        };

        // Calculate hit point and normal
        let hit_point = ray.point_at(t);
        let normal = (hit_point - self.center).normalize();

        Some((t, hit_point, normal))
    }

    /// Sweep a sphere of `radius` from `origin` along `direction` against
    /// this sphere
    ///
    /// Equivalent to casting a ray against this sphere inflated by `radius`.
    /// Sweeps that start overlapping deeper than the contact skin report no
    /// hit; shallow contact reports a zero-distance hit.
    pub fn sweep_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<SphereCastHit> {
        let inflated = Self::new(self.center, self.radius + radius);

        let oc = origin - inflated.center;
        let b = 2.0 * oc.dot(&direction);
        let c = oc.dot(&oc) - inflated.radius * inflated.radius;

        let discriminant = b * b - 4.0 * c;
        if discriminant < 0.0 {
            return None;
        }

        // Entry point of the swept center into the inflated sphere; deep
        // starting overlap falls below the skin and is ignored
        let t = (-b - discriminant.sqrt()) * 0.5;
        if t < -CONTACT_SKIN || t > max_distance {
            return None;
        }
        let t = t.max(0.0);

        let center_at_hit = origin + direction * t;
        let normal = (center_at_hit - self.center).normalize();
        let point = self.center + normal * self.radius;

        Some(SphereCastHit {
            distance: t,
            point,
            normal,
        })
    }
}

/// An infinite plane defined by a unit normal and an offset
///
/// Points `x` on the plane satisfy `normal . x = offset`.
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    /// Unit surface normal
    pub normal: Vec3,
    /// Signed distance of the plane from the origin along the normal
    pub offset: f32,
}

impl Plane {
    /// Creates a plane from a unit normal and offset
    pub fn new(normal: Vec3, offset: f32) -> Self {
        Self {
            normal: normal.normalize(),
            offset,
        }
    }

    /// The horizontal ground plane `y = height`
    pub fn horizontal(height: f32) -> Self {
        Self {
            normal: Vec3::y(),
            offset: height,
        }
    }

    /// Signed distance from `point` to the plane
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) - self.offset
    }

    /// Sweep a sphere of `radius` from `origin` along `direction` against
    /// this plane
    ///
    /// The hit normal faces the side the sweep started on. Sweeps moving
    /// away from the plane, or starting overlapped deeper than the contact
    /// skin, report no hit.
    pub fn sweep_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<SphereCastHit> {
        let s = self.signed_distance(origin);
        let closing = self.normal.dot(&direction);

        // Approaching only: the signed distance must be shrinking in magnitude
        if s * closing >= 0.0 {
            return None;
        }

        let t = (s.abs() - radius) / closing.abs();
        if t < -CONTACT_SKIN || t > max_distance {
            return None;
        }
        let t = t.max(0.0);

        let facing = self.normal * s.signum();
        let center_at_hit = origin + direction * t;

        Some(SphereCastHit {
            distance: t,
            point: center_at_hit - facing * radius,
            normal: facing,
        })
    }
}
