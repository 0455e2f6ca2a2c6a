use crate::aabb::{compute_bounding_boxes_and_centers, compute_bounding_boxes_union, Aabb};
use crate::bvh::{build_sweep_sah, find_closest_hit, Bvh};
use crate::geometry::{Hit, Ray, Triangle, Vec3f};

/// A triangle soup with its own BVH. Triangles are appended while building the
/// scene; `commit_bvh` reorders them into BVH order, after which the mesh is
/// only read.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
    pub bvh: Bvh,
}

impl Mesh {
    pub fn add_triangle(&mut self, a: Vec3f, b: Vec3f, c: Vec3f) {
        self.triangles.push(Triangle::new(a, b, c));
    }

    pub fn commit_bvh(&mut self) {
        let (bboxes, centers) = compute_bounding_boxes_and_centers(&self.triangles);
        let global_bbox = compute_bounding_boxes_union(&bboxes);
        self.bvh = build_sweep_sah(&global_bbox, &bboxes, &centers);

        let permuted_triangles = self
            .bvh
            .primitive_indices
            .iter()
            .map(|&i| self.triangles[i])
            .collect();
        self.triangles = permuted_triangles;
    }

    pub fn find_closest_hit(&self, ray: &Ray) -> Option<Hit> {
        find_closest_hit(&self.bvh, &self.triangles, ray)
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn bounding_box(&self) -> Aabb {
        if self.bvh.is_empty() {
            Aabb::default()
        } else {
            self.bvh.nodes[self.bvh.root].aabb
        }
    }
}
