use crate::aabb::Aabb;
use crate::geometry::{Fp, Hit, Ray, Triangle, Vec3f};
use arrayvec::ArrayVec;

const MIN_LEAF_SIZE: usize = 2;
const MAX_LEAF_SIZE: usize = 16;
const TRAVERSAL_COST: Fp = 1.0;
// Bounds the tree depth, and with it the traversal stack below.
const MAX_DEPTH: usize = 48;
const STACK_SIZE: usize = MAX_DEPTH + 2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BvhContent {
    Internal { left: usize, right: usize },
    Leaf { first_primitive: usize, primitive_count: usize },
}

#[derive(Clone, Debug)]
pub struct BvhNode {
    pub aabb: Aabb,
    pub content: BvhContent,
}

/// Binary bounding volume hierarchy. `primitive_indices[i]` is the original
/// index of the primitive stored at BVH position `i`; leaves reference
/// contiguous ranges of that array.
#[derive(Clone, Debug, Default)]
pub struct Bvh {
    pub nodes: Vec<BvhNode>,
    pub primitive_indices: Vec<usize>,
    pub root: usize,
}

impl Bvh {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn depth(&self) -> usize {
        fn walk(bvh: &Bvh, node_index: usize) -> usize {
            match bvh.nodes[node_index].content {
                BvhContent::Leaf { .. } => 1,
                BvhContent::Internal { left, right } => 1 + walk(bvh, left).max(walk(bvh, right)),
            }
        }
        if self.is_empty() {
            0
        } else {
            walk(self, self.root)
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node.content, BvhContent::Leaf { .. }))
            .count()
    }
}

struct SweepSahBuilder<'a> {
    nodes: Vec<BvhNode>,
    bboxes: &'a [Aabb],
    centers: &'a [Vec3f],
    // scratch buffer for the right-to-left sweep, reused across nodes
    right_areas: Vec<Fp>,
}

pub fn build_sweep_sah(global_bbox: &Aabb, bboxes: &[Aabb], centers: &[Vec3f]) -> Bvh {
    assert_eq!(bboxes.len(), centers.len());
    let mut primitive_indices: Vec<usize> = (0..bboxes.len()).collect();
    if primitive_indices.is_empty() {
        return Bvh::default();
    }
    let mut builder = SweepSahBuilder {
        nodes: Vec::with_capacity(2 * bboxes.len()),
        bboxes,
        centers,
        right_areas: vec![0.0; bboxes.len()],
    };
    let root = builder.create_bvh_node(&mut primitive_indices, 0, *global_bbox, 0);
    Bvh {
        nodes: builder.nodes,
        primitive_indices,
        root,
    }
}

impl SweepSahBuilder<'_> {
    // The node's primitives are the slice `indices` which starts at `start` in
    // the full permutation. Children are pushed before their parent.
    fn create_bvh_node(
        &mut self,
        indices: &mut [usize],
        start: usize,
        aabb: Aabb,
        depth: usize,
    ) -> usize {
        let count = indices.len();
        let split = if count <= MIN_LEAF_SIZE || depth >= MAX_DEPTH {
            None
        } else {
            self.find_split(indices, &aabb)
        };
        let content = match split {
            Some(first_part_len) => {
                let (left_indices, right_indices) = indices.split_at_mut(first_part_len);
                let left_aabb = self.union_of(left_indices);
                let right_aabb = self.union_of(right_indices);
                let left = self.create_bvh_node(left_indices, start, left_aabb, depth + 1);
                let right = self.create_bvh_node(
                    right_indices,
                    start + first_part_len,
                    right_aabb,
                    depth + 1,
                );
                BvhContent::Internal { left, right }
            }
            None => BvhContent::Leaf {
                first_primitive: start,
                primitive_count: count,
            },
        };
        self.nodes.push(BvhNode { aabb, content });
        self.nodes.len() - 1
    }

    fn union_of(&self, indices: &[usize]) -> Aabb {
        indices
            .iter()
            .fold(Aabb::default(), |acc, &i| acc.extend_aabb(&self.bboxes[i]))
    }

    fn sort_by_axis(&self, indices: &mut [usize], axis: usize) {
        let centers = self.centers;
        indices.sort_unstable_by(|&l, &r| centers[l][axis].total_cmp(&centers[r][axis]));
    }

    // Returns the length of the left part, leaving `indices` sorted along the
    // chosen axis, or None when a leaf is cheaper.
    fn find_split(&mut self, indices: &mut [usize], aabb: &Aabb) -> Option<usize> {
        let count = indices.len();
        let mut best: Option<(Fp, usize, usize)> = None;
        for axis in 0..3 {
            self.sort_by_axis(indices, axis);

            let mut right = Aabb::default();
            for i in (1..count).rev() {
                right = right.extend_aabb(&self.bboxes[indices[i]]);
                self.right_areas[i] = right.half_area();
            }

            let mut left = Aabb::default();
            for i in 0..count - 1 {
                left = left.extend_aabb(&self.bboxes[indices[i]]);
                let left_count = (i + 1) as Fp;
                let right_count = (count - i - 1) as Fp;
                let cost =
                    left.half_area() * left_count + self.right_areas[i + 1] * right_count;
                if best.map_or(true, |(best_cost, _, _)| cost < best_cost) {
                    best = Some((cost, axis, i + 1));
                }
            }
        }

        let (best_cost, best_axis, first_part_len) = best?;
        let leaf_cost = aabb.half_area() * (count as Fp - TRAVERSAL_COST);
        if best_cost >= leaf_cost && count <= MAX_LEAF_SIZE {
            return None;
        }
        if best_axis != 2 {
            self.sort_by_axis(indices, best_axis);
        }
        Some(first_part_len)
    }
}

/// Closest-hit query over `primitives`, which must already be stored in BVH
/// order. Children are visited nearest-first and pruned against the best hit.
pub fn find_closest_hit(bvh: &Bvh, primitives: &[Triangle], ray: &Ray) -> Option<Hit> {
    if bvh.is_empty() {
        return None;
    }
    let inv_dir = ray.inverse_direction();
    let mut closest: Option<Hit> = None;
    let mut closest_t = ray.t_max;

    let root = &bvh.nodes[bvh.root];
    let Some((root_entry, _)) = root.aabb.intersect_ray(ray, &inv_dir) else {
        return None;
    };
    let mut stack = ArrayVec::<(usize, Fp), STACK_SIZE>::new();
    stack.push((bvh.root, root_entry));

    while let Some((node_index, t_entry)) = stack.pop() {
        if t_entry >= closest_t {
            continue;
        }
        match bvh.nodes[node_index].content {
            BvhContent::Leaf {
                first_primitive,
                primitive_count,
            } => {
                for primitive_index in first_primitive..first_primitive + primitive_count {
                    let bounded = Ray {
                        t_max: closest_t,
                        ..ray.clone()
                    };
                    if let Some((t, u, v)) = primitives[primitive_index].intersect(&bounded) {
                        closest_t = t;
                        closest = Some(Hit {
                            distance: t,
                            primitive_index,
                            u,
                            v,
                        });
                    }
                }
            }
            BvhContent::Internal { left, right } => {
                let bounded = Ray {
                    t_max: closest_t,
                    ..ray.clone()
                };
                let left_hit = bvh.nodes[left].aabb.intersect_ray(&bounded, &inv_dir);
                let right_hit = bvh.nodes[right].aabb.intersect_ray(&bounded, &inv_dir);
                // push the farther child first so the nearer one is popped next
                match (left_hit, right_hit) {
                    (Some((lt, _)), Some((rt, _))) => {
                        if lt < rt {
                            stack.push((right, rt));
                            stack.push((left, lt));
                        } else {
                            stack.push((left, lt));
                            stack.push((right, rt));
                        }
                    }
                    (Some((lt, _)), None) => stack.push((left, lt)),
                    (None, Some((rt, _))) => stack.push((right, rt)),
                    (None, None) => {}
                }
            }
        }
    }
    closest
}
