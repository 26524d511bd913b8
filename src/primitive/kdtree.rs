use crate::core::{
    bbox::Bbox, error::BuildError, fast_stack::FastStack, intersection::TraverseResult, ray::Ray,
};

use super::Triangle;

/// Capacity of the per-query traversal stack.
pub const TRAVERSAL_STACK_SIZE: usize = 64;
/// Deepest tree the traversal stack can serve.
pub const MAX_KD_DEPTH: u32 = TRAVERSAL_STACK_SIZE as u32 - 1;

const BUCKET_NUMBER: usize = 16;
const TRAVERSAL_COST: f32 = 1.0;
const INTERSECT_COST: f32 = 4.0;
/// Absolute padding of the root box and the smallest node extent worth splitting.
const EPSILON: f32 = 1e-3;
const PARALLEL_EPS: f32 = 1e-12;

/// One node of the flat node arena.
///
/// Interior nodes carry a split axis and child indices; leaves carry `axis == None`,
/// `INVALID` children and a `[start, end)` range into the tree's index array.
#[derive(Copy, Clone, Debug)]
pub struct KdNode {
    pub axis: Option<usize>,
    pub split: f32,
    pub left: u32,
    pub right: u32,
    pub start: u32,
    pub end: u32,
    pub bbox: Bbox,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct KdTreeStats {
    pub nodes: usize,
    pub leaves: usize,
    pub empty_leaves: usize,
    pub max_depth_reached: u32,
    /// Triangle references stored across all leaves, duplicates included.
    pub references: usize,
    pub skipped_degenerate: usize,
}

pub struct KdTree {
    triangles: Vec<Triangle>,
    nodes: Vec<KdNode>,
    indices: Vec<u32>,
    bbox: Bbox,
    stats: KdTreeStats,
}

struct BuildTask {
    node: u32,
    depth: u32,
    bbox: Bbox,
    refs: Vec<u32>,
}

#[derive(Copy, Clone, Default)]
struct TraverseEntry {
    node: u32,
    t_near: f32,
    t_far: f32,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Side {
    Below,
    Both,
    Above,
}

impl KdNode {
    pub const INVALID: u32 = u32::MAX;

    fn leaf(bbox: Bbox) -> Self {
        Self {
            axis: None,
            split: 0.0,
            left: Self::INVALID,
            right: Self::INVALID,
            start: 0,
            end: 0,
            bbox,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.axis.is_none()
    }

    pub fn size(&self) -> usize {
        (self.end - self.start) as usize
    }
}

impl KdTree {
    /// Builds the tree top-down.
    ///
    /// Degenerate triangles stay in the triangle list, so indices held by callers
    /// remain valid, but no leaf references them. A triangle whose box straddles a
    /// split plane is referenced by both children.
    pub fn build(
        triangles: Vec<Triangle>,
        max_depth: u32,
        min_leaf_size: usize,
    ) -> Result<Self, BuildError> {
        if triangles.is_empty() {
            return Err(BuildError::NoTriangles);
        }
        if max_depth > MAX_KD_DEPTH {
            return Err(BuildError::MaxDepthTooLarge {
                depth: max_depth,
                limit: MAX_KD_DEPTH,
            });
        }

        let refs: Vec<u32> = triangles
            .iter()
            .enumerate()
            .filter(|(_, tri)| !tri.is_degenerate())
            .map(|(i, _)| i as u32)
            .collect();
        let skipped_degenerate = triangles.len() - refs.len();
        if refs.is_empty() {
            return Err(BuildError::AllTrianglesDegenerate(triangles.len()));
        }
        if skipped_degenerate > 0 {
            log::warn!(
                "kd-tree: skipped {} degenerate triangle(s) out of {}",
                skipped_degenerate,
                triangles.len()
            );
        }

        let bbox = refs
            .iter()
            .fold(Bbox::empty(), |bbox, i| {
                bbox.merge(triangles[*i as usize].bbox())
            })
            .padded(EPSILON);

        let mut nodes = vec![KdNode::leaf(bbox)];
        let mut indices = Vec::with_capacity(refs.len() * 2);
        let mut stats = KdTreeStats {
            skipped_degenerate,
            ..Default::default()
        };

        let mut stack = vec![BuildTask {
            node: 0,
            depth: 0,
            bbox,
            refs,
        }];
        while let Some(mut task) = stack.pop() {
            stats.max_depth_reached = stats.max_depth_reached.max(task.depth);

            let split = if task.depth >= max_depth || task.refs.len() <= min_leaf_size {
                None
            } else {
                Self::find_split(&triangles, &task.bbox, &task.refs)
            };

            let children = split.and_then(|(axis, position)| {
                let (below_end, above_start) =
                    Self::partition(&triangles, &mut task.refs, axis, position);
                let total = task.refs.len();
                // every triangle straddles the plane, splitting would only duplicate them
                if above_start == total && below_end == 0 {
                    None
                } else {
                    Some((axis, position, below_end, above_start))
                }
            });

            match children {
                None => {
                    let node = &mut nodes[task.node as usize];
                    node.start = indices.len() as u32;
                    indices.extend_from_slice(&task.refs);
                    node.end = indices.len() as u32;
                }
                Some((axis, position, below_end, above_start)) => {
                    let (below_box, above_box) = task.bbox.split(axis, position);
                    let left = nodes.len() as u32;
                    let right = left + 1;
                    nodes.push(KdNode::leaf(below_box));
                    nodes.push(KdNode::leaf(above_box));

                    let node = &mut nodes[task.node as usize];
                    node.axis = Some(axis);
                    node.split = position;
                    node.left = left;
                    node.right = right;

                    let right_refs = task.refs[below_end..].to_vec();
                    task.refs.truncate(above_start);
                    stack.push(BuildTask {
                        node: right,
                        depth: task.depth + 1,
                        bbox: above_box,
                        refs: right_refs,
                    });
                    stack.push(BuildTask {
                        node: left,
                        depth: task.depth + 1,
                        bbox: below_box,
                        refs: task.refs,
                    });
                }
            }
        }

        stats.nodes = nodes.len();
        for node in nodes.iter().filter(|node| node.is_leaf()) {
            stats.leaves += 1;
            stats.references += node.size();
            if node.size() == 0 {
                stats.empty_leaves += 1;
            }
        }
        log::info!(
            "kd-tree: {} triangles, {} nodes, {} leaves ({} empty), depth {}, {:.2} refs/leaf",
            triangles.len(),
            stats.nodes,
            stats.leaves,
            stats.empty_leaves,
            stats.max_depth_reached,
            stats.references as f32 / stats.leaves as f32,
        );

        Ok(Self {
            triangles,
            nodes,
            indices,
            bbox,
            stats,
        })
    }

    /// Bucketed surface-area-heuristic sweep over all three axes.
    fn find_split(triangles: &[Triangle], bbox: &Bbox, refs: &[u32]) -> Option<(usize, f32)> {
        let node_area = bbox.surface_area();
        let diagonal = bbox.diagonal();
        let mut best: Option<(f32, usize, f32)> = None;

        for axis in 0..3 {
            let extent = diagonal[axis];
            if extent <= EPSILON {
                continue;
            }
            let low = bbox.p_min[axis];
            let len_per_bucket = extent / BUCKET_NUMBER as f32;
            let bucket_of = |value: f32| {
                let b = ((value - low) / len_per_bucket).floor();
                (b.max(0.0) as usize).min(BUCKET_NUMBER - 1)
            };

            let mut starts = [0usize; BUCKET_NUMBER];
            let mut ends = [0usize; BUCKET_NUMBER];
            for i in refs {
                let tri_box = triangles[*i as usize].bbox();
                starts[bucket_of(tri_box.p_min[axis])] += 1;
                ends[bucket_of(tri_box.p_max[axis])] += 1;
            }

            let mut below_count = 0;
            let mut above_count = refs.len();
            for plane in 1..BUCKET_NUMBER {
                below_count += starts[plane - 1];
                above_count -= ends[plane - 1];
                let position = low + len_per_bucket * plane as f32;
                let (below_box, above_box) = bbox.split(axis, position);
                let cost = TRAVERSAL_COST
                    + INTERSECT_COST
                        * (below_box.surface_area() * below_count as f32
                            + above_box.surface_area() * above_count as f32)
                        / node_area;
                if best.map_or(true, |(best_cost, _, _)| cost < best_cost) {
                    best = Some((cost, axis, position));
                }
            }
        }

        best.map(|(_, axis, position)| (axis, position)).or_else(|| {
            let axis = bbox.longest_axis();
            if diagonal[axis] > 0.0 {
                Some((axis, bbox.centroid()[axis]))
            } else {
                None
            }
        })
    }

    fn side_of(triangle: &Triangle, axis: usize, position: f32) -> Side {
        let tri_box = triangle.bbox();
        let below = tri_box.p_min[axis] <= position;
        let above = tri_box.p_max[axis] >= position;
        match (below, above) {
            (true, false) => Side::Below,
            (false, true) => Side::Above,
            _ => Side::Both,
        }
    }

    /// In-place three-way partition into `[below | both | above]`.
    ///
    /// Returns `(below_end, above_start)`: the left child takes `[0, above_start)`, the
    /// right child takes `[below_end, len)`.
    fn partition(
        triangles: &[Triangle],
        refs: &mut [u32],
        axis: usize,
        position: f32,
    ) -> (usize, usize) {
        let mut lo = 0;
        let mut mid = 0;
        let mut hi = refs.len();
        while mid < hi {
            match Self::side_of(&triangles[refs[mid] as usize], axis, position) {
                Side::Below => {
                    refs.swap(lo, mid);
                    lo += 1;
                    mid += 1;
                }
                Side::Both => mid += 1,
                Side::Above => {
                    hi -= 1;
                    refs.swap(mid, hi);
                }
            }
        }
        (lo, hi)
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangle(&self, index: usize) -> &Triangle {
        &self.triangles[index]
    }

    pub fn nodes(&self) -> &[KdNode] {
        &self.nodes
    }

    /// Triangle indices referenced by a leaf.
    pub fn leaf_indices(&self, node: &KdNode) -> &[u32] {
        &self.indices[node.start as usize..node.end as usize]
    }

    pub fn bbox(&self) -> Bbox {
        self.bbox
    }

    pub fn stats(&self) -> &KdTreeStats {
        &self.stats
    }

    /// Closest hit along the ray with `t > ray.t_min`.
    pub fn traverse(&self, ray: &Ray) -> TraverseResult {
        let mut result = TraverseResult::miss();
        self.walk(ray, f32::INFINITY, |leaf| {
            for index in leaf {
                let triangle = &self.triangles[*index as usize];
                if let Some((t, barycentric)) = triangle.intersect_ray(ray) {
                    if t > ray.t_min && t < result.t {
                        result.triangle = Some(*index as usize);
                        result.t = t;
                        result.barycentric = barycentric;
                    }
                }
            }
            result.t
        });
        if result.is_hit() {
            result.position = ray.point_at(result.t);
        }
        result
    }

    /// Whether anything blocks the ray within `(ray.t_min, t_max)`.
    pub fn intersect_test(&self, ray: &Ray, t_max: f32) -> bool {
        let mut occluded = false;
        self.walk(ray, t_max, |leaf| {
            occluded = leaf.iter().any(|index| {
                match self.triangles[*index as usize].intersect_ray(ray) {
                    Some((t, _)) => t > ray.t_min && t < t_max,
                    None => false,
                }
            });
            if occluded {
                f32::MIN
            } else {
                t_max
            }
        });
        occluded
    }

    /// Front-to-back descent with an explicit bounded stack.
    ///
    /// `visit_leaf` tests a leaf's triangles and returns the closest accepted distance
    /// so far; the walk stops once that distance lies inside the interval already swept.
    fn walk<F>(&self, ray: &Ray, t_max: f32, mut visit_leaf: F)
    where
        F: FnMut(&[u32]) -> f32,
    {
        let (t_near, t_far) = match self.bbox.intersect_ray(ray) {
            Some(interval) => interval,
            None => return,
        };
        let t_near = t_near.max(ray.t_min);
        let t_far = t_far.min(t_max);
        if t_near > t_far {
            return;
        }

        let mut best = t_max;
        let mut stack = FastStack::<TraverseEntry, TRAVERSAL_STACK_SIZE>::new();
        stack.push(TraverseEntry {
            node: 0,
            t_near,
            t_far,
        });

        while let Some(entry) = stack.pop() {
            if entry.t_near > best {
                break;
            }
            let mut node = &self.nodes[entry.node as usize];
            let t_near = entry.t_near;
            let mut t_far = entry.t_far;

            while let Some(axis) = node.axis {
                let origin = ray.origin[axis];
                let dir = ray.direction[axis];
                let below_first = origin < node.split || (origin == node.split && dir <= 0.0);
                let (first, second) = if below_first {
                    (node.left, node.right)
                } else {
                    (node.right, node.left)
                };
                let t_plane = if dir.abs() > PARALLEL_EPS {
                    (node.split - origin) * ray.inv_direction[axis]
                } else {
                    f32::INFINITY
                };

                if t_plane > t_far || t_plane <= 0.0 {
                    node = &self.nodes[first as usize];
                } else if t_plane < t_near {
                    node = &self.nodes[second as usize];
                } else {
                    stack.push(TraverseEntry {
                        node: second,
                        t_near: t_plane,
                        t_far,
                    });
                    node = &self.nodes[first as usize];
                    t_far = t_plane;
                }
            }

            best = best.min(visit_leaf(self.leaf_indices(node)));
            if best <= t_far {
                break;
            }
        }
    }
}
