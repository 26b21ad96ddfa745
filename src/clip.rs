//! Polygon/line/point clipping against the six clip-space planes
//! (spec.md §4.6).
//!
//! Generalizes the fan/strip triangle-splitting idiom already used by the
//! assembler (`vertex::Assembler`) one stage later in the pipeline: instead
//! of splitting a strip into triangles, this splits a triangle against each
//! of the six `w ± {x,y,z} >= 0` planes in turn, Sutherland-Hodgman style,
//! carrying every per-vertex attribute along for the ride.

use smallvec::SmallVec;

use crate::math::Vec4;

/// A vertex in clip space carrying every attribute that must be
/// interpolated across a clip edge (spec.md §4.6).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipVertex {
    pub clip: Vec4,
    pub color: [f32; 4],
    pub normal: [f32; 3],
    pub texcoord: [f32; 2],
}

impl ClipVertex {
    fn lerp(self, other: ClipVertex, t: f32) -> ClipVertex {
        let lerp3 = |a: [f32; 3], b: [f32; 3]| {
            [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t, a[2] + (b[2] - a[2]) * t]
        };
        let lerp2 = |a: [f32; 2], b: [f32; 2]| [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t];
        let lerp4 = |a: [f32; 4], b: [f32; 4]| {
            [
                a[0] + (b[0] - a[0]) * t,
                a[1] + (b[1] - a[1]) * t,
                a[2] + (b[2] - a[2]) * t,
                a[3] + (b[3] - a[3]) * t,
            ]
        };
        ClipVertex {
            clip: self.clip.lerp(other.clip, t),
            color: lerp4(self.color, other.color),
            normal: lerp3(self.normal, other.normal),
            texcoord: lerp2(self.texcoord, other.texcoord),
        }
    }
}

/// Maximum polygon size after clipping: 16 vertices practically suffices
/// for a triangle clipped against six planes (spec.md §4.6).
pub const MAX_CLIPPED_VERTS: usize = 16;

type PlaneFn = fn(&Vec4) -> f32;

const PLANES: [PlaneFn; 6] = [
    |c| c.w + c.x, // w + x >= 0
    |c| c.w - c.x, // w - x >= 0
    |c| c.w + c.y, // w + y >= 0
    |c| c.w - c.y, // w - y >= 0
    |c| c.w + c.z, // w + z >= 0
    |c| c.w - c.z, // w - z >= 0
];

/// Sutherland-Hodgman clip of a convex polygon against all six planes.
/// Returns an empty output if the polygon is entirely outside any plane.
pub fn clip_polygon(input: &[ClipVertex]) -> SmallVec<[ClipVertex; MAX_CLIPPED_VERTS]> {
    let mut current: SmallVec<[ClipVertex; MAX_CLIPPED_VERTS]> = input.iter().copied().collect();

    for plane in PLANES {
        if current.is_empty() {
            break;
        }
        let mut output: SmallVec<[ClipVertex; MAX_CLIPPED_VERTS]> = SmallVec::new();
        let n = current.len();
        for i in 0..n {
            let curr = current[i];
            let prev = current[(i + n - 1) % n];
            let curr_dist = plane(&curr.clip);
            let prev_dist = plane(&prev.clip);
            let curr_inside = curr_dist >= 0.0;
            let prev_inside = prev_dist >= 0.0;

            if curr_inside {
                if !prev_inside {
                    let t = prev_dist / (prev_dist - curr_dist);
                    output.push(prev.lerp(curr, t));
                }
                output.push(curr);
            } else if prev_inside {
                let t = prev_dist / (prev_dist - curr_dist);
                output.push(prev.lerp(curr, t));
            }
        }
        current = output;
    }

    current
}

/// Parametric (Liang-Barsky-style) clip of a single segment against all six
/// planes (spec.md §4.6). Returns `None` if the segment is entirely
/// outside any plane.
pub fn clip_line(a: ClipVertex, b: ClipVertex) -> Option<(ClipVertex, ClipVertex)> {
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;

    for plane in PLANES {
        let da = plane(&a.clip);
        let db = plane(&b.clip);
        let delta = db - da;

        if delta.abs() < f32::EPSILON {
            if da < 0.0 {
                return None;
            }
            continue;
        }

        let t = -da / delta;
        if delta > 0.0 {
            // Entering the half-space as t increases.
            if t > t1 {
                return None;
            }
            t0 = t0.max(t);
        } else {
            if t < t0 {
                return None;
            }
            t1 = t1.min(t);
        }
    }

    if t0 > t1 {
        return None;
    }

    Some((a.lerp(b, t0), a.lerp(b, t1)))
}

/// A point is accepted iff it lies inside all six planes (spec.md §4.6).
pub fn point_visible(p: &ClipVertex) -> bool {
    PLANES.iter().all(|plane| plane(&p.clip) >= 0.0)
}
