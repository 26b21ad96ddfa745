//! Vertex pipeline: modelview/projection transform, lighting evaluation,
//! flat-shading provoking-vertex rule (spec.md §4.5).

use crate::clip::ClipVertex;
use crate::lighting::{self, MaterialChannel};
use crate::math::Vec3;
use crate::matrix_stack::MatrixState;
use crate::state::{RenderState, ShadeModel};
use crate::vertex::Vertex;

/// Transform one vertex: modelview -> eye space (for lighting), lighting
/// evaluation (or passthrough), projection -> clip space. Perspective
/// divide is deferred to after clipping (spec.md §4.5).
pub fn transform_vertex(v: &Vertex, state: &RenderState, matrices: &mut MatrixState) -> ClipVertex {
    let modelview = *matrices.modelview.top();
    let projection = *matrices.projection.top();

    let eye_pos = modelview.transform_vec3(Vec3::new(v.position[0], v.position[1], v.position[2]));

    let color = if state.lighting {
        let normal_matrix = modelview.inverse_transpose_3x3();
        let eye_normal = normal_matrix
            .transform_vec3(Vec3::new(v.normal[0], v.normal[1], v.normal[2]))
            .normalize();

        let mut material = state.material;
        if state.color_material.enabled {
            let vc = v.color;
            match state.color_material.channel {
                MaterialChannel::Ambient => material.ambient = vc,
                MaterialChannel::Diffuse => material.diffuse = vc,
                MaterialChannel::AmbientAndDiffuse => {
                    material.ambient = vc;
                    material.diffuse = vc;
                }
                MaterialChannel::Specular => material.specular = vc,
                MaterialChannel::Emission => material.emission = vc,
            }
        }

        lighting::evaluate(eye_pos, eye_normal, &material, state.global_ambient, &state.lights)
    } else {
        v.color
    };

    let clip = projection.transform_point4(eye_pos.to_vec4(1.0));

    ClipVertex { clip, color: color.to_f32(), normal: v.normal, texcoord: v.texcoord }
}

/// Copy the provoking (last) vertex's color to every vertex of the
/// primitive when `FLAT` shading is active (spec.md §4.4, §4.5).
pub fn apply_flat_shading(verts: &mut [ClipVertex], shade_model: ShadeModel) {
    if shade_model != ShadeModel::Flat || verts.is_empty() {
        return;
    }
    let provoking = verts[verts.len() - 1].color;
    for v in verts.iter_mut() {
        v.color = provoking;
    }
}
