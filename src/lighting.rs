//! Per-vertex lighting evaluator (spec.md §3, §4.4).
//!
//! Mirrors the shape of `graphics::gx::lighting::{ColorChannel,LightingState}`
//! (material/ambient registers plus per-channel enable), generalized from
//! the GameCube's two fixed color channels to the spec's up-to-`MAX_LIGHTS`
//! directional/positional light array with full Phong ambient+diffuse+
//! specular and spot/distance attenuation.

use crate::color::Color;
use crate::math::Vec3;

pub const MAX_LIGHTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Front,
    Back,
    FrontAndBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialChannel {
    Ambient,
    Diffuse,
    AmbientAndDiffuse,
    Specular,
    Emission,
}

#[derive(Debug, Clone, Copy)]
pub struct Material {
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub emission: Color,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Color::rgba(51, 51, 51, 255),
            diffuse: Color::rgba(204, 204, 204, 255),
            specular: Color::BLACK,
            emission: Color::BLACK,
            shininess: 0.0,
        }
    }
}

/// A single light (spec.md §3). `position.w == 0.0` marks a directional
/// light (`position.xyz` is then the direction it shines *from*, i.e. the
/// negated light direction); `position.w == 1.0` marks a positional light.
#[derive(Debug, Clone, Copy)]
pub struct Light {
    pub enabled: bool,
    pub position: [f32; 4],
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub spot_direction: Vec3,
    /// Degrees; 180.0 disables the spot cone (omnidirectional).
    pub spot_cutoff: f32,
    pub spot_exponent: f32,
    /// (constant, linear, quadratic).
    pub attenuation: (f32, f32, f32),
}

impl Default for Light {
    fn default() -> Self {
        Self {
            enabled: false,
            position: [0.0, 0.0, 1.0, 0.0],
            ambient: Color::BLACK,
            diffuse: Color::WHITE,
            specular: Color::WHITE,
            spot_direction: Vec3::new(0.0, 0.0, -1.0),
            spot_cutoff: 180.0,
            spot_exponent: 0.0,
            attenuation: (1.0, 0.0, 0.0),
        }
    }
}

/// A vertex color to be spliced into a material channel when
/// `COLOR_MATERIAL` is enabled (spec.md §3, §4.4).
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorMaterial {
    pub enabled: bool,
    pub face: Face,
    pub channel: MaterialChannel,
}

impl Default for Face {
    fn default() -> Self {
        Face::FrontAndBack
    }
}

impl Default for MaterialChannel {
    fn default() -> Self {
        MaterialChannel::AmbientAndDiffuse
    }
}

fn mul3(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] * b[0], a[1] * b[1], a[2] * b[2]]
}

fn rgb3(c: Color) -> [f32; 3] {
    let f = c.to_f32();
    [f[0], f[1], f[2]]
}

/// Evaluate full ambient+diffuse+specular lighting for one vertex in eye
/// space (spec.md §4.4). `eye_pos`/`eye_normal` are already in eye space;
/// the eye itself sits at the origin of eye space, so the view vector is
/// `-eye_pos` normalized.
pub fn evaluate(
    eye_pos: Vec3,
    eye_normal: Vec3,
    material: &Material,
    global_ambient: Color,
    lights: &[Light; MAX_LIGHTS],
) -> Color {
    let n = eye_normal.normalize();
    let view = (Vec3::ZERO - eye_pos).normalize();

    let m_amb = rgb3(material.ambient);
    let m_diff = rgb3(material.diffuse);
    let m_spec = rgb3(material.specular);
    let m_emit = rgb3(material.emission);
    let global_amb = rgb3(global_ambient);

    let mut accum = [
        global_amb[0] * m_amb[0] + m_emit[0],
        global_amb[1] * m_amb[1] + m_emit[1],
        global_amb[2] * m_amb[2] + m_emit[2],
    ];
    let mut alpha = material.diffuse.to_f32()[3];

    for light in lights.iter().filter(|l| l.enabled) {
        let positional = light.position[3] != 0.0;
        let light_pos = Vec3::new(light.position[0], light.position[1], light.position[2]);

        let (l_vec, distance) = if positional {
            let delta = light_pos - eye_pos;
            (delta.normalize(), delta.length())
        } else {
            ((Vec3::ZERO - light_pos).normalize(), 0.0)
        };

        let n_dot_l = n.dot(l_vec).max(0.0);

        let spot_factor = if light.spot_cutoff >= 180.0 {
            1.0
        } else {
            let spot_dir = light.spot_direction.normalize();
            let cos_angle = (Vec3::ZERO - l_vec).dot(spot_dir);
            let cos_cutoff = light.spot_cutoff.to_radians().cos();
            if cos_angle >= cos_cutoff {
                cos_angle.max(0.0).powf(light.spot_exponent)
            } else {
                0.0
            }
        };

        let dist_atten = if positional {
            let (kc, kl, kq) = light.attenuation;
            1.0 / (kc + kl * distance + kq * distance * distance).max(f32::EPSILON)
        } else {
            1.0
        };

        let atten = spot_factor * dist_atten;
        if atten <= 0.0 {
            continue;
        }

        let l_amb = rgb3(light.ambient);
        let l_diff = rgb3(light.diffuse);
        let l_spec = rgb3(light.specular);

        let mut contribution = [
            l_amb[0] * m_amb[0],
            l_amb[1] * m_amb[1],
            l_amb[2] * m_amb[2],
        ];
        let diff_term = mul3(m_diff, l_diff);
        for i in 0..3 {
            contribution[i] += diff_term[i] * n_dot_l;
        }

        if n_dot_l > 0.0 && material.shininess > 0.0 {
            let reflect = n * (2.0 * n.dot(l_vec)) - l_vec;
            let spec_factor = reflect.dot(view).max(0.0).powf(material.shininess);
            let spec_term = mul3(m_spec, l_spec);
            for i in 0..3 {
                contribution[i] += spec_term[i] * spec_factor;
            }
        }

        for i in 0..3 {
            accum[i] += contribution[i] * atten;
        }
    }

    alpha = alpha.clamp(0.0, 1.0);
    Color::from_f32_clamped([accum[0], accum[1], accum[2], alpha])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_lights_leaves_only_ambient_and_emission() {
        let lights = [Light::default(); MAX_LIGHTS];
        let material = Material {
            ambient: Color::rgb(100, 100, 100),
            ..Default::default()
        };
        let c = evaluate(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), &material, Color::rgb(50, 50, 50), &lights);
        // global_ambient(50/255) * material_ambient(100/255) ~ 0.077 -> ~20
        assert!(c.r < 30 && c.r > 10);
    }

    #[test]
    fn directly_facing_directional_light_is_bright() {
        let mut lights = [Light::default(); MAX_LIGHTS];
        lights[0] = Light {
            enabled: true,
            position: [0.0, 0.0, 1.0, 0.0],
            diffuse: Color::WHITE,
            ..Default::default()
        };
        let material = Material { diffuse: Color::WHITE, ..Default::default() };
        let c = evaluate(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), &material, Color::BLACK, &lights);
        assert!(c.r > 240);
    }

    #[test]
    fn grazing_directional_light_is_dark() {
        let mut lights = [Light::default(); MAX_LIGHTS];
        lights[0] = Light {
            enabled: true,
            position: [1.0, 0.0, 0.0, 0.0],
            diffuse: Color::WHITE,
            ..Default::default()
        };
        let material = Material { diffuse: Color::WHITE, ambient: Color::BLACK, ..Default::default() };
        let c = evaluate(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), &material, Color::BLACK, &lights);
        assert_eq!(c.r, 0);
    }
}
