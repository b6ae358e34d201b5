// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Lighting helpers shared by the built-in shaders
//!
//! All positions and directions are expected in view space (camera at the
//! origin looking down -Z), which is where the built-in vertex shaders put
//! normals and surface positions.
//!
//! # Light model
//!
//! For each light the contribution is
//!
//! ```text
//! color  = light.color · lambert · diffuse.rgb
//!        + specular · spec_factor            (only when lambert > 0)
//! result = clamp(Σ color · atten + emission + ambient, 0, 1)
//! ```
//!
//! Directional lights (`position.w == 0`) are never attenuated. Positional
//! lights use `1 / (1 + k·clamp(d²/r², 0, 1))` plus an optional spotlight cone.

use glam::{Vec3, Vec4};

use super::Uniforms;

/// Cel shading transition half-width
const CEL_EDGE: f32 = 0.05;

/// A light source in view space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// `w == 0` for a directional light (xyz is the direction towards the
    /// light), `w == 1` for a positional light
    pub position: Vec4,
    pub color: Vec3,
    /// Attenuation parameters
    ///
    /// - `x`: spotlight cosine cutoff (disabled when `<= 0`)
    /// - `y`: spotlight falloff exponent
    /// - `z`: distance attenuation factor
    /// - `w`: squared reference radius
    pub atten: Vec4,
    /// Spotlight axis
    pub spot_direction: Vec3,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec4::new(0.0, 0.0, 1.0, 0.0),
            color: Vec3::ONE,
            atten: Vec4::new(-1.0, 1.0, 0.0, 1.0),
            spot_direction: Vec3::new(0.0, 0.0, -1.0),
        }
    }
}

impl Light {
    /// Directional light shining from `direction` towards the origin
    pub fn directional(direction: Vec3, color: Vec3) -> Self {
        Self {
            position: direction.extend(0.0),
            color,
            ..Self::default()
        }
    }

    /// Point light at `position`
    pub fn point(position: Vec3, color: Vec3) -> Self {
        Self {
            position: position.extend(1.0),
            color,
            ..Self::default()
        }
    }

    fn is_positional(&self) -> bool {
        self.position.w > 0.0
    }
}

/// Surface material read from the uniform bag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub diffuse: Vec4,
    pub specular: Vec3,
    pub shininess: f32,
    pub emission: Vec3,
    pub ambient: Vec3,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: Vec4::ONE,
            specular: Vec3::ONE,
            shininess: 20.0,
            emission: Vec3::ZERO,
            ambient: Vec3::ZERO,
        }
    }
}

impl Material {
    /// Read `diffuse`, `specular`, `shininess`, `emission` and `ambient`
    /// uniforms, falling back to the defaults for anything unset
    pub fn from_uniforms(uniforms: &Uniforms) -> Self {
        let d = Self::default();
        Self {
            diffuse: uniforms.vec4_or("diffuse", d.diffuse),
            specular: uniforms.vec3_or("specular", d.specular),
            shininess: uniforms.float_or("shininess", d.shininess),
            emission: uniforms.vec3_or("emission", d.emission),
            ambient: uniforms.vec3_or("ambient", d.ambient),
        }
    }

    /// Same material with the diffuse color modulated by a texel
    pub fn with_texel(mut self, texel: Vec4) -> Self {
        self.diffuse *= texel;
        self
    }
}

/// Diffuse factor `max(0, L·N)`
#[inline]
pub fn lambert(light_direction: Vec3, normal: Vec3) -> f32 {
    light_direction.dot(normal).max(0.0)
}

/// Blinn-style specular factor
///
/// The half vector is `normalize(L + (camera - point))`.
pub fn specular(light_direction: Vec3, camera: Vec3, point: Vec3, normal: Vec3, shininess: f32) -> f32 {
    let half = (light_direction + (camera - point)).normalize_or_zero();
    half.dot(normal).max(0.0).powf(shininess)
}

/// Distance and spotlight attenuation for a positional light
///
/// A zero reference radius disables the distance term.
pub fn attenuation(light_direction: Vec3, distance: f32, atten: Vec4, spot_direction: Vec3) -> f32 {
    let d = if atten.w != 0.0 {
        (distance * distance / atten.w).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut factor = 1.0 / (1.0 + atten.z * d);

    if atten.x > 0.0 {
        let cosine = (-light_direction.dot(spot_direction)).max(0.0);
        if cosine < atten.x {
            return 0.0;
        }
        factor *= cosine.powf(atten.y);
    }

    factor
}

/// Quantize a diffuse term into `level` bands with smoothed edges
pub fn cel_shade(d: f32, level: f32) -> f32 {
    let d = d * level;
    let r = 1.0 / (level - 0.5);
    let fd = d.floor();
    let dr = d * r;

    if d > fd - CEL_EDGE && d < fd + CEL_EDGE {
        let last = (fd - sign(d - fd)) * r;
        let t = smoothstep((fd - CEL_EDGE) * r, (fd + CEL_EDGE) * r, dr);
        return lerp(last, fd * r, t);
    }
    fd * r
}

/// Two-level specular highlight
pub fn specular_cel_shade(sf: f32) -> f32 {
    if sf > 0.5 - CEL_EDGE && sf < 0.5 + CEL_EDGE {
        smoothstep(0.5 - CEL_EDGE, 0.5 + CEL_EDGE, sf)
    } else if sf < 0.5 {
        0.0
    } else {
        1.0
    }
}

/// Direction towards the light (normalized) and the distance to it
fn light_vector(light: &Light, position: Vec3) -> (Vec3, f32) {
    let lw = if light.is_positional() { light.position.w } else { 0.0 };
    let to_light = light.position.truncate() - position * lw;
    let distance = to_light.length();
    let direction = if distance > 0.0 {
        to_light / distance
    } else {
        Vec3::ZERO
    };
    (direction, distance)
}

fn light_atten(light: &Light, direction: Vec3, distance: f32) -> f32 {
    if light.is_positional() {
        attenuation(direction, distance, light.atten, light.spot_direction)
    } else {
        1.0
    }
}

fn finish(sum: Vec3, material: &Material) -> Vec4 {
    (sum + material.emission + material.ambient)
        .clamp(Vec3::ZERO, Vec3::ONE)
        .extend(material.diffuse.w)
}

/// Phong lighting over a light list
///
/// # Arguments
///
/// * `camera` - Camera position (the origin in view space)
/// * `position` - Surface point
/// * `normal` - Unit surface normal
/// * `lights` - Lights to accumulate
/// * `material` - Surface material
///
/// # Returns
///
/// RGBA color with alpha taken from the material's diffuse color
pub fn phong(camera: Vec3, position: Vec3, normal: Vec3, lights: &[Light], material: &Material) -> Vec4 {
    let diffuse = material.diffuse.truncate();
    let mut sum = Vec3::ZERO;

    for light in lights {
        let (direction, distance) = light_vector(light, position);
        let diffuse_factor = lambert(direction, normal);
        let atten = light_atten(light, direction, distance);

        let mut color = light.color * diffuse_factor * diffuse;
        if diffuse_factor > 0.0 {
            let s = specular(direction, camera, position, normal, material.shininess);
            color += material.specular * s;
        }
        sum = (sum + color * atten).clamp(Vec3::ZERO, Vec3::ONE);
    }

    finish(sum, material)
}

/// Cel (toon) lighting over a light list
///
/// Same inputs as [`phong`], with the diffuse term quantized into `level`
/// bands and the specular term reduced to a hard highlight.
pub fn cel(
    camera: Vec3,
    position: Vec3,
    normal: Vec3,
    lights: &[Light],
    material: &Material,
    level: f32,
) -> Vec4 {
    let diffuse = material.diffuse.truncate();
    let mut sum = Vec3::ZERO;

    for light in lights {
        let (direction, distance) = light_vector(light, position);
        let diffuse_factor = lambert(direction, normal);
        let atten = light_atten(light, direction, distance);

        let mut color = light.color * cel_shade(diffuse_factor * atten, level) * diffuse;
        if diffuse_factor > 0.0 {
            let s = specular(direction, camera, position, normal, material.shininess);
            color += material.specular * specular_cel_shade(s * atten);
        }
        sum = (sum + color).clamp(Vec3::ZERO, Vec3::ONE);
    }

    finish(sum, material)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 == edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Sign with `sign(0) == 0`
#[inline]
fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_lambert_clamps_back_facing() {
        assert_eq!(lambert(Vec3::Z, Vec3::Z), 1.0);
        assert_eq!(lambert(Vec3::Z, -Vec3::Z), 0.0);
    }

    #[test]
    fn test_specular_peaks_on_mirror_direction() {
        // Light and camera both straight in front of the surface
        let s = specular(Vec3::Z, Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Z, 20.0);
        assert!((s - 1.0).abs() < EPS);
    }

    #[test]
    fn test_attenuation_distance() {
        let atten = Vec4::new(-1.0, 1.0, 1.0, 4.0);
        // d² / r² = 1 -> 1 / (1 + 1)
        let a = attenuation(Vec3::Z, 2.0, atten, -Vec3::Z);
        assert!((a - 0.5).abs() < EPS);
    }

    #[test]
    fn test_attenuation_spot_cutoff() {
        let atten = Vec4::new(0.9, 1.0, 0.0, 1.0);
        // Light direction points back along the spot axis -> inside the cone
        assert!(attenuation(Vec3::Z, 1.0, atten, -Vec3::Z) > 0.0);
        // Perpendicular -> outside the cone
        assert_eq!(attenuation(Vec3::X, 1.0, atten, -Vec3::Z), 0.0);
    }

    #[test]
    fn test_phong_directional_light() {
        let lights = [Light::directional(Vec3::Z, Vec3::ONE)];
        let material = Material {
            diffuse: Vec4::new(0.5, 0.25, 1.0, 0.75),
            specular: Vec3::ZERO,
            ..Material::default()
        };
        let c = phong(Vec3::ZERO, Vec3::new(0.0, 0.0, -5.0), Vec3::Z, &lights, &material);
        assert!((c - Vec4::new(0.5, 0.25, 1.0, 0.75)).abs().max_element() < EPS);
    }

    #[test]
    fn test_phong_no_lights_is_emission_plus_ambient() {
        let material = Material {
            emission: Vec3::new(0.1, 0.0, 0.0),
            ambient: Vec3::new(0.0, 0.2, 0.0),
            ..Material::default()
        };
        let c = phong(Vec3::ZERO, Vec3::ZERO, Vec3::Z, &[], &material);
        assert!((c - Vec4::new(0.1, 0.2, 0.0, 1.0)).abs().max_element() < EPS);
    }

    #[test]
    fn test_cel_shade_bands() {
        // Far from band edges the result is a flat step
        assert_eq!(cel_shade(0.0, 4.0), 0.0);
        let mid = cel_shade(0.6, 4.0); // d = 2.4 -> floor 2
        assert!((mid - 2.0 / 3.5).abs() < EPS);
    }

    #[test]
    fn test_specular_cel_shade() {
        assert_eq!(specular_cel_shade(0.1), 0.0);
        assert_eq!(specular_cel_shade(0.9), 1.0);
        assert!((specular_cel_shade(0.5) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_material_from_uniforms() {
        let mut uniforms = Uniforms::default();
        uniforms.set("shininess", 8.0_f32);
        let m = Material::from_uniforms(&uniforms);
        assert_eq!(m.shininess, 8.0);
        assert_eq!(m.diffuse, Vec4::ONE);
    }
}
