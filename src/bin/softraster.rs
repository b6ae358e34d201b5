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

//! softraster entry point
//!
//! Renders a demo scene with the software pipeline and writes the frame to
//! a PNG file.
//!
//! ```text
//! softraster --scene cube --shading cel --width 640 --height 480 -o cube.png
//! softraster --shading fog --fog-mode exp2 -o fog.png
//! ```
//!
//! A render state config (TOML) can be given with `--config`, or through the
//! `SOFTRASTER_CONFIG` environment variable (also read from `.env`).

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use glam::{Mat4, Vec3, Vec4};
use softraster::core::config::RenderConfig;
use softraster::core::mesh::{MeshBuffer, SubMesh, Topology, VertexAttributes};
use softraster::core::raster::CullFace;
use softraster::core::renderer::Renderer;
use softraster::core::shader::builtin::{self, FogMode};
use softraster::core::shader::{Light, Texture, Uniforms};
use softraster::core::surface::MemorySurface;
use softraster::core::varyings::Varyings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scene {
    /// A single colored triangle
    Triangle,
    /// A rotated unit cube
    Cube,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Shading {
    /// Vertex colors only
    Flat,
    /// Per-vertex Phong lighting over a checker texture
    Lit,
    /// Procedural checker pattern
    Checkers,
    /// UV grid lines, everything else discarded
    Wire,
    /// Per-fragment cel shading
    Cel,
    /// Per-vertex cel shading
    VertexCel,
    /// Distance fog blended into the diffuse color
    Fog,
    /// Animated water surface (see `--time`)
    Water,
}

#[derive(Debug, Parser)]
#[command(name = "softraster", version, about = "Render a demo scene with the software rasterizer")]
struct Args {
    /// Frame width in pixels
    #[arg(long, default_value_t = 320)]
    width: usize,

    /// Frame height in pixels
    #[arg(long, default_value_t = 240)]
    height: usize,

    /// Render state config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long, default_value = "frame.png")]
    output: PathBuf,

    /// Scene to render
    #[arg(long, value_enum, default_value_t = Scene::Cube)]
    scene: Scene,

    /// Shader combination
    #[arg(long, value_enum, default_value_t = Shading::Lit)]
    shading: Shading,

    /// Animation time in seconds for the water shading
    #[arg(long, default_value_t = 1.0)]
    time: f32,

    /// Fog falloff: linear, exp or exp2
    #[arg(long, default_value = "linear")]
    fog_mode: FogMode,

    /// Write the effective render state to this TOML file
    #[arg(long)]
    dump_config: Option<PathBuf>,
}

/// Colored triangle filling most of the frame
fn triangle_mesh() -> softraster::Result<MeshBuffer> {
    Ok(MeshBuffer::builder()
        .attribute("position", 3, vec![-0.8, -0.8, 0.0, 0.8, -0.8, 0.0, 0.0, 0.8, 0.0])
        .attribute("uv", 2, vec![0.0, 0.0, 1.0, 0.0, 0.5, 1.0])
        .attribute("normal", 3, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0])
        .build()?)
}

/// Unit cube with per-face normals and uvs, plus its edges as a line submesh
fn cube_mesh() -> softraster::Result<MeshBuffer> {
    // (normal, u axis, v axis) per face
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    for (face, (normal, u_axis, v_axis)) in faces.iter().enumerate() {
        let base = (face * 4) as u32;
        for (u, v) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            let p = *normal * 0.5 + *u_axis * (u - 0.5) + *v_axis * (v - 0.5);
            positions.extend_from_slice(&p.to_array());
            normals.extend_from_slice(&normal.to_array());
            uvs.extend_from_slice(&[u, v]);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    let triangles = indices.len();
    // Outline of the front face
    indices.extend_from_slice(&[16, 17, 18, 19]);

    Ok(MeshBuffer::builder()
        .attribute("position", 3, positions)
        .attribute("normal", 3, normals)
        .attribute("uv", 2, uvs)
        .indices(indices)
        .sub_mesh(SubMesh::new(0, triangles, Topology::Triangles))
        .sub_mesh(SubMesh::new(triangles, 4, Topology::LineLoop).with_vertex_shader(outline_vertex))
        .build()?)
}

/// White edges regardless of the face shading
fn outline_vertex(out: &mut Varyings, attrs: &VertexAttributes, uniforms: &Uniforms) {
    out.position = uniforms.pmv_matrix * attrs.position();
    out.color = Vec4::ONE;
}

fn setup_shading(renderer: &mut Renderer<MemorySurface>, args: &Args) {
    let uniforms = renderer.uniforms_mut();
    uniforms.set("diffuse", Vec4::new(0.9, 0.6, 0.2, 1.0));
    uniforms.set("ambient", Vec3::splat(0.1));
    uniforms.set("shininess", 32.0_f32);
    uniforms.set(
        "lights",
        vec![Light::directional(Vec3::new(0.5, 1.0, 1.0).normalize(), Vec3::ONE)],
    );
    uniforms.set(
        "text1",
        Texture::checkerboard(64, 8, Vec4::ONE, Vec4::new(0.6, 0.6, 0.6, 1.0)),
    );

    match args.shading {
        Shading::Flat => {
            renderer.set_vertex_shader(builtin::default_vertex);
            renderer.set_fragment_shader(builtin::default_fragment);
        }
        Shading::Lit => {
            renderer.set_vertex_shader(builtin::vertex_lit);
            renderer.set_fragment_shader(builtin::default_fragment);
        }
        Shading::Checkers => {
            renderer.set_vertex_shader(builtin::default_vertex);
            renderer.set_fragment_shader(builtin::checkers);
        }
        Shading::Wire => {
            renderer.set_vertex_shader(builtin::default_vertex);
            renderer.set_fragment_shader(builtin::uv_wire);
            renderer.set_cull_face(CullFace::None);
        }
        Shading::Cel => {
            renderer.set_vertex_shader(builtin::phong_vertex);
            renderer.set_fragment_shader(builtin::cel_fragment);
        }
        Shading::VertexCel => {
            renderer.set_vertex_shader(builtin::vertex_cel);
            renderer.set_fragment_shader(builtin::default_fragment);
        }
        Shading::Fog => {
            let fog_color = Vec3::splat(0.7);
            let uniforms = renderer.uniforms_mut();
            uniforms.set("fogColor", fog_color);
            uniforms.set("fogStart", 2.0_f32);
            uniforms.set("fogEnd", 4.5_f32);
            uniforms.set("fogDensity", 0.3_f32);
            renderer.set_vertex_shader(builtin::fog_vertex(args.fog_mode));
            renderer.set_fragment_shader(builtin::default_fragment);
            renderer.set_clear_color(fog_color.extend(1.0));
        }
        Shading::Water => {
            let uniforms = renderer.uniforms_mut();
            uniforms.set("diffuse", Vec4::new(0.2, 0.45, 0.8, 1.0));
            uniforms.set("time", args.time);
            uniforms.set("intensity", 0.05_f32);
            uniforms.set("textScale", 4.0_f32);
            renderer.set_vertex_shader(builtin::water_vertex);
            renderer.set_fragment_shader(builtin::default_fragment);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    log::info!(
        "Rendering {:?} scene ({:?} shading) at {}x{}",
        args.scene,
        args.shading,
        args.width,
        args.height
    );

    let mut renderer = Renderer::new(MemorySurface::new(args.width, args.height));
    setup_shading(&mut renderer, &args);

    let config_path = args
        .config
        .clone()
        .or_else(|| std::env::var_os("SOFTRASTER_CONFIG").map(PathBuf::from));
    if let Some(path) = config_path {
        let config = RenderConfig::load(&path)?;
        for warning in config.apply(&mut renderer) {
            log::warn!("{}: {}", path.display(), warning);
        }
    }

    let aspect = args.width.max(1) as f32 / args.height.max(1) as f32;
    let mesh = match args.scene {
        Scene::Triangle => triangle_mesh()?,
        Scene::Cube => {
            renderer.set_projection_matrix(Mat4::perspective_rh_gl(
                60_f32.to_radians(),
                aspect,
                0.1,
                100.0,
            ));
            renderer.set_view_matrix(Mat4::look_at_rh(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y));
            renderer.set_model_matrix(
                Mat4::from_rotation_y(35_f32.to_radians()) * Mat4::from_rotation_x(25_f32.to_radians()),
            );
            cube_mesh()?
        }
    };

    renderer.clear();
    renderer.render(&mesh)?;
    let primitives = renderer.flush();
    log::info!("Drew {} primitives", primitives);

    renderer.surface().save_png(&args.output)?;
    log::info!("Wrote {}", args.output.display());

    if let Some(path) = &args.dump_config {
        RenderConfig::from_state(renderer.raster().state()).save(path)?;
        log::info!("Wrote render state to {}", path.display());
    }

    Ok(())
}
