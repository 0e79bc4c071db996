// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WebGL2 renderer - draws the attached subsets with ambient plus
//! directional lighting, then the grid and axes helpers.
//!
//! GPU buffers are cached per subset key and rebuilt whenever the registry
//! hands out a newer revision of that subset.

use ifc_audit_geometry::Mesh;
use ifc_audit_viewer::{
    axes_helper, grid_helper, LineGeometry, Material, SceneGraph, SubsetKey, SubsetRegistry, Viewport,
    ViewportSettings,
};
use js_sys::{Float32Array, Uint32Array};
use rustc_hash::FxHashMap;
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::error::{AppError, Result};

const MESH_VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
uniform mat4 u_view_projection;
out vec3 v_normal;
void main() {
    v_normal = a_normal;
    gl_Position = u_view_projection * vec4(a_position, 1.0);
}
"#;

const MESH_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;
in vec3 v_normal;
uniform vec3 u_color;
uniform float u_opacity;
uniform vec3 u_light_direction;
uniform float u_ambient;
uniform float u_directional;
out vec4 frag_color;
void main() {
    vec3 n = normalize(gl_FrontFacing ? v_normal : -v_normal);
    float lambert = max(dot(n, u_light_direction), 0.0);
    vec3 lit = u_color * (u_ambient + u_directional * lambert);
    frag_color = vec4(min(lit, vec3(1.0)), u_opacity);
}
"#;

const LINE_VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_color;
uniform mat4 u_view_projection;
out vec3 v_color;
void main() {
    v_color = a_color;
    gl_Position = u_view_projection * vec4(a_position, 1.0);
}
"#;

const LINE_FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
in vec3 v_color;
out vec4 frag_color;
void main() {
    frag_color = vec4(v_color, 1.0);
}
"#;

const POSITION_LOCATION: u32 = 0;
const SECOND_ATTRIBUTE_LOCATION: u32 = 1;

struct MeshProgram {
    program: WebGlProgram,
    view_projection: Option<WebGlUniformLocation>,
    color: Option<WebGlUniformLocation>,
    opacity: Option<WebGlUniformLocation>,
    light_direction: Option<WebGlUniformLocation>,
    ambient: Option<WebGlUniformLocation>,
    directional: Option<WebGlUniformLocation>,
}

struct LineProgram {
    program: WebGlProgram,
    view_projection: Option<WebGlUniformLocation>,
}

/// Uploaded subset geometry
struct GpuMesh {
    vao: WebGlVertexArrayObject,
    buffers: [WebGlBuffer; 3],
    index_count: i32,
    revision: u64,
}

struct GpuLines {
    vao: WebGlVertexArrayObject,
    vertex_count: i32,
}

pub struct Renderer {
    gl: GL,
    mesh_program: MeshProgram,
    line_program: LineProgram,
    meshes: FxHashMap<SubsetKey, GpuMesh>,
    grid: GpuLines,
    axes: GpuLines,
}

impl Renderer {
    pub fn new(canvas: &HtmlCanvasElement, settings: &ViewportSettings) -> Result<Self> {
        let gl = canvas
            .get_context("webgl2")?
            .ok_or(AppError::NoWebGl)?
            .dyn_into::<GL>()
            .map_err(|_| AppError::NoWebGl)?;

        let program = link_program(&gl, MESH_VERTEX_SHADER, MESH_FRAGMENT_SHADER)?;
        let mesh_program = MeshProgram {
            view_projection: gl.get_uniform_location(&program, "u_view_projection"),
            color: gl.get_uniform_location(&program, "u_color"),
            opacity: gl.get_uniform_location(&program, "u_opacity"),
            light_direction: gl.get_uniform_location(&program, "u_light_direction"),
            ambient: gl.get_uniform_location(&program, "u_ambient"),
            directional: gl.get_uniform_location(&program, "u_directional"),
            program,
        };

        let program = link_program(&gl, LINE_VERTEX_SHADER, LINE_FRAGMENT_SHADER)?;
        let line_program = LineProgram {
            view_projection: gl.get_uniform_location(&program, "u_view_projection"),
            program,
        };

        let grid = upload_lines(&gl, &grid_helper(settings.grid_size, settings.grid_divisions))?;
        let axes = upload_lines(&gl, &axes_helper(settings.axes_length))?;

        gl.clear_color(1.0, 1.0, 1.0, 0.0);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);

        Ok(Self {
            gl,
            mesh_program,
            line_program,
            meshes: FxHashMap::default(),
            grid,
            axes,
        })
    }

    /// Bring GPU buffers in line with the registry
    pub fn sync(&mut self, registry: &SubsetRegistry) {
        let stale: Vec<SubsetKey> = self
            .meshes
            .iter()
            .filter(|(key, gpu)| registry.get(**key).map_or(true, |s| s.revision != gpu.revision))
            .map(|(key, _)| *key)
            .collect();
        for key in stale {
            if let Some(gpu) = self.meshes.remove(&key) {
                self.release(gpu);
            }
        }
    }

    fn release(&self, gpu: GpuMesh) {
        self.gl.delete_vertex_array(Some(&gpu.vao));
        for buffer in &gpu.buffers {
            self.gl.delete_buffer(Some(buffer));
        }
    }

    /// Draw one frame
    pub fn render(&mut self, viewport: &Viewport, scene: &SceneGraph, registry: &SubsetRegistry) -> Result<()> {
        self.sync(registry);

        let (width, height) = viewport.drawing_buffer_size();
        let gl = &self.gl;
        gl.viewport(0, 0, width as i32, height as i32);
        gl.enable(GL::DEPTH_TEST);
        gl.depth_mask(true);
        gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);

        let view_projection = viewport.camera.view_projection();

        gl.use_program(Some(&self.line_program.program));
        gl.uniform_matrix4fv_with_f32_array(
            self.line_program.view_projection.as_ref(),
            false,
            view_projection.as_slice(),
        );
        draw_lines(gl, &self.grid);

        let program = &self.mesh_program;
        gl.use_program(Some(&program.program));
        gl.uniform_matrix4fv_with_f32_array(program.view_projection.as_ref(), false, view_projection.as_slice());
        let light = viewport.lighting.direction;
        gl.uniform3f(program.light_direction.as_ref(), light.x, light.y, light.z);
        gl.uniform1f(program.ambient.as_ref(), viewport.lighting.ambient_intensity);
        gl.uniform1f(program.directional.as_ref(), viewport.lighting.directional_intensity);

        for subset in scene.visible(registry) {
            if subset.mesh.is_empty() {
                continue;
            }
            if !self.meshes.contains_key(&subset.key) {
                let gpu = upload_mesh(&self.gl, &subset.mesh, subset.revision)?;
                self.meshes.insert(subset.key, gpu);
            }
            let Some(gpu) = self.meshes.get(&subset.key) else {
                continue;
            };
            self.draw_mesh(gpu, &subset.material);
        }

        let gl = &self.gl;
        gl.disable(GL::BLEND);
        gl.depth_mask(true);
        gl.disable(GL::DEPTH_TEST);
        gl.use_program(Some(&self.line_program.program));
        draw_lines(gl, &self.axes);
        gl.bind_vertex_array(None);
        Ok(())
    }

    fn draw_mesh(&self, gpu: &GpuMesh, material: &Material) {
        let gl = &self.gl;
        let program = &self.mesh_program;

        if material.transparent {
            gl.enable(GL::BLEND);
            gl.depth_mask(false);
        } else {
            gl.disable(GL::BLEND);
            gl.depth_mask(true);
        }
        if material.depth_test {
            gl.enable(GL::DEPTH_TEST);
        } else {
            gl.disable(GL::DEPTH_TEST);
        }

        let [r, g, b] = material.rgb();
        gl.uniform3f(program.color.as_ref(), r, g, b);
        gl.uniform1f(program.opacity.as_ref(), material.opacity);

        gl.bind_vertex_array(Some(&gpu.vao));
        gl.draw_elements_with_i32(GL::TRIANGLES, gpu.index_count, GL::UNSIGNED_INT, 0);
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        let meshes: Vec<GpuMesh> = self.meshes.drain().map(|(_, gpu)| gpu).collect();
        for gpu in meshes {
            self.release(gpu);
        }
    }
}

fn draw_lines(gl: &GL, lines: &GpuLines) {
    gl.bind_vertex_array(Some(&lines.vao));
    gl.draw_arrays(GL::LINES, 0, lines.vertex_count);
}

fn compile_shader(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| AppError::WebGl("unable to create shader".to_string()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(AppError::WebGl(format!("shader compilation failed: {}", log)))
    }
}

fn link_program(gl: &GL, vertex_source: &str, fragment_source: &str) -> Result<WebGlProgram> {
    let vertex = compile_shader(gl, GL::VERTEX_SHADER, vertex_source)?;
    let fragment = compile_shader(gl, GL::FRAGMENT_SHADER, fragment_source)?;
    let program = gl
        .create_program()
        .ok_or_else(|| AppError::WebGl("unable to create program".to_string()))?;
    gl.attach_shader(&program, &vertex);
    gl.attach_shader(&program, &fragment);
    gl.link_program(&program);
    gl.delete_shader(Some(&vertex));
    gl.delete_shader(Some(&fragment));

    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(AppError::WebGl(format!("program link failed: {}", log)))
    }
}

/// Upload a float attribute buffer and bind it to `location` of the current VAO
fn float_attribute(gl: &GL, location: u32, data: &[f32]) -> Result<WebGlBuffer> {
    let buffer = gl
        .create_buffer()
        .ok_or_else(|| AppError::WebGl("unable to create buffer".to_string()))?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
    gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &Float32Array::from(data), GL::STATIC_DRAW);
    gl.enable_vertex_attrib_array(location);
    gl.vertex_attrib_pointer_with_i32(location, 3, GL::FLOAT, false, 0, 0);
    Ok(buffer)
}

fn create_vertex_array(gl: &GL) -> Result<WebGlVertexArrayObject> {
    let vao = gl
        .create_vertex_array()
        .ok_or_else(|| AppError::WebGl("unable to create vertex array".to_string()))?;
    gl.bind_vertex_array(Some(&vao));
    Ok(vao)
}

fn upload_mesh(gl: &GL, mesh: &Mesh, revision: u64) -> Result<GpuMesh> {
    let vao = create_vertex_array(gl)?;
    let positions = float_attribute(gl, POSITION_LOCATION, &mesh.positions)?;
    let normals = float_attribute(gl, SECOND_ATTRIBUTE_LOCATION, &mesh.normals)?;

    let indices = gl
        .create_buffer()
        .ok_or_else(|| AppError::WebGl("unable to create buffer".to_string()))?;
    gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(&indices));
    gl.buffer_data_with_array_buffer_view(
        GL::ELEMENT_ARRAY_BUFFER,
        &Uint32Array::from(mesh.indices.as_slice()),
        GL::STATIC_DRAW,
    );
    gl.bind_vertex_array(None);

    Ok(GpuMesh {
        vao,
        buffers: [positions, normals, indices],
        index_count: mesh.indices.len() as i32,
        revision,
    })
}

fn upload_lines(gl: &GL, lines: &LineGeometry) -> Result<GpuLines> {
    let vao = create_vertex_array(gl)?;
    float_attribute(gl, POSITION_LOCATION, &lines.positions)?;
    float_attribute(gl, SECOND_ATTRIBUTE_LOCATION, &lines.colors)?;
    gl.bind_vertex_array(None);
    Ok(GpuLines {
        vao,
        vertex_count: lines.vertex_count() as i32,
    })
}
