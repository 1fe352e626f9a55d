//! GLSL shader sources and compilation helpers.
//!
//! All shaders target GLSL 1.40 (OpenGL 3.1), which is widely supported on
//! desktop platforms.

use glow::HasContext;

use crate::error::RenderError;

/// Vertex shader for sprite meshes and glyph outlines.
///
/// Meshes are authored in unit space (glyphs in em space) and stretched by a
/// per-draw scale+translate transform.
///
/// # Uniforms
///
/// | Name           | Type   | Description                              |
/// |----------------|--------|------------------------------------------|
/// | `u_scale`      | `vec2` | Sprite size on the canvas (width, height)|
/// | `u_offset`     | `vec2` | Sprite top-left on the canvas (x, y)     |
/// | `u_resolution` | `vec2` | Canvas size in pixels                    |
pub const SPRITE_VERTEX_SRC: &str = r"#version 140

in vec2 a_position;

// Sprite transform: output = offset + scale * input
uniform vec2 u_scale;
uniform vec2 u_offset;

// Canvas resolution for NDC conversion
uniform vec2 u_resolution;

void main() {
    vec2 canvas = u_offset + u_scale * a_position;

    // Convert from [0, resolution] to [-1, 1] (flip Y for GL)
    vec2 ndc = (canvas / u_resolution) * 2.0 - 1.0;
    ndc.y = -ndc.y;

    gl_Position = vec4(ndc, 0.0, 1.0);
}
";

/// Fragment shader filling with the sprite's tint.
///
/// The output is premultiplied by alpha before writing.
pub const SPRITE_FRAGMENT_SRC: &str = r"#version 140

uniform vec4 u_tint;

out vec4 frag_color;

void main() {
    frag_color = u_tint;
    frag_color.rgb *= frag_color.a;
}
";

/// Build the sprite program.
///
/// Shader objects are released once the program links. On failure every
/// object created so far is deleted.
///
/// # Safety
///
/// Requires a valid, current OpenGL context.
///
/// # Errors
///
/// Returns [`RenderError::Surface`] carrying the driver's info log if a
/// stage fails to compile or the program fails to link.
pub unsafe fn compile_program(
    gl: &glow::Context,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<glow::Program, RenderError> {
    let mut stages = Vec::with_capacity(2);
    for (kind, source) in [(glow::VERTEX_SHADER, vertex_src), (glow::FRAGMENT_SHADER, fragment_src)] {
        match unsafe { compile_shader(gl, kind, source) } {
            Ok(shader) => stages.push(shader),
            Err(err) => {
                for shader in stages {
                    unsafe { gl.delete_shader(shader) };
                }
                return Err(err);
            }
        }
    }

    let program = match unsafe { gl.create_program() } {
        Ok(program) => program,
        Err(err) => {
            for shader in stages {
                unsafe { gl.delete_shader(shader) };
            }
            return Err(err.into());
        }
    };

    unsafe {
        for &shader in &stages {
            gl.attach_shader(program, shader);
        }
        gl.bind_attrib_location(program, 0, "a_position");
        gl.link_program(program);

        let linked = gl.get_program_link_status(program);
        let log = (!linked).then(|| gl.get_program_info_log(program));
        for shader in stages {
            gl.detach_shader(program, shader);
            gl.delete_shader(shader);
        }
        if let Some(log) = log {
            gl.delete_program(program);
            return Err(RenderError::Surface(format!("sprite program failed to link: {log}")));
        }
    }

    Ok(program)
}

unsafe fn compile_shader(gl: &glow::Context, kind: u32, source: &str) -> Result<glow::Shader, RenderError> {
    unsafe {
        let shader = gl.create_shader(kind)?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        if gl.get_shader_compile_status(shader) {
            return Ok(shader);
        }
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        let stage = if kind == glow::VERTEX_SHADER { "vertex" } else { "fragment" };
        Err(RenderError::Surface(format!("sprite {stage} shader failed to compile: {log}")))
    }
}
