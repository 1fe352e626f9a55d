//! The OpenGL surface: owns GL state, draws stage sprites, and presents the
//! frame to the default framebuffer.

use glow::{HasContext, PixelPackData, PixelUnpackData};
use livesplit_core::rendering::Label as _;
use std::sync::Arc;

use crate::{
    error::RenderError,
    shaders,
    stage::Stage,
    surface::{Frame, Surface},
    types::{Color, Mesh, Point, Shape, Sprite, ViewTransform, Vertex},
};

/// Number of MSAA samples for antialiasing.
const MSAA_SAMPLES: i32 = 4;

/// GL internal format for RGBA8 textures, pre-cast to the `i32` that
/// `tex_image_2d` expects.
#[expect(clippy::cast_possible_wrap)]
const RGBA8_INTERNAL_FORMAT: i32 = glow::RGBA8 as i32;

/// Distance from the vertical center of a text sprite's box to the text
/// baseline, in ems.
const BASELINE_OFFSET: f32 = 0.35;

/// Convert a `u32` to `i32` for GL API calls.
fn gl_size(value: u32) -> Result<i32, RenderError> {
    i32::try_from(value)
        .map_err(|_| RenderError::Surface(format!("dimension {value} exceeds i32::MAX")))
}

/// Cached uniform locations for the sprite shader program.
struct SpriteUniforms {
    /// `u_scale`: sprite width and height on the canvas.
    scale: glow::UniformLocation,
    /// `u_offset`: sprite translation on the canvas.
    offset: glow::UniformLocation,
    /// `u_resolution`: canvas size in pixels.
    resolution: glow::UniformLocation,
    /// `u_tint`: fill color.
    tint: glow::UniformLocation,
}

/// Canvas-space placement of one mesh draw: `canvas = offset + scale * local`.
#[derive(Clone, Copy)]
struct Placement {
    offset: [f32; 2],
    scale: [f32; 2],
}

/// A [`Surface`] drawing through OpenGL.
///
/// Sprites are rendered into a 4× multisampled framebuffer, resolved into a
/// texture-backed framebuffer that [`capture`](Self::capture) reads from,
/// and finally blitted to the default framebuffer.
///
/// # Example
///
/// ```no_run
/// # use alignment_scene_renderer::{app::RenderApp, render::GlSurface, types::rgb};
/// # use std::sync::Arc;
/// # fn example(gl: Arc<glow::Context>) -> Result<(), alignment_scene_renderer::error::RenderError> {
/// // During setup (with a current GL context):
/// let surface = unsafe { GlSurface::new(gl) }?;
/// let mut app = RenderApp::new(surface, [800, 600], rgb(0xf2f2f2))?;
/// # Ok(())
/// # }
/// ```
pub struct GlSurface {
    /// The OpenGL context, shared via [`Arc`] with the host.
    gl: Arc<glow::Context>,

    /// Compiled shader program for sprite meshes and glyphs.
    program: glow::Program,
    /// Cached uniform locations for [`program`](Self::program).
    uniforms: SpriteUniforms,

    /// Vertex array object with a single `vec2` position attribute.
    vao: glow::VertexArray,
    /// Vertex buffer for streaming mesh vertex data.
    vbo: glow::Buffer,
    /// Element (index) buffer for streaming mesh index data.
    ebo: glow::Buffer,

    /// Non-MSAA framebuffer holding the resolved frame.
    fbo: glow::Framebuffer,
    /// Texture attached to [`fbo`](Self::fbo).
    fbo_texture: glow::Texture,

    /// MSAA framebuffer all sprites are drawn into.
    msaa_fbo: glow::Framebuffer,
    /// MSAA renderbuffer (color attachment) for [`msaa_fbo`](Self::msaa_fbo).
    msaa_rbo: glow::Renderbuffer,

    /// Current dimensions of the off-screen framebuffers.
    fbo_size: [u32; 2],
    /// Whether [`destroy`](Surface::destroy) has released the GL objects.
    destroyed: bool,
}

impl GlSurface {
    /// Create a surface.
    ///
    /// Compiles the sprite program and creates GL buffer objects and
    /// framebuffers. Framebuffers are sized by the first
    /// [`resize`](Surface::resize).
    ///
    /// # Safety
    ///
    /// The `gl` context must be valid and current whenever the surface is
    /// used, and [`destroy`](Surface::destroy) must be called before the
    /// context is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if shader compilation, program linking, uniform
    /// lookup or GL resource creation fails.
    pub unsafe fn new(gl: Arc<glow::Context>) -> Result<Self, RenderError> {
        let program = unsafe {
            shaders::compile_program(&gl, shaders::SPRITE_VERTEX_SRC, shaders::SPRITE_FRAGMENT_SRC)?
        };

        let uniform = |name: &str| {
            unsafe { gl.get_uniform_location(program, name) }
                .ok_or_else(|| RenderError::Surface(format!("{name} missing from sprite shader")))
        };
        let uniforms = SpriteUniforms {
            scale: uniform("u_scale")?,
            offset: uniform("u_offset")?,
            resolution: uniform("u_resolution")?,
            tint: uniform("u_tint")?,
        };

        let (vao, vbo, ebo) = unsafe {
            let vao = gl.create_vertex_array()?;
            let vbo = gl.create_buffer()?;
            let ebo = gl.create_buffer()?;

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(
                0,
                2,
                glow::FLOAT,
                false,
                // Vertex is 8 bytes.
                #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                {
                    std::mem::size_of::<Vertex>() as i32
                },
                0,
            );
            gl.bind_vertex_array(None);

            (vao, vbo, ebo)
        };

        // fbo vs rbo are standard GL terminology (framebuffer object vs renderbuffer object).
        let (fbo, fbo_texture, msaa_fbo, msaa_rbo) = unsafe {
            (
                gl.create_framebuffer()?,
                gl.create_texture()?,
                gl.create_framebuffer()?,
                gl.create_renderbuffer()?,
            )
        };

        Ok(Self {
            gl,
            program,
            uniforms,
            vao,
            vbo,
            ebo,
            fbo,
            fbo_texture,
            msaa_fbo,
            msaa_rbo,
            fbo_size: [0, 0],
            destroyed: false,
        })
    }

    /// Read the last presented frame back from the resolve framebuffer.
    ///
    /// # Errors
    ///
    /// Fails if the surface has not been sized or was destroyed.
    pub fn capture(&self) -> Result<image::RgbaImage, RenderError> {
        let [width, height] = self.fbo_size;
        if self.destroyed || width == 0 || height == 0 {
            return Err(RenderError::Surface("no frame to capture".to_owned()));
        }
        let (w, h) = (gl_size(width)?, gl_size(height)?);
        let row = width as usize * 4;
        let mut pixels = vec![0; row * height as usize];

        let gl = &self.gl;
        unsafe {
            gl.bind_framebuffer(glow::READ_FRAMEBUFFER, Some(self.fbo));
            gl.read_pixels(
                0,
                0,
                w,
                h,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                PixelPackData::Slice(Some(&mut pixels)),
            );
            gl.bind_framebuffer(glow::READ_FRAMEBUFFER, None);
        }

        // GL rows run bottom-up.
        let flipped: Vec<u8> = pixels.chunks_exact(row).rev().flatten().copied().collect();
        image::RgbaImage::from_raw(width, height, flipped)
            .ok_or_else(|| RenderError::Surface("pixel buffer size mismatch".to_owned()))
    }

    /// Draw every sprite of `stage`'s draw list through `view`.
    unsafe fn draw_stage(
        &self,
        stage: &Stage,
        view: &ViewTransform,
        resolution: [f32; 2],
    ) -> Result<(), RenderError> {
        for sprite in stage.draw_list() {
            match &sprite.shape {
                Shape::Mesh(mesh) => {
                    let origin = view.to_screen(sprite.pos);
                    let placement = Placement {
                        offset: [origin.x, origin.y],
                        scale: [sprite.dim.width * view.scale, sprite.dim.height * view.scale],
                    };
                    unsafe { self.draw_mesh(mesh, placement, sprite.tint, resolution)? };
                }
                Shape::Text(_) => unsafe { self.draw_text(sprite, view, resolution)? },
            }
        }
        Ok(())
    }

    /// Draw a text sprite centered in its box. Each glyph is a filled mesh in
    /// em space.
    unsafe fn draw_text(
        &self,
        sprite: &Sprite,
        view: &ViewTransform,
        resolution: [f32; 2],
    ) -> Result<(), RenderError> {
        let Shape::Text(label) = &sprite.shape else {
            return Ok(());
        };
        let size = sprite.font_size;
        let width = label.width(size);
        let baseline = view.to_screen(Point::new(
            sprite.pos.x + (sprite.dim.width - width) / 2.0,
            sprite.pos.y + sprite.dim.height / 2.0 + BASELINE_OFFSET * size,
        ));
        let em = size * view.scale;

        let label = label
            .read()
            .map_err(|_| RenderError::Surface("label lock poisoned".to_owned()))?;
        for glyph in label.glyphs() {
            if let Some(mesh) = &glyph.path {
                let placement = Placement {
                    offset: [baseline.x + glyph.x * em, baseline.y + glyph.y * em],
                    scale: [glyph.scale * em, glyph.scale * em],
                };
                let tint = glyph.color.unwrap_or(sprite.tint);
                unsafe { self.draw_mesh(mesh, placement, tint, resolution)? };
            }
        }
        Ok(())
    }

    /// Upload a mesh and issue its draw call.
    unsafe fn draw_mesh(
        &self,
        mesh: &Mesh,
        placement: Placement,
        tint: Color,
        resolution: [f32; 2],
    ) -> Result<(), RenderError> {
        let index_count = i32::try_from(mesh.indices.len())
            .map_err(|_| RenderError::Surface("index count exceeds i32::MAX".to_owned()))?;
        let gl = &self.gl;
        let u = &self.uniforms;
        unsafe {
            gl.use_program(Some(self.program));
            gl.uniform_2_f32(Some(&u.resolution), resolution[0], resolution[1]);
            gl.uniform_2_f32(Some(&u.scale), placement.scale[0], placement.scale[1]);
            gl.uniform_2_f32(Some(&u.offset), placement.offset[0], placement.offset[1]);
            gl.uniform_4_f32(Some(&u.tint), tint[0], tint[1], tint[2], tint[3]);

            gl.bind_vertex_array(Some(self.vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&mesh.vertices),
                glow::STREAM_DRAW,
            );
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(self.ebo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(&mesh.indices),
                glow::STREAM_DRAW,
            );
            gl.draw_elements(glow::TRIANGLES, index_count, glow::UNSIGNED_INT, 0);
            gl.bind_vertex_array(None);
        }
        Ok(())
    }

    /// Blit one framebuffer onto another at full size.
    unsafe fn blit(
        &self,
        from: Option<glow::Framebuffer>,
        to: Option<glow::Framebuffer>,
        w: i32,
        h: i32,
    ) {
        let gl = &self.gl;
        unsafe {
            gl.bind_framebuffer(glow::READ_FRAMEBUFFER, from);
            gl.bind_framebuffer(glow::DRAW_FRAMEBUFFER, to);
            gl.blit_framebuffer(0, 0, w, h, 0, 0, w, h, glow::COLOR_BUFFER_BIT, glow::NEAREST);
        }
    }

    /// Resize (or initially create) both the resolve FBO and MSAA FBO.
    unsafe fn resize_fbo(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        let gl = &self.gl;
        let w = gl_size(width)?;
        let h = gl_size(height)?;

        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, Some(self.fbo_texture));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                RGBA8_INTERNAL_FORMAT,
                w,
                h,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                PixelUnpackData::Slice(None),
            );
            // GL constant values are small enough that the cast is always safe.
            #[expect(clippy::cast_possible_wrap)]
            {
                gl.tex_parameter_i32(
                    glow::TEXTURE_2D,
                    glow::TEXTURE_MIN_FILTER,
                    glow::LINEAR as i32,
                );
                gl.tex_parameter_i32(
                    glow::TEXTURE_2D,
                    glow::TEXTURE_MAG_FILTER,
                    glow::LINEAR as i32,
                );
            }

            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.fbo));
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(self.fbo_texture),
                0,
            );

            gl.bind_renderbuffer(glow::RENDERBUFFER, Some(self.msaa_rbo));
            gl.renderbuffer_storage_multisample(
                glow::RENDERBUFFER,
                MSAA_SAMPLES,
                glow::RGBA8,
                w,
                h,
            );
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.msaa_fbo));
            gl.framebuffer_renderbuffer(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::RENDERBUFFER,
                Some(self.msaa_rbo),
            );

            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            gl.bind_renderbuffer(glow::RENDERBUFFER, None);
            gl.bind_texture(glow::TEXTURE_2D, None);
        }

        self.fbo_size = [width, height];
        Ok(())
    }
}

impl Surface for GlSurface {
    fn resize(&mut self, [width, height]: [u32; 2]) -> Result<(), RenderError> {
        if self.destroyed {
            return Err(RenderError::Surface("surface was destroyed".to_owned()));
        }
        if self.fbo_size == [width, height] {
            return Ok(());
        }
        log::debug!("resizing GL framebuffers to {width}x{height}");
        unsafe { self.resize_fbo(width, height) }
    }

    fn present(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        if self.destroyed {
            return Err(RenderError::Surface("surface was destroyed".to_owned()));
        }
        let [width, height] = self.fbo_size;
        let w = gl_size(width)?;
        let h = gl_size(height)?;
        // Canvas dimensions are small relative to the f32 mantissa.
        #[expect(clippy::cast_precision_loss)]
        let resolution = [width as f32, height as f32];
        let [r, g, b, a] = frame.background;

        let gl = &self.gl;
        unsafe {
            // Premultiplied alpha blending.
            gl.enable(glow::BLEND);
            gl.blend_func(glow::ONE, glow::ONE_MINUS_SRC_ALPHA);

            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.msaa_fbo));
            gl.viewport(0, 0, w, h);
            gl.clear_color(r * a, g * a, b * a, a);
            gl.clear(glow::COLOR_BUFFER_BIT);

            self.draw_stage(frame.stage, &frame.view, resolution)?;
            if let Some(overlay) = frame.overlay {
                self.draw_stage(overlay, &ViewTransform::IDENTITY, resolution)?;
            }

            // Resolve MSAA into the capture texture, then onto the screen.
            self.blit(Some(self.msaa_fbo), Some(self.fbo), w, h);
            self.blit(Some(self.fbo), None, w, h);
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            gl.disable(glow::BLEND);
        }
        log::trace!("presented frame at {width}x{height}");
        Ok(())
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        let gl = &self.gl;
        unsafe {
            gl.delete_program(self.program);
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.vbo);
            gl.delete_buffer(self.ebo);
            gl.delete_framebuffer(self.fbo);
            gl.delete_texture(self.fbo_texture);
            gl.delete_framebuffer(self.msaa_fbo);
            gl.delete_renderbuffer(self.msaa_rbo);
        }
        self.destroyed = true;
    }
}
