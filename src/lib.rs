//! A pooled, virtualized GPU renderer for genomic read alignments, drawing
//! through OpenGL via [glow].
//!
//! Two scenes are provided. [`AlignedReadsScene`] lays out read pairs as rows
//! of bodies, strand caps and connecting lines, with mismatches, insertions
//! and deletions drawn on top and a hover tooltip per read.
//! [`RefSeqScene`] draws a reference sequence one base per block, switching to
//! letters once a base is wide enough to hold one.
//!
//! Both scenes draw into a buffer wider than the visible canvas so the host
//! can scroll without redrawing. Every drawn object comes from a per-class
//! [`DrawPool`](pool::DrawPool) and is recycled rather than freed between
//! draws.
//!
//! Shapes are tessellated once via [lyon] into unit meshes and stretched per
//! sprite. Text is laid out with [livesplit-core]'s built-in text engine.
//!
//! # Features
//!
//! - **4× MSAA** antialiasing on all rendered content.
//! - **Headless testing**: every scene runs against
//!   [`HeadlessSurface`](surface::HeadlessSurface) without a GL context.
//! - **JSON styling**: colors and font sizes load from a [`StyleConfig`].
//!
//! # Safety
//!
//! Creating and using a [`GlSurface`] requires a valid, current OpenGL
//! context.
//!
//! [livesplit-core]: https://github.com/LiveSplit/livesplit-core
//! [glow]: https://docs.rs/glow
//! [lyon]: https://docs.rs/lyon

pub mod alignment;
pub mod allocator;
pub mod app;
pub mod error;
pub mod genomics;
pub mod pool;
pub mod pool_group;
#[cfg(feature = "glow")]
pub mod render;
pub mod scene;
#[cfg(feature = "glow")]
mod shaders;
pub mod stage;
pub mod style;
pub mod surface;
pub mod types;
pub mod viewport;

pub use app::RenderApp;
pub use error::{RegionError, RenderError, StyleError};
#[cfg(feature = "glow")]
pub use render::GlSurface;
pub use scene::{AlignedReadsScene, RefSeqScene, Scene};
pub use style::StyleConfig;
