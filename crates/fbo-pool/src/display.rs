//! A display: one GL context, its render-target pool and its bitmaps.
//!
//! The display is the only place that changes both sides of the
//! bitmap ↔ slot relation, so a bitmap losing its slot is always told before
//! the slot is reused.

use std::sync::mpsc::Receiver;

use anyhow::{anyhow, bail, Result};
use fbo_core::{Clock, MonotonicClock, Transform, WindowEvent};
use fbo_gl::GlContext;
use gl::types::GLuint;
use slotmap::SlotMap;
use tracing::{debug, trace, warn};

use crate::bitmap::{Bitmap, BitmapDesc, BitmapId};
use crate::config::DisplayConfig;
use crate::context::{self, DisplayId};
use crate::pool::FboPool;
use crate::projection::{NoProjection, ProjectionInstaller};
use crate::slot::{FboRef, RenderTargetSlot};

pub struct Display {
    pub(crate) id: DisplayId,
    pub(crate) config: DisplayConfig,
    pub(crate) gl: GlContext,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) projection: Box<dyn ProjectionInstaller>,
    pub(crate) pool: FboPool,
    pub(crate) bitmaps: SlotMap<BitmapId, Bitmap>,
    pub(crate) backbuffer: BitmapId,
    pub(crate) current_target: Option<BitmapId>,
    pub(crate) proj_transform: Transform,
    pub(crate) program: Option<GLuint>,
}

impl std::fmt::Debug for Display {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Display")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("gl", &self.gl)
            .field("pool", &self.pool)
            .field("current_target", &self.current_target)
            .finish()
    }
}

impl Display {
    /// Create a display around `gl`. Its context is made current on this
    /// thread.
    pub fn new(gl: GlContext, config: DisplayConfig) -> Self {
        let mut bitmaps = SlotMap::with_key();
        let backbuffer = bitmaps.insert(Bitmap::backbuffer(config.width, config.height));
        let id = DisplayId::next();

        debug!(
            ?id,
            capacity = config.fbo_capacity,
            width = config.width,
            height = config.height,
            "Created display"
        );

        let display = Self {
            id,
            pool: FboPool::new(config.fbo_capacity),
            config,
            gl,
            clock: Box::new(MonotonicClock::new()),
            projection: Box::new(NoProjection),
            bitmaps,
            backbuffer,
            current_target: None,
            proj_transform: Transform::identity(),
            program: None,
        };
        display.make_current();
        display
    }

    /// Open a display on the context that is current on this thread.
    ///
    /// # Safety
    ///
    /// A GL context must be current on the calling thread and stay current
    /// for as long as the display is used.
    pub unsafe fn open_native(config: DisplayConfig) -> Result<Self> {
        let gl = GlContext::native(config.platform)?;
        Ok(Self::new(gl, config))
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_projection_installer(mut self, installer: impl ProjectionInstaller + 'static) -> Self {
        self.projection = Box::new(installer);
        self
    }

    pub fn id(&self) -> DisplayId {
        self.id
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn gl(&self) -> &GlContext {
        &self.gl
    }

    pub fn pool(&self) -> &FboPool {
        &self.pool
    }

    /// Record that this display's context is current on the calling thread.
    pub fn make_current(&self) {
        context::make_current(Some(self.id));
    }

    pub fn backbuffer(&self) -> BitmapId {
        self.backbuffer
    }

    pub fn size(&self) -> (u32, u32) {
        let bb = &self.bitmaps[self.backbuffer];
        (bb.width, bb.height)
    }

    /// The bitmap (or backbuffer) most recently made the render target.
    pub fn current_render_target(&self) -> Option<BitmapId> {
        self.current_target
    }

    /// The projection computed for the current render target.
    pub fn projection(&self) -> &Transform {
        &self.proj_transform
    }

    // -----------------------------------------------------------------------
    // Bitmaps
    // -----------------------------------------------------------------------

    pub fn create_bitmap(&mut self, desc: BitmapDesc) -> BitmapId {
        self.bitmaps.insert(Bitmap::from_desc(&desc))
    }

    /// A view into `parent` at `(x, y)`. Views of views point at the root.
    pub fn create_sub_bitmap(
        &mut self,
        parent: BitmapId,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<BitmapId> {
        let p = self.bitmap(parent)?;
        let (root, x, y) = match p.parent {
            Some(root) => (root, p.x + x, p.y + y),
            None => (parent, x, y),
        };
        let r = self.bitmap(root)?;

        let sub = Bitmap {
            width,
            height,
            format: r.format,
            texture: r.texture,
            flags: r.flags,
            parent: Some(root),
            x,
            y,
            is_backbuffer: false,
            fbo: None,
        };
        Ok(self.bitmaps.insert(sub))
    }

    pub fn bitmap(&self, id: BitmapId) -> Result<&Bitmap> {
        self.bitmaps
            .get(id)
            .ok_or_else(|| anyhow!("Bitmap {id:?} does not exist on this display"))
    }

    pub(crate) fn bitmap_mut(&mut self, id: BitmapId) -> Result<&mut Bitmap> {
        self.bitmaps
            .get_mut(id)
            .ok_or_else(|| anyhow!("Bitmap {id:?} does not exist on this display"))
    }

    /// The bitmap whose texture and render target `id` uses.
    pub(crate) fn resolve_root(&self, id: BitmapId) -> Result<BitmapId> {
        match self.bitmap(id)?.parent {
            None => Ok(id),
            Some(root) => {
                self.bitmap(root)
                    .map_err(|_| anyhow!("Parent of sub-bitmap {id:?} was destroyed"))?;
                Ok(root)
            }
        }
    }

    /// Snapshot of the render target `id` (or its parent) holds.
    pub fn render_target_of(&self, id: BitmapId) -> Option<RenderTargetSlot> {
        let root = self.resolve_root(id).ok()?;
        let fbo_ref = self.bitmaps[root].fbo?;
        self.pool.get(fbo_ref).copied()
    }

    /// Replace the texture backing a bitmap, e.g. after it was reallocated at
    /// a new size. Any render target stays associated; the new texture is
    /// attached on the next activation.
    pub fn set_texture(&mut self, id: BitmapId, texture: GLuint, width: u32, height: u32) -> Result<()> {
        let bitmap = self.bitmap_mut(id)?;
        if bitmap.is_backbuffer {
            bail!("The backbuffer has no texture");
        }
        if bitmap.parent.is_some() {
            bail!("Sub-bitmaps share their parent's texture");
        }
        bitmap.texture = texture;
        bitmap.width = width;
        bitmap.height = height;

        let subs: Vec<BitmapId> = self
            .bitmaps
            .iter()
            .filter(|(_, b)| b.parent == Some(id))
            .map(|(sub, _)| sub)
            .collect();
        for sub in subs {
            self.bitmaps[sub].texture = texture;
        }
        Ok(())
    }

    /// Destroy a bitmap, releasing its render target.
    pub fn destroy_bitmap(&mut self, id: BitmapId) -> Result<()> {
        let bitmap = self.bitmap(id)?;
        if bitmap.is_backbuffer {
            bail!("The backbuffer is destroyed with its display");
        }
        if bitmap.parent.is_none() {
            self.release_render_target(id)?;
        }
        if self.current_target == Some(id) {
            self.current_target = None;
        }
        self.bitmaps.remove(id);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Window notifications
    // -----------------------------------------------------------------------

    /// React to a notification from the window thread.
    pub fn handle_window_event(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::Resized { width, height } => {
                let bb = &mut self.bitmaps[self.backbuffer];
                if (bb.width, bb.height) == (width, height) {
                    return;
                }
                debug!(width, height, "Backbuffer resized");
                bb.width = width;
                bb.height = height;
                if self.current_target == Some(self.backbuffer) {
                    self.setup_backbuffer();
                }
            }
            WindowEvent::SwitchIn => {
                // The context may have been disturbed while in the
                // background; rebind and revalidate the current target.
                if let Some(target) = self.current_target {
                    if let Err(e) = self.activate_as_render_target(target) {
                        warn!("Failed to restore render target after switch in: {e}");
                    }
                }
            }
            other => trace!(?other, "Ignoring window event"),
        }
    }

    /// Apply every notification queued by the window thread. Returns how many
    /// were handled.
    pub fn pump_window_events(&mut self, events: &Receiver<WindowEvent>) -> usize {
        let mut handled = 0;
        while let Ok(event) = events.try_recv() {
            self.handle_window_event(event);
            handled += 1;
        }
        handled
    }

    // -----------------------------------------------------------------------
    // Shaders
    // -----------------------------------------------------------------------

    /// Bind (or unbind) the shader program used with the programmable
    /// pipeline, and install the current projection into it.
    pub fn set_program(&mut self, program: Option<GLuint>) {
        self.program = program.filter(|&p| p != 0);
        if self.program.is_some() {
            let proj = self.proj_transform;
            self.projection.install(&proj);
        }
    }

    pub(crate) fn can_install_projection(&self) -> bool {
        !self.config.programmable_pipeline || self.program.is_some()
    }

    pub(crate) fn fbo_of(&self, fbo_ref: FboRef) -> GLuint {
        self.pool.get(fbo_ref).map(|s| s.fbo).unwrap_or(0)
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        let framebuffers: Vec<GLuint> = self.pool.framebuffers().collect();
        if framebuffers.is_empty() {
            return;
        }
        if self.config.shared_context || context::is_current(self.id) {
            self.gl.bind_framebuffer(0);
            for fbo in framebuffers {
                self.gl.delete_framebuffer(fbo);
            }
        } else {
            warn!(
                count = framebuffers.len(),
                "Display dropped while not current; leaking its framebuffers"
            );
        }
        if context::is_current(self.id) {
            context::make_current(None);
        }
    }
}
