//! Making bitmaps the render target.
//!
//! Every activation of an off-screen bitmap goes through the same steps: find
//! its framebuffer (or claim one from the pool), bind it, attach the bitmap's
//! texture and check completeness. The check is repeated on every activation
//! because the texture may have been reallocated or its framebuffer taken by
//! another bitmap since the last one.

use anyhow::{anyhow, bail, Result};
use fbo_core::Transform;
use gl::types::GLuint;
use tracing::{debug, error, trace, warn};

use crate::bitmap::{BitmapFlags, BitmapId};
use crate::context;
use crate::display::Display;
use crate::slot::{FboRef, RenderTargetSlot, SlotState};

/// What an activation ended up drawing into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The default framebuffer is bound.
    Backbuffer,
    /// The bitmap's texture is attached to this framebuffer.
    Framebuffer(GLuint),
    /// No framebuffer can be used for the bitmap; the caller draws through a
    /// locked memory copy.
    Software,
}

impl Activation {
    pub fn is_hardware(self) -> bool {
        !matches!(self, Activation::Software)
    }
}

impl Display {
    /// Make `id` the destination of subsequent drawing.
    ///
    /// Sub-bitmaps activate their parent. Errors are reserved for invalid
    /// handles; a bitmap that cannot be rendered to through a framebuffer
    /// yields [`Activation::Software`].
    pub fn activate_as_render_target(&mut self, id: BitmapId) -> Result<Activation> {
        let root = self.resolve_root(id)?;
        if self.bitmaps[root].is_backbuffer {
            return Ok(self.setup_backbuffer());
        }
        Ok(self.setup_fbo(root))
    }

    pub(crate) fn setup_backbuffer(&mut self) -> Activation {
        self.current_target = Some(self.backbuffer);

        if self.gl.capabilities().supports_render_to_texture() {
            self.gl.bind_framebuffer(0);
        }

        let (width, height) = self.size();
        self.gl.viewport(width, height);
        self.set_projection(width, height, true);
        Activation::Backbuffer
    }

    fn setup_fbo(&mut self, root: BitmapId) -> Activation {
        let bitmap = &self.bitmaps[root];
        let (texture, format, width, height) =
            (bitmap.texture, bitmap.format, bitmap.width, bitmap.height);

        let fbo_ref = match bitmap.fbo {
            Some(fbo_ref) => fbo_ref,
            None if bitmap.flags.contains(BitmapFlags::FORCE_LOCKING) => {
                trace!(?root, "Bitmap forces locking");
                return Activation::Software;
            }
            None if !self.gl.capabilities().supports_render_to_texture() => {
                return Activation::Software;
            }
            None if bitmap.flags.contains(BitmapFlags::KEEP_TARGET) => {
                if let Err(e) = self.create_persistent(root) {
                    warn!("No persistent render target for bitmap {root:?}: {e:#}");
                    return Activation::Software;
                }
                match self.bitmaps[root].fbo {
                    Some(fbo_ref) => fbo_ref,
                    None => return Activation::Software,
                }
            }
            None => match self.claim_slot(root) {
                Some(fbo_ref) => fbo_ref,
                None => return Activation::Software,
            },
        };

        let now = self.clock.now();
        let Some(slot) = self.pool.get_mut(fbo_ref) else {
            error!(?fbo_ref, "Render target of bitmap {root:?} is missing from the pool");
            self.bitmaps[root].fbo = None;
            return Activation::Software;
        };
        if slot.state == SlotState::Unused {
            slot.state = SlotState::Transient;
        }
        slot.owner = Some(root);
        slot.last_use_time = now;
        let fbo = slot.fbo;
        self.bitmaps[root].fbo = Some(fbo_ref);

        self.gl.bind_framebuffer(fbo);
        self.gl.attach_texture(fbo, texture);

        if !self.gl.framebuffer_complete() {
            // The driver cannot render into this texture. There is no point
            // in retrying with the same format.
            error!("Could not use FBO for bitmap with format {format}.");
            error!("*** SWITCHING TO SOFTWARE MODE ***");
            self.gl.bind_framebuffer(0);
            self.gl.delete_framebuffer(fbo);
            self.pool.release(fbo_ref);
            self.bitmaps[root].fbo = None;
            return Activation::Software;
        }

        self.current_target = Some(root);
        self.gl.viewport(width, height);
        let install = self.can_install_projection();
        self.set_projection(width, height, install);
        Activation::Framebuffer(fbo)
    }

    /// Take a pool slot for `root`, evicting its previous owner, and give it
    /// a fresh framebuffer.
    fn claim_slot(&mut self, root: BitmapId) -> Option<FboRef> {
        let index = self.pool.find_or_evict_slot()?;
        let slot_ref = FboRef::Pooled(index);

        let evicted = self.pool.slots()[index];
        if evicted.state == SlotState::Transient {
            if let Some(owner) = evicted.owner.and_then(|o| self.bitmaps.get_mut(o)) {
                owner.fbo = None;
            }
            trace!(slot = index, owner = ?evicted.owner, "Evicting transient FBO");
            self.gl.delete_framebuffer(evicted.fbo);
            self.pool.release(slot_ref);
        }

        let fbo = self.gl.gen_framebuffer()?;
        let slot = self.pool.get_mut(slot_ref)?;
        slot.state = SlotState::Transient;
        slot.fbo = fbo;
        slot.owner = Some(root);
        Some(slot_ref)
    }

    fn set_projection(&mut self, width: u32, height: u32, install: bool) {
        self.proj_transform = Transform::pixel_projection(width, height);
        if install {
            let proj = self.proj_transform;
            self.projection.install(&proj);
        }
    }

    /// Give `id` a render target that is never evicted.
    ///
    /// The framebuffer is created and validated immediately; the binding in
    /// effect before the call is restored afterwards.
    pub fn create_persistent(&mut self, id: BitmapId) -> Result<()> {
        let root = self.resolve_root(id)?;

        if !self.config.shared_context && !context::is_current(self.id) {
            bail!("Display {:?} is not current on this thread", self.id);
        }
        let bitmap = &self.bitmaps[root];
        if bitmap.is_backbuffer {
            bail!("The backbuffer cannot have a persistent render target");
        }
        if bitmap.fbo.is_some() {
            bail!("Bitmap {root:?} already has a render target");
        }
        if !self.gl.capabilities().supports_render_to_texture() {
            bail!("Render-to-texture is not supported by this context");
        }
        let texture = bitmap.texture;

        let fbo = self
            .gl
            .gen_framebuffer()
            .ok_or_else(|| anyhow!("Could not allocate a framebuffer for bitmap {root:?}"))?;

        let old = self.gl.bind_framebuffer(fbo);
        self.gl.attach_texture(fbo, texture);

        if !self.gl.framebuffer_complete() {
            error!("FBO incomplete.");
            self.gl.bind_framebuffer(old);
            self.gl.delete_framebuffer(fbo);
            bail!("Framebuffer for bitmap {root:?} is incomplete");
        }
        self.gl.bind_framebuffer(old);

        let fbo_ref = self.pool.insert_persistent(RenderTargetSlot {
            state: SlotState::Persistent,
            fbo,
            owner: Some(root),
            last_use_time: self.clock.now(),
        });
        self.bitmaps[root].fbo = Some(fbo_ref);
        debug!("Persistent FBO: {fbo}");
        Ok(())
    }

    /// Take the transient render target `id` holds out of the eviction
    /// policy. Already persistent targets are left alone.
    pub fn persist_render_target(&mut self, id: BitmapId) -> Result<()> {
        let root = self.resolve_root(id)?;
        let Some(fbo_ref) = self.bitmaps[root].fbo else {
            bail!("Bitmap {root:?} has no render target to persist");
        };
        if !fbo_ref.is_persistent() {
            self.bitmaps[root].fbo = Some(self.pool.promote_to_persistent(fbo_ref));
        }
        Ok(())
    }

    /// Delete the persistent render target of `id`.
    ///
    /// A bitmap without a render target is left alone; one holding a
    /// transient target is an error.
    pub fn release_persistent(&mut self, id: BitmapId) -> Result<()> {
        let root = self.resolve_root(id)?;
        match self.bitmaps[root].fbo {
            None => Ok(()),
            Some(FboRef::Persistent(_)) => self.release_render_target(root),
            Some(FboRef::Pooled(_)) => bail!("Render target of bitmap {root:?} is not persistent"),
        }
    }

    /// Delete whatever render target `id` holds, transient or persistent.
    pub fn release_render_target(&mut self, id: BitmapId) -> Result<()> {
        let root = self.resolve_root(id)?;
        let Some(fbo_ref) = self.bitmaps[root].fbo.take() else {
            return Ok(());
        };
        match self.pool.release(fbo_ref) {
            Some(slot) => self.gl.delete_framebuffer(slot.fbo),
            None => error!(?fbo_ref, "Render target of bitmap {root:?} is missing from the pool"),
        }
        Ok(())
    }

    /// Framebuffer name bound for `id`, 0 if it has none.
    pub fn framebuffer_of(&self, id: BitmapId) -> GLuint {
        self.resolve_root(id)
            .ok()
            .and_then(|root| self.bitmaps[root].fbo)
            .map(|fbo_ref| self.fbo_of(fbo_ref))
            .unwrap_or(0)
    }
}
