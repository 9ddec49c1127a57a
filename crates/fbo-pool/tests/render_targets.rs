use std::collections::HashSet;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;

use fbo_core::{ManualClock, WindowEvent};
use fbo_gl::fake::FakeGl;
use fbo_gl::{GlContext, Platform};
use fbo_pool::{Activation, BitmapDesc, BitmapId, Display, DisplayConfig, SlotState};

struct Harness {
    display: Display,
    gl: FakeGl,
    clock: Rc<ManualClock>,
}

impl Harness {
    fn new(capacity: usize) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let gl = FakeGl::new();
        let clock = Rc::new(ManualClock::new());
        let ctx = GlContext::new(Box::new(gl.clone()), Platform::Desktop);
        let config = DisplayConfig {
            fbo_capacity: capacity,
            platform: Platform::Desktop,
            ..DisplayConfig::default()
        };
        let display = Display::new(ctx, config).with_clock(clock.clone());
        Self { display, gl, clock }
    }

    fn bitmap(&mut self, texture: u32) -> BitmapId {
        self.display.create_bitmap(BitmapDesc::new(64, 32, texture))
    }

    /// Activate `id` one millisecond after the previous activation.
    fn activate(&mut self, id: BitmapId) -> Activation {
        self.clock.advance(Duration::from_millis(1));
        self.display.activate_as_render_target(id).unwrap()
    }

    fn fbo(&self, id: BitmapId) -> u32 {
        self.display.framebuffer_of(id)
    }
}

#[test]
fn bitmaps_within_capacity_get_distinct_framebuffers() {
    let mut h = Harness::new(4);
    let ids: Vec<_> = (1..=4).map(|t| h.bitmap(t)).collect();

    for &id in &ids {
        assert!(matches!(h.activate(id), Activation::Framebuffer(_)));
    }

    let handles: HashSet<u32> = ids.iter().map(|&id| h.fbo(id)).collect();
    assert_eq!(handles.len(), 4);
    assert!(!handles.contains(&0));
    assert_eq!(h.gl.live_framebuffers().len(), 4);
}

#[test]
fn exceeding_capacity_evicts_the_least_recently_activated() {
    let mut h = Harness::new(3);
    let ids: Vec<_> = (1..=6).map(|t| h.bitmap(t)).collect();

    for (n, &id) in ids.iter().enumerate() {
        h.activate(id);
        if n >= 3 {
            let evicted = ids[n - 3];
            assert!(h.display.bitmap(evicted).unwrap().render_target().is_none());
            assert_eq!(h.fbo(evicted), 0);
        }
    }

    // Only the last three still hold a framebuffer.
    for &id in &ids[3..] {
        assert_ne!(h.fbo(id), 0);
    }
    assert_eq!(h.gl.live_framebuffers().len(), 3);
    assert_eq!(h.gl.deleted_framebuffers().len(), 3);
}

#[test]
fn a_b_a_c_reuses_the_slot_of_b() {
    let mut h = Harness::new(2);
    let a = h.bitmap(1);
    let b = h.bitmap(2);
    let c = h.bitmap(3);

    h.activate(a);
    h.activate(b);
    h.activate(a);

    let fa = h.fbo(a);
    let b_slot = h
        .display
        .pool()
        .slots()
        .iter()
        .position(|s| s.owner() == Some(b))
        .unwrap();

    h.activate(c);

    assert_eq!(h.fbo(a), fa);
    assert_eq!(h.fbo(b), 0);
    assert!(h.display.bitmap(b).unwrap().render_target().is_none());
    assert_eq!(h.display.pool().slots()[b_slot].owner(), Some(c));
    assert_ne!(h.fbo(c), 0);
}

#[test]
fn persistent_slots_are_never_evicted() {
    let mut h = Harness::new(2);
    let keep = h.bitmap(1);
    let others: Vec<_> = (2..=6).map(|t| h.bitmap(t)).collect();

    h.activate(keep);
    let fbo = h.fbo(keep);
    h.display.persist_render_target(keep).unwrap();

    for &id in &others {
        h.activate(id);
    }

    assert_eq!(h.fbo(keep), fbo);
    assert!(h.gl.is_live(fbo));
    assert!(h
        .display
        .pool()
        .slots()
        .iter()
        .all(|s| s.state() != SlotState::Persistent));
}

#[test]
fn promotion_keeps_the_handle_and_frees_the_array_slot() {
    let mut h = Harness::new(2);
    let a = h.bitmap(1);
    h.activate(a);
    let fbo = h.fbo(a);

    h.display.persist_render_target(a).unwrap();

    let record = h.display.render_target_of(a).unwrap();
    assert_eq!(record.fbo(), fbo);
    assert_eq!(record.state(), SlotState::Persistent);
    assert!(h
        .display
        .pool()
        .slots()
        .iter()
        .all(|s| s.state() == SlotState::Unused));

    // Persisting twice is harmless.
    h.display.persist_render_target(a).unwrap();
    assert_eq!(h.display.pool().persistent_len(), 1);

    // The persistent target still works as a render target.
    assert_eq!(h.activate(a), Activation::Framebuffer(fbo));
}

#[test]
fn backbuffer_activation_always_binds_zero() {
    let mut h = Harness::new(2);
    let a = h.bitmap(1);
    let b = h.bitmap(2);
    let bb = h.display.backbuffer();

    assert_eq!(h.activate(bb), Activation::Backbuffer);
    assert_eq!(h.display.current_render_target(), Some(bb));

    h.activate(a);
    h.display.persist_render_target(a).unwrap();
    h.activate(b);
    assert_ne!(h.gl.bound(), 0);

    assert_eq!(h.activate(bb), Activation::Backbuffer);
    assert_eq!(h.display.current_render_target(), Some(bb));
    assert_eq!(h.gl.bound(), 0);
    assert_eq!(h.gl.last_viewport(), Some([0, 0, 640, 480]));
}

#[test]
fn completeness_failure_clears_the_association_and_retries_fresh() {
    let mut h = Harness::new(2);
    let a = h.bitmap(9);
    h.gl.mark_texture_unrenderable(9);

    assert_eq!(h.activate(a), Activation::Software);
    assert!(h.display.bitmap(a).unwrap().render_target().is_none());
    assert_eq!(h.gl.bound(), 0);
    assert!(h.gl.live_framebuffers().is_empty());
    assert!(h
        .display
        .pool()
        .slots()
        .iter()
        .all(|s| s.state() == SlotState::Unused));

    // The driver changed its mind; the next activation starts over.
    h.gl.mark_texture_renderable(9);
    let Activation::Framebuffer(fbo) = h.activate(a) else {
        panic!("retry should get a framebuffer");
    };
    assert!(h.gl.is_live(fbo));
    assert_eq!(h.gl.deleted_framebuffers().len(), 1);
}

#[test]
fn reactivation_reuses_the_handle_and_refreshes_the_timestamp() {
    let mut h = Harness::new(2);
    let a = h.bitmap(1);

    h.activate(a);
    let fbo = h.fbo(a);
    let first = h.display.render_target_of(a).unwrap().last_use_time();

    for _ in 0..3 {
        assert_eq!(h.activate(a), Activation::Framebuffer(fbo));
    }

    let slot = h.display.render_target_of(a).unwrap();
    assert_eq!(slot.fbo(), fbo);
    assert_eq!(slot.last_use_time(), first + Duration::from_millis(3));
    assert_eq!(h.gl.live_framebuffers(), vec![fbo]);
}

#[test]
fn reactivation_reattaches_a_replaced_texture() {
    let mut h = Harness::new(2);
    let a = h.bitmap(1);
    h.activate(a);
    let fbo = h.fbo(a);

    h.display.set_texture(a, 77, 128, 128).unwrap();
    assert_eq!(h.activate(a), Activation::Framebuffer(fbo));
    assert_eq!(h.gl.attachment(fbo), Some(77));
    assert_eq!(h.gl.last_viewport(), Some([0, 0, 128, 128]));
}

#[test]
fn evicted_current_target_is_revalidated_on_next_use() {
    let mut h = Harness::new(1);
    let a = h.bitmap(1);
    let b = h.bitmap(2);

    h.activate(a);
    h.activate(b);
    assert_eq!(h.fbo(a), 0);

    // Taking the slot back evicts b in turn.
    assert!(h.activate(a).is_hardware());
    assert_eq!(h.fbo(b), 0);
    assert_eq!(h.display.current_render_target(), Some(a));
}

#[test]
fn destroying_a_bitmap_releases_its_framebuffer() {
    let mut h = Harness::new(2);
    let a = h.bitmap(1);
    let b = h.bitmap(2);
    h.activate(a);
    h.activate(b);
    h.display.persist_render_target(b).unwrap();
    let (fa, fb) = (h.fbo(a), h.fbo(b));

    h.display.destroy_bitmap(a).unwrap();
    h.display.destroy_bitmap(b).unwrap();

    assert!(!h.gl.is_live(fa));
    assert!(!h.gl.is_live(fb));
    assert_eq!(h.display.current_render_target(), None);
    assert_eq!(h.display.pool().persistent_len(), 0);
    assert!(h.display.bitmap(a).is_err());
    assert!(h.display.activate_as_render_target(a).is_err());
    assert!(h.display.destroy_bitmap(h.display.backbuffer()).is_err());
}

#[test]
fn dropping_the_display_deletes_every_framebuffer() {
    let mut h = Harness::new(2);
    let a = h.bitmap(1);
    let b = h.bitmap(2);
    h.activate(a);
    h.display.create_persistent(b).unwrap();
    assert_eq!(h.gl.live_framebuffers().len(), 2);

    let gl = h.gl.clone();
    drop(h);
    assert!(gl.live_framebuffers().is_empty());
}

#[test]
fn window_events_resize_the_backbuffer() {
    let mut h = Harness::new(2);
    let bb = h.display.backbuffer();
    h.activate(bb);

    let (tx, rx) = mpsc::channel();
    tx.send(WindowEvent::Moved { x: 5, y: 5 }).unwrap();
    tx.send(WindowEvent::Resized { width: 800, height: 600 }).unwrap();

    assert_eq!(h.display.pump_window_events(&rx), 2);
    assert_eq!(h.display.size(), (800, 600));
    assert_eq!(h.gl.last_viewport(), Some([0, 0, 800, 600]));
    assert_eq!(h.display.pump_window_events(&rx), 0);
}

#[test]
fn switch_in_revalidates_the_current_target() {
    let mut h = Harness::new(2);
    let a = h.bitmap(1);
    h.activate(a);
    let fbo = h.fbo(a);
    let checks = h.gl.status_checks();

    h.display.handle_window_event(WindowEvent::SwitchIn);

    assert_eq!(h.gl.status_checks(), checks + 1);
    assert_eq!(h.gl.bound(), fbo);
}
