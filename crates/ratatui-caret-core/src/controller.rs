use crate::caret::CaretVisual;
use crate::caret::VisualCaret;
use crate::error::CaretError;
use crate::frame::FrameLoop;
use crate::frame::FrameTask;
use crate::geometry::CaretPosition;
use crate::host::FieldId;
use crate::host::Host;
use crate::host::NativeCaret;
use crate::host::OverlayCanvas;
use crate::host::TrackedField;
use crate::input::CaretEvent;
use crate::locate;
use crate::mirror::Mirror;
use crate::options::CaretOptions;
use crate::options::NormalizedOptions;
use crate::style;
use crate::trail::BurstParams;
use crate::trail::TrailEngine;
use std::time::Instant;

/// Animated caret overlay bound to one field.
///
/// Owns the visual caret, the measurement mirror, the particle trail and the overlay canvas. The
/// field itself is only borrowed per call: pass it to [`Self::handle_event`] for every host event
/// and to [`Self::frame`] once per animation frame while [`Self::needs_frame`] is true.
///
/// Lifecycle: bound and blurred after [`Self::new`], focused after a `Focus` event, blurred again
/// on `Blur`, unbound after [`Self::destroy`]. Once destroyed, events and frames are ignored.
pub struct CaretTrail<H: Host> {
    field_id: FieldId,
    options: NormalizedOptions,
    colors: Vec<String>,
    caret: VisualCaret,
    mirror: Mirror<H::Mirror>,
    canvas: H::Canvas,
    trail: TrailEngine,
    frames: FrameLoop,
    focused: bool,
    destroyed: bool,
    current: CaretPosition,
    target: CaretPosition,
    last_target: Option<CaretPosition>,
}

impl<H: Host> CaretTrail<H> {
    pub fn new<F>(field: &mut F, host: &mut H, options: CaretOptions) -> Result<Self, CaretError>
    where
        F: TrackedField + ?Sized,
    {
        Self::with_trail(field, host, options, TrailEngine::new())
    }

    /// Like [`Self::new`] with a caller-provided particle engine (e.g. a seeded one).
    pub fn with_trail<F>(
        field: &mut F,
        host: &mut H,
        options: CaretOptions,
        trail: TrailEngine,
    ) -> Result<Self, CaretError>
    where
        F: TrackedField + ?Sized,
    {
        let options = NormalizedOptions::normalize(&options);
        let mut canvas = host.create_canvas().ok_or_else(|| {
            CaretError::RenderContextUnavailable("host returned no overlay canvas".to_string())
        })?;
        let viewport = host.viewport();
        canvas.resize(viewport.width, viewport.height, viewport.pixel_ratio);

        let colors = style::resolve_colors(&options);
        let mut caret = VisualCaret::new(colors.clone(), options.size, options.transition());
        caret.set_height(field.text_style().resolved_line_height());
        let mirror = Mirror::create(host);

        field.set_native_caret(NativeCaret::Transparent);
        tracing::debug!(field = ?field.id(), style = %options.style, "caret overlay attached");

        Ok(Self {
            field_id: field.id(),
            options,
            colors,
            caret,
            mirror,
            canvas,
            trail,
            frames: FrameLoop::new(),
            focused: false,
            destroyed: false,
            current: CaretPosition::default(),
            target: CaretPosition::default(),
            last_target: None,
        })
    }

    pub fn handle_event<F>(&mut self, event: CaretEvent, field: &mut F, host: &H)
    where
        F: TrackedField + ?Sized,
    {
        if self.destroyed || !self.owns(field) {
            return;
        }
        match event {
            CaretEvent::Focus => self.on_focus(field, host),
            CaretEvent::Blur => self.on_blur(),
            CaretEvent::Input | CaretEvent::Click | CaretEvent::KeyUp => {
                self.update_position(field, host)
            }
            // The host applies the key after this event; read the cursor on the next frame.
            CaretEvent::KeyDown => self.frames.defer(FrameTask::Recompute),
            CaretEvent::SelectionChange => {
                if self.focused && host.active_field() == Some(self.field_id) {
                    self.update_position(field, host);
                }
            }
            CaretEvent::Resize => self.resize_canvas(host),
        }
    }

    /// Runs one animation frame. Returns whether another frame is wanted.
    pub fn frame<F>(&mut self, field: &mut F, host: &H) -> bool
    where
        F: TrackedField + ?Sized,
    {
        if self.destroyed {
            return false;
        }
        if !self.owns(field) {
            return self.frames.needs_frame();
        }

        let tick = self.frames.is_running();
        for task in self.frames.take_tasks() {
            match task {
                FrameTask::EnableTransition => self.caret.enable_transition(),
                FrameTask::Recompute => self.update_position(field, host),
            }
        }
        if tick && self.frames.is_running() {
            self.tick_trail(host);
        }
        self.frames.needs_frame()
    }

    pub fn update_options<F>(&mut self, partial: &CaretOptions, field: &F)
    where
        F: TrackedField + ?Sized,
    {
        if self.destroyed {
            return;
        }
        self.options.merge(partial);
        self.colors = style::resolve_colors(&self.options);
        self.caret.apply_style(
            self.colors.clone(),
            self.options.size,
            self.options.transition(),
        );
        self.caret.set_height(field.text_style().resolved_line_height());
        tracing::debug!(
            field = ?self.field_id,
            style = %self.options.style,
            "caret options updated"
        );
    }

    /// Tears everything down. Calling it again does nothing.
    pub fn destroy<F>(&mut self, field: &mut F)
    where
        F: TrackedField + ?Sized,
    {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.focused = false;
        self.stop_animation();
        self.frames.cancel_tasks();
        if field.id() == self.field_id {
            field.set_native_caret(NativeCaret::Auto);
        }
        self.caret.remove();
        self.canvas.detach();
        self.mirror.detach();
        tracing::debug!(field = ?self.field_id, "caret overlay destroyed");
    }

    pub fn field_id(&self) -> FieldId {
        self.field_id
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn options(&self) -> &NormalizedOptions {
        &self.options
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn gradient(&self) -> &str {
        self.caret.background()
    }

    pub fn caret(&self) -> &VisualCaret {
        &self.caret
    }

    pub fn caret_visual(&self, now: Instant) -> Option<CaretVisual> {
        self.caret.visual(now)
    }

    pub fn trail(&self) -> &TrailEngine {
        &self.trail
    }

    pub fn canvas(&self) -> &H::Canvas {
        &self.canvas
    }

    pub fn mirror(&self) -> &Mirror<H::Mirror> {
        &self.mirror
    }

    /// Last computed caret position.
    pub fn target(&self) -> CaretPosition {
        self.target
    }

    /// Where the caret was drawn when the last position was computed.
    pub fn current(&self) -> CaretPosition {
        self.current
    }

    pub fn is_animating(&self) -> bool {
        self.frames.is_running()
    }

    pub fn needs_frame(&self) -> bool {
        !self.destroyed && self.frames.needs_frame()
    }

    /// Frames are needed, or the caret is still sliding to its target.
    pub fn needs_redraw(&self, now: Instant) -> bool {
        self.needs_frame() || (!self.destroyed && self.caret.is_animating(now))
    }

    fn owns<F: TrackedField + ?Sized>(&self, field: &F) -> bool {
        let id = field.id();
        if id != self.field_id {
            tracing::warn!(expected = ?self.field_id, got = ?id, "ignoring call for another field");
            return false;
        }
        true
    }

    fn on_focus<F: TrackedField + ?Sized>(&mut self, field: &mut F, host: &H) {
        self.focused = true;
        self.caret.disable_transition();
        self.caret.show();
        self.update_position(field, host);
        self.frames.defer(FrameTask::EnableTransition);
    }

    fn on_blur(&mut self) {
        self.focused = false;
        self.caret.hide();
        self.stop_animation();
        self.frames.cancel_tasks();
    }

    fn update_position<F: TrackedField + ?Sized>(&mut self, field: &mut F, host: &H) {
        if !self.focused {
            return;
        }
        let now = host.now();
        if let Some(drawn) = self.caret.rendered_position(now) {
            self.current = drawn;
        }

        let page_scroll = host.page_scroll();
        let target = if field.kind().is_plain_text() {
            match locate::locate_in_text(field, &mut self.mirror, page_scroll) {
                Some(p) => {
                    field.set_native_caret(NativeCaret::Transparent);
                    self.caret.show();
                    p
                }
                None => {
                    // No readable cursor: hand the caret back to the field for now.
                    field.set_native_caret(NativeCaret::Auto);
                    self.caret.hide();
                    return;
                }
            }
        } else {
            locate::locate_in_rich(field, page_scroll)
        };

        self.target = target;
        self.caret.move_to(target, now);
        if self.last_target != Some(target) {
            self.last_target = Some(target);
            self.trigger_burst(now);
        }
    }

    fn trigger_burst(&mut self, now: Instant) {
        let origin = self
            .caret
            .bounding_rect(now)
            .map(|r| r.center())
            .unwrap_or(self.target);
        self.trail.spawn_burst(
            origin,
            BurstParams {
                count: self.options.burst_count(),
                trail_width: self.options.trail_width,
                colors: &self.colors,
                cap: self.options.particle_cap(),
            },
        );
        self.frames.arm_burst(now, self.options.burst_window());
        self.frames.start();
        tracing::debug!(x = origin.x, y = origin.y, live = self.trail.len(), "caret burst");
    }

    fn tick_trail(&mut self, host: &H) {
        if !self.focused {
            self.stop_animation();
            return;
        }
        self.trail.advance();
        self.trail
            .render(&mut self.canvas, host.page_scroll(), self.options.trail_opacity);

        if !self.trail.is_active() && !self.frames.burst_active(host.now()) {
            self.stop_animation();
        }
    }

    fn stop_animation(&mut self) {
        self.frames.stop();
        self.trail.clear();
        self.canvas.clear();
    }

    fn resize_canvas(&mut self, host: &H) {
        let v = host.viewport();
        self.canvas.resize(v.width, v.height, v.pixel_ratio);
    }
}
