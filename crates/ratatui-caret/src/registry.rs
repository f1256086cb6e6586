use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui_caret_core::controller::CaretTrail;
use ratatui_caret_core::error::CaretError;
use ratatui_caret_core::host::FieldId;
use ratatui_caret_core::host::Host;
use ratatui_caret_core::host::TrackedField;
use ratatui_caret_core::input::CaretEvent;
use ratatui_caret_core::options::CaretOptions;
use ratatui_caret_core::render::BufferCanvas;
use ratatui_caret_core::render::render_overlay;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Caret overlays keyed by field identity.
///
/// For apps that attach and detach overlays declaratively, the way a UI framework mounts and
/// unmounts a directive. Fields are never stored; every call borrows the one it is about.
pub struct CaretRegistry<H: Host> {
    entries: BTreeMap<FieldId, CaretTrail<H>>,
}

impl<H: Host> Default for CaretRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Host> CaretRegistry<H> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Creates an overlay for `field`. If it already has one, `options` are merged into it.
    pub fn attach<F>(
        &mut self,
        field: &mut F,
        host: &mut H,
        options: CaretOptions,
    ) -> Result<&mut CaretTrail<H>, CaretError>
    where
        F: TrackedField + ?Sized,
    {
        match self.entries.entry(field.id()) {
            Entry::Occupied(entry) => {
                tracing::debug!(
                    field = ?entry.key(),
                    "caret overlay already attached; updating options"
                );
                let trail = entry.into_mut();
                trail.update_options(&options, field);
                Ok(trail)
            }
            Entry::Vacant(entry) => Ok(entry.insert(CaretTrail::new(field, host, options)?)),
        }
    }

    /// Merges `options` into the field's overlay. Returns false when it has none.
    pub fn update<F>(&mut self, field: &F, options: &CaretOptions) -> bool
    where
        F: TrackedField + ?Sized,
    {
        match self.entries.get_mut(&field.id()) {
            Some(trail) => {
                trail.update_options(options, field);
                true
            }
            None => false,
        }
    }

    /// Destroys and forgets the field's overlay. Returns false when it has none.
    pub fn detach<F>(&mut self, field: &mut F) -> bool
    where
        F: TrackedField + ?Sized,
    {
        match self.entries.remove(&field.id()) {
            Some(mut trail) => {
                trail.destroy(field);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: FieldId) -> Option<&CaretTrail<H>> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: FieldId) -> Option<&mut CaretTrail<H>> {
        self.entries.get_mut(&id)
    }

    pub fn contains(&self, id: FieldId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Routes an event to the field's overlay, if it has one.
    pub fn handle_event<F>(&mut self, event: CaretEvent, field: &mut F, host: &H)
    where
        F: TrackedField + ?Sized,
    {
        if let Some(trail) = self.entries.get_mut(&field.id()) {
            trail.handle_event(event, field, host);
        }
    }

    /// Sends a viewport-wide event (such as `Resize`) to every overlay whose field is given.
    pub fn broadcast(&mut self, event: CaretEvent, fields: &mut [&mut dyn TrackedField], host: &H) {
        for field in fields.iter_mut() {
            self.handle_event(event, &mut **field, host);
        }
    }

    /// Runs one frame for every given field that has an overlay. Returns whether any wants more.
    pub fn frame_all(&mut self, fields: &mut [&mut dyn TrackedField], host: &H) -> bool {
        let mut more = false;
        for field in fields.iter_mut() {
            if let Some(trail) = self.entries.get_mut(&field.id()) {
                more |= trail.frame(&mut **field, host);
            }
        }
        more
    }

    pub fn needs_frame(&self) -> bool {
        self.entries.values().any(CaretTrail::needs_frame)
    }

    pub fn ids(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<H: Host<Canvas = BufferCanvas>> CaretRegistry<H> {
    /// Paints every overlay into `buf`. `area` is the host viewport.
    pub fn render(&self, host: &H, area: Rect, buf: &mut Buffer) {
        for trail in self.entries.values() {
            render_overlay(trail, host, area, buf);
        }
    }

    /// Whether anything is still moving: particles, deferred work or a caret transition.
    pub fn needs_redraw(&self, host: &H) -> bool {
        let now = host.now();
        self.entries.values().any(|t| t.needs_redraw(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::TextField;
    use crate::terminal::Clock;
    use crate::terminal::TerminalHost;
    use crate::terminal::TerminalHostOptions;
    use ratatui_caret_core::geometry::BoxRect;
    use ratatui_caret_core::host::NativeCaret;
    use ratatui_caret_core::options::StyleName;

    fn host() -> TerminalHost {
        TerminalHost::with_options(
            Rect::new(0, 0, 40, 10),
            TerminalHostOptions {
                clock: Clock::manual(),
                ..TerminalHostOptions::default()
            },
        )
    }

    fn field(id: u64, value: &str) -> TextField {
        let mut f = TextField::single_line(FieldId(id)).with_value(value);
        f.set_rect(BoxRect::new(0.0, id as f64, 20.0, 1.0));
        f
    }

    #[test]
    fn attach_twice_merges_options() {
        let mut host = host();
        let mut reg = CaretRegistry::new();
        let mut a = field(1, "abc");
        reg.attach(&mut a, &mut host, CaretOptions::new().with_size(3.0))
            .unwrap();
        reg.attach(
            &mut a,
            &mut host,
            CaretOptions::new().with_style(StyleName::Ocean),
        )
        .unwrap();
        assert_eq!(reg.len(), 1);
        let trail = reg.get(FieldId(1)).unwrap();
        assert_eq!(trail.options().size, 3.0);
        assert_eq!(trail.options().style, StyleName::Ocean);
    }

    #[test]
    fn update_and_detach_unknown_fields_are_noops() {
        let mut reg: CaretRegistry<TerminalHost> = CaretRegistry::new();
        let mut a = field(1, "abc");
        assert!(!reg.update(&a, &CaretOptions::new()));
        assert!(!reg.detach(&mut a));
    }

    #[test]
    fn detach_restores_the_native_caret() {
        let mut host = host();
        let mut reg = CaretRegistry::new();
        let mut a = field(1, "abc");
        reg.attach(&mut a, &mut host, CaretOptions::default()).unwrap();
        assert_eq!(a.native_caret(), NativeCaret::Transparent);
        assert!(reg.detach(&mut a));
        assert_eq!(a.native_caret(), NativeCaret::Auto);
        assert!(reg.is_empty());
    }

    #[test]
    fn events_and_frames_reach_only_their_field() {
        let mut host = host();
        let mut reg = CaretRegistry::new();
        let mut a = field(1, "abc");
        let mut b = field(2, "xyz");
        reg.attach(&mut a, &mut host, CaretOptions::default()).unwrap();
        reg.attach(&mut b, &mut host, CaretOptions::default()).unwrap();

        reg.handle_event(CaretEvent::Focus, &mut a, &host);
        assert!(reg.get(FieldId(1)).unwrap().is_focused());
        assert!(!reg.get(FieldId(2)).unwrap().is_focused());
        assert!(reg.needs_frame());

        let mut frames = 0;
        while reg.frame_all(&mut [&mut a, &mut b], &host) {
            host.clock_mut().advance(std::time::Duration::from_millis(16));
            frames += 1;
            assert!(frames < 200);
        }
        assert!(!reg.needs_frame());
        assert_eq!(reg.ids().collect::<Vec<_>>(), vec![FieldId(1), FieldId(2)]);
    }
}
