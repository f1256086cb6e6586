/// Host events the caret overlay reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaretEvent {
    Focus,
    Blur,
    Input,
    Click,
    KeyDown,
    KeyUp,
    /// The document-level selection changed; only acted on while this field is the active one.
    SelectionChange,
    /// The viewport size or pixel ratio changed.
    Resize,
}

impl CaretEvent {
    /// Events that ask for a fresh caret position.
    pub fn recomputes(self) -> bool {
        matches!(
            self,
            CaretEvent::Input | CaretEvent::Click | CaretEvent::KeyUp | CaretEvent::SelectionChange
        )
    }
}
