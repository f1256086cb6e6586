//! `ratatui-caret-core` is the engine behind `ratatui-caret`: a decorative caret that glides to the
//! cursor of a text field and leaves a short-lived particle trail behind.
//!
//! The engine does not own a terminal, a window or an event loop. It observes fields through the
//! [`host::TrackedField`] trait and talks to its environment through [`host::Host`], so the same
//! controller drives the ratatui host in the facade crate and the fakes used in tests.
//!
//! ## Design goals
//!
//! - Event-loop agnostic: forward events with [`controller::CaretTrail::handle_event`] and call
//!   [`controller::CaretTrail::frame`] while it asks for frames.
//! - No async runtime, no threads: everything runs on the caller's thread.
//! - Nothing is drawn until the host paints: [`render::render_overlay`] puts the trail and the
//!   caret into a ratatui `Buffer`.
//!
//! ## Getting started
//!
//! Most users should depend on the facade crate `ratatui-caret`, which ships a terminal host,
//! ready-made fields and a crossterm event mapping. Use this crate directly to plug the caret into
//! your own widgets.
//!
//! Useful entry points:
//! - [`controller::CaretTrail`]: one overlay bound to one field.
//! - [`options::CaretOptions`]: styles, colors, timing and trail shape.
//! - [`mirror::MirrorSurface`] and [`cell_mirror::CellMirror`]: caret measurement on a cell grid.
//! - [`render::BufferCanvas`]: particle canvas painted into a `Buffer`.
pub mod geometry;

pub mod error;
pub mod options;
pub mod style;

pub mod host;
pub mod input;

pub mod cell_mirror;
pub mod mirror;

pub mod caret;
pub mod locate;
pub mod trail;

pub mod controller;
pub mod frame;
pub mod render;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::CaretTrail;
pub use error::CaretError;
pub use options::CaretOptions;
pub use options::StyleName;
