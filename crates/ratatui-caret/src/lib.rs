//! `ratatui-caret` puts an animated caret with a particle trail on top of ratatui text fields.
//!
//! The engine lives in `ratatui-caret-core` and is re-exported as [`engine`]. This crate adds a
//! terminal [`terminal::TerminalHost`], ready-made [`field::TextField`] and [`field::RichField`],
//! a [`registry::CaretRegistry`] for many fields, and (feature `crossterm`) event mapping.
//!
//! ## Getting started
//!
//! ```no_run
//! use ratatui::layout::Rect;
//! use ratatui_caret::engine::geometry::BoxRect;
//! use ratatui_caret::engine::host::FieldId;
//! use ratatui_caret::engine::input::CaretEvent;
//! use ratatui_caret::field::TextField;
//! use ratatui_caret::registry::CaretRegistry;
//! use ratatui_caret::terminal::TerminalHost;
//! use ratatui_caret::CaretOptions;
//!
//! let mut host = TerminalHost::new(Rect::new(0, 0, 80, 24));
//! let mut name = TextField::single_line(FieldId(1)).with_value("hello");
//! name.set_rect(BoxRect::new(2.0, 2.0, 30.0, 1.0));
//!
//! let mut carets = CaretRegistry::new();
//! carets.attach(&mut name, &mut host, CaretOptions::new().with_style_name("fire"))?;
//! carets.handle_event(CaretEvent::Focus, &mut name, &host);
//! while carets.frame_all(&mut [&mut name], &host) {
//!     // draw, then wait for the next frame
//! #   break;
//! }
//! # Ok::<(), ratatui_caret::CaretError>(())
//! ```
pub use ratatui_caret_core as engine;
pub use ratatui_caret_core::CaretError;
pub use ratatui_caret_core::CaretOptions;
pub use ratatui_caret_core::CaretTrail;
pub use ratatui_caret_core::StyleName;

pub mod field;
pub mod input;
pub mod registry;
pub mod terminal;

#[cfg(feature = "crossterm")]
pub mod crossterm_input;
