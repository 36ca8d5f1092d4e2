//! Headless testing framework: toolkit, Pilot, snapshot helpers.
//!
//! [`HeadlessUi`] is an in-memory [`UserInterface`](crate::ui::UserInterface).
//! Use the [`Pilot`] to open a declarative window on it and drive it
//! programmatically. Use [`tree_to_string`] and [`menus_to_string`] to capture
//! widget trees and menu bars as plain text for snapshot-style assertions.

pub mod headless;
pub mod pilot;
pub mod snapshot;

pub use headless::{HeadlessUi, MenuEntry};
pub use pilot::Pilot;
pub use snapshot::{menus_to_string, tree_to_string};
