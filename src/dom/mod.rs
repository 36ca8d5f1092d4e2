//! Widget arena: slotmap-backed widget trees for the in-memory toolkit.
//!
//! A [`Dom`] holds any number of detached trees. Each widget records its
//! layout in order (children, fixed spacing, stretch, tab pages), which is
//! what snapshot rendering and structural assertions read back.

pub mod focus;
pub mod node;
pub mod query;
pub mod tree;

pub use focus::FocusChain;
pub use node::{LayoutItem, WidgetData};
pub use tree::Dom;
