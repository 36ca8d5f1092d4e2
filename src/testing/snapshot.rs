//! Snapshot rendering helpers.
//!
//! Functions for converting a headless widget tree or menu bar into plain
//! text suitable for snapshot testing and assertions.

use std::fmt::Write as _;

use crate::dom::{Dom, LayoutItem};
use crate::ui::{MenuId, UserInterface, WidgetId, WindowId};

use super::headless::{HeadlessUi, MenuEntry};

const INDENT: &str = "  ";

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Render the widget tree under `root` as indented text.
///
/// Each widget is one line: its kind followed by its properties in name
/// order, values written as JSON. Children are indented two spaces per level.
/// Layout spacing and stretch appear as `<spacing N>` and `<stretch>`, and
/// tab pages are prefixed with their `[label]`. Lines are joined with `'\n'`
/// and the final line has no trailing newline.
///
/// # Examples
///
/// ```
/// use declui::testing::{tree_to_string, HeadlessUi};
/// use declui::ui::{UserInterface, WidgetKind};
/// use serde_json::json;
///
/// let ui = HeadlessUi::new();
/// let column = ui.create_widget(WidgetKind::Column);
/// let label = ui.create_widget(WidgetKind::Label);
/// ui.set_property(label, "text", json!("hi"));
/// ui.add_child(column, label);
/// assert_eq!(tree_to_string(&ui, column), "column\n  label text=\"hi\"");
/// ```
pub fn tree_to_string(ui: &HeadlessUi, root: WidgetId) -> String {
    ui.with_dom(|dom| {
        let mut lines = Vec::new();
        write_widget(dom, root, 0, "", &mut lines);
        lines.join("\n")
    })
}

/// Render the menu bar of `window` as indented text.
///
/// Menus are written as `Title (id)`, items as `Title [action_id]` with the
/// key sequence and any `disabled` or `checked` flag appended. Separators
/// are `---` and sub-menus nest one level deeper.
pub fn menus_to_string(ui: &HeadlessUi, window: WindowId) -> String {
    let mut lines = Vec::new();
    for menu in ui.menus(window) {
        let title = ui.menu_title(menu).unwrap_or_default();
        let id = ui.menu_id(menu).unwrap_or_default();
        lines.push(format!("{title} ({id})"));
        write_entries(ui, menu, 1, &mut lines);
    }
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn write_widget(dom: &Dom, id: WidgetId, depth: usize, prefix: &str, lines: &mut Vec<String>) {
    let indent = INDENT.repeat(depth);
    let Some(data) = dom.get(id) else {
        lines.push(format!("{indent}{prefix}<missing>"));
        return;
    };

    let mut line = format!("{indent}{prefix}{}", data.kind);
    for (name, value) in &data.properties {
        let _ = write!(line, " {name}={value}");
    }
    lines.push(line);

    let child_indent = INDENT.repeat(depth + 1);
    for item in &data.layout {
        match item {
            LayoutItem::Widget(child) => write_widget(dom, *child, depth + 1, "", lines),
            LayoutItem::Tab { label, widget } => {
                write_widget(dom, *widget, depth + 1, &format!("[{label}] "), lines);
            }
            LayoutItem::Spacing(size) => lines.push(format!("{child_indent}<spacing {size}>")),
            LayoutItem::Stretch => lines.push(format!("{child_indent}<stretch>")),
        }
    }
}

fn write_entries(ui: &HeadlessUi, menu: MenuId, depth: usize, lines: &mut Vec<String>) {
    let indent = INDENT.repeat(depth);
    for entry in ui.menu_entries(menu) {
        match entry {
            MenuEntry::Item { item, state } => {
                let title = state.title.unwrap_or(item.title);
                let mut line = format!("{indent}{title} [{}]", item.action_id);
                if let Some(keys) = &item.key_sequence {
                    let _ = write!(line, " {keys}");
                }
                if !state.enabled {
                    line.push_str(" disabled");
                }
                if state.checked {
                    line.push_str(" checked");
                }
                lines.push(line);
            }
            MenuEntry::Separator => lines.push(format!("{indent}---")),
            MenuEntry::SubMenu { title, menu } => {
                lines.push(format!("{indent}{title} >"));
                write_entries(ui, menu, depth + 1, lines);
            }
        }
    }
}
