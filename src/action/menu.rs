//! Declarative menu descriptions.
//!
//! ```text
//! [{"type": "menu", "menu_id": "edit", "title": "Edit", "items": [
//!     {"type": "item", "action_id": "window.undo"},
//!     {"type": "separator"},
//!     {"type": "sub_menu", "menu_id": "find", "title": "Find", "items": [...]}
//! ]}]
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MenuDescription {
    /// A top-level menu. Reuses an existing menu with the same id.
    Menu {
        menu_id: String,
        title: String,
        #[serde(default)]
        items: Vec<MenuDescription>,
    },
    Item {
        action_id: String,
    },
    Separator,
    SubMenu {
        menu_id: String,
        title: String,
        #[serde(default)]
        items: Vec<MenuDescription>,
    },
}

impl MenuDescription {
    pub fn menu(
        menu_id: impl Into<String>,
        title: impl Into<String>,
        items: impl IntoIterator<Item = MenuDescription>,
    ) -> Self {
        Self::Menu {
            menu_id: menu_id.into(),
            title: title.into(),
            items: items.into_iter().collect(),
        }
    }

    pub fn item(action_id: impl Into<String>) -> Self {
        Self::Item {
            action_id: action_id.into(),
        }
    }

    pub fn separator() -> Self {
        Self::Separator
    }

    pub fn sub_menu(
        menu_id: impl Into<String>,
        title: impl Into<String>,
        items: impl IntoIterator<Item = MenuDescription>,
    ) -> Self {
        Self::SubMenu {
            menu_id: menu_id.into(),
            title: title.into(),
            items: items.into_iter().collect(),
        }
    }
}

/// File, Edit, Window, and Help menus over the standard actions.
pub fn standard_menus() -> Vec<MenuDescription> {
    use MenuDescription as M;

    vec![
        M::menu(
            "file",
            "File",
            [
                M::item("window.close"),
                M::separator(),
                M::item("window.page_setup"),
                M::item("window.print"),
                M::separator(),
                M::item("application.exit"),
            ],
        ),
        M::menu(
            "edit",
            "Edit",
            [
                M::item("window.undo"),
                M::item("window.redo"),
                M::separator(),
                M::item("window.cut"),
                M::item("window.copy"),
                M::item("window.paste"),
                M::item("window.delete"),
                M::item("window.select_all"),
            ],
        ),
        M::menu(
            "window",
            "Window",
            [
                M::item("window.minimize"),
                M::separator(),
                M::item("window.zoom"),
                M::item("window.bring_to_front"),
            ],
        ),
        M::menu("help", "Help", []),
    ]
}
