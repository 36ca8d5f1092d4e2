//! Top-level kinds: `window` and `modeless_dialog`.
//!
//! Order matters here. The whole content tree is built and attached before
//! any finisher runs, and `init_handler` runs only after every binding is in
//! place.

use std::rc::Rc;

use tracing::{debug, warn};

use super::connect::run_finishers;
use super::construct::{construct_margin, Builder};
use super::ConstructError;
use crate::app::{AppConfig, Application};
use crate::handler::{close_handler, init_handler, with_handler_mut, HandlerRef};
use crate::spec::{Node, Resources, TopLevelNode};
use crate::ui::UiRef;
use crate::window::Window;

/// Construct a top-level node into a new [`Window`].
///
/// Dialogs become children of `parent`, take the standard menus when the
/// configuration asks for them, and are left hidden. Windows are shown.
pub(crate) fn construct_top_level(
    ui: &UiRef,
    app: Option<Rc<Application>>,
    parent: Option<&Window>,
    node: &Node,
    handler: Option<&HandlerRef>,
) -> Result<Option<Window>, ConstructError> {
    match node {
        Node::Window(top) => build(ui, app, None, top, false, handler).map(Some),
        Node::ModelessDialog(top) => build(ui, app, parent, top, true, handler).map(Some),
        _ => Ok(None),
    }
}

fn build(
    ui: &UiRef,
    app: Option<Rc<Application>>,
    parent: Option<&Window>,
    top: &TopLevelNode,
    is_dialog: bool,
    handler: Option<&HandlerRef>,
) -> Result<Window, ConstructError> {
    if let Some(handler) = handler {
        merge_resources(handler, &top.resources)?;
    }

    let standard_menus = app.as_ref().map_or(true, |app| app.config().standard_menus);
    let default_title = app.as_ref().map_or_else(
        || AppConfig::default().default_window_title,
        |app| app.config().default_window_title.clone(),
    );

    let window = Window::new(Rc::clone(ui), app, parent)?;
    if is_dialog && standard_menus {
        window.create_standard_menus();
    }
    window.set_title(top.title.as_deref().unwrap_or(&default_title));

    let mut finishers = Vec::new();
    let content = Builder::new(&**ui, &mut finishers).construct_widget(&top.content, handler)?;
    if let Some(content) = content {
        window.attach_widget(construct_margin(&**ui, content, top.margin));
    }
    if !is_dialog {
        window.show();
    }

    run_finishers(&**ui, finishers)?;

    if let Some(handler) = handler {
        init_handler(handler);
        let handler = Rc::clone(handler);
        window.set_on_close(move || close_handler(&handler));
    }
    debug!(is_dialog, title = %window.title(), "constructed top-level");
    Ok(window)
}

/// Add node-declared resources to the handler's own, keeping entries the
/// handler already has.
fn merge_resources(handler: &HandlerRef, resources: &Resources) -> Result<(), ConstructError> {
    if resources.is_empty() {
        return Ok(());
    }
    let merged = with_handler_mut(handler, |h| match h.resources_mut() {
        Some(existing) => {
            for (identifier, resource) in resources {
                existing
                    .entry(identifier.clone())
                    .or_insert_with(|| resource.clone());
            }
            true
        }
        None => false,
    })
    .ok_or(ConstructError::HandlerBusy)?;
    if !merged {
        warn!(count = resources.len(), "handler has no resources; node resources dropped");
    }
    Ok(())
}

/// Construct a top-level node for `app` and show it.
pub fn run_window(
    app: &Rc<Application>,
    node: &Node,
    handler: Option<&HandlerRef>,
) -> Result<Option<Window>, ConstructError> {
    if !node.is_top_level() {
        warn!(kind = node.kind_name(), "run_window needs a window or dialog node");
        return Ok(None);
    }
    let window = construct_top_level(app.ui(), Some(Rc::clone(app)), None, node, handler)?;
    if let Some(window) = &window {
        window.show();
    }
    Ok(window)
}

/// Open `top` as a shown application window for `app`.
pub fn open_window(
    app: &Rc<Application>,
    top: &TopLevelNode,
    handler: Option<&HandlerRef>,
) -> Result<Window, ConstructError> {
    build(app.ui(), Some(Rc::clone(app)), None, top, false, handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{CloseHandler, Handler, InitHandler};
    use crate::spec::{ComponentDefinition, TextLabelNode};
    use crate::testing::HeadlessUi;
    use crate::ui::{UserInterface, WidgetId};
    use serde_json::{json, Value};
    use std::cell::RefCell;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    #[derive(Default)]
    struct Document {
        log: Log,
        resources: Resources,
    }

    impl Handler for Document {
        fn resources(&self) -> Option<&Resources> {
            Some(&self.resources)
        }

        fn resources_mut(&mut self) -> Option<&mut Resources> {
            Some(&mut self.resources)
        }

        fn as_init_handler(&mut self) -> Option<&mut dyn InitHandler> {
            Some(self)
        }

        fn as_close_handler(&mut self) -> Option<&mut dyn CloseHandler> {
            Some(self)
        }
    }

    impl InitHandler for Document {
        fn init_handler(&mut self) {
            self.log.borrow_mut().push("init_handler");
        }
    }

    impl CloseHandler for Document {
        fn close(&mut self) {
            self.log.borrow_mut().push("close");
        }
    }

    fn setup() -> (Rc<HeadlessUi>, Rc<Application>) {
        let headless = Rc::new(HeadlessUi::new());
        let app = Rc::new(Application::new(headless.clone(), AppConfig::default()));
        (headless, app)
    }

    #[test]
    fn window_is_titled_shown_and_initialized() {
        let (headless, app) = setup();
        let log = Log::default();
        let handler: HandlerRef = Rc::new(RefCell::new(Document {
            log: log.clone(),
            ..Document::default()
        }));
        let node = TopLevelNode::window(TextLabelNode::new().with_text("hi").unwrap())
            .with_title("Inspector")
            .into_window();
        let window = run_window(&app, &node, Some(&handler)).unwrap().unwrap();
        let id = window.document_window().unwrap();
        assert_eq!(window.title(), "Inspector");
        assert!(headless.is_shown(id));
        assert!(headless.window_root(id).is_some());
        assert_eq!(*log.borrow(), vec!["init_handler"]);

        window.about_to_close();
        assert_eq!(*log.borrow(), vec!["init_handler", "close"]);
        assert!(window.is_closed());
    }

    #[test]
    fn default_title_from_config() {
        let (_headless, app) = setup();
        let node = TopLevelNode::window(TextLabelNode::new()).into_window();
        let window = run_window(&app, &node, None).unwrap().unwrap();
        assert_eq!(window.title(), "Untitled");
    }

    #[test]
    fn dialog_gets_standard_menus_and_stays_hidden() {
        let (headless, app) = setup();
        let parent = Window::new(headless.clone(), Some(app), None).unwrap();
        let ui: UiRef = headless.clone();
        let node = TopLevelNode::modeless_dialog(TextLabelNode::new()).into_modeless_dialog();
        let mut finishers = Vec::new();
        let dialog = crate::declarative::construct(&ui, Some(&parent), &node, None, &mut finishers)
            .unwrap()
            .and_then(|c| c.into_window())
            .unwrap();
        let id = dialog.document_window().unwrap();
        assert!(!headless.is_shown(id));
        assert_eq!(headless.window_parent(id), parent.document_window());
        assert!(dialog.menu("edit").is_some());
        assert!(dialog.menu("help").is_some());
    }

    #[test]
    fn resources_merge_without_clobbering() {
        let (_headless, app) = setup();
        let mut document = Document::default();
        let authored = ComponentDefinition::new(TextLabelNode::new(), "make_authored");
        document.resources.insert("shared".into(), authored.clone().into());
        let handler: HandlerRef = Rc::new(RefCell::new(document));

        let node = TopLevelNode::window(TextLabelNode::new())
            .with_resource("shared", ComponentDefinition::new(TextLabelNode::new(), "make_other"))
            .with_resource("extra", ComponentDefinition::new(TextLabelNode::new(), "make_extra"))
            .into_window();
        let _window = run_window(&app, &node, Some(&handler)).unwrap().unwrap();

        let handler = handler.borrow();
        let resources = handler.resources().unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources.get("shared"), Some(&authored.into()));
    }

    #[test]
    fn open_window_takes_the_node_directly() {
        let (headless, app) = setup();
        let top = TopLevelNode::window(TextLabelNode::new()).with_title("Direct");
        let window = open_window(&app, &top, None).unwrap();
        assert_eq!(window.title(), "Direct");
        assert!(headless.is_shown(window.document_window().unwrap()));
    }

    // ── Build order ──────────────────────────────────────────────────

    type Seen = Rc<RefCell<Option<(bool, Option<Value>)>>>;

    /// Records, from inside `init_handler`, whether its label is already
    /// attached to a window and what text the label holds.
    struct Observer {
        ui: Rc<HeadlessUi>,
        label: Option<WidgetId>,
        seen: Seen,
    }

    impl Handler for Observer {
        fn property(&self, name: &str) -> Option<Value> {
            (name == "title").then(|| json!("Quarterly report"))
        }

        fn set_widget(&mut self, name: &str, widget: WidgetId) {
            if name == "label" {
                self.label = Some(widget);
            }
        }

        fn as_init_handler(&mut self) -> Option<&mut dyn InitHandler> {
            Some(self)
        }
    }

    impl InitHandler for Observer {
        fn init_handler(&mut self) {
            let attached = self
                .label
                .and_then(|label| self.ui.window_of(label))
                .and_then(|id| self.ui.window_root(id))
                .is_some();
            let text = self
                .label
                .and_then(|label| UserInterface::property(&*self.ui, label, "text"));
            *self.seen.borrow_mut() = Some((attached, text));
        }
    }

    fn observer(ui: &Rc<HeadlessUi>) -> (HandlerRef, Seen) {
        let seen = Seen::default();
        let handler: HandlerRef = Rc::new(RefCell::new(Observer {
            ui: ui.clone(),
            label: None,
            seen: seen.clone(),
        }));
        (handler, seen)
    }

    fn bound_content() -> Node {
        Node::column([TextLabelNode::new()
            .with_text("@binding(title)")
            .unwrap()
            .with_name("label")
            .into()])
    }

    #[test]
    fn window_init_sees_attached_and_bound_tree() {
        let (headless, app) = setup();
        let (handler, seen) = observer(&headless);
        let node = TopLevelNode::window(bound_content()).into_window();
        let _window = run_window(&app, &node, Some(&handler)).unwrap().unwrap();

        assert_eq!(
            seen.borrow().clone(),
            Some((true, Some(json!("Quarterly report"))))
        );
    }

    #[test]
    fn dialog_init_sees_attached_and_bound_tree() {
        let (headless, app) = setup();
        let (handler, seen) = observer(&headless);
        let parent = Window::new(headless.clone(), Some(app), None).unwrap();
        let ui: UiRef = headless.clone();
        let node = TopLevelNode::modeless_dialog(bound_content()).into_modeless_dialog();
        let mut finishers = Vec::new();
        let dialog = crate::declarative::construct(&ui, Some(&parent), &node, Some(&handler), &mut finishers)
            .unwrap()
            .and_then(|c| c.into_window())
            .unwrap();

        assert!(!headless.is_shown(dialog.document_window().unwrap()));
        assert_eq!(
            seen.borrow().clone(),
            Some((true, Some(json!("Quarterly report"))))
        );
    }

    #[test]
    fn run_window_rejects_widget_nodes() {
        let (_headless, app) = setup();
        let node: Node = TextLabelNode::new().into();
        assert!(run_window(&app, &node, None).unwrap().is_none());
    }
}
