//! Component instantiation.
//!
//! A component node names a definition registered in the handler's
//! resources. The definition's factory method on the outer handler produces
//! the component's private handler; the node's properties are applied to it
//! before its content is built, and its declared events are routed back to
//! outer-handler methods.

use tracing::{debug, warn};

use super::connect::connect_name;
use super::construct::Builder;
use super::event::{connect_event, SignalSource};
use super::ConstructError;
use crate::handler::{init_component, with_handler_mut, HandlerRef};
use crate::spec::{ComponentDefinition, ComponentNode, Resource};
use crate::ui::WidgetId;

pub(crate) fn construct_component(
    builder: &mut Builder<'_>,
    node: &ComponentNode,
    handler: Option<&HandlerRef>,
) -> Result<Option<WidgetId>, ConstructError> {
    let Some(handler) = handler else {
        warn!(identifier = %node.identifier, "component without a handler; skipped");
        return Ok(None);
    };
    let Some(definition) = lookup(handler, &node.identifier)? else {
        warn!(identifier = %node.identifier, "component is not registered; skipped");
        return Ok(None);
    };

    let component_handler = with_handler_mut(handler, |h| {
        h.create_handler(&definition.create_handler_method_name)
    })
    .flatten();
    match &component_handler {
        Some(component_handler) => {
            for (key, value) in &node.properties {
                let accepted =
                    with_handler_mut(component_handler, |h| h.set_property(key, value.clone()));
                if accepted != Some(true) {
                    debug!(identifier = %node.identifier, property = %key, "property not accepted");
                }
            }
        }
        None => debug!(
            identifier = %node.identifier,
            method = %definition.create_handler_method_name,
            "no component handler; content built without one"
        ),
    }

    let Some(widget) = builder.construct_widget(&definition.content, component_handler.as_ref())?
    else {
        return Ok(None);
    };

    connect_name(Some(handler), node.name.as_deref(), widget);
    if let Some(component_handler) = &component_handler {
        builder
            .ui
            .set_widget_handler(widget, Some(component_handler.clone()));
        init_component(component_handler);
        for declaration in &definition.events {
            let arg_names: Vec<&str> = declaration.parameters.iter().map(String::as_str).collect();
            connect_event(
                builder.ui,
                widget,
                SignalSource::Handler(component_handler),
                node.event_method(&declaration.event),
                Some(handler),
                &declaration.event,
                &arg_names,
            );
        }
    }
    debug!(identifier = %node.identifier, ?widget, "constructed component");
    Ok(Some(widget))
}

fn lookup(
    handler: &HandlerRef,
    identifier: &str,
) -> Result<Option<ComponentDefinition>, ConstructError> {
    let resource = handler
        .try_borrow()
        .map_err(|_| ConstructError::HandlerBusy)?
        .resources()
        .and_then(|resources| resources.get(identifier).cloned());
    Ok(match resource {
        Some(Resource::Component(definition)) => Some(definition),
        Some(Resource::Other) | None => None,
    })
}

#[cfg(test)]
mod tests {
    use crate::declarative::{construct, run_finishers};
    use crate::handler::{
        handler_ref, EventArgs, EventSlots, Handler, HandlerRef, InitComponent,
    };
    use crate::spec::{
        BindingExpr, ComponentDefinition, ComponentNode, EventDeclaration, Node, Resources,
        SliderNode, TextLabelNode,
    };
    use crate::testing::HeadlessUi;
    use crate::ui::{UiRef, UserInterface, WidgetId};
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Knob {
        log: Log,
        values: BTreeMap<String, Value>,
        slots: EventSlots,
    }

    impl Handler for Knob {
        fn property(&self, name: &str) -> Option<Value> {
            self.values.get(name).cloned()
        }

        fn set_property(&mut self, name: &str, value: Value) -> bool {
            self.log.borrow_mut().push(format!("set {name}={value}"));
            self.values.insert(name.to_owned(), value);
            true
        }

        fn event_slots(&mut self) -> Option<&mut EventSlots> {
            Some(&mut self.slots)
        }

        fn as_init_component(&mut self) -> Option<&mut dyn InitComponent> {
            Some(self)
        }
    }

    impl InitComponent for Knob {
        fn init_component(&mut self) {
            self.log.borrow_mut().push("init_component".into());
        }
    }

    struct Panel {
        log: Log,
        resources: Resources,
        widgets: BTreeMap<String, WidgetId>,
        knob: Option<HandlerRef>,
    }

    impl Handler for Panel {
        fn set_widget(&mut self, name: &str, widget: WidgetId) {
            self.log.borrow_mut().push(format!("widget {name}"));
            self.widgets.insert(name.to_owned(), widget);
        }

        fn has_method(&self, name: &str) -> bool {
            name == "knob_turned"
        }

        fn call_method(&mut self, name: &str, _sender: WidgetId, args: &EventArgs) {
            let value = args.get("value").cloned().unwrap_or(Value::Null);
            self.log.borrow_mut().push(format!("{name} value={value}"));
        }

        fn create_handler(&mut self, method: &str) -> Option<HandlerRef> {
            if method != "make_knob" {
                return None;
            }
            self.log.borrow_mut().push("make_knob".into());
            let knob = handler_ref(Knob {
                log: self.log.clone(),
                values: BTreeMap::new(),
                slots: EventSlots::new(),
            });
            self.knob = Some(knob.clone());
            Some(knob)
        }

        fn resources(&self) -> Option<&Resources> {
            Some(&self.resources)
        }
    }

    fn panel(log: &Log) -> HandlerRef {
        let content = SliderNode::new()
            .with_value(BindingExpr::new("k", None).unwrap())
            .unwrap();
        let definition = ComponentDefinition::new(content, "make_knob")
            .with_event(EventDeclaration::new("on_turned", ["value"]));
        let mut resources = Resources::new();
        resources.insert("knob".into(), definition.into());
        handler_ref(Panel {
            log: log.clone(),
            resources,
            widgets: BTreeMap::new(),
            knob: None,
        })
    }

    fn build(ui: &UiRef, node: &Node, handler: &HandlerRef) -> Option<WidgetId> {
        let mut finishers = Vec::new();
        let built = construct(ui, None, node, Some(handler), &mut finishers)
            .unwrap()
            .and_then(|c| c.widget());
        run_finishers(&**ui, finishers).unwrap();
        built
    }

    #[test]
    fn lifecycle_order() {
        let headless = Rc::new(HeadlessUi::new());
        let ui: UiRef = headless.clone();
        let log = Log::default();
        let handler = panel(&log);
        let node = ComponentNode::new("knob")
            .with_property("k", 1)
            .with_name("volume")
            .on("on_turned", "knob_turned");
        let widget = build(&ui, &node.into(), &handler).unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["make_knob", "set k=1", "widget volume", "init_component"]
        );
        assert_eq!(headless.property(widget, "value"), Some(json!(1)));
        assert!(headless.widget_handler(widget).is_some());
    }

    #[test]
    fn declared_event_reaches_outer_handler() {
        let headless = Rc::new(HeadlessUi::new());
        let ui: UiRef = headless.clone();
        let log = Log::default();
        let handler = panel(&log);
        let node = ComponentNode::new("knob")
            .with_property("k", 0)
            .on("on_turned", "knob_turned");
        let widget = build(&ui, &node.into(), &handler).unwrap();

        let knob = headless.widget_handler(widget).unwrap();
        knob.borrow_mut()
            .event_slots()
            .unwrap()
            .fire("on_turned", &[json!(42)]);
        assert_eq!(log.borrow().last().unwrap(), "knob_turned value=42");
    }

    #[test]
    fn unregistered_component_produces_nothing() {
        let ui: UiRef = Rc::new(HeadlessUi::new());
        let log = Log::default();
        let handler = panel(&log);
        let node: Node = ComponentNode::new("dial").into();
        assert!(build(&ui, &node, &handler).is_none());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn missing_factory_builds_without_handler() {
        let ui: UiRef = Rc::new(HeadlessUi::new());
        let log = Log::default();
        let label = TextLabelNode::new().with_text("plain").unwrap();
        let definition = ComponentDefinition::new(label, "make_dial");
        let owner = handler_ref(Panel {
            log: log.clone(),
            resources: Resources::from([("dial".to_owned(), definition.into())]),
            widgets: BTreeMap::new(),
            knob: None,
        });
        let widget = build(&ui, &ComponentNode::new("dial").into(), &owner).unwrap();
        assert_eq!(ui.property(widget, "text"), Some(json!("plain")));
        assert!(ui.widget_handler(widget).is_none());
    }
}
