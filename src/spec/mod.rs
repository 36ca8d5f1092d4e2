//! Specification trees: the serializable description of a widget hierarchy.

pub mod binding;
pub mod node;

pub use binding::{BindingError, BindingExpr};
pub use node::{
    BoxNode, CheckBoxNode, ComboBoxNode, ComponentDefinition, ComponentNode, EventDeclaration,
    GroupNode, LineEditNode, Node, ProgressBarNode, PushButtonNode, RadioButtonNode,
    ReferenceValue, Resource, Resources, SliderNode, StackNode, StringValue, Tab, TabsNode,
    TextLabelNode, TopLevelNode,
};
