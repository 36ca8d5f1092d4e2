//! # declui
//!
//! A declarative widget-tree builder with property bindings, event
//! trampolines, and a window shell with actions and menus.
//!
//! A UI is described as a tree of plain [`spec::Node`] values. The
//! [`declarative`] constructor walks the tree against a [`ui::UserInterface`]
//! adapter, creates the widgets, binds their properties to a
//! [`handler::Handler`], and routes their signals to handler methods. Top-level
//! nodes open a [`window::Window`] whose menus and shortcuts run registered
//! [`action::Action`]s.
//!
//! ## Core Systems
//!
//! - **[`spec`]**: Node tree, binding expressions, component definitions
//! - **[`handler`]**: Handler trait, property bindings, converters, event slots
//! - **[`declarative`]**: Tree constructor, finishers, event trampolines, components
//! - **[`ui`]**: Toolkit adapter seam with widget, window, and menu ids
//! - **[`window`]**: Window shell: menus, actions, key dispatch, periodic tasks
//! - **[`action`]**: Action trait, global registry, standard actions and menus
//! - **[`app`]**: Application configuration and app-level commands
//! - **[`event`]**: Toolkit-independent key events
//! - **[`dom`]**: Slotmap-backed widget arena used by the headless toolkit
//! - **[`testing`]**: Headless toolkit, Pilot driver, snapshot helpers

// Description
pub mod spec;

// Runtime
pub mod declarative;
pub mod handler;
pub mod ui;

// Window shell
pub mod action;
pub mod app;
pub mod event;
pub mod window;

// Headless toolkit
pub mod dom;
pub mod testing;
