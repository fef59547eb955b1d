//! # Leaf and Composite Behaviour
//!
//! [`Leaf`] is the domain-model instance a [`Node`](crate::Node) wraps.
//! [`Composite`] is the optional behaviour behind a
//! [`NodeSet`](crate::NodeSet).

use std::any::Any;
use std::sync::Arc;

use crate::capability::{HandlerSet, InterfaceSet};
use crate::component::ScenarioComponent;

/// Upcast helper so a `dyn Leaf` or `dyn Composite` can be recovered as its
/// concrete type.
pub trait AsAny: Any + Send + Sync {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// The domain model behind one leaf node.
///
/// Both declarations run on every consolidation, so they must not have side
/// effects beyond filling the given set.
///
/// ```rust,ignore
/// impl Leaf for A {
///     fn declare_interfaces(self: Arc<Self>, interfaces: &mut InterfaceSet) {
///         interfaces.provide::<dyn InterfaceA>(self);
///     }
/// }
/// ```
pub trait Leaf: AsAny {
    /// Interfaces this leaf implements.
    fn declare_interfaces(self: Arc<Self>, _interfaces: &mut InterfaceSet) {}

    /// Event handlers this leaf implements.
    fn declare_handlers(self: Arc<Self>, _handlers: &mut HandlerSet) {}
}

/// Behaviour of a composite node-set.
pub trait Composite: AsAny {
    /// Called after `child` has been attached to the node-set `owner`.
    fn child_attached(&self, _owner: &str, _child: &ScenarioComponent) {}
}

/// Composite with no behaviour of its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainComposite;

impl Composite for PlainComposite {}
