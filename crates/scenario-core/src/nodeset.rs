//! # Composite Node-Set
//!
//! A [`NodeSet`] owns an ordered list of children and the dependencies
//! declared at its level. It has no capabilities of its own: predecessor
//! and successor operations are forwarded to the descendant leaf with the
//! addressed name.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use scenario_bus::EventPayload;
use scenario_types::{CapabilityKey, NodeSetConfig, ScenarioError, ScenarioResult};
use tracing::debug;

use crate::capability::{EventHandler, InterfaceRef};
use crate::component::ScenarioComponent;
use crate::dependency::Dependency;
use crate::leaf::{AsAny, Composite};
use crate::node::Node;
use crate::ports::{Predecessor, Successor};

pub struct NodeSet {
    name: String,
    nodeset_class: String,
    composite: Arc<dyn Composite>,
    children: RwLock<Vec<ScenarioComponent>>,
    dependencies: RwLock<Vec<Dependency>>,
    parent: RwLock<Option<Weak<NodeSet>>>,
}

impl NodeSet {
    /// Create an empty node-set named after `config`. Children are attached
    /// separately.
    pub fn new(config: &NodeSetConfig, composite: Arc<dyn Composite>) -> Arc<Self> {
        Self::with_name(&config.name, &config.nodeset_class, composite)
    }

    pub fn with_name(
        name: impl Into<String>,
        nodeset_class: impl Into<String>,
        composite: Arc<dyn Composite>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            nodeset_class: nodeset_class.into(),
            composite,
            children: RwLock::new(Vec::new()),
            dependencies: RwLock::new(Vec::new()),
            parent: RwLock::new(None),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodeset_class(&self) -> &str {
        &self.nodeset_class
    }

    pub fn composite(&self) -> &Arc<dyn Composite> {
        &self.composite
    }

    /// The composite behaviour as its concrete type.
    pub fn composite_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.composite).into_any().downcast::<T>().ok()
    }

    pub fn parent(&self) -> Option<Arc<NodeSet>> {
        self.parent.read().as_ref().and_then(Weak::upgrade)
    }

    /// Direct children in attach order.
    pub fn children(&self) -> Vec<ScenarioComponent> {
        self.children.read().clone()
    }

    /// Dependencies registered at this level.
    pub fn dependencies(&self) -> Vec<Dependency> {
        self.dependencies.read().clone()
    }

    // =========================================================================
    // Composition
    // =========================================================================

    /// Attach `child` and set its parent to `self`.
    ///
    /// A component that already has a live parent is rejected.
    pub fn add_child(self: &Arc<Self>, child: ScenarioComponent) -> ScenarioResult<()> {
        match &child {
            ScenarioComponent::Node(node) => node.attach(self)?,
            ScenarioComponent::NodeSet(nodeset) => {
                if Arc::ptr_eq(nodeset, self) {
                    return Err(ScenarioError::AlreadyAttached {
                        name: self.name.clone(),
                        parent: self.name.clone(),
                    });
                }
                nodeset.attach(self)?;
            }
        }

        debug!(owner = %self.name, child = %child.name(), "[NodeSet] Child attached");
        self.composite.child_attached(&self.name, &child);
        self.children.write().push(child);
        Ok(())
    }

    /// Detach the direct child called `name` and clear its parent.
    pub fn remove_child(&self, name: &str) -> ScenarioResult<ScenarioComponent> {
        let mut children = self.children.write();
        let index = children
            .iter()
            .position(|child| child.name() == name)
            .ok_or_else(|| ScenarioError::ComponentNotFound {
                name: name.to_string(),
            })?;

        let child = children.remove(index);
        match &child {
            ScenarioComponent::Node(node) => node.detach(),
            ScenarioComponent::NodeSet(nodeset) => nodeset.detach(),
        }
        debug!(owner = %self.name, child = %name, "[NodeSet] Child removed");
        Ok(child)
    }

    /// Record a dependency declared at this level.
    pub fn add_edge(&self, dependency: Dependency) {
        self.dependencies.write().push(dependency);
    }

    fn attach(&self, parent: &Arc<NodeSet>) -> ScenarioResult<()> {
        let mut slot = self.parent.write();
        if let Some(existing) = slot.as_ref().and_then(Weak::upgrade) {
            return Err(ScenarioError::AlreadyAttached {
                name: self.name.clone(),
                parent: existing.name().to_string(),
            });
        }
        *slot = Some(Arc::downgrade(parent));
        Ok(())
    }

    fn detach(&self) {
        *self.parent.write() = None;
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Every component below `self`, in pre-order.
    pub fn descendants(&self) -> Vec<ScenarioComponent> {
        let mut out = Vec::new();
        let mut stack: Vec<ScenarioComponent> = self.children().into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            if let ScenarioComponent::NodeSet(nodeset) = &current {
                stack.extend(nodeset.children().into_iter().rev());
            }
            out.push(current);
        }
        out
    }

    /// `self` if `name` matches, otherwise the descendant node-set `name`.
    pub fn get_nodeset(self: &Arc<Self>, name: &str) -> ScenarioResult<Arc<NodeSet>> {
        if name == self.name {
            return Ok(Arc::clone(self));
        }
        self.descendants()
            .into_iter()
            .find_map(|component| match component {
                ScenarioComponent::NodeSet(nodeset) if nodeset.name() == name => Some(nodeset),
                _ => None,
            })
            .ok_or_else(|| ScenarioError::ComponentNotFound {
                name: name.to_string(),
            })
    }

    /// Any component called `name`, including `self`.
    pub fn get_child_component(self: &Arc<Self>, name: &str) -> ScenarioResult<ScenarioComponent> {
        if name == self.name {
            return Ok(ScenarioComponent::NodeSet(Arc::clone(self)));
        }
        self.descendants()
            .into_iter()
            .find(|component| component.name() == name)
            .ok_or_else(|| ScenarioError::ComponentNotFound {
                name: name.to_string(),
            })
    }

    /// The descendant leaf called `name`.
    pub fn get_child_node(&self, name: &str) -> ScenarioResult<Arc<Node>> {
        self.leaves()
            .into_iter()
            .find(|node| node.name() == name)
            .ok_or_else(|| ScenarioError::ComponentNotFound {
                name: name.to_string(),
            })
    }

    /// The single descendant leaf whose dependency tag is `tag`.
    pub fn get_child_node_by_tag(&self, tag: &str) -> ScenarioResult<Arc<Node>> {
        let mut matches: Vec<Arc<Node>> = self
            .leaves()
            .into_iter()
            .filter(|node| node.dependency_tag() == tag)
            .collect();

        match matches.len() {
            0 => Err(ScenarioError::UnresolvedTag {
                tag: tag.to_string(),
            }),
            1 => Ok(matches.remove(0)),
            _ => Err(ScenarioError::AmbiguousTag {
                tag: tag.to_string(),
                nodes: matches.iter().map(|node| node.name().to_string()).collect(),
            }),
        }
    }

    pub fn has_child_nodeset(&self) -> bool {
        self.children.read().iter().any(ScenarioComponent::is_nodeset)
    }

    /// All descendant leaves, in pre-order.
    pub fn leaves(&self) -> Vec<Arc<Node>> {
        self.descendants()
            .into_iter()
            .filter_map(|component| match component {
                ScenarioComponent::Node(node) => Some(node),
                ScenarioComponent::NodeSet(_) => None,
            })
            .collect()
    }

    /// Consolidate the capability maps of every leaf below.
    pub fn consolidate(&self) {
        self.consolidate_implemented_interfaces();
        self.consolidate_implemented_handlers();
    }
}

impl Predecessor for NodeSet {
    fn add_event(&self, node_name: &str, event: &str) -> ScenarioResult<bool> {
        self.get_child_node(node_name)?.add_event(node_name, event)
    }

    fn has_event(&self, node_name: &str, event: &str) -> ScenarioResult<bool> {
        self.get_child_node(node_name)?.has_event(node_name, event)
    }

    fn register_handler_to_event(
        &self,
        node_name: &str,
        event: &str,
        handler: EventHandler,
    ) -> ScenarioResult<()> {
        self.get_child_node(node_name)?
            .register_handler_to_event(node_name, event, handler)
    }

    fn notify_handlers(
        &self,
        node_name: &str,
        event: &str,
        payload: EventPayload,
    ) -> ScenarioResult<usize> {
        self.get_child_node(node_name)?
            .notify_handlers(node_name, event, payload)
    }

    fn implemented_interface(
        &self,
        node_name: &str,
        key: &CapabilityKey,
    ) -> ScenarioResult<InterfaceRef> {
        self.get_child_node(node_name)?
            .implemented_interface(node_name, key)
    }

    fn consolidate_implemented_interfaces(&self) {
        for child in self.children() {
            match child {
                ScenarioComponent::Node(node) => node.consolidate_implemented_interfaces(),
                ScenarioComponent::NodeSet(nodeset) => nodeset.consolidate_implemented_interfaces(),
            }
        }
    }
}

impl Successor for NodeSet {
    fn implemented_event_handler(
        &self,
        node_name: &str,
        key: &CapabilityKey,
    ) -> ScenarioResult<EventHandler> {
        self.get_child_node(node_name)?
            .implemented_event_handler(node_name, key)
    }

    fn register_interface_to_node(
        &self,
        node_name: &str,
        key: CapabilityKey,
        iface: InterfaceRef,
    ) -> ScenarioResult<()> {
        self.get_child_node(node_name)?
            .register_interface_to_node(node_name, key, iface)
    }

    fn consolidate_implemented_handlers(&self) {
        for child in self.children() {
            match child {
                ScenarioComponent::Node(node) => node.consolidate_implemented_handlers(),
                ScenarioComponent::NodeSet(nodeset) => nodeset.consolidate_implemented_handlers(),
            }
        }
    }
}

impl fmt::Debug for NodeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSet")
            .field("name", &self.name)
            .field("nodeset_class", &self.nodeset_class)
            .field("children", &*self.children.read())
            .finish_non_exhaustive()
    }
}
