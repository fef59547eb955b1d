//! # Leaf Node
//!
//! A [`Node`] wraps one [`Leaf`] and carries its capability maps:
//!
//! | Map | Filled by | Keyed by |
//! |-----|-----------|----------|
//! | implemented interfaces | consolidation | own leaf type |
//! | implemented event handlers | consolidation | predecessor leaf type |
//! | registered interfaces | callable edges | predecessor leaf type |
//!
//! Events live in the shared [`EventRegistry`]; a node remembers which
//! events it created.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use scenario_bus::{payload, EventPayload, EventRegistry};
use scenario_types::{
    short_name, CapabilityKey, CapabilityKind, Contract, ContractId, NodeConfig, ScenarioError,
    ScenarioResult,
};
use tracing::{debug, info};

use crate::capability::{EventHandler, HandlerSet, InterfaceRef, InterfaceSet};
use crate::leaf::{AsAny, Leaf};
use crate::nodeset::NodeSet;
use crate::ports::{Predecessor, Successor};

pub struct Node {
    config: NodeConfig,
    leaf_type: String,
    leaf: Arc<dyn Leaf>,
    events: Arc<EventRegistry>,
    created_events: RwLock<BTreeSet<String>>,
    implemented_interfaces: RwLock<Option<BTreeMap<CapabilityKey, InterfaceRef>>>,
    implemented_handlers: RwLock<Option<BTreeMap<CapabilityKey, EventHandler>>>,
    registered_interfaces: RwLock<BTreeMap<CapabilityKey, InterfaceRef>>,
    parent: RwLock<Option<Weak<NodeSet>>>,
}

impl Node {
    /// Wrap `leaf`. The leaf type is the last segment of `config.node_class`.
    pub fn new(config: NodeConfig, leaf: Arc<dyn Leaf>, events: Arc<EventRegistry>) -> Arc<Self> {
        let leaf_type = short_name(&config.node_class).to_string();
        Arc::new(Self {
            config,
            leaf_type,
            leaf,
            events,
            created_events: RwLock::new(BTreeSet::new()),
            implemented_interfaces: RwLock::new(None),
            implemented_handlers: RwLock::new(None),
            registered_interfaces: RwLock::new(BTreeMap::new()),
            parent: RwLock::new(None),
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn dependency_tag(&self) -> &str {
        self.config.dependency_tag()
    }

    /// Short type name used as the first half of capability keys.
    pub fn leaf_type(&self) -> &str {
        &self.leaf_type
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn leaf(&self) -> &Arc<dyn Leaf> {
        &self.leaf
    }

    /// The wrapped leaf as its concrete type.
    pub fn leaf_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.leaf).into_any().downcast::<T>().ok()
    }

    pub fn event_registry(&self) -> &Arc<EventRegistry> {
        &self.events
    }

    pub fn parent(&self) -> Option<Arc<NodeSet>> {
        self.parent.read().as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn attach(&self, parent: &Arc<NodeSet>) -> ScenarioResult<()> {
        let mut slot = self.parent.write();
        if let Some(existing) = slot.as_ref().and_then(Weak::upgrade) {
            return Err(ScenarioError::AlreadyAttached {
                name: self.name().to_string(),
                parent: existing.name().to_string(),
            });
        }
        *slot = Some(Arc::downgrade(parent));
        Ok(())
    }

    pub(crate) fn detach(&self) {
        *self.parent.write() = None;
    }

    /// Names of the events this node created, sorted.
    pub fn registered_events(&self) -> Vec<String> {
        self.created_events.read().iter().cloned().collect()
    }

    /// Capability key for contract `C` under this node's own type.
    pub fn key_for<C: Contract + ?Sized>(&self) -> CapabilityKey {
        CapabilityKey::new(self.leaf_type.clone(), ContractId::of::<C>())
    }

    /// Emit `value` on `<own-type>.<E>`.
    pub fn emit<E: Contract + Any + Send + Sync>(&self, value: E) -> ScenarioResult<usize> {
        let event = self.key_for::<E>().to_string();
        self.notify_handlers(&self.config.name, &event, payload(value))
    }

    /// Interface a predecessor handed over under `key`, as contract `C`.
    pub fn registered_interface<C>(&self, key: &CapabilityKey) -> Option<Arc<C>>
    where
        C: Contract + ?Sized + Send + Sync + 'static,
    {
        self.registered_interfaces.read().get(key)?.get::<C>()
    }

    pub fn registered_interface_keys(&self) -> Vec<CapabilityKey> {
        self.registered_interfaces.read().keys().cloned().collect()
    }

    /// Snapshot of the implemented-interface map.
    pub fn implemented_interfaces(&self) -> ScenarioResult<BTreeMap<CapabilityKey, InterfaceRef>> {
        self.implemented_interfaces
            .read()
            .clone()
            .ok_or_else(|| self.not_consolidated())
    }

    /// Keys of the implemented event handlers.
    pub fn implemented_handler_keys(&self) -> ScenarioResult<Vec<CapabilityKey>> {
        self.implemented_handlers
            .read()
            .as_ref()
            .map(|handlers| handlers.keys().cloned().collect())
            .ok_or_else(|| self.not_consolidated())
    }

    pub fn is_consolidated(&self) -> bool {
        self.implemented_interfaces.read().is_some() && self.implemented_handlers.read().is_some()
    }

    /// Consolidate both capability maps.
    pub fn consolidate(&self) {
        self.consolidate_implemented_interfaces();
        self.consolidate_implemented_handlers();
    }

    fn check_name(&self, node_name: &str) -> ScenarioResult<()> {
        if node_name == self.name() {
            Ok(())
        } else {
            Err(ScenarioError::NodeNameMismatch {
                expected: node_name.to_string(),
                actual: self.name().to_string(),
            })
        }
    }

    fn not_consolidated(&self) -> ScenarioError {
        ScenarioError::NotConsolidated {
            node: self.name().to_string(),
        }
    }

    fn missing(&self, key: &CapabilityKey, capability: CapabilityKind) -> ScenarioError {
        ScenarioError::MissingCapability {
            node: self.name().to_string(),
            key: key.to_string(),
            capability,
        }
    }
}

impl Predecessor for Node {
    fn add_event(&self, node_name: &str, event: &str) -> ScenarioResult<bool> {
        self.check_name(node_name)?;
        let created = self.events.create(event);
        if created {
            self.created_events.write().insert(event.to_string());
            info!(node = %self.name(), event, "[Node] Event created");
        }
        Ok(created)
    }

    fn has_event(&self, node_name: &str, event: &str) -> ScenarioResult<bool> {
        self.check_name(node_name)?;
        Ok(self.events.contains(event))
    }

    fn register_handler_to_event(
        &self,
        node_name: &str,
        event: &str,
        handler: EventHandler,
    ) -> ScenarioResult<()> {
        self.check_name(node_name)?;
        self.events.add_listener(event, handler)?;
        Ok(())
    }

    fn notify_handlers(
        &self,
        node_name: &str,
        event: &str,
        payload: EventPayload,
    ) -> ScenarioResult<usize> {
        self.check_name(node_name)?;
        Ok(self.events.emit(event, payload)?)
    }

    fn implemented_interface(
        &self,
        node_name: &str,
        key: &CapabilityKey,
    ) -> ScenarioResult<InterfaceRef> {
        self.check_name(node_name)?;
        let guard = self.implemented_interfaces.read();
        let interfaces = guard.as_ref().ok_or_else(|| self.not_consolidated())?;
        interfaces
            .get(key)
            .cloned()
            .ok_or_else(|| self.missing(key, CapabilityKind::Interface))
    }

    fn consolidate_implemented_interfaces(&self) {
        let mut set = InterfaceSet::new(self.leaf_type.clone());
        Arc::clone(&self.leaf).declare_interfaces(&mut set);
        debug!(node = %self.name(), count = set.len(), "[Node] Interfaces consolidated");
        *self.implemented_interfaces.write() = Some(set.into_map());
    }
}

impl Successor for Node {
    fn implemented_event_handler(
        &self,
        node_name: &str,
        key: &CapabilityKey,
    ) -> ScenarioResult<EventHandler> {
        self.check_name(node_name)?;
        let guard = self.implemented_handlers.read();
        let handlers = guard.as_ref().ok_or_else(|| self.not_consolidated())?;
        handlers
            .get(key)
            .cloned()
            .ok_or_else(|| self.missing(key, CapabilityKind::EventHandler))
    }

    fn register_interface_to_node(
        &self,
        node_name: &str,
        key: CapabilityKey,
        iface: InterfaceRef,
    ) -> ScenarioResult<()> {
        self.check_name(node_name)?;
        self.registered_interfaces.write().insert(key, iface);
        Ok(())
    }

    fn consolidate_implemented_handlers(&self) {
        let mut set = HandlerSet::new(self.name());
        Arc::clone(&self.leaf).declare_handlers(&mut set);
        debug!(node = %self.name(), count = set.len(), "[Node] Handlers consolidated");
        *self.implemented_handlers.write() = Some(set.into_map());
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.config.name)
            .field("leaf_type", &self.leaf_type)
            .field("dependency_tag", &self.config.dependency_tag())
            .finish_non_exhaustive()
    }
}
