//! # Capability Maps
//!
//! A leaf declares what it offers to other leaves:
//!
//! - **interfaces** it implements, handed to successors over callable edges;
//! - **event handlers** it wants attached to a predecessor's events.
//!
//! Both are collected into maps keyed by [`CapabilityKey`] during
//! consolidation.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use scenario_bus::{EventPayload, Listener};
use scenario_types::{CapabilityKey, Contract, ContractId};
use tracing::warn;

/// Handler attached as a listener to a predecessor's event.
pub type EventHandler = Listener;

/// Type-erased reference to an implemented interface.
///
/// Holds an `Arc<C>` where `C` is usually a `dyn Trait`. Two references are
/// equal when they point at the same implementation of the same contract.
#[derive(Clone)]
pub struct InterfaceRef {
    contract: ContractId,
    target: usize,
    inner: Arc<dyn Any + Send + Sync>,
}

impl InterfaceRef {
    pub fn new<C>(iface: Arc<C>) -> Self
    where
        C: Contract + ?Sized + Send + Sync + 'static,
    {
        Self {
            contract: ContractId::of::<C>(),
            target: Arc::as_ptr(&iface) as *const () as usize,
            inner: Arc::new(iface),
        }
    }

    pub fn contract(&self) -> &ContractId {
        &self.contract
    }

    /// Recover the typed interface. `None` if `C` is not the stored contract.
    pub fn get<C>(&self) -> Option<Arc<C>>
    where
        C: Contract + ?Sized + Send + Sync + 'static,
    {
        self.inner.downcast_ref::<Arc<C>>().cloned()
    }
}

impl PartialEq for InterfaceRef {
    fn eq(&self, other: &Self) -> bool {
        self.contract == other.contract && self.target == other.target
    }
}

impl Eq for InterfaceRef {}

impl fmt::Debug for InterfaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceRef")
            .field("contract", &self.contract)
            .finish_non_exhaustive()
    }
}

/// Interfaces declared by one leaf, keyed under the leaf's own type.
#[derive(Debug)]
pub struct InterfaceSet {
    leaf_type: String,
    interfaces: BTreeMap<CapabilityKey, InterfaceRef>,
}

impl InterfaceSet {
    pub fn new(leaf_type: impl Into<String>) -> Self {
        Self {
            leaf_type: leaf_type.into(),
            interfaces: BTreeMap::new(),
        }
    }

    /// Offer `iface` as contract `C` under `<leaf-type>.<C>`.
    pub fn provide<C>(&mut self, iface: Arc<C>) -> &mut Self
    where
        C: Contract + ?Sized + Send + Sync + 'static,
    {
        let key = CapabilityKey::new(self.leaf_type.clone(), ContractId::of::<C>());
        self.interfaces.insert(key, InterfaceRef::new(iface));
        self
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    pub fn into_map(self) -> BTreeMap<CapabilityKey, InterfaceRef> {
        self.interfaces
    }
}

/// Event handlers declared by one leaf.
///
/// Handlers are keyed under the *predecessor's* leaf type, since that is the
/// type whose events they listen to.
pub struct HandlerSet {
    leaf_name: String,
    handlers: BTreeMap<CapabilityKey, EventHandler>,
}

impl HandlerSet {
    pub fn new(leaf_name: impl Into<String>) -> Self {
        Self {
            leaf_name: leaf_name.into(),
            handlers: BTreeMap::new(),
        }
    }

    /// Handle payload `E` emitted by leaves of type `pred_leaf_type`.
    ///
    /// A payload of any other type is dropped with a warning.
    pub fn on<E, F>(&mut self, pred_leaf_type: &str, handler: F) -> &mut Self
    where
        E: Contract + Any + Send + Sync,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let key = CapabilityKey::new(pred_leaf_type, ContractId::of::<E>());
        let leaf_name = self.leaf_name.clone();
        let event = key.to_string();
        let listener: EventHandler = Arc::new(move |payload: &EventPayload| {
            match payload.downcast_ref::<E>() {
                Some(value) => handler(value),
                None => warn!(
                    node = %leaf_name,
                    event = %event,
                    "[Node] Dropped payload of unexpected type"
                ),
            }
        });
        self.handlers.insert(key, listener);
        self
    }

    /// Register an untyped handler under an explicit key.
    pub fn on_raw(&mut self, key: CapabilityKey, handler: EventHandler) -> &mut Self {
        self.handlers.insert(key, handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn into_map(self) -> BTreeMap<CapabilityKey, EventHandler> {
        self.handlers
    }
}

impl fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSet")
            .field("leaf_name", &self.leaf_name)
            .field("keys", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
