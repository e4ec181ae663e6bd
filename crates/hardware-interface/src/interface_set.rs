//! [`InterfaceSet`]: every registry exposed by one hardware backend.
//!
//! The set is a flat map from interface kind to registry. Controllers look
//! registries up by kind; the cycle owner uses the set to clear claims and to
//! check a batch of controllers for conflicting resource requests before
//! starting them.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::error::{HardwareInterfaceError, Result};
use crate::registry::{InterfaceKind, ResourceRegistry};

trait ErasedRegistry: Send + Sync {
    fn claims_resources(&self) -> bool;
    fn contains_resource(&self, name: &str) -> bool;
    fn claimed(&self) -> Vec<String>;
    fn clear_claims(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<K: InterfaceKind> ErasedRegistry for ResourceRegistry<K> {
    fn claims_resources(&self) -> bool {
        K::CLAIMS_RESOURCES
    }

    fn contains_resource(&self, name: &str) -> bool {
        self.contains(name)
    }

    fn claimed(&self) -> Vec<String> {
        self.claims().iter().cloned().collect()
    }

    fn clear_claims(&mut self) {
        ResourceRegistry::clear_claims(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Resources one controller wants through one interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceResources {
    pub interface: String,
    pub resources: BTreeSet<String>,
}

impl InterfaceResources {
    pub fn new<I, R>(interface: impl Into<String>, resources: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self {
            interface: interface.into(),
            resources: resources.into_iter().map(Into::into).collect(),
        }
    }
}

/// Everything one controller asks for before it is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerClaims {
    pub controller: String,
    pub interfaces: Vec<InterfaceResources>,
}

impl ControllerClaims {
    pub fn new(controller: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            interfaces: Vec::new(),
        }
    }

    pub fn with<I, R>(mut self, interface: impl Into<String>, resources: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.interfaces
            .push(InterfaceResources::new(interface, resources));
        self
    }
}

#[derive(Default)]
pub struct InterfaceSet {
    registries: HashMap<TypeId, Box<dyn ErasedRegistry>>,
    by_name: BTreeMap<&'static str, TypeId>,
}

impl InterfaceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the registry for kind `K`. Each kind is registered exactly once.
    pub fn register<K: InterfaceKind>(&mut self, registry: ResourceRegistry<K>) -> Result<()> {
        let id = TypeId::of::<K>();
        if self.registries.contains_key(&id) || self.by_name.contains_key(K::NAME) {
            return Err(HardwareInterfaceError::InterfaceAlreadyRegistered(
                K::NAME.to_string(),
            ));
        }
        debug!(
            interface = K::NAME,
            resources = registry.len(),
            "registered interface"
        );
        self.registries.insert(id, Box::new(registry));
        self.by_name.insert(K::NAME, id);
        Ok(())
    }

    pub fn get<K: InterfaceKind>(&self) -> Result<&ResourceRegistry<K>> {
        self.registries
            .get(&TypeId::of::<K>())
            .and_then(|r| r.as_any().downcast_ref::<ResourceRegistry<K>>())
            .ok_or_else(|| HardwareInterfaceError::InterfaceNotRegistered(K::NAME.to_string()))
    }

    pub fn get_mut<K: InterfaceKind>(&mut self) -> Result<&mut ResourceRegistry<K>> {
        self.registries
            .get_mut(&TypeId::of::<K>())
            .and_then(|r| r.as_any_mut().downcast_mut::<ResourceRegistry<K>>())
            .ok_or_else(|| HardwareInterfaceError::InterfaceNotRegistered(K::NAME.to_string()))
    }

    pub fn contains<K: InterfaceKind>(&self) -> bool {
        self.registries.contains_key(&TypeId::of::<K>())
    }

    /// Names of all registered kinds, sorted.
    pub fn kind_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.by_name.keys().copied()
    }

    /// Release every claim on every interface. Called by the cycle owner.
    pub fn clear_claims(&mut self) {
        for registry in self.registries.values_mut() {
            registry.clear_claims();
        }
    }

    /// Currently claimed `(interface, resource)` pairs.
    pub fn claimed_resources(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        for (name, id) in &self.by_name {
            if let Some(registry) = self.registries.get(id) {
                out.extend(registry.claimed().into_iter().map(|r| (*name, r)));
            }
        }
        out
    }

    /// Check that a batch of controllers can run together.
    ///
    /// A resource requested through claim-tracked interfaces by more than one
    /// controller is a conflict, whatever interfaces each of them uses. A
    /// single controller may reach one resource through several interfaces.
    ///
    /// # Errors
    ///
    /// [`HardwareInterfaceError::InterfaceNotRegistered`] or
    /// [`HardwareInterfaceError::NotFound`] for unknown requests,
    /// [`HardwareInterfaceError::ControllerConflict`] for the first conflict.
    pub fn check_for_conflict(&self, controllers: &[ControllerClaims]) -> Result<()> {
        let mut owners: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for claims in controllers {
            for request in &claims.interfaces {
                let registry = self.erased(&request.interface)?;
                for resource in &request.resources {
                    if !registry.contains_resource(resource) {
                        return Err(HardwareInterfaceError::NotFound {
                            interface: request.interface.clone(),
                            name: resource.clone(),
                        });
                    }
                    if registry.claims_resources() {
                        owners
                            .entry(resource.as_str())
                            .or_default()
                            .insert(claims.controller.as_str());
                    }
                }
            }
        }
        for (resource, users) in owners {
            if users.len() > 1 {
                let controllers = users.into_iter().collect::<Vec<_>>().join(", ");
                warn!(resource, controllers = %controllers, "resource conflict");
                return Err(HardwareInterfaceError::ControllerConflict {
                    resource: resource.to_string(),
                    controllers,
                });
            }
        }
        Ok(())
    }

    fn erased(&self, interface: &str) -> Result<&dyn ErasedRegistry> {
        self.by_name
            .get(interface)
            .and_then(|id| self.registries.get(id))
            .map(|r| r.as_ref())
            .ok_or_else(|| HardwareInterfaceError::InterfaceNotRegistered(interface.to_string()))
    }
}
