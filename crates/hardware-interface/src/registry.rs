//! [`ResourceRegistry`]: one name-keyed collection of handles per semantic
//! interface kind.
//!
//! Every hardware interface ("position command for joints", "actuator
//! state", ...) shares the same logic and differs only in its handle type,
//! its name and whether it tracks claims. Those three facts live on an
//! [`InterfaceKind`] marker; the registry itself is written once.

use core::fmt;
use core::marker::PhantomData;
use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::{HardwareInterfaceError, Result};
use crate::handle::Resource;

/// Compile-time description of one hardware interface kind.
pub trait InterfaceKind: Send + Sync + 'static {
    type Handle: Resource;
    /// Name used in diagnostics, e.g. `"EffortJointInterface"`.
    const NAME: &'static str;
    /// Whether handles taken from this interface are claimed for exclusive
    /// use within a control cycle.
    const CLAIMS_RESOURCES: bool;
}

/// Declare a hardware interface kind and its registry alias.
///
/// ```
/// use hardware_interface::{interface_kind, JointHandle};
///
/// interface_kind!(
///     /// Joint commands for a vendor-specific channel.
///     pub FooJoint => FooJointInterface, handle = JointHandle, claims = true
/// );
///
/// let iface = FooJointInterface::new();
/// assert_eq!(iface.kind_name(), "FooJointInterface");
/// ```
#[macro_export]
macro_rules! interface_kind {
    ($(#[$meta:meta])* $vis:vis $kind:ident => $alias:ident, handle = $handle:ty, claims = $claims:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        $vis struct $kind;

        impl $crate::InterfaceKind for $kind {
            type Handle = $handle;
            const NAME: &'static str = stringify!($alias);
            const CLAIMS_RESOURCES: bool = $claims;
        }

        $(#[$meta])*
        $vis type $alias = $crate::ResourceRegistry<$kind>;
    };
}

pub struct ResourceRegistry<K: InterfaceKind> {
    handles: BTreeMap<String, K::Handle>,
    claims: BTreeSet<String>,
    kind: PhantomData<K>,
}

impl<K: InterfaceKind> Default for ResourceRegistry<K> {
    fn default() -> Self {
        Self {
            handles: BTreeMap::new(),
            claims: BTreeSet::new(),
            kind: PhantomData,
        }
    }
}

impl<K: InterfaceKind> fmt::Debug for ResourceRegistry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(K::NAME)
            .field("names", &self.handles.keys().collect::<Vec<_>>())
            .field("claims", &self.claims)
            .finish()
    }
}

impl<K: InterfaceKind> ResourceRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind_name(&self) -> &'static str {
        K::NAME
    }

    pub fn claims_resources(&self) -> bool {
        K::CLAIMS_RESOURCES
    }

    /// Register a handle under its own name.
    ///
    /// # Errors
    ///
    /// [`HardwareInterfaceError::DuplicateResource`] when the name is taken;
    /// the registered handle is left untouched. Use
    /// [`replace_handle`](Self::replace_handle) to overwrite on purpose.
    pub fn register_handle(&mut self, handle: K::Handle) -> Result<()> {
        if self.handles.contains_key(handle.name()) {
            return Err(HardwareInterfaceError::DuplicateResource {
                interface: K::NAME.to_string(),
                name: handle.name().to_string(),
            });
        }
        debug!(interface = K::NAME, name = handle.name(), "registered handle");
        self.handles.insert(handle.name().to_string(), handle);
        Ok(())
    }

    /// Register a handle, returning any handle it displaced.
    pub fn replace_handle(&mut self, handle: K::Handle) -> Option<K::Handle> {
        debug!(interface = K::NAME, name = handle.name(), "replaced handle");
        self.handles.insert(handle.name().to_string(), handle)
    }

    pub fn handle(&self, name: &str) -> Result<K::Handle> {
        self.handles
            .get(name)
            .cloned()
            .ok_or_else(|| self.not_found(name))
    }

    /// Look up a handle and claim it for the current cycle.
    pub fn claim_handle(&mut self, name: &str) -> Result<K::Handle> {
        let handle = self.handle(name)?;
        self.claim(name)?;
        Ok(handle)
    }

    /// Mark `name` as in use for the current cycle.
    ///
    /// A no-op for kinds that do not track claims.
    ///
    /// # Errors
    ///
    /// [`HardwareInterfaceError::NotFound`] for unknown names and
    /// [`HardwareInterfaceError::ClaimConflict`] when already claimed.
    pub fn claim(&mut self, name: &str) -> Result<()> {
        if !self.handles.contains_key(name) {
            return Err(self.not_found(name));
        }
        if !K::CLAIMS_RESOURCES {
            return Ok(());
        }
        if !self.claims.insert(name.to_string()) {
            return Err(HardwareInterfaceError::ClaimConflict {
                interface: K::NAME.to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Drop a single claim; returns whether it was held.
    pub fn release(&mut self, name: &str) -> bool {
        self.claims.remove(name)
    }

    pub fn claims(&self) -> &BTreeSet<String> {
        &self.claims
    }

    pub fn clear_claims(&mut self) {
        self.claims.clear();
    }

    /// Registered names. Each call starts a fresh pass.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.handles.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handles.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    fn not_found(&self, name: &str) -> HardwareInterfaceError {
        HardwareInterfaceError::NotFound {
            interface: K::NAME.to_string(),
            name: name.to_string(),
        }
    }
}
