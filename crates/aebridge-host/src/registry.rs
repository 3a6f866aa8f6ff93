//! Host-side registry of objects handed out to the client

use std::collections::HashMap;

use crate::{
    error::{HostError, HostResult},
    scene::ObjRef,
};

/// The `$._pydobe` global: an arena of registered objects keyed by generated
/// id. Entries are never removed while the host runs.
#[derive(Debug, Default)]
pub struct HostRegistry {
    installed: bool,
    next_id: u64,
    entries: HashMap<String, ObjRef>,
}

impl HostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the global on first use; later calls keep the existing state
    pub fn install(&mut self) {
        self.installed = true;
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register `object` under a fresh id and return the id
    pub fn register(&mut self, object: ObjRef) -> HostResult<String> {
        if !self.installed {
            return Err(HostError::type_error(
                "undefined is not an object (evaluating '$._pydobe.generateId')",
            ));
        }
        self.next_id += 1;
        let id = format!("p{}", self.next_id);
        self.entries.insert(id.clone(), object);
        Ok(id)
    }

    pub fn lookup(&self, id: &str) -> HostResult<Option<ObjRef>> {
        if !self.installed {
            return Err(HostError::reference("$._pydobe is undefined"));
        }
        Ok(self.entries.get(id).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_fresh_per_registration() {
        let mut registry = HostRegistry::new();
        registry.install();
        let object = ObjRef(0);
        let first = registry.register(object).unwrap();
        let second = registry.register(object).unwrap();
        assert_eq!(first, "p1");
        assert_eq!(second, "p2");
        assert_eq!(registry.lookup("p2").unwrap(), Some(object));
        assert_eq!(registry.lookup("p9").unwrap(), None);
    }

    #[test]
    fn test_install_is_idempotent() {
        let mut registry = HostRegistry::new();
        registry.install();
        registry.register(ObjRef(3)).unwrap();
        registry.install();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.register(ObjRef(3)).unwrap(), "p2");
    }

    #[test]
    fn test_register_requires_prelude() {
        let mut registry = HostRegistry::new();
        assert!(matches!(registry.register(ObjRef(0)), Err(HostError::Type(_))));
    }
}
