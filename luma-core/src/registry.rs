//! Module group registry
//!
//! The engine module is populated by an explicit, ordered list of groups. Each
//! group may name the groups it must run after; the order is checked before
//! any group runs.

use crate::error::{BridgeError, Result};
use crate::module::Module;
use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;

/// Name of the built-in group that always runs first
pub const CORE_GROUP: &str = "core";

/// A unit of bindings added to the engine module
pub trait ModuleGroup<C>: 'static {
    /// Unique group name
    fn name(&self) -> &str;

    /// Groups that must already have populated the module
    fn requires(&self) -> &[&'static str] {
        &[]
    }

    fn populate(&self, module: &mut Module<'_>, context: &Arc<C>) -> mlua::Result<()>;
}

/// Group built from a closure
pub struct FnGroup<C, F> {
    name: String,
    requires: Vec<&'static str>,
    func: F,
    _context: PhantomData<fn(&Arc<C>)>,
}

impl<C, F> FnGroup<C, F>
where
    F: Fn(&mut Module<'_>, &Arc<C>) -> mlua::Result<()> + 'static,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        FnGroup {
            name: name.into(),
            requires: Vec::new(),
            func,
            _context: PhantomData,
        }
    }

    /// Declare an ordering dependency
    pub fn after(mut self, group: &'static str) -> Self {
        self.requires.push(group);
        self
    }
}

impl<C, F> ModuleGroup<C> for FnGroup<C, F>
where
    C: 'static,
    F: Fn(&mut Module<'_>, &Arc<C>) -> mlua::Result<()> + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn requires(&self) -> &[&'static str] {
        &self.requires
    }

    fn populate(&self, module: &mut Module<'_>, context: &Arc<C>) -> mlua::Result<()> {
        (self.func)(module, context)
    }
}

/// Ordered collection of module groups
pub struct ModuleRegistry<C: 'static> {
    groups: Vec<Box<dyn ModuleGroup<C>>>,
}

impl<C: 'static> Default for ModuleRegistry<C> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<C: 'static> std::fmt::Debug for ModuleRegistry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("groups", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

impl<C: 'static> ModuleRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a group
    pub fn register(&mut self, group: impl ModuleGroup<C>) {
        self.groups.push(Box::new(group));
    }

    /// Append a group (chained)
    pub fn with(mut self, group: impl ModuleGroup<C>) -> Self {
        self.register(group);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &dyn ModuleGroup<C>> {
        self.groups.iter().map(|g| g.as_ref())
    }

    /// Check names are unique and every dependency comes earlier
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::from([CORE_GROUP]);
        for group in &self.groups {
            for &dep in group.requires() {
                if !seen.contains(dep) {
                    return Err(BridgeError::GroupOrder {
                        group: group.name().to_string(),
                        missing: dep.to_string(),
                    });
                }
            }
            if !seen.insert(group.name()) {
                return Err(BridgeError::DuplicateGroup(group.name().to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut Module<'_>, _: &Arc<()>) -> mlua::Result<()> {
        Ok(())
    }

    #[test]
    fn test_registry_keeps_order() {
        let registry = ModuleRegistry::<()>::new()
            .with(FnGroup::new("math", noop))
            .with(FnGroup::new("physics", noop).after("math"));

        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["math", "physics"]);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("physics"));
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn test_dependency_must_come_first() {
        let registry = ModuleRegistry::<()>::new()
            .with(FnGroup::new("physics", noop).after("math"))
            .with(FnGroup::new("math", noop));

        match registry.validate() {
            Err(BridgeError::GroupOrder { group, missing }) => {
                assert_eq!(group, "physics");
                assert_eq!(missing, "math");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_core_is_always_available() {
        let registry = ModuleRegistry::<()>::new().with(FnGroup::new("assets", noop).after(CORE_GROUP));
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let registry = ModuleRegistry::<()>::new()
            .with(FnGroup::new("math", noop))
            .with(FnGroup::new("math", noop));
        assert!(matches!(
            registry.validate(),
            Err(BridgeError::DuplicateGroup(name)) if name == "math"
        ));

        let shadowing_core = ModuleRegistry::<()>::new().with(FnGroup::new(CORE_GROUP, noop));
        assert!(shadowing_core.validate().is_err());
    }

    struct Arena {
        name: String,
    }

    fn arena_registry<C: 'static>(group: impl ModuleGroup<C>) -> ModuleRegistry<C> {
        let mut registry = ModuleRegistry::default();
        registry.register(group);
        registry
    }

    #[test]
    fn test_registry_over_host_context() {
        let group = FnGroup::new("arena", |module: &mut Module<'_>, arena: &Arc<Arena>| {
            module.constant("arena_name", arena.name.as_str())
        });
        let registry = arena_registry(group);

        assert_eq!(format!("{:?}", registry), r#"ModuleRegistry { groups: ["arena"] }"#);
        assert_eq!(registry.iter().map(|g| g.name()).collect::<Vec<_>>(), vec!["arena"]);
        assert!(registry.iter().all(|g| g.requires().is_empty()));
        assert!(registry.validate().is_ok());
    }
}
