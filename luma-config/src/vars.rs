//! Host variable store
//!
//! Named string settings the host owns and may persist between runs. The bridge
//! only ever reads from it.

use crate::ConfigError;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Address the remote script debugger listens on
pub const DEBUGGER_ADDR_VAR: &str = "script_debugger_addr";

/// Variable behaviour flags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VarFlags(u32);

impl VarFlags {
    pub const NONE: VarFlags = VarFlags(0);
    /// Persisted by `VarRegistry::save_archive`
    pub const ARCHIVE: VarFlags = VarFlags(1);
    /// Rejected by `VarRegistry::set`
    pub const READ_ONLY: VarFlags = VarFlags(1 << 1);

    pub const fn union(self, other: VarFlags) -> VarFlags {
        VarFlags(self.0 | other.0)
    }

    pub const fn contains(self, other: VarFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Declaration of a host variable
#[derive(Clone, Debug, PartialEq)]
pub struct VarDef {
    pub name: &'static str,
    pub default: &'static str,
    pub flags: VarFlags,
    pub description: &'static str,
}

impl VarDef {
    pub const fn new(
        name: &'static str,
        default: &'static str,
        flags: VarFlags,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            default,
            flags,
            description,
        }
    }

    /// The debugger address variable, archived with the host settings
    pub const fn debugger_addr() -> Self {
        Self::new(
            DEBUGGER_ADDR_VAR,
            "localhost",
            VarFlags::ARCHIVE,
            "Lua debugger address for remote debugging",
        )
    }
}

/// Read-only view of the host variable store
pub trait VarStore: Send + Sync {
    /// Current value of a variable, `None` if it is not declared
    fn get_string(&self, name: &str) -> Option<String>;
}

#[derive(Debug)]
struct VarSlot {
    def: VarDef,
    value: String,
}

/// In-process variable store
///
/// Variables must be registered before they can be set. Archived variables can
/// be written to and restored from a JSON object.
#[derive(Debug, Default)]
pub struct VarRegistry {
    slots: RwLock<BTreeMap<&'static str, VarSlot>>,
}

impl VarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the variables the bridge reads
    pub fn with_bridge_vars() -> Self {
        let registry = Self::new();
        registry.register(VarDef::debugger_addr());
        registry
    }

    /// Declare a variable; re-declaring keeps the current value
    pub fn register(&self, def: VarDef) {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        slots.entry(def.name).or_insert_with(|| VarSlot {
            value: def.default.to_string(),
            def,
        });
    }

    pub fn set(&self, name: &str, value: impl Into<String>) -> Result<(), ConfigError> {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        match slots.get_mut(name) {
            Some(slot) if !slot.def.flags.contains(VarFlags::READ_ONLY) => {
                slot.value = value.into();
                Ok(())
            }
            _ => Err(ConfigError::UnknownVar(name.to_string())),
        }
    }

    /// Reset a variable to its declared default
    pub fn reset(&self, name: &str) -> Result<(), ConfigError> {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        let slot = slots
            .get_mut(name)
            .ok_or_else(|| ConfigError::UnknownVar(name.to_string()))?;
        slot.value = slot.def.default.to_string();
        Ok(())
    }

    /// Serialize every archived variable as a JSON object
    pub fn save_archive(&self) -> String {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        let archived: BTreeMap<&str, &str> = slots
            .values()
            .filter(|slot| slot.def.flags.contains(VarFlags::ARCHIVE))
            .map(|slot| (slot.def.name, slot.value.as_str()))
            .collect();
        serde_json::to_string_pretty(&archived).unwrap_or_else(|_| "{}".to_string())
    }

    /// Restore archived variables; unknown or non-archived names are skipped
    ///
    /// Returns the number of variables restored.
    pub fn load_archive(&self, json: &str) -> Result<usize, ConfigError> {
        let values: BTreeMap<String, String> =
            serde_json::from_str(json).map_err(|e| ConfigError::Archive(e.to_string()))?;

        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        let mut restored = 0;
        for (name, value) in values {
            if let Some(slot) = slots.get_mut(name.as_str()) {
                if slot.def.flags.contains(VarFlags::ARCHIVE) {
                    slot.value = value;
                    restored += 1;
                }
            }
        }
        Ok(restored)
    }
}

impl VarStore for VarRegistry {
    fn get_string(&self, name: &str) -> Option<String> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots.get(name).map(|slot| slot.value.clone())
    }
}
