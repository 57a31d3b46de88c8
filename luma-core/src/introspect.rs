//! Runtime version and JIT introspection

use crate::error::{BridgeError, Result};
use mlua::{Function, Lua, Table};
use std::fmt;

/// Language version of the runtime, e.g. `5.1`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RuntimeVersion {
    pub major: u32,
    pub minor: u32,
}

impl RuntimeVersion {
    /// Parse a `_VERSION` string such as `"Lua 5.1"`
    pub fn parse(version: &str) -> Option<Self> {
        let number = version.strip_prefix("Lua ")?;
        let (major, minor) = number.trim().split_once('.')?;
        Some(RuntimeVersion {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// JIT compiler version, e.g. `2.1.0`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct JitVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl JitVersion {
    /// Decode `jit.version_num` (`major * 10000 + minor * 100 + patch`)
    pub fn from_version_num(num: u32) -> Self {
        JitVersion {
            major: num / 10000,
            minor: (num / 100) % 100,
            patch: num % 100,
        }
    }
}

impl fmt::Display for JitVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Read `_VERSION`; only meaningful before any script has run
pub(crate) fn runtime_version(lua: &Lua) -> Result<RuntimeVersion> {
    let version: String = lua.globals().get("_VERSION")?;
    RuntimeVersion::parse(&version).ok_or(BridgeError::UnrecognizedVersion(version))
}

/// Handles to the `jit` library functions, taken from a fresh runtime
///
/// Scripts may replace or remove the global `jit` table afterwards; the
/// captured functions and version stay those of the real library.
pub(crate) struct JitControl {
    version: JitVersion,
    on: Function,
    off: Function,
    status: Function,
}

impl JitControl {
    /// `None` when the runtime has no `jit` library
    pub(crate) fn capture(lua: &Lua) -> Result<Option<Self>> {
        let Some(jit) = lua.globals().get::<Option<Table>>("jit")? else {
            return Ok(None);
        };
        let num: u32 = jit.get("version_num")?;
        Ok(Some(JitControl {
            version: JitVersion::from_version_num(num),
            on: jit.get("on")?,
            off: jit.get("off")?,
            status: jit.get("status")?,
        }))
    }

    pub(crate) fn version(&self) -> JitVersion {
        self.version
    }

    pub(crate) fn set_enabled(&self, enabled: bool) -> mlua::Result<()> {
        if enabled {
            self.on.call::<()>(())
        } else {
            self.off.call::<()>(())
        }
    }

    /// First result of `jit.status()`
    pub(crate) fn is_enabled(&self) -> mlua::Result<bool> {
        self.status.call::<bool>(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_runtime_version() {
        assert_eq!(
            RuntimeVersion::parse("Lua 5.1"),
            Some(RuntimeVersion { major: 5, minor: 1 })
        );
        assert_eq!(RuntimeVersion::parse("Lua 5.4").unwrap().to_string(), "5.4");
        assert_eq!(RuntimeVersion::parse("Luau"), None);
        assert_eq!(RuntimeVersion::parse("Lua five"), None);
    }

    #[test]
    fn test_decode_jit_version_num() {
        let version = JitVersion::from_version_num(20100);
        assert_eq!(version, JitVersion { major: 2, minor: 1, patch: 0 });
        assert_eq!(JitVersion::from_version_num(20005).to_string(), "2.0.5");
    }

    #[test]
    fn test_versions_from_live_runtime() {
        let lua = Lua::new();
        let version = runtime_version(&lua).unwrap();
        assert_eq!(version.major, 5);

        let jit = JitControl::capture(&lua).unwrap().unwrap();
        assert_eq!(jit.version().major, 2);
    }

    #[test]
    fn test_jit_toggle() {
        let lua = Lua::new();
        let jit = JitControl::capture(&lua).unwrap().unwrap();
        jit.set_enabled(false).unwrap();
        assert!(!jit.is_enabled().unwrap());
        jit.set_enabled(true).unwrap();
        assert!(jit.is_enabled().unwrap());
    }

    #[test]
    fn test_captured_handles_outlive_global() {
        let lua = Lua::new();
        let jit = JitControl::capture(&lua).unwrap().unwrap();
        let version = jit.version();
        lua.load("jit = { version_num = 10101, off = function() error('replaced') end }")
            .exec()
            .unwrap();

        jit.set_enabled(false).unwrap();
        assert!(!jit.is_enabled().unwrap());
        assert_eq!(jit.version(), version);
        lua.load("assert(jit.version_num == 10101)").exec().unwrap();
    }

    #[test]
    fn test_missing_jit_library() {
        let lua = Lua::new();
        lua.globals().set("jit", mlua::Value::Nil).unwrap();
        assert!(JitControl::capture(&lua).unwrap().is_none());
    }

    #[test]
    fn test_unrecognized_version_string() {
        let lua = Lua::new();
        lua.globals().set("_VERSION", "Luau").unwrap();
        assert!(matches!(
            runtime_version(&lua),
            Err(BridgeError::UnrecognizedVersion(v)) if v == "Luau"
        ));
    }
}
