//! Core utility bindings: `log` and world unit conversion

use crate::module::Module;
use crate::registry::{ModuleGroup, CORE_GROUP};
use luma_config::UnitConfig;
use luma_log::{info, Logger};
use std::sync::Arc;

/// Bindings every engine module starts with
///
/// | binding | meaning |
/// |---|---|
/// | `log(msg)` | info line in the host log |
/// | `unit_to_centi(x)` / `centi_to_unit(x)` | world units and centimeters |
/// | `unit_to_meter(x)` / `meter_to_unit(x)` | world units and meters |
#[derive(Debug, Clone)]
pub struct CoreGroup {
    logger: Arc<Logger>,
    units_per_meter: f64,
}

impl CoreGroup {
    pub fn new(logger: Arc<Logger>, units: &UnitConfig) -> Self {
        CoreGroup {
            logger,
            units_per_meter: units.units_per_meter,
        }
    }
}

impl<C: 'static> ModuleGroup<C> for CoreGroup {
    fn name(&self) -> &str {
        CORE_GROUP
    }

    fn populate(&self, module: &mut Module<'_>, _context: &Arc<C>) -> mlua::Result<()> {
        let logger = Arc::clone(&self.logger);
        module.function("log", move |_, message: String| {
            info!(logger, "{}", message);
            Ok(())
        })?;

        let upm = self.units_per_meter;
        module.function("unit_to_centi", move |_, x: f64| Ok(x * 100.0 / upm))?;
        module.function("unit_to_meter", move |_, x: f64| Ok(x / upm))?;
        module.function("centi_to_unit", move |_, x: f64| Ok(x * upm / 100.0))?;
        module.function("meter_to_unit", move |_, x: f64| Ok(x * upm))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luma_log::{Level, LogRingBuffer};
    use mlua::Lua;

    fn install(lua: &Lua, group: &CoreGroup) {
        let logger = Logger::noop();
        let mut module = Module::new(lua, "luma", &logger).unwrap();
        ModuleGroup::<()>::populate(group, &mut module, &Arc::new(())).unwrap();
        lua.globals().set("luma", module.into_table()).unwrap();
    }

    #[test]
    fn test_unit_conversion_default_centimeters() {
        let lua = Lua::new();
        install(&lua, &CoreGroup::new(Logger::noop(), &UnitConfig::default()));

        let (centi, meter, back): (f64, f64, f64) = lua
            .load("return luma.unit_to_centi(250), luma.unit_to_meter(250), luma.meter_to_unit(2.5)")
            .eval()
            .unwrap();
        assert_eq!(centi, 250.0);
        assert_eq!(meter, 2.5);
        assert_eq!(back, 250.0);
    }

    #[test]
    fn test_unit_conversion_custom_scale() {
        let lua = Lua::new();
        let units = UnitConfig { units_per_meter: 1.0 };
        install(&lua, &CoreGroup::new(Logger::noop(), &units));

        let (centi, unit): (f64, f64) = lua
            .load("return luma.unit_to_centi(3), luma.centi_to_unit(50)")
            .eval()
            .unwrap();
        assert_eq!(centi, 300.0);
        assert_eq!(unit, 0.5);
    }

    #[test]
    fn test_log_goes_to_host_logger() {
        let lua = Lua::new();
        let ring = LogRingBuffer::new(8);
        let logger = Logger::new(Level::Trace).with_sink(ring.clone());
        install(&lua, &CoreGroup::new(logger, &UnitConfig::default()));

        lua.load("luma.log('hello from script')").exec().unwrap();
        let infos = ring.records_at(Level::Info);
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].message, "hello from script");
    }
}
