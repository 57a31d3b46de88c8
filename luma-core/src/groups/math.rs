//! Math bindings
//!
//! Flat layout like the rest of the engine module: helpers and constants sit
//! directly on the module, `Vec3` is a constructible userdata type.

use crate::module::Module;
use crate::registry::ModuleGroup;
use mlua::{MetaMethod, UserData, UserDataFields, UserDataMethods, UserDataRef};
use std::ops::{Add, Mul, Sub};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3 { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector; the zero vector stays zero
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len == 0.0 {
            self
        } else {
            self * (1.0 / len)
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl UserData for Vec3 {
    fn add_fields<F: UserDataFields<Self>>(fields: &mut F) {
        fields.add_field_method_get("x", |_, this| Ok(this.x));
        fields.add_field_method_get("y", |_, this| Ok(this.y));
        fields.add_field_method_get("z", |_, this| Ok(this.z));
    }

    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_function("new", |_, (x, y, z): (Option<f64>, Option<f64>, Option<f64>)| {
            Ok(Vec3::new(x.unwrap_or(0.0), y.unwrap_or(0.0), z.unwrap_or(0.0)))
        });

        methods.add_method("length", |_, this, ()| Ok(this.length()));
        methods.add_method("normalized", |_, this, ()| Ok(this.normalized()));
        methods.add_method("dot", |_, this, other: UserDataRef<Vec3>| Ok(this.dot(*other)));
        methods.add_method("cross", |_, this, other: UserDataRef<Vec3>| {
            Ok(this.cross(*other))
        });

        methods.add_meta_method(MetaMethod::Add, |_, this, other: UserDataRef<Vec3>| {
            Ok(*this + *other)
        });
        methods.add_meta_method(MetaMethod::Sub, |_, this, other: UserDataRef<Vec3>| {
            Ok(*this - *other)
        });
        methods.add_meta_method(MetaMethod::Mul, |_, this, scale: f64| Ok(*this * scale));
        methods.add_meta_method(MetaMethod::Eq, |_, this, other: UserDataRef<Vec3>| {
            Ok(*this == *other)
        });
        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| {
            Ok(format!("Vec3({}, {}, {})", this.x, this.y, this.z))
        });
    }
}

/// Math helpers and the `Vec3` type
#[derive(Debug, Clone, Copy, Default)]
pub struct MathGroup;

pub const MATH_GROUP: &str = "math";

impl<C: 'static> ModuleGroup<C> for MathGroup {
    fn name(&self) -> &str {
        MATH_GROUP
    }

    fn populate(&self, module: &mut Module<'_>, _context: &Arc<C>) -> mlua::Result<()> {
        module.constant("PI", std::f64::consts::PI)?;
        module.function("deg_to_rad", |_, deg: f64| Ok(deg.to_radians()))?;
        module.function("rad_to_deg", |_, rad: f64| Ok(rad.to_degrees()))?;
        module.function("clamp", |_, (x, lo, hi): (f64, f64, f64)| {
            if lo > hi {
                return Err(mlua::Error::runtime(format!(
                    "clamp: lower bound {lo} is greater than upper bound {hi}"
                )));
            }
            Ok(x.clamp(lo, hi))
        })?;
        module.function("lerp", |_, (a, b, t): (f64, f64, f64)| Ok(a + (b - a) * t))?;
        module.userdata_type::<Vec3>("Vec3")
    }
}
