//! Eastward/northward variable pairs (wind, currents).

use crate::variable::{Shape, Variable};

/// CF attribute stamped on each component of a pair.
pub const STANDARD_NAME_ATTRIBUTE: &str = "standard_name";

/// Two variables of the same shape forming one vector quantity.
///
/// Construction stamps `standard_name = eastward_<group>` on `u` and
/// `standard_name = northward_<group>` on `v`.
#[derive(Debug, Clone)]
pub struct VectorVariable<S: Shape> {
    group_name: String,
    u: Variable<S>,
    v: Variable<S>,
}

impl<S: Shape> VectorVariable<S> {
    pub fn new(group_name: impl Into<String>, mut u: Variable<S>, mut v: Variable<S>) -> Self {
        let group_name = group_name.into();
        u.set_attribute(STANDARD_NAME_ATTRIBUTE, format!("eastward_{}", group_name));
        v.set_attribute(STANDARD_NAME_ATTRIBUTE, format!("northward_{}", group_name));
        Self { group_name, u, v }
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    pub fn u(&self) -> &Variable<S> {
        &self.u
    }

    pub fn v(&self) -> &Variable<S> {
        &self.v
    }

    pub fn u_mut(&mut self) -> &mut Variable<S> {
        &mut self.u
    }

    pub fn v_mut(&mut self) -> &mut Variable<S> {
        &mut self.v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::TimeVarying;

    #[test]
    fn test_standard_names_stamped() {
        let wind = VectorVariable::new(
            "wind",
            Variable::<TimeVarying>::new("wspeed_u", "ms-1"),
            Variable::<TimeVarying>::new("wspeed_v", "ms-1"),
        );

        assert_eq!(wind.group_name(), "wind");
        assert_eq!(
            wind.u().attributes().get("standard_name").map(String::as_str),
            Some("eastward_wind")
        );
        assert_eq!(
            wind.v().attributes().get("standard_name").map(String::as_str),
            Some("northward_wind")
        );
        assert_eq!(wind.u().attributes().get("units").map(String::as_str), Some("ms-1"));
    }

    #[test]
    fn test_stamp_replaces_caller_value() {
        let u = Variable::<TimeVarying>::new("u", "ms-1").with_attribute("standard_name", "x");
        let v = Variable::<TimeVarying>::new("v", "ms-1");
        let current = VectorVariable::new("sea_water_velocity", u, v);
        assert_eq!(
            current.u().attributes()["standard_name"],
            "eastward_sea_water_velocity"
        );
    }
}
