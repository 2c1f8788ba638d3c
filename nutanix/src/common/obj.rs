//! Building state objects from API models

use std::collections::HashMap;

use tfplug::types::{Dynamic, DynamicValue};

use crate::enums::ApiEnum;

/// Conversion of flattened values into state
pub trait IntoDynamic {
    fn into_dynamic(self) -> Dynamic;
}

impl IntoDynamic for Dynamic {
    fn into_dynamic(self) -> Dynamic {
        self
    }
}

impl IntoDynamic for String {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::String(self)
    }
}

impl IntoDynamic for &str {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::string(self)
    }
}

impl IntoDynamic for &String {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::String(self.clone())
    }
}

impl IntoDynamic for bool {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Bool(self)
    }
}

impl IntoDynamic for &bool {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Bool(*self)
    }
}

impl IntoDynamic for i64 {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Number(self as f64)
    }
}

impl IntoDynamic for &i64 {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Number(*self as f64)
    }
}

impl IntoDynamic for Obj {
    fn into_dynamic(self) -> Dynamic {
        self.build()
    }
}

impl<T: IntoDynamic> IntoDynamic for Option<T> {
    fn into_dynamic(self) -> Dynamic {
        self.map_or(Dynamic::Null, IntoDynamic::into_dynamic)
    }
}

impl<T: IntoDynamic> IntoDynamic for Vec<T> {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::List(self.into_iter().map(IntoDynamic::into_dynamic).collect())
    }
}

/// Map under construction
#[derive(Debug, Default, Clone)]
pub struct Obj(HashMap<String, Dynamic>);

impl Obj {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl IntoDynamic) -> Self {
        self.0.insert(key.to_string(), value.into_dynamic());
        self
    }

    /// Known values flatten to their wire name, reserved ones to `UNKNOWN`
    pub fn set_enum<E: ApiEnum>(self, key: &str, value: Option<&E>) -> Self {
        self.set(key, value.map(|e| e.flatten()))
    }

    pub fn set_enum_list<E: ApiEnum>(self, key: &str, values: Option<&Vec<E>>) -> Self {
        self.set(key, crate::enums::flatten_enum_list(values))
    }

    /// Strings list; absent becomes an empty list
    pub fn set_strings(self, key: &str, values: Option<&Vec<String>>) -> Self {
        self.set(key, values.cloned().unwrap_or_default())
    }

    pub fn build(self) -> Dynamic {
        Dynamic::Map(self.0)
    }

    pub fn into_state(self) -> DynamicValue {
        DynamicValue::new(self.build())
    }

    /// Writes every field into `state`, replacing what was there
    pub fn merge_into(self, state: &mut DynamicValue) {
        match &mut state.value {
            Dynamic::Map(target) => target.extend(self.0),
            other => *other = Dynamic::Map(self.0),
        }
    }
}

/// A max-one block: `[obj]` when present, `[]` otherwise
pub fn single<T>(value: Option<&T>, flatten: impl FnOnce(&T) -> Obj) -> Dynamic {
    Dynamic::List(value.map(flatten).map(Obj::build).into_iter().collect())
}

/// A repeated block; absent becomes an empty list
pub fn many<T>(values: Option<&Vec<T>>, flatten: impl Fn(&T) -> Obj) -> Dynamic {
    Dynamic::List(
        values
            .map(|list| list.iter().map(|v| flatten(v).build()).collect())
            .unwrap_or_default(),
    )
}

/// Copies attributes that the API never returns from `from` into `into`
pub fn carry(from: &DynamicValue, into: &mut DynamicValue, keys: &[&str]) {
    let (Some(source), Dynamic::Map(target)) = (from.value.as_map(), &mut into.value) else {
        return;
    };
    for key in keys {
        let value = match source.get(*key) {
            Some(v) if !v.is_unknown() => v.clone(),
            _ => Dynamic::Null,
        };
        target.insert(key.to_string(), value);
    }
}

/// Values still unknown after apply become null
pub fn unknowns_to_null(value: &mut Dynamic) {
    match value {
        Dynamic::Unknown => *value = Dynamic::Null,
        Dynamic::List(items) => items.iter_mut().for_each(unknowns_to_null),
        Dynamic::Map(map) => map.values_mut().for_each(unknowns_to_null),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::HypervisorType;
    use tfplug::types::AttributePath;

    #[test]
    fn options_become_null_and_blocks_lists() {
        let value = Obj::new()
            .set("name", Some("c1"))
            .set("count", None::<i64>)
            .set("flag", true)
            .set("nested", single(Some(&5i64), |n| Obj::new().set("n", n)))
            .set("empty", single(None::<&i64>, |n| Obj::new().set("n", n)))
            .into_state();

        assert_eq!(
            value.get_string(&AttributePath::new("name")).unwrap(),
            "c1"
        );
        assert!(value.get(&AttributePath::new("count")).unwrap().is_null());
        assert_eq!(
            value
                .get_number(&AttributePath::new("nested").index(0).attribute("n"))
                .unwrap(),
            5.0
        );
        assert_eq!(
            value.get_list(&AttributePath::new("empty")).unwrap().len(),
            0
        );
    }

    #[test]
    fn enums_flatten_reserved_values_to_unknown() {
        let value = Obj::new()
            .set_enum("known", Some(&HypervisorType::Ahv))
            .set_enum("reserved", Some(&HypervisorType::Redacted))
            .set_enum_list("list", Some(&vec![HypervisorType::Esx, HypervisorType::Unknown]))
            .into_state();

        assert_eq!(value.get_string(&AttributePath::new("known")).unwrap(), "AHV");
        assert_eq!(
            value.get_string(&AttributePath::new("reserved")).unwrap(),
            "UNKNOWN"
        );
        assert_eq!(
            value.get_list(&AttributePath::new("list")).unwrap(),
            vec![Dynamic::string("ESX"), Dynamic::string("UNKNOWN")]
        );
    }

    #[test]
    fn merge_overwrites_only_its_own_fields() {
        let mut state = Obj::new()
            .set("pc_ext_id", "pc-1")
            .set("tenant_id", Dynamic::Unknown)
            .into_state();
        Obj::new().set("tenant_id", "t-1").merge_into(&mut state);

        assert_eq!(state.get_string(&AttributePath::new("pc_ext_id")).unwrap(), "pc-1");
        assert_eq!(state.get_string(&AttributePath::new("tenant_id")).unwrap(), "t-1");
    }

    #[test]
    fn carry_copies_known_values_only() {
        let from = Obj::new()
            .set("dryrun", true)
            .set("expand", Dynamic::Unknown)
            .into_state();
        let mut into = Obj::new().set("name", "x").into_state();
        carry(&from, &mut into, &["dryrun", "expand"]);

        assert!(into.get_bool(&AttributePath::new("dryrun")).unwrap());
        assert!(into.get(&AttributePath::new("expand")).unwrap().is_null());
    }
}
