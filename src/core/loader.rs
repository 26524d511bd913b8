use std::{
    borrow::Cow,
    collections::{HashMap, HashSet},
    convert::{TryFrom, TryInto},
};

/// Flat key/value section of a JSON configuration. Every getter records the key as
/// visited so leftovers can be reported with `check_unused_keys`.
pub struct InputParams {
    params: HashMap<String, InputParamsValue>,
    name: Cow<'static, str>,
    visited_names: HashSet<String>,
}

pub enum InputParamsValue {
    Int(i64),
    /// Integers above `i64::MAX`.
    UInt(u64),
    Float(f32),
    Bool(bool),
    String(String),
    Array(Vec<InputParamsValue>),
}

macro_rules! params_get {
    ( $( ( $name:ident, $type:ty, $hint:expr, $( $variant:ident => $conv:expr ),+ ) ),+ $(,)? ) => {
        $(
            paste::paste! {
                pub fn [<get_ $name>](&mut self, key: &str) -> anyhow::Result<$type> {
                    if let Some(value) = self.params.get(key) {
                        match value {
                            $(
                                InputParamsValue::$variant(value) => {
                                    self.visited_names.insert(key.to_owned());
                                    return Ok(($conv)(value));
                                }
                            )+
                            _ => anyhow::bail!("{} - '{}' should be {}", self.name, key, $hint),
                        }
                    }
                    anyhow::bail!("{} - there is no '{}' field", self.name, key);
                }

                /// Falls back only when the key is absent; a value of the wrong type is
                /// still an error.
                pub fn [<get_ $name _or>](&mut self, key: &str, fallback: $type) -> anyhow::Result<$type> {
                    if self.contains_key(key) {
                        self.[<get_ $name>](key)
                    } else {
                        Ok(fallback)
                    }
                }
            }
        )+
    };
}

impl InputParams {
    pub fn set_name(&mut self, name: Cow<'static, str>) {
        self.name = name;
    }

    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    params_get! {
        (int, i64, "integer", Int => |v: &i64| *v),
        (float, f32, "float", Float => |v: &f32| *v, Int => |v: &i64| *v as f32, UInt => |v: &u64| *v as f32),
        (bool, bool, "boolean", Bool => |v: &bool| *v),
        (str, String, "string", String => |v: &String| v.clone()),
    }

    /// Any non-negative JSON integer, up to `u64::MAX`.
    pub fn get_u64(&mut self, key: &str) -> anyhow::Result<u64> {
        let value = match self.params.get(key) {
            Some(InputParamsValue::Int(v)) => u64::try_from(*v).ok(),
            Some(InputParamsValue::UInt(v)) => Some(*v),
            Some(_) => None,
            None => anyhow::bail!("{} - there is no '{}' field", self.name, key),
        };
        match value {
            Some(value) => {
                self.visited_names.insert(key.to_owned());
                Ok(value)
            }
            None => anyhow::bail!("{} - '{}' should be non-negative integer", self.name, key),
        }
    }

    pub fn get_float3(&mut self, key: &str) -> anyhow::Result<[f32; 3]> {
        if let Some(value) = self.params.get(key) {
            if let InputParamsValue::Array(arr) = value {
                if arr.len() == 3 {
                    let mut result = [0.0; 3];
                    for (res, ele) in result.iter_mut().zip(arr) {
                        *res = match ele {
                            InputParamsValue::Float(v) => *v,
                            InputParamsValue::Int(v) => *v as f32,
                            InputParamsValue::UInt(v) => *v as f32,
                            _ => anyhow::bail!(
                                "{} - '{}' should be array with 3 floats",
                                self.name,
                                key
                            ),
                        };
                    }
                    self.visited_names.insert(key.to_owned());
                    return Ok(result);
                }
            }
            anyhow::bail!("{} - '{}' should be array with 3 floats", self.name, key);
        }
        anyhow::bail!("{} - there is no '{}' field", self.name, key);
    }

    pub fn get_float3_or(&mut self, key: &str, fallback: [f32; 3]) -> anyhow::Result<[f32; 3]> {
        if self.contains_key(key) {
            self.get_float3(key)
        } else {
            Ok(fallback)
        }
    }

    /// Returns the keys nobody asked for, warning about each. Keys starting with `#`
    /// are comments.
    pub fn check_unused_keys(&self) -> Vec<String> {
        let mut unused: Vec<String> = self
            .params
            .keys()
            .filter(|k| !k.starts_with('#') && !self.visited_names.contains(*k))
            .cloned()
            .collect();
        unused.sort();
        for k in &unused {
            log::warn!("{} - unused key '{}'", self.name, k);
        }
        unused
    }
}

impl TryFrom<&serde_json::Value> for InputParamsValue {
    type Error = anyhow::Error;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Null => {
                anyhow::bail!("can't convert to InputParamsValue from null json")
            }
            serde_json::Value::Bool(v) => Ok(Self::Bool(*v)),
            serde_json::Value::Number(v) => {
                if let Some(v) = v.as_i64() {
                    Ok(Self::Int(v))
                } else if let Some(v) = v.as_u64() {
                    Ok(Self::UInt(v))
                } else if let Some(v) = v.as_f64() {
                    Ok(Self::Float(v as f32))
                } else {
                    anyhow::bail!("can't convert number {} to InputParamsValue", v)
                }
            }
            serde_json::Value::String(v) => Ok(Self::String(v.clone())),
            serde_json::Value::Array(arr) => {
                let mut values = Vec::<InputParamsValue>::with_capacity(arr.len());
                for v in arr {
                    match v.try_into() {
                        Ok(v) => values.push(v),
                        Err(e) => anyhow::bail!("can't convert array element: {}", e),
                    }
                }
                Ok(Self::Array(values))
            }
            serde_json::Value::Object(_) => {
                anyhow::bail!("can't convert to InputParamsValue from object json")
            }
        }
    }
}

impl TryFrom<&serde_json::Value> for InputParams {
    type Error = anyhow::Error;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        if let serde_json::Value::Object(value) = value {
            let mut params = HashMap::<String, InputParamsValue>::with_capacity(value.len());
            for (k, v) in value {
                match v.try_into() {
                    Ok(v) => {
                        params.insert(k.clone(), v);
                    }
                    Err(e) => anyhow::bail!("can't convert member '{}': {}", k, e),
                }
            }
            Ok(Self {
                params,
                name: Cow::Borrowed(""),
                visited_names: HashSet::new(),
            })
        } else {
            anyhow::bail!("can't convert to InputParams from non-object json value");
        }
    }
}
