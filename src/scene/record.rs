//! Typed access to YAML component records
//!
//! Every component record is a mapping whose first key is `name`, the
//! registry discriminator. [`RecordWriter`] builds records in that shape and
//! [`Record`] reads fields back, turning anything missing or ill-typed into a
//! [`LoadError`] instead of a default.

use cgmath::{Quaternion, Vector3};
use serde_yaml::{Mapping, Value};

use crate::error::LoadError;

/// Read-only view over one component record
pub struct Record<'a> {
    component: &'a str,
    map: &'a Mapping,
}

impl<'a> Record<'a> {
    pub fn new(component: &'a str, map: &'a Mapping) -> Self {
        Self { component, map }
    }

    fn get(&self, field: &'static str) -> Result<&'a Value, LoadError> {
        self.map
            .get(field)
            .ok_or_else(|| LoadError::MissingField {
                component: self.component.to_string(),
                field,
            })
    }

    fn invalid(&self, field: &'static str, reason: impl Into<String>) -> LoadError {
        LoadError::InvalidField {
            component: self.component.to_string(),
            field,
            reason: reason.into(),
        }
    }

    pub fn f32(&self, field: &'static str) -> Result<f32, LoadError> {
        self.get(field)?
            .as_f64()
            .map(|v| v as f32)
            .ok_or_else(|| self.invalid(field, "expected a number"))
    }

    pub fn i64(&self, field: &'static str) -> Result<i64, LoadError> {
        self.get(field)?
            .as_i64()
            .ok_or_else(|| self.invalid(field, "expected an integer"))
    }

    pub fn bool(&self, field: &'static str) -> Result<bool, LoadError> {
        self.get(field)?
            .as_bool()
            .ok_or_else(|| self.invalid(field, "expected a boolean"))
    }

    fn floats<const N: usize>(&self, field: &'static str) -> Result<[f32; N], LoadError> {
        let sequence = self
            .get(field)?
            .as_sequence()
            .ok_or_else(|| self.invalid(field, format!("expected a sequence of {} numbers", N)))?;
        if sequence.len() != N {
            return Err(self.invalid(
                field,
                format!("expected {} numbers, found {}", N, sequence.len()),
            ));
        }

        let mut out = [0.0; N];
        for (slot, value) in out.iter_mut().zip(sequence) {
            *slot = value
                .as_f64()
                .ok_or_else(|| self.invalid(field, "sequence contains a non-number"))?
                as f32;
        }
        Ok(out)
    }

    pub fn vec3(&self, field: &'static str) -> Result<Vector3<f32>, LoadError> {
        self.floats::<3>(field).map(Vector3::from)
    }

    /// Reads `[x, y, z, w]`
    pub fn quat(&self, field: &'static str) -> Result<Quaternion<f32>, LoadError> {
        let [x, y, z, w] = self.floats::<4>(field)?;
        Ok(Quaternion::new(w, x, y, z))
    }

    /// An optional string field; absent is fine, present must be a string
    pub fn opt_str(&self, field: &'static str) -> Result<Option<&'a str>, LoadError> {
        match self.map.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| self.invalid(field, "expected a string")),
        }
    }
}

/// Builds a component record with `name` as its first key
pub struct RecordWriter {
    map: Mapping,
}

impl RecordWriter {
    pub fn new(component: &str) -> Self {
        let mut map = Mapping::new();
        map.insert("name".into(), component.into());
        Self { map }
    }

    pub fn f32(mut self, field: &str, value: f32) -> Self {
        self.map.insert(field.into(), number(value));
        self
    }

    pub fn i64(mut self, field: &str, value: i64) -> Self {
        self.map.insert(field.into(), value.into());
        self
    }

    pub fn bool(mut self, field: &str, value: bool) -> Self {
        self.map.insert(field.into(), value.into());
        self
    }

    pub fn vec3(self, field: &str, value: Vector3<f32>) -> Self {
        self.floats(field, &[value.x, value.y, value.z])
    }

    /// Writes `[x, y, z, w]`
    pub fn quat(self, field: &str, value: Quaternion<f32>) -> Self {
        self.floats(field, &[value.v.x, value.v.y, value.v.z, value.s])
    }

    /// Writes the string only when present
    pub fn opt_str(mut self, field: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.map.insert(field.into(), value.into());
        }
        self
    }

    fn floats(mut self, field: &str, values: &[f32]) -> Self {
        let sequence = values.iter().map(|v| number(*v)).collect();
        self.map.insert(field.into(), Value::Sequence(sequence));
        self
    }

    pub fn finish(self) -> Mapping {
        self.map
    }
}

/// Shortest decimal that reads back as the same `f32`
fn number(value: f32) -> Value {
    let short: f64 = value.to_string().parse().unwrap_or(value as f64);
    if short as f32 == value {
        Value::from(short)
    } else {
        Value::from(value as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_puts_name_first() {
        let map = RecordWriter::new("Light")
            .i64("type", 1)
            .vec3("color", Vector3::new(1.0, 0.5, 0.25))
            .finish();
        let keys: Vec<_> = map.keys().filter_map(|k| k.as_str()).collect();
        assert_eq!(keys, ["name", "type", "color"]);
    }

    #[test]
    fn test_reader_reports_missing_and_malformed() {
        let map: Mapping = serde_yaml::from_str("position: [1, 2]\nspeed: fast\n").unwrap();
        let record = Record::new("Spin", &map);

        assert!(matches!(
            record.vec3("axis"),
            Err(LoadError::MissingField { field: "axis", .. })
        ));
        assert!(matches!(
            record.vec3("position"),
            Err(LoadError::InvalidField { field: "position", .. })
        ));
        assert!(matches!(
            record.f32("speed"),
            Err(LoadError::InvalidField { field: "speed", .. })
        ));
    }

    #[test]
    fn test_floats_are_written_short() {
        let map = RecordWriter::new("Light").f32("quadAttenuation", 0.1).finish();
        let text = serde_yaml::to_string(&map).unwrap();
        assert!(text.contains("quadAttenuation: 0.1\n"), "{}", text);
        assert_eq!(Record::new("Light", &map).f32("quadAttenuation").unwrap(), 0.1);
    }

    #[test]
    fn test_reader_accepts_integers_as_floats() {
        let map: Mapping = serde_yaml::from_str("scale: [1, 2, 3]\nfov: 45\n").unwrap();
        let record = Record::new("Transform", &map);
        assert_eq!(record.vec3("scale").unwrap(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(record.f32("fov").unwrap(), 45.0);
        assert_eq!(record.opt_str("shader").unwrap(), None);
    }
}
