//! Record traversal.
//!
//! A configuration record describes its fields through [`Bind::visit`],
//! normally generated by `#[derive(Bind)]`. The visitor sees every bound leaf
//! field in declaration order, depth-first through nested records, together
//! with its raw binding declarations and a typed [`Slot`] for reading and
//! writing the value in place.
//!
//! [`walk`] narrows that stream down to one [`Source`]: fields without a
//! binding for the source are skipped, the rest are handed over with their
//! declaration already parsed.

use tracing::trace;

use crate::error::BindError;
use crate::tag::parse_tag;
use crate::value::{Kind, Value};

/// A configuration record whose fields can be bound.
pub trait Bind {
    /// Call `visitor` for every leaf field, recursing into nested records.
    fn visit(&mut self, visitor: &mut dyn Visitor) -> Result<(), BindError>;
}

/// Receives the leaf fields of a record.
pub trait Visitor {
    fn visit_field(&mut self, field: Field<'_>) -> Result<(), BindError>;
}

impl<F> Visitor for F
where
    F: FnMut(Field<'_>) -> Result<(), BindError>,
{
    fn visit_field(&mut self, field: Field<'_>) -> Result<(), BindError> {
        self(field)
    }
}

/// One leaf field as seen during traversal.
#[derive(Debug)]
pub struct Field<'a> {
    /// Rust field name, for diagnostics.
    pub name: &'static str,
    /// Command-line declaration, `name|usage`. Empty when unbound.
    pub cmd: &'static str,
    /// Environment key without prefix. Empty when unbound.
    pub env: &'static str,
    pub slot: Slot<'a>,
}

impl Field<'_> {
    /// Parse the declaration for `source`, or `None` if the field is unbound there.
    pub fn binding(&self, source: Source) -> Option<Binding> {
        let (names, usage) = match source {
            Source::Cmd => {
                let tag = parse_tag(self.cmd);
                (tag.names, tag.usage)
            }
            Source::Env => {
                let key = self.env.trim();
                if key.is_empty() {
                    (Vec::new(), String::new())
                } else {
                    (vec![key.to_string()], String::new())
                }
            }
        };

        if names.is_empty() {
            return None;
        }

        Some(Binding {
            source,
            field: self.name,
            names,
            usage,
        })
    }
}

/// Where a binding takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cmd,
    Env,
}

/// A parsed binding of one field to one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub source: Source,
    pub field: &'static str,
    /// Primary name first, then aliases.
    pub names: Vec<String>,
    pub usage: String,
}

impl Binding {
    /// The primary name, or `""` for a binding with no names.
    pub fn key(&self) -> &str {
        self.names.first().map_or("", String::as_str)
    }

    pub fn aliases(&self) -> &[String] {
        self.names.get(1..).unwrap_or_default()
    }
}

/// Typed mutable access to a leaf field.
#[derive(Debug)]
pub enum Slot<'a> {
    Str(&'a mut String),
    Int(&'a mut i32),
    Int64(&'a mut i64),
    Bool(&'a mut bool),
    Float(&'a mut f64),
    IntSeq(&'a mut Vec<i32>),
    /// A field of a type no converter handles. Binding it is a shape error.
    Unsupported(&'static str),
}

impl Slot<'_> {
    pub fn kind(&self) -> Option<Kind> {
        match self {
            Slot::Str(_) => Some(Kind::Str),
            Slot::Int(_) => Some(Kind::Int),
            Slot::Int64(_) => Some(Kind::Int64),
            Slot::Bool(_) => Some(Kind::Bool),
            Slot::Float(_) => Some(Kind::Float),
            Slot::IntSeq(_) => Some(Kind::IntSeq),
            Slot::Unsupported(_) => None,
        }
    }

    /// Like [`kind`](Self::kind), but an unsupported field is a shape error for `binding`.
    pub fn require_kind(&self, binding: &Binding) -> Result<Kind, BindError> {
        self.kind().ok_or_else(|| BindError::UnsupportedField {
            key: binding.key().to_string(),
            type_name: self.type_name(),
        })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Slot::Str(_) => "String",
            Slot::Int(_) => "i32",
            Slot::Int64(_) => "i64",
            Slot::Bool(_) => "bool",
            Slot::Float(_) => "f64",
            Slot::IntSeq(_) => "Vec<i32>",
            Slot::Unsupported(type_name) => *type_name,
        }
    }

    /// The current value of the field.
    pub fn get(&self) -> Option<Value> {
        match self {
            Slot::Str(v) => Some(Value::Str((**v).clone())),
            Slot::Int(v) => Some(Value::Int(**v)),
            Slot::Int64(v) => Some(Value::Int64(**v)),
            Slot::Bool(v) => Some(Value::Bool(**v)),
            Slot::Float(v) => Some(Value::Float(**v)),
            Slot::IntSeq(v) => Some(Value::IntSeq((**v).clone())),
            Slot::Unsupported(_) => None,
        }
    }

    /// Store `value` in the field. A value of another kind is handed back.
    pub fn set(&mut self, value: Value) -> Result<(), Value> {
        match (self, value) {
            (Slot::Str(v), Value::Str(new)) => **v = new,
            (Slot::Int(v), Value::Int(new)) => **v = new,
            (Slot::Int64(v), Value::Int64(new)) => **v = new,
            (Slot::Bool(v), Value::Bool(new)) => **v = new,
            (Slot::Float(v), Value::Float(new)) => **v = new,
            (Slot::IntSeq(v), Value::IntSeq(new)) => **v = new,
            (_, value) => return Err(value),
        }
        Ok(())
    }
}

impl<'a> From<&'a mut String> for Slot<'a> {
    fn from(v: &'a mut String) -> Self {
        Slot::Str(v)
    }
}

impl<'a> From<&'a mut i32> for Slot<'a> {
    fn from(v: &'a mut i32) -> Self {
        Slot::Int(v)
    }
}

impl<'a> From<&'a mut i64> for Slot<'a> {
    fn from(v: &'a mut i64) -> Self {
        Slot::Int64(v)
    }
}

impl<'a> From<&'a mut bool> for Slot<'a> {
    fn from(v: &'a mut bool) -> Self {
        Slot::Bool(v)
    }
}

impl<'a> From<&'a mut f64> for Slot<'a> {
    fn from(v: &'a mut f64) -> Self {
        Slot::Float(v)
    }
}

impl<'a> From<&'a mut Vec<i32>> for Slot<'a> {
    fn from(v: &'a mut Vec<i32>) -> Self {
        Slot::IntSeq(v)
    }
}

/// Visit every leaf of `record` bound to `source`, in declaration order.
///
/// Unbound fields are skipped. `f` receives the parsed binding and the slot.
pub fn walk<R, F>(record: &mut R, source: Source, mut f: F) -> Result<(), BindError>
where
    R: Bind + ?Sized,
    F: FnMut(Binding, Slot<'_>) -> Result<(), BindError>,
{
    let mut visitor = |field: Field<'_>| -> Result<(), BindError> {
        match field.binding(source) {
            Some(binding) => f(binding, field.slot),
            None => {
                trace!(field = field.name, ?source, "field has no binding, skipping");
                Ok(())
            }
        }
    };
    record.visit(&mut visitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{Hand, Record};

    fn keys(record: &mut impl Bind, source: Source) -> Vec<String> {
        let mut keys = Vec::new();
        walk(record, source, |binding, _| {
            keys.push(binding.key().to_string());
            Ok(())
        })
        .unwrap();
        keys
    }

    #[test]
    fn cmd_walk_is_declaration_order_depth_first() {
        let mut record = Record::default();
        assert_eq!(
            keys(&mut record, Source::Cmd),
            ["intval", "int64", "strval", "intslice", "float", "bool"]
        );
    }

    #[test]
    fn env_walk_sees_only_env_bindings() {
        let mut record = Record::default();
        assert_eq!(
            keys(&mut record, Source::Env),
            ["INTVAL", "INT64", "STRVAL", "INTSLICE", "FL64", "BOOL", "NAME"]
        );
    }

    #[test]
    fn walk_passes_parsed_usage() {
        let mut record = Record::default();
        let mut usages = Vec::new();
        walk(&mut record, Source::Cmd, |binding, _| {
            usages.push(binding.usage);
            Ok(())
        })
        .unwrap();
        assert_eq!(usages[0], "integer value");
        assert_eq!(usages[1], "integer 64 value");
        assert_eq!(usages[2], "");
    }

    #[test]
    fn walk_stops_on_first_error() {
        let mut record = Record::default();
        let mut seen = 0;
        let result = walk(&mut record, Source::Cmd, |binding, _| {
            seen += 1;
            if binding.key() == "strval" {
                return Err(BindError::DuplicateFlag("strval".into()));
            }
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(seen, 3);
    }

    #[test]
    fn hand_written_records_walk_the_same_way() {
        let mut record = Hand::default();
        assert_eq!(keys(&mut record, Source::Cmd), ["level"]);
        assert_eq!(keys(&mut record, Source::Env), ["LEVEL", "TAGS"]);
    }

    #[test]
    fn slot_set_writes_through() {
        let mut record = Record::default();
        walk(&mut record, Source::Cmd, |binding, mut slot| {
            if binding.key() == "intval" {
                slot.set(Value::Int(7)).unwrap();
            }
            Ok(())
        })
        .unwrap();
        assert_eq!(record.int_val, 7);
    }

    #[test]
    fn slot_set_rejects_other_kinds() {
        let mut target = 1i64;
        let mut slot = Slot::from(&mut target);
        assert_eq!(slot.set(Value::Bool(true)), Err(Value::Bool(true)));
        assert_eq!(target, 1);
    }

    #[test]
    fn unsupported_slot_is_a_shape_error() {
        let slot = Slot::Unsupported("u16");
        let binding = Binding {
            source: Source::Env,
            field: "port",
            names: vec!["PORT".into()],
            usage: String::new(),
        };
        let err = slot.require_kind(&binding).unwrap_err();
        assert!(matches!(err, BindError::UnsupportedField { type_name: "u16", .. }));
        assert_eq!(slot.get(), None);
    }

    #[test]
    fn blank_declarations_bind_nothing() {
        let field = Field {
            name: "x",
            cmd: " ",
            env: "",
            slot: Slot::Unsupported("u8"),
        };
        assert!(field.binding(Source::Cmd).is_none());
        assert!(field.binding(Source::Env).is_none());
    }

    #[test]
    fn hand_built_binding_without_names_has_empty_key() {
        let binding = Binding {
            source: Source::Cmd,
            field: "x",
            names: Vec::new(),
            usage: String::new(),
        };
        assert_eq!(binding.key(), "");
        assert!(binding.aliases().is_empty());

        let binding = Binding {
            names: vec!["config".into(), "c".into()],
            ..binding
        };
        assert_eq!(binding.key(), "config");
        assert_eq!(binding.aliases(), ["c".to_string()]);
    }
}
