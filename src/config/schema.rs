//! Configuration descriptors
//!
//! A configuration struct describes its fields once, up front, through a
//! [`Schema`]. Each registration names the field, documents it and hands over
//! a plain accessor function, so every supported kind is checked by the
//! compiler and no runtime reflection is involved.

use super::error::{ConfigError, Result};
use super::naming::{env_var_name, flag_name};
use crate::app::AppName;
use std::fmt;
use strum_macros::{Display, EnumString};

/// Flag names owned by the resolver itself
pub(crate) const RESERVED_FLAGS: &[&str] = &["config", "help"];

/// A struct whose fields can be resolved from file, environment and flags
///
/// Usually derived:
///
/// ```
/// use runkit::Configurable;
///
/// #[derive(Default, Configurable)]
/// struct Config {
///     #[config(description = "Print more output")]
///     verbose: bool,
/// }
/// ```
///
/// or written by hand:
///
/// ```
/// use runkit::config::{Configurable, Schema};
///
/// #[derive(Default)]
/// struct Config {
///     workers: i64,
/// }
///
/// impl Configurable for Config {
///     fn describe(schema: &mut Schema<Self>) {
///         schema.int("Workers", "Number of worker tasks", |c| &mut c.workers);
///     }
/// }
/// ```
pub trait Configurable: Sized + Send + 'static {
    /// Register every configurable field
    fn describe(schema: &mut Schema<Self>);
}

impl Configurable for () {
    fn describe(_schema: &mut Schema<Self>) {}
}

/// Supported field kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum FieldKind {
    Bool,
    Int,
    String,
    StringList,
}

/// A type-matched field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    String(String),
    StringList(Vec<String>),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::Int(_) => FieldKind::Int,
            FieldValue::String(_) => FieldKind::String,
            FieldValue::StringList(_) => FieldKind::StringList,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(v) => write!(f, "{v}"),
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::String(v) => f.write_str(v),
            FieldValue::StringList(v) => f.write_str(&v.join(",")),
        }
    }
}

/// Everything the resolver knows about one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Declared field identifier
    pub name: String,
    pub kind: FieldKind,
    pub description: String,
    pub flag_name: String,
    pub env_name: String,
    /// Value held by the struct when the descriptor was taken
    pub default_value: FieldValue,
}

/// Accessor into one field of `T`
pub(crate) enum Binding<T> {
    Bool(fn(&mut T) -> &mut bool),
    Int(fn(&mut T) -> &mut i64),
    String(fn(&mut T) -> &mut String),
    StringList(fn(&mut T) -> &mut Vec<String>),
}

impl<T> Binding<T> {
    pub(crate) fn kind(&self) -> FieldKind {
        match self {
            Binding::Bool(_) => FieldKind::Bool,
            Binding::Int(_) => FieldKind::Int,
            Binding::String(_) => FieldKind::String,
            Binding::StringList(_) => FieldKind::StringList,
        }
    }

    pub(crate) fn get(&self, target: &mut T) -> FieldValue {
        match self {
            Binding::Bool(access) => FieldValue::Bool(*access(target)),
            Binding::Int(access) => FieldValue::Int(*access(target)),
            Binding::String(access) => FieldValue::String(access(target).clone()),
            Binding::StringList(access) => FieldValue::StringList(access(target).clone()),
        }
    }

    /// Store `value`; returns `false` when its kind does not match the field
    pub(crate) fn set(&self, target: &mut T, value: FieldValue) -> bool {
        match (self, value) {
            (Binding::Bool(access), FieldValue::Bool(v)) => *access(target) = v,
            (Binding::Int(access), FieldValue::Int(v)) => *access(target) = v,
            (Binding::String(access), FieldValue::String(v)) => *access(target) = v,
            (Binding::StringList(access), FieldValue::StringList(v)) => *access(target) = v,
            _ => return false,
        }
        true
    }
}

/// One registered field
pub(crate) struct Field<T> {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) flag_name: String,
    pub(crate) binding: Binding<T>,
}

/// Descriptor table of a [`Configurable`] struct
///
/// Fields keep their registration order, which is also the order of the
/// flags in the help text.
pub struct Schema<T> {
    fields: Vec<Field<T>>,
}

impl<T: Configurable> Schema<T> {
    /// Collect the descriptor table of `T`
    pub fn of() -> Self {
        let mut schema = Self { fields: Vec::new() };
        T::describe(&mut schema);
        schema
    }
}

impl<T> Schema<T> {
    /// Register a boolean field
    pub fn bool(
        &mut self,
        name: &str,
        description: &str,
        access: fn(&mut T) -> &mut bool,
    ) -> &mut Self {
        self.push(name, description, Binding::Bool(access))
    }

    /// Register a signed integer field
    pub fn int(&mut self, name: &str, description: &str, access: fn(&mut T) -> &mut i64) -> &mut Self {
        self.push(name, description, Binding::Int(access))
    }

    /// Register a string field
    pub fn string(
        &mut self,
        name: &str,
        description: &str,
        access: fn(&mut T) -> &mut String,
    ) -> &mut Self {
        self.push(name, description, Binding::String(access))
    }

    /// Register a list-of-strings field
    pub fn string_list(
        &mut self,
        name: &str,
        description: &str,
        access: fn(&mut T) -> &mut Vec<String>,
    ) -> &mut Self {
        self.push(name, description, Binding::StringList(access))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check every field can be exposed as a flag
    ///
    /// Flag uniqueness across several structs is checked by the resolver.
    pub fn validate(&self) -> Result<()> {
        for field in &self.fields {
            validate_field(field)?;
        }
        Ok(())
    }

    /// Descriptors of all fields, with defaults read from `target`
    pub fn descriptors(&self, app: &AppName, target: &mut T) -> Result<Vec<FieldDescriptor>> {
        self.validate()?;
        Ok(self
            .fields
            .iter()
            .map(|field| FieldDescriptor {
                name: field.name.clone(),
                kind: field.binding.kind(),
                description: field.description.clone(),
                flag_name: field.flag_name.clone(),
                env_name: env_var_name(app, &field.flag_name),
                default_value: field.binding.get(target),
            })
            .collect())
    }

    pub(crate) fn fields(&self) -> &[Field<T>] {
        &self.fields
    }

    fn push(&mut self, name: &str, description: &str, binding: Binding<T>) -> &mut Self {
        self.fields.push(Field {
            name: name.to_owned(),
            description: description.trim().to_owned(),
            flag_name: flag_name(name),
            binding,
        });
        self
    }
}

fn validate_field<T>(field: &Field<T>) -> Result<()> {
    let is_identifier = field
        .name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && field.name.chars().all(|c| c.is_alphanumeric() || c == '_');
    if !is_identifier {
        return Err(ConfigError::unsupported(
            &field.name,
            "name is not a valid identifier",
        ));
    }

    if field.flag_name.is_empty() {
        return Err(ConfigError::unsupported(&field.name, "name yields an empty flag"));
    }

    if RESERVED_FLAGS.contains(&field.flag_name.as_str()) {
        return Err(ConfigError::unsupported(
            &field.name,
            format!("flag --{} is reserved", field.flag_name),
        ));
    }

    if field.description.is_empty() {
        return Err(ConfigError::MissingDescription {
            field: field.name.clone(),
        });
    }

    Ok(())
}
