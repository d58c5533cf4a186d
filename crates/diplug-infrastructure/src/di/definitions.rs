//! Definition files
//!
//! A definition file is a TOML table whose keys are entry identifiers.
//! Quoted keys may contain dots (`"db.host" = "localhost"`). Each value is
//! one of:
//!
//! ```toml
//! answer = 42                                   # literal value
//! alias = { get = "answer" }                    # reference to another entry
//! greeting = { string = "Hello {user.name}" }   # interpolated string
//! home = { env = "HOME", default = "/tmp" }     # environment variable
//! mailer = { factory = "smtp", args = { host = { get = "smtp.host" } }, lazy = true }
//! ```
//!
//! A table is only read as one of the special forms when it carries the
//! form's marker key (`get`, `string`, `env` or `factory`); any other table
//! is a literal value.

use diplug_domain::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Entries of one definition source, by identifier
pub type DefinitionMap = BTreeMap<String, Definition>;

/// How a container entry is produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum Definition {
    /// A literal value
    Value(Value),
    /// The value of another entry
    Reference(String),
    /// A string with `{id}` placeholders
    Interpolated(String),
    /// A process environment variable
    Environment {
        /// Variable name
        variable: String,
        /// Value used when the variable is not set
        default: Option<Value>,
    },
    /// A service built by a registered factory
    Factory(FactoryDefinition),
}

impl Definition {
    /// Literal value
    pub fn value<V: Into<Value>>(value: V) -> Self {
        Self::Value(value.into())
    }

    /// Reference to `id`
    pub fn reference<S: Into<String>>(id: S) -> Self {
        Self::Reference(id.into())
    }

    /// Interpolated string
    pub fn string<S: Into<String>>(template: S) -> Self {
        Self::Interpolated(template.into())
    }

    /// Environment variable, with an optional default
    pub fn env<S: Into<String>>(variable: S, default: Option<Value>) -> Self {
        Self::Environment {
            variable: variable.into(),
            default,
        }
    }

    /// Service built by the factory registered under `name`
    pub fn factory<S: Into<String>>(name: S) -> FactoryDefinition {
        FactoryDefinition::new(name)
    }

    /// Whether the entry is a lazily built service
    pub fn is_lazy(&self) -> bool {
        matches!(self, Self::Factory(f) if f.lazy)
    }

    /// Read one entry of a definition file
    pub fn from_json(value: Value) -> std::result::Result<Self, String> {
        let Value::Object(map) = value else {
            return Ok(Self::Value(value));
        };

        if map.contains_key("get") {
            expect_keys(&map, "get", &["get"])?;
            return string_field(&map, "get").map(Self::Reference);
        }
        if map.contains_key("string") {
            expect_keys(&map, "string", &["string"])?;
            return string_field(&map, "string").map(Self::Interpolated);
        }
        if map.contains_key("env") {
            expect_keys(&map, "env", &["env", "default"])?;
            return Ok(Self::Environment {
                variable: string_field(&map, "env")?,
                default: map.get("default").cloned(),
            });
        }
        if map.contains_key("factory") {
            expect_keys(&map, "factory", &["factory", "args", "lazy"])?;
            return FactoryDefinition::from_json(&map).map(Self::Factory);
        }

        Ok(Self::Value(Value::Object(map)))
    }
}

impl From<FactoryDefinition> for Definition {
    fn from(definition: FactoryDefinition) -> Self {
        Self::Factory(definition)
    }
}

/// A service built by a registered factory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactoryDefinition {
    /// Name the factory is registered under
    pub factory: String,
    /// Arguments handed to the factory
    #[serde(default)]
    pub args: BTreeMap<String, Definition>,
    /// Build on first access instead of on first resolution
    #[serde(default)]
    pub lazy: bool,
}

impl FactoryDefinition {
    /// Definition calling `factory` with no arguments
    pub fn new<S: Into<String>>(factory: S) -> Self {
        Self {
            factory: factory.into(),
            args: BTreeMap::new(),
            lazy: false,
        }
    }

    /// Add an argument
    #[must_use]
    pub fn arg<S: Into<String>>(mut self, name: S, definition: Definition) -> Self {
        self.args.insert(name.into(), definition);
        self
    }

    /// Mark the service lazy
    #[must_use]
    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    fn from_json(map: &Map<String, Value>) -> std::result::Result<Self, String> {
        let factory = string_field(map, "factory")?;

        let lazy = match map.get("lazy") {
            None => false,
            Some(Value::Bool(lazy)) => *lazy,
            Some(_) => return Err("'lazy' must be a boolean".to_string()),
        };

        let mut args = BTreeMap::new();
        match map.get("args") {
            None => {}
            Some(Value::Object(raw)) => {
                for (name, value) in raw {
                    let definition = Definition::from_json(value.clone())
                        .map_err(|e| format!("argument '{name}': {e}"))?;
                    if matches!(definition, Definition::Factory(_)) {
                        return Err(format!(
                            "argument '{name}': factory arguments cannot declare services, \
                             declare the service as an entry and reference it with 'get'"
                        ));
                    }
                    args.insert(name.clone(), definition);
                }
            }
            Some(_) => return Err("'args' must be a table".to_string()),
        }

        Ok(Self {
            factory,
            args,
            lazy,
        })
    }
}

fn expect_keys(
    map: &Map<String, Value>,
    form: &str,
    allowed: &[&str],
) -> std::result::Result<(), String> {
    match map.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(extra) => Err(format!("unexpected key '{extra}' in a '{form}' entry")),
        None => Ok(()),
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> std::result::Result<String, String> {
    match map.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        _ => Err(format!("'{key}' must be a non-empty string")),
    }
}

/// Parse the content of a definition file
pub fn parse_definitions(path: &Path, content: &str) -> Result<DefinitionMap> {
    let source = path.display().to_string();
    let table: toml::Table = toml::from_str(content)
        .map_err(|e| Error::definition_with_source(source.clone(), "invalid TOML", e))?;

    let mut definitions = DefinitionMap::new();
    for (id, value) in table {
        let value = serde_json::to_value(value)
            .map_err(|e| Error::definition_with_source(source.clone(), format!("entry '{id}'"), e))?;
        let definition = Definition::from_json(value)
            .map_err(|msg| Error::definition(source.clone(), format!("entry '{id}': {msg}")))?;
        definitions.insert(id, definition);
    }
    Ok(definitions)
}
