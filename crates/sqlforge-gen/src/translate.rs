//! Mapping from database types to target type names, and the registry of
//! target types the generated code depends on.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::{Catalog, Domain, EnumType};

/// A database type as reported for a prepared statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeInfo {
    /// `ENUM`, `ARRAY` or the type name.
    pub column_type: String,
    /// Name in `pg_type`.
    pub udt_name: String,
    /// Schema of the type.
    pub udt_schema: String,
    /// `USER-DEFINED` for enums, else the type name.
    pub arr_type: String,
}

impl TypeInfo {
    /// A scalar type known by name only.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            column_type: name.to_string(),
            udt_name: name.to_string(),
            udt_schema: "pg_catalog".to_string(),
            arr_type: name.to_string(),
        }
    }
}

/// How generated code uses a target type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeDef {
    /// The type is another name for this one.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub alias_of: String,
    /// Paths to import wherever the type is used.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    /// Types this one is built from.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    /// Expression producing a random value.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub random_expr: String,
    /// Expression comparing `AAA` with `BBB`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub compare_expr: String,
    /// Type used for NULL-able values.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub null_type: String,
    /// Random values are too narrow for round-trip tests.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub no_randomization_test: bool,
}

/// Target types registered while translating, plus translation warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeRegistry {
    /// Types by target name.
    pub types: BTreeMap<String, TypeDef>,
    /// Database types that fell back to a string.
    pub warnings: Vec<String>,
}

impl TypeRegistry {
    /// Registers `def` under `name` unless the name is taken.
    pub fn register(&mut self, name: &str, def: TypeDef) {
        self.types.entry(name.to_string()).or_insert(def);
    }

    fn warn(&mut self, message: String) {
        if !self.warnings.contains(&message) {
            warn!("{message}");
            self.warnings.push(message);
        }
    }
}

const BUILTINS: &[(&[&str], &str, &str)] = &[
    (&["bigint", "int8", "bigserial", "serial8"], "i64", ""),
    (&["integer", "int", "int4", "serial", "serial4"], "i32", ""),
    (&["smallint", "int2", "smallserial", "serial2"], "i16", ""),
    (&["oid"], "u32", ""),
    (&["double precision", "float8"], "f64", ""),
    (&["real", "float4"], "f32", ""),
    (&["boolean", "bool"], "bool", ""),
    (
        &[
            "text", "character varying", "varchar", "character", "bpchar", "char", "name",
            "citext", "bit", "bit varying", "varbit", "xml", "money",
        ],
        "String",
        "",
    ),
    (&["bytea"], "Vec<u8>", ""),
    (&["decimal", "numeric"], "Decimal", "rust_decimal::Decimal"),
    (&["json", "jsonb"], "serde_json::Value", ""),
    (&["uuid"], "Uuid", "uuid::Uuid"),
    (&["date"], "NaiveDate", "chrono::NaiveDate"),
    (&["time", "time without time zone"], "NaiveTime", "chrono::NaiveTime"),
    (
        &["timestamp", "timestamp without time zone"],
        "NaiveDateTime",
        "chrono::NaiveDateTime",
    ),
    (
        &["timestamptz", "timestamp with time zone"],
        "DateTime<Utc>",
        "chrono::{DateTime, Utc}",
    ),
    (&["timetz", "time with time zone"], "PgTimeTz", "sqlx::postgres::types::PgTimeTz"),
    (&["interval"], "PgInterval", "sqlx::postgres::types::PgInterval"),
    (&["inet", "cidr"], "IpNetwork", "ipnetwork::IpNetwork"),
    (&["macaddr", "macaddr8"], "MacAddress", "mac_address::MacAddress"),
    (&["hstore"], "PgHstore", "sqlx::postgres::types::PgHstore"),
    (&["point"], "PgPoint", "sqlx::postgres::types::PgPoint"),
    (&["line"], "PgLine", "sqlx::postgres::types::PgLine"),
    (&["lseg"], "PgLSeg", "sqlx::postgres::types::PgLSeg"),
    (&["box"], "PgBox", "sqlx::postgres::types::PgBox"),
    (&["path"], "PgPath", "sqlx::postgres::types::PgPath"),
    (&["polygon"], "PgPolygon", "sqlx::postgres::types::PgPolygon"),
    (&["circle"], "PgCircle", "sqlx::postgres::types::PgCircle"),
];

fn builtin(db_type: &str) -> Option<(&'static str, &'static str)> {
    BUILTINS
        .iter()
        .find(|(names, _, _)| names.contains(&db_type))
        .map(|(_, target, import)| (*target, *import))
}

/// Translates database types, registering the target types it hands out.
#[derive(Debug, Clone)]
pub struct Translator {
    registry: Arc<Mutex<TypeRegistry>>,
    enums: Vec<EnumType>,
    domains: Vec<Domain>,
    overrides: HashMap<String, String>,
    shared_schema: String,
}

impl Translator {
    /// Creates a translator for the enums and domains of `catalog`.
    #[must_use]
    pub fn new(catalog: &Catalog, shared_schema: &str) -> Self {
        Self {
            registry: Arc::new(Mutex::new(TypeRegistry::default())),
            enums: catalog.enums.clone(),
            domains: catalog.domains.clone(),
            overrides: HashMap::new(),
            shared_schema: shared_schema.to_string(),
        }
    }

    /// Registers user-defined target types ahead of any translation.
    #[must_use]
    pub fn with_types(self, types: BTreeMap<String, TypeDef>) -> Self {
        {
            let mut registry = self.lock();
            for (name, def) in types {
                registry.types.insert(name, def);
            }
        }
        self
    }

    /// Maps database type names straight to target types.
    #[must_use]
    pub fn with_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.overrides = overrides;
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TypeRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the registry as it is now.
    #[must_use]
    pub fn registry(&self) -> TypeRegistry {
        self.lock().clone()
    }

    /// The target type for `info`.
    #[must_use]
    pub fn translate(&self, info: &TypeInfo) -> String {
        if let Some(target) = self
            .overrides
            .get(&info.udt_name)
            .or_else(|| self.overrides.get(&info.column_type))
        {
            return target.clone();
        }

        match info.column_type.as_str() {
            "ENUM" => self.enum_type(&info.udt_schema, &info.udt_name),
            "ARRAY" => self.array_type(info),
            other => self.scalar_type(other, info),
        }
    }

    fn scalar_type(&self, db_type: &str, info: &TypeInfo) -> String {
        if let Some(target) = self.builtin_type(db_type) {
            return target;
        }

        if let Some(domain) = self.domains.iter().find(|d| d.name == info.udt_name) {
            if self.lock().types.contains_key(&domain.name) {
                return domain.name.clone();
            }
            let base = domain.base_type.clone();
            return self.translate(&TypeInfo::named(&base));
        }

        if self.lock().types.contains_key(&info.udt_name) {
            return info.udt_name.clone();
        }

        self.lock().warn(format!(
            "unknown type {}.{}, using String",
            info.udt_schema, info.udt_name
        ));
        "String".to_string()
    }

    fn builtin_type(&self, db_type: &str) -> Option<String> {
        let (target, import) = builtin(db_type)?;
        if !import.is_empty() {
            self.lock().register(
                target,
                TypeDef {
                    imports: vec![import.to_string()],
                    ..TypeDef::default()
                },
            );
        }
        Some(target.to_string())
    }

    fn enum_by_name(&self, schema: &str, name: &str) -> Option<&EnumType> {
        self.enums
            .iter()
            .find(|e| e.name == name && (e.schema == schema || schema.is_empty()))
    }

    fn enum_type(&self, schema: &str, name: &str) -> String {
        let Some(e) = self.enum_by_name(schema, name) else {
            self.lock()
                .warn(format!("unknown enum {schema}.{name}, using String"));
            return "String".to_string();
        };

        let target = if e.schema == self.shared_schema {
            pascal_case(&e.name)
        } else {
            pascal_case(&format!("{}_{}", e.schema, e.name))
        };
        let labels = e
            .labels
            .iter()
            .map(|l| format!("{target}::{}", pascal_case(l)))
            .collect::<Vec<_>>()
            .join(", ");
        self.lock().register(
            &target,
            TypeDef {
                random_expr: format!("*[{labels}].choose(rng)"),
                no_randomization_test: true,
                ..TypeDef::default()
            },
        );
        target
    }

    fn array_type(&self, info: &TypeInfo) -> String {
        let elem_name = info.udt_name.strip_prefix('_').unwrap_or(&info.udt_name);

        if let Some(e) = self.enum_by_name(&info.udt_schema, elem_name) {
            let (schema, name) = (e.schema.clone(), e.name.clone());
            let elem = self.enum_type(&schema, &name);
            let target = format!("Vec<{elem}>");
            self.lock().register(
                &target,
                TypeDef {
                    depends_on: vec![elem.clone()],
                    random_expr: random_vec(&elem),
                    no_randomization_test: true,
                    ..TypeDef::default()
                },
            );
            return target;
        }

        let elem = match builtin(elem_name) {
            Some(_) => self.builtin_type(elem_name).unwrap_or_default(),
            None => {
                self.lock().warn(format!(
                    "unknown array element {}.{elem_name}, using String",
                    info.udt_schema
                ));
                return "Vec<String>".to_string();
            }
        };
        let target = format!("Vec<{elem}>");

        let mut registry = self.lock();
        let Some(elem_def) = registry.types.get(&elem).cloned() else {
            return target;
        };
        let compare = match elem_def.compare_expr.as_str() {
            "" => "a == b".to_string(),
            expr => expr.replace("AAA", "a").replace("BBB", "b"),
        };
        registry.register(
            &target,
            TypeDef {
                depends_on: vec![elem.clone()],
                imports: elem_def.imports,
                random_expr: random_vec(&elem),
                compare_expr: format!(
                    "AAA.len() == BBB.len() && AAA.iter().zip(BBB.iter()).all(|(a, b)| {compare})"
                ),
                ..TypeDef::default()
            },
        );
        target
    }
}

fn random_vec(elem: &str) -> String {
    format!(
        "(0..rng.gen_range(1..5)).map(|_| random_{}(rng)).collect()",
        snake_case(elem)
    )
}

fn pascal_case(s: &str) -> String {
    s.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
            })
        })
        .collect()
}

fn snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}
