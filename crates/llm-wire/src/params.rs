//! Parameter schemas, resolution, and agent validation.
//!
//! Each provider family carries a declarative table of tunable
//! parameters: internal name, wire name, numeric range, and optional
//! default. Model-specific behavior is layered on top as an ordered
//! list of override rules keyed by a pattern match against the model
//! identifier, so whole families ("gpt-5*", "o3*") can be targeted
//! without enumerating every model string. Overrides are pure
//! transformations applied to an immutable base schema, which keeps
//! their ordering independently testable.
//!
//! Three operations consume the tables:
//!
//! - [`get_schema`] resolves the effective schema for a `(family,
//!   model)` pair. Unknown models degrade to the base schema; this
//!   function never fails.
//! - [`resolve_params`] turns a caller-supplied [`ModelSpec`] into the
//!   wire-ready parameter map: caller values clamped into range,
//!   defaults filled in, everything else omitted. Also infallible.
//! - [`validate_agent`] reports configuration problems as structured
//!   errors and warnings for display. Nothing is thrown and nothing is
//!   acted on automatically.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::provider::ProviderKind;

// ── Schema model ───────────────────────────────────────────────────

/// One tunable parameter of a provider family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// The internal name callers use in their configuration.
    pub name: String,
    /// The key emitted on the wire. Often equal to `name`, but some
    /// families rename (for example camelCase generation options).
    pub wire_name: String,
    /// Value used when the caller supplies none. `None` means the
    /// parameter is omitted entirely rather than sent as null.
    pub default: Option<Value>,
    /// Lower bound for numeric values.
    pub min: Option<f64>,
    /// Upper bound for numeric values.
    pub max: Option<f64>,
}

impl ParamSpec {
    /// Creates a spec whose wire name equals its internal name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            wire_name: name.clone(),
            name,
            default: None,
            min: None,
            max: None,
        }
    }

    /// Sets the wire name.
    #[must_use]
    pub fn wire(mut self, wire_name: impl Into<String>) -> Self {
        self.wire_name = wire_name.into();
        self
    }

    /// Sets the numeric range.
    #[must_use]
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Sets the default value.
    ///
    /// Numeric defaults must lie within the range configured so far.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        if let Some(n) = value.as_f64() {
            debug_assert!(
                self.min.is_none_or(|min| min <= n) && self.max.is_none_or(|max| n <= max),
                "default {n} outside [{:?}, {:?}] for '{}'",
                self.min,
                self.max,
                self.name
            );
        }
        self.default = Some(value);
        self
    }
}

/// A validation constraint over a set of parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusiveGroup {
    /// Internal names of the constrained parameters.
    pub members: Vec<String>,
    /// Violated when more than one member is set.
    pub at_most_one: bool,
    /// Violated when zero members are set.
    pub require_one: bool,
}

impl ExclusiveGroup {
    /// A group allowing at most one of its members to be set.
    pub fn at_most_one<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
            at_most_one: true,
            require_one: false,
        }
    }

    /// A group requiring exactly one of its members to be set.
    pub fn require_one<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
            at_most_one: true,
            require_one: true,
        }
    }
}

/// The effective parameter schema for one `(family, model)` pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// Parameters keyed by internal name.
    pub params: BTreeMap<String, ParamSpec>,
    /// Group constraints, checked by [`validate_agent`].
    pub exclusive_groups: Vec<ExclusiveGroup>,
}

// ── Override rules ─────────────────────────────────────────────────

/// How an override rule matches a model identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelPattern {
    /// The identifier equals this string.
    Exact(String),
    /// The identifier starts with this string.
    Prefix(String),
    /// The identifier contains this string.
    Contains(String),
}

impl ModelPattern {
    /// Exact-match pattern.
    pub fn exact(s: impl Into<String>) -> Self {
        Self::Exact(s.into())
    }

    /// Starts-with pattern.
    pub fn prefix(s: impl Into<String>) -> Self {
        Self::Prefix(s.into())
    }

    /// Contains pattern.
    pub fn contains(s: impl Into<String>) -> Self {
        Self::Contains(s.into())
    }

    /// Tests the pattern against a model identifier.
    pub fn matches(&self, model: &str) -> bool {
        match self {
            Self::Exact(s) => model == s,
            Self::Prefix(s) => model.starts_with(s.as_str()),
            Self::Contains(s) => model.contains(s.as_str()),
        }
    }
}

/// A single schema transformation.
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideOp {
    /// Deletes a parameter by internal name.
    RemoveParam(String),
    /// Adds a parameter, replacing any existing spec of the same name.
    AddParam(ParamSpec),
    /// Changes the wire name of an existing parameter.
    RenameWire {
        /// Internal name of the parameter to rename.
        param: String,
        /// The new wire name.
        wire_name: String,
    },
    /// Appends a group constraint.
    AddGroup(ExclusiveGroup),
}

/// An ordered set of transformations applied when `pattern` matches.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaOverride {
    /// When this rule applies.
    pub pattern: ModelPattern,
    /// What it changes, applied in order.
    pub ops: Vec<OverrideOp>,
}

impl SchemaOverride {
    /// Applies every operation to `schema`, in order.
    pub fn apply(&self, schema: &mut Schema) {
        for op in &self.ops {
            match op {
                OverrideOp::RemoveParam(name) => {
                    schema.params.remove(name);
                }
                OverrideOp::AddParam(spec) => {
                    schema.params.insert(spec.name.clone(), spec.clone());
                }
                OverrideOp::RenameWire { param, wire_name } => {
                    if let Some(spec) = schema.params.get_mut(param) {
                        spec.wire_name = wire_name.clone();
                    }
                }
                OverrideOp::AddGroup(group) => {
                    schema.exclusive_groups.push(group.clone());
                }
            }
        }
    }
}

// ── Base tables ────────────────────────────────────────────────────

fn params_map(specs: impl IntoIterator<Item = ParamSpec>) -> BTreeMap<String, ParamSpec> {
    specs
        .into_iter()
        .map(|spec| (spec.name.clone(), spec))
        .collect()
}

static OPENAI_SCHEMA: LazyLock<Schema> = LazyLock::new(|| Schema {
    params: params_map([
        ParamSpec::new("temperature").range(0.0, 2.0),
        ParamSpec::new("top_p").range(0.0, 1.0),
        ParamSpec::new("max_tokens").range(1.0, 128_000.0),
        ParamSpec::new("presence_penalty").range(-2.0, 2.0),
        ParamSpec::new("frequency_penalty").range(-2.0, 2.0),
    ]),
    exclusive_groups: Vec::new(),
});

static OPENAI_OVERRIDES: LazyLock<Vec<SchemaOverride>> = LazyLock::new(|| {
    let mut rules = vec![SchemaOverride {
        pattern: ModelPattern::prefix("gpt-4.1"),
        ops: vec![OverrideOp::RenameWire {
            param: "max_tokens".into(),
            wire_name: "max_completion_tokens".into(),
        }],
    }];
    // Reasoning models reject sampling and length controls outright;
    // effort replaces them.
    for family in ["gpt-5", "o1", "o3", "o4"] {
        rules.push(SchemaOverride {
            pattern: ModelPattern::prefix(family),
            ops: vec![
                OverrideOp::RemoveParam("temperature".into()),
                OverrideOp::RemoveParam("top_p".into()),
                OverrideOp::RemoveParam("max_tokens".into()),
                OverrideOp::AddParam(
                    ParamSpec::new("reasoning_effort").default_value("medium"),
                ),
            ],
        });
    }
    rules
});

static ANTHROPIC_SCHEMA: LazyLock<Schema> = LazyLock::new(|| Schema {
    params: params_map([
        ParamSpec::new("temperature").range(0.0, 1.0),
        ParamSpec::new("top_p").range(0.0, 1.0),
        ParamSpec::new("top_k").range(0.0, 500.0),
        // The Messages API requires max_tokens, so the default keeps it
        // on the wire even when the caller tunes nothing.
        ParamSpec::new("max_tokens")
            .range(1.0, 64_000.0)
            .default_value(4096),
    ]),
    exclusive_groups: vec![ExclusiveGroup::at_most_one(["temperature", "top_p"])],
});

static ANTHROPIC_OVERRIDES: LazyLock<Vec<SchemaOverride>> = LazyLock::new(Vec::new);

static GEMINI_SCHEMA: LazyLock<Schema> = LazyLock::new(|| Schema {
    params: params_map([
        ParamSpec::new("temperature").range(0.0, 2.0),
        ParamSpec::new("top_p").wire("topP").range(0.0, 1.0),
        ParamSpec::new("top_k").wire("topK").range(1.0, 40.0),
        ParamSpec::new("max_output_tokens")
            .wire("maxOutputTokens")
            .range(1.0, 65_536.0),
    ]),
    exclusive_groups: Vec::new(),
});

static GEMINI_OVERRIDES: LazyLock<Vec<SchemaOverride>> = LazyLock::new(Vec::new);

/// The base schema of a provider family, before model overrides.
pub fn base_schema(kind: ProviderKind) -> &'static Schema {
    match kind {
        ProviderKind::OpenAi => &OPENAI_SCHEMA,
        ProviderKind::Anthropic => &ANTHROPIC_SCHEMA,
        ProviderKind::Gemini => &GEMINI_SCHEMA,
    }
}

/// The override rules of a provider family, in declaration order.
pub fn overrides(kind: ProviderKind) -> &'static [SchemaOverride] {
    match kind {
        ProviderKind::OpenAi => &OPENAI_OVERRIDES,
        ProviderKind::Anthropic => &ANTHROPIC_OVERRIDES,
        ProviderKind::Gemini => &GEMINI_OVERRIDES,
    }
}

/// Resolves the effective schema for a model: base schema plus every
/// matching override, applied in declaration order. Later rules may
/// delete or replace what earlier rules set. Never fails; a model no
/// rule matches simply gets the base schema.
pub fn get_schema(kind: ProviderKind, model: &str) -> Schema {
    let mut schema = base_schema(kind).clone();
    for rule in overrides(kind) {
        if rule.pattern.matches(model) {
            rule.apply(&mut schema);
        }
    }
    schema
}

// ── Model configuration ────────────────────────────────────────────

/// A model reference from the caller's configuration.
///
/// Either a bare model name (the provider receives only structural
/// defaults) or a table with per-parameter overrides:
///
/// ```json
/// "model": "gpt-4o"
/// "model": { "name": "gpt-4o", "temperature": 0.7 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelSpec {
    /// A bare model name with no parameter overrides.
    Name(String),
    /// A model name plus tuned parameters.
    Configured(ModelConfig),
}

impl ModelSpec {
    /// The model identifier, regardless of form.
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Configured(config) => &config.name,
        }
    }
}

/// A model name plus caller-tuned parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// The model identifier.
    pub name: String,
    /// Parameter overrides keyed by internal name.
    #[serde(flatten)]
    pub params: BTreeMap<String, Value>,
}

/// A named model configuration as the host application declares it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Which provider family serves this agent.
    pub provider: Option<String>,
    /// The model reference.
    pub model: ModelSpec,
}

/// The outcome of [`validate_agent`]: human-readable messages, never
/// acted on automatically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    /// Problems that make the agent unusable.
    pub errors: Vec<String>,
    /// Problems worth telling the caller about.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Returns `true` when there are no errors (warnings are allowed).
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

// ── Resolution ─────────────────────────────────────────────────────

/// Clamps a numeric value into `[min, max]`, preserving integer-ness
/// where the clamped result is whole. Non-numeric values pass through.
fn clamp_value(value: &Value, min: Option<f64>, max: Option<f64>) -> Value {
    let Some(n) = value.as_f64() else {
        return value.clone();
    };
    let mut clamped = n;
    if let Some(min) = min {
        clamped = clamped.max(min);
    }
    if let Some(max) = max {
        clamped = clamped.min(max);
    }
    if clamped == n {
        return value.clone();
    }
    if (value.is_i64() || value.is_u64()) && clamped.fract() == 0.0 {
        Value::from(clamped as i64)
    } else {
        Value::from(clamped)
    }
}

fn out_of_range(value: &Value, min: Option<f64>, max: Option<f64>) -> bool {
    let Some(n) = value.as_f64() else {
        return false;
    };
    min.is_some_and(|min| n < min) || max.is_some_and(|max| n > max)
}

/// Resolves a model specification into the wire-ready parameter map.
///
/// A bare model name yields an empty map. Otherwise, for every
/// parameter in the resolved schema: a caller-supplied value is clamped
/// into range and used; a non-null default is used when the caller is
/// silent; anything else is omitted (never sent as null). Keys are wire
/// names. Pure and infallible; unknown models degrade to a minimal map.
pub fn resolve_params(kind: ProviderKind, model: &ModelSpec) -> Map<String, Value> {
    let mut out = Map::new();
    let ModelSpec::Configured(config) = model else {
        return out;
    };
    let schema = get_schema(kind, &config.name);
    for spec in schema.params.values() {
        if let Some(value) = config.params.get(&spec.name) {
            out.insert(spec.wire_name.clone(), clamp_value(value, spec.min, spec.max));
        } else if let Some(default) = &spec.default {
            if !default.is_null() {
                out.insert(spec.wire_name.clone(), default.clone());
            }
        }
    }
    out
}

/// Validates an agent configuration against its resolved schema.
///
/// Errors: missing provider identity, or an exclusive-group violation.
/// Warnings: parameters the schema does not declare (typo detection)
/// and values outside their range (still clamped at resolution time).
/// Bare-string models have nothing to validate and report clean.
pub fn validate_agent(agent: &AgentConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    let kind = match agent.provider.as_deref() {
        None => {
            report
                .errors
                .push("agent has no provider; expected one of openai, anthropic, gemini".into());
            None
        }
        Some(p) => match p.parse::<ProviderKind>() {
            Ok(kind) => Some(kind),
            Err(_) => {
                report
                    .warnings
                    .push(format!("unknown provider '{p}'; parameters were not checked"));
                None
            }
        },
    };

    let ModelSpec::Configured(config) = &agent.model else {
        return report;
    };
    let Some(kind) = kind else {
        return report;
    };

    let schema = get_schema(kind, &config.name);
    validate_config(&schema, config, &mut report);
    report
}

/// The schema-dependent half of [`validate_agent`], split out so group
/// semantics can be exercised against any schema.
fn validate_config(schema: &Schema, config: &ModelConfig, report: &mut ValidationReport) {
    for (name, value) in &config.params {
        match schema.params.get(name) {
            None => report.warnings.push(format!(
                "parameter '{name}' is not recognized for model '{}'",
                config.name
            )),
            Some(spec) if out_of_range(value, spec.min, spec.max) => {
                report.warnings.push(format!(
                    "value {value} for '{name}' is outside [{}, {}] and will be clamped",
                    spec.min.unwrap_or(f64::NEG_INFINITY),
                    spec.max.unwrap_or(f64::INFINITY),
                ));
            }
            Some(_) => {}
        }
    }

    for group in &schema.exclusive_groups {
        let set = group
            .members
            .iter()
            .filter(|m| config.params.contains_key(m.as_str()))
            .count();
        let names = group.members.join(", ");
        if group.at_most_one && set > 1 {
            report
                .errors
                .push(format!("at most one of {names} may be set"));
        }
        if group.require_one && set == 0 {
            report
                .errors
                .push(format!("exactly one of {names} is required"));
        }
    }
}
