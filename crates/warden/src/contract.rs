//! Response contract validation.
//!
//! A [`Contract`] is a named JSON Schema. The [`ContractValidator`] checks API
//! responses against contracts, deserializes the ones that pass, and counts
//! passes and failures for the whole run so CI can report the pass rate.

use crate::result::{WardenError, WardenResult};
use jsonschema::JSONSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::{debug, warn};

/// How unknown object fields are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Objects with declared `properties` reject fields not listed there
    #[default]
    Strict,
    /// Unknown fields are accepted everywhere
    Lenient,
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Lenient => write!(f, "lenient"),
        }
    }
}

impl std::str::FromStr for ValidationMode {
    type Err = WardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(WardenError::config(format!(
                "unknown validation mode '{other}' (expected strict or lenient)"
            ))),
        }
    }
}

/// A named JSON Schema describing an API response.
///
/// The schema is compiled once per [`ValidationMode`] on first use.
pub struct Contract {
    name: String,
    schema: Value,
    strict: OnceLock<JSONSchema>,
    lenient: OnceLock<JSONSchema>,
}

impl Contract {
    /// Create a contract
    #[must_use]
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
            strict: OnceLock::new(),
            lenient: OnceLock::new(),
        }
    }

    /// Contract name used in errors and logs
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema as declared
    #[must_use]
    pub const fn schema(&self) -> &Value {
        &self.schema
    }

    /// Schema adjusted for `mode`
    #[must_use]
    pub fn schema_for(&self, mode: ValidationMode) -> Value {
        let mut schema = self.schema.clone();
        apply_mode(&mut schema, mode, false);
        schema
    }

    fn compiled(&self, mode: ValidationMode) -> WardenResult<&JSONSchema> {
        let cell = match mode {
            ValidationMode::Strict => &self.strict,
            ValidationMode::Lenient => &self.lenient,
        };
        if let Some(compiled) = cell.get() {
            return Ok(compiled);
        }
        let compiled = JSONSchema::compile(&self.schema_for(mode)).map_err(|e| {
            WardenError::InvalidSchema {
                contract: self.name.clone(),
                message: e.to_string(),
            }
        })?;
        Ok(cell.get_or_init(|| compiled))
    }

    #[cfg(test)]
    fn is_compiled(&self, mode: ValidationMode) -> bool {
        match mode {
            ValidationMode::Strict => self.strict.get().is_some(),
            ValidationMode::Lenient => self.lenient.get().is_some(),
        }
    }
}

impl Clone for Contract {
    fn clone(&self) -> Self {
        Self::new(self.name.clone(), self.schema.clone())
    }
}

impl PartialEq for Contract {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.schema == other.schema
    }
}

impl fmt::Debug for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contract")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Keywords whose value is a single subschema (or, for `items`, a list).
const SCHEMA_KEYWORDS: &[&str] = &[
    "additionalProperties",
    "additionalItems",
    "items",
    "contains",
    "propertyNames",
    "unevaluatedProperties",
    "unevaluatedItems",
];

/// Keywords whose value maps names to subschemas.
const SCHEMA_MAP_KEYWORDS: &[&str] = &["properties", "patternProperties", "definitions", "$defs"];

/// Keywords whose subschemas apply to the same instance as their parent.
/// They are never closed on their own.
const APPLICATOR_LIST_KEYWORDS: &[&str] = &["allOf", "anyOf", "oneOf"];
const APPLICATOR_KEYWORDS: &[&str] = &["if", "then", "else", "not"];

/// Rewrite `additionalProperties` on object subschemas.
///
/// Only schema-valued keywords are walked, so literals under `const`,
/// `enum`, `default` or `examples` are left alone. `applied` marks a
/// subschema that validates the same instance as its parent (an `allOf`
/// branch, say); strict mode closes the parent instead, with the branch
/// properties merged in.
fn apply_mode(schema: &mut Value, mode: ValidationMode, applied: bool) {
    let Value::Object(map) = schema else { return };

    match mode {
        ValidationMode::Strict if !applied => close_object(map),
        ValidationMode::Strict => {}
        ValidationMode::Lenient => relax_additional(map),
    }

    for key in SCHEMA_KEYWORDS {
        match map.get_mut(*key) {
            Some(Value::Array(items)) => {
                for item in items {
                    apply_mode(item, mode, false);
                }
            }
            Some(sub) => apply_mode(sub, mode, false),
            None => {}
        }
    }
    for key in SCHEMA_MAP_KEYWORDS {
        if let Some(Value::Object(subs)) = map.get_mut(*key) {
            for sub in subs.values_mut() {
                apply_mode(sub, mode, false);
            }
        }
    }
    if let Some(Value::Object(subs)) = map.get_mut("dependentSchemas") {
        for sub in subs.values_mut() {
            apply_mode(sub, mode, true);
        }
    }
    for key in APPLICATOR_LIST_KEYWORDS {
        if let Some(Value::Array(branches)) = map.get_mut(*key) {
            for branch in branches {
                apply_mode(branch, mode, true);
            }
        }
    }
    for key in APPLICATOR_KEYWORDS {
        if let Some(sub) = map.get_mut(*key) {
            apply_mode(sub, mode, true);
        }
    }
}

/// Add `additionalProperties: false` to an object schema that declares
/// properties, itself or through its `allOf`/`anyOf`/`oneOf`/`then`/`else`
/// branches. Branch property names are copied into `properties` as `true`
/// so the closed parent still admits them. Left open when a branch cannot
/// be enumerated (a `$ref`, `patternProperties`, or an open branch).
fn close_object(map: &mut Map<String, Value>) {
    if map.contains_key("additionalProperties") || map.contains_key("unevaluatedProperties") {
        return;
    }
    let Some(branch_names) = applied_names(map) else {
        return;
    };
    if !map.contains_key("properties") && branch_names.is_empty() {
        return;
    }
    if let Value::Object(props) = map
        .entry("properties")
        .or_insert_with(|| Value::Object(Map::new()))
    {
        for name in branch_names {
            props.entry(name).or_insert(Value::Bool(true));
        }
    }
    map.insert("additionalProperties".to_string(), Value::Bool(false));
}

/// Property names declared by the subschemas applied alongside `map`,
/// or `None` if any of them admits names that cannot be listed.
fn applied_names(map: &Map<String, Value>) -> Option<Vec<String>> {
    if map.contains_key("dependentSchemas") {
        return None;
    }
    let mut names = Vec::new();
    for key in APPLICATOR_LIST_KEYWORDS {
        if let Some(Value::Array(branches)) = map.get(*key) {
            for branch in branches {
                names.extend(branch_names(branch)?);
            }
        }
    }
    for key in ["then", "else"] {
        if let Some(branch) = map.get(key) {
            names.extend(branch_names(branch)?);
        }
    }
    Some(names)
}

fn branch_names(branch: &Value) -> Option<Vec<String>> {
    let Value::Object(map) = branch else {
        return Some(Vec::new());
    };
    if map.contains_key("$ref") || map.contains_key("patternProperties") {
        return None;
    }
    if map
        .get("additionalProperties")
        .is_some_and(|v| v != &Value::Bool(false))
    {
        return None;
    }
    let mut names: Vec<String> = map
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| props.keys().cloned().collect())
        .unwrap_or_default();
    names.extend(applied_names(map)?);
    Some(names)
}

fn relax_additional(map: &mut Map<String, Value>) {
    if map.get("additionalProperties") == Some(&Value::Bool(false)) {
        map.remove("additionalProperties");
    }
}

/// One schema violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// JSON pointer to the offending value, `/` for the document root
    pub path: String,
    /// What was wrong
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Data did not satisfy a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractViolation {
    /// Contract that was checked
    pub contract: String,
    /// Caller-supplied context, e.g. the endpoint
    pub context: Option<String>,
    /// Individual violations
    pub errors: Vec<FieldError>,
}

impl ContractViolation {
    /// Paths of every offending field
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.path.as_str()).collect()
    }
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Contract '{}' violated", self.contract)?;
        if let Some(context) = &self.context {
            write!(f, " ({context})")?;
        }
        write!(f, ":")?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ContractViolation {}

/// Outcome of [`ContractValidator::safe_parse`]
#[derive(Debug, Clone, PartialEq)]
pub enum SafeParse<T> {
    /// Data matched and was deserialized
    Success(T),
    /// Data did not match
    Failure(Vec<FieldError>),
}

impl<T> SafeParse<T> {
    /// Whether validation passed
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Violations, empty on success
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        match self {
            Self::Success(_) => &[],
            Self::Failure(errors) => errors,
        }
    }

    /// The parsed value, if any
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }
}

/// Pass/fail counters for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractStats {
    /// Validations performed
    pub total: u64,
    /// Validations that passed
    pub passed: u64,
    /// Validations that failed
    pub failed: u64,
    /// `passed / total * 100`, or 100 when nothing ran
    pub pass_rate: f64,
}

#[derive(Debug, Default)]
struct ValidatorState {
    mode: ValidationMode,
    passed: u64,
    failed: u64,
}

/// Validates responses against contracts and keeps run statistics.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use warden::{Contract, ContractValidator};
///
/// let deck = Contract::new("deck", json!({
///     "type": "object",
///     "required": ["id"],
///     "properties": { "id": { "type": "string" } }
/// }));
/// let validator = ContractValidator::new();
/// assert!(validator.assert_valid(&deck, &json!({"id": "d1"}), None).is_ok());
/// assert!(validator.assert_valid(&deck, &json!({"id": 1}), None).is_err());
/// assert_eq!(validator.stats().pass_rate, 50.0);
/// ```
#[derive(Debug, Default)]
pub struct ContractValidator {
    state: Mutex<ValidatorState>,
}

impl ContractValidator {
    /// Strict validator with zeroed statistics
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator in the given mode
    #[must_use]
    pub fn with_mode(mode: ValidationMode) -> Self {
        let validator = Self::default();
        validator.set_mode(mode);
        validator
    }

    fn lock(&self) -> MutexGuard<'_, ValidatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current mode
    #[must_use]
    pub fn mode(&self) -> ValidationMode {
        self.lock().mode
    }

    /// Switch between strict and lenient handling of unknown fields
    pub fn set_mode(&self, mode: ValidationMode) {
        self.lock().mode = mode;
    }

    /// Validate `data` and deserialize it.
    ///
    /// # Errors
    ///
    /// Returns [`WardenError::ContractValidationFailed`] with the offending
    /// field paths, or [`WardenError::InvalidSchema`] if the contract does
    /// not compile.
    pub fn validate<T: DeserializeOwned>(
        &self,
        contract: &Contract,
        data: &Value,
        context: Option<&str>,
    ) -> WardenResult<T> {
        match self.check(contract, data)? {
            SafeParse::Success(value) => Ok(value),
            SafeParse::Failure(errors) => {
                let violation = ContractViolation {
                    contract: contract.name().to_string(),
                    context: context.map(str::to_string),
                    errors,
                };
                warn!(contract = contract.name(), context, "{violation}");
                Err(violation.into())
            }
        }
    }

    /// Validate without raising.
    ///
    /// A contract whose schema does not compile is reported as a failure at
    /// the root path.
    pub fn safe_parse<T: DeserializeOwned>(&self, contract: &Contract, data: &Value) -> SafeParse<T> {
        match self.check(contract, data) {
            Ok(outcome) => outcome,
            Err(err) => SafeParse::Failure(vec![FieldError {
                path: "/".to_string(),
                message: err.to_string(),
            }]),
        }
    }

    /// Validate and discard the value.
    ///
    /// # Errors
    ///
    /// Same as [`ContractValidator::validate`].
    pub fn assert_valid(
        &self,
        contract: &Contract,
        data: &Value,
        context: Option<&str>,
    ) -> WardenResult<()> {
        self.validate::<Value>(contract, data, context).map(|_| ())
    }

    /// Counters so far
    #[must_use]
    pub fn stats(&self) -> ContractStats {
        let state = self.lock();
        let total = state.passed + state.failed;
        let pass_rate = if total == 0 {
            100.0
        } else {
            state.passed as f64 / total as f64 * 100.0
        };
        ContractStats {
            total,
            passed: state.passed,
            failed: state.failed,
            pass_rate,
        }
    }

    /// Zero the counters; the mode is kept
    pub fn reset(&self) {
        let mut state = self.lock();
        state.passed = 0;
        state.failed = 0;
    }

    /// Run the schema, then serde, and count the outcome.
    fn check<T: DeserializeOwned>(
        &self,
        contract: &Contract,
        data: &Value,
    ) -> WardenResult<SafeParse<T>> {
        let mode = self.mode();
        let compiled = match contract.compiled(mode) {
            Ok(compiled) => compiled,
            Err(err) => {
                self.record(false);
                return Err(err);
            }
        };

        let mut errors: Vec<FieldError> = match compiled.validate(data) {
            Ok(()) => Vec::new(),
            Err(violations) => violations
                .map(|e| FieldError {
                    path: pointer_or_root(&e.instance_path.to_string()),
                    message: e.to_string(),
                })
                .collect(),
        };

        let outcome = if errors.is_empty() {
            match serde_json::from_value::<T>(data.clone()) {
                Ok(value) => SafeParse::Success(value),
                Err(e) => {
                    errors.push(FieldError {
                        path: "/".to_string(),
                        message: format!("does not deserialize: {e}"),
                    });
                    SafeParse::Failure(errors)
                }
            }
        } else {
            SafeParse::Failure(errors)
        };

        self.record(outcome.is_success());
        debug!(
            contract = contract.name(),
            %mode,
            passed = outcome.is_success(),
            "contract checked"
        );
        Ok(outcome)
    }

    fn record(&self, passed: bool) {
        let mut state = self.lock();
        if passed {
            state.passed += 1;
        } else {
            state.failed += 1;
        }
    }
}

fn pointer_or_root(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn deck_contract() -> Contract {
        Contract::new(
            "deck",
            json!({
                "type": "object",
                "required": ["id", "name", "cards"],
                "properties": {
                    "id": { "type": "string" },
                    "name": { "type": "string", "minLength": 1 },
                    "cards": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["front"],
                            "properties": { "front": { "type": "string" } }
                        }
                    }
                }
            }),
        )
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Deck {
        id: String,
        name: String,
    }

    fn valid_deck() -> Value {
        json!({"id": "d1", "name": "Spanish", "cards": [{"front": "hola"}]})
    }

    mod mode {
        use super::*;

        #[test]
        fn test_default_is_strict() {
            assert_eq!(ContractValidator::new().mode(), ValidationMode::Strict);
        }

        #[test]
        fn test_parse() {
            assert_eq!("Lenient".parse::<ValidationMode>().unwrap(), ValidationMode::Lenient);
            assert!("loose".parse::<ValidationMode>().is_err());
        }

        #[test]
        fn test_strict_adds_additional_properties_false() {
            let schema = deck_contract().schema_for(ValidationMode::Strict);
            assert_eq!(schema["additionalProperties"], json!(false));
            assert_eq!(
                schema["properties"]["cards"]["items"]["additionalProperties"],
                json!(false)
            );
        }

        #[test]
        fn test_strict_keeps_explicit_additional_properties() {
            let contract = Contract::new(
                "open",
                json!({"type": "object", "properties": {}, "additionalProperties": true}),
            );
            assert_eq!(
                contract.schema_for(ValidationMode::Strict)["additionalProperties"],
                json!(true)
            );
        }

        #[test]
        fn test_lenient_removes_closed_objects() {
            let contract = Contract::new(
                "closed",
                json!({"type": "object", "properties": {}, "additionalProperties": false}),
            );
            let schema = contract.schema_for(ValidationMode::Lenient);
            assert!(schema.get("additionalProperties").is_none());
        }

        #[test]
        fn test_composed_object_accepts_declared_fields_in_strict() {
            let contract = Contract::new(
                "named_deck",
                json!({
                    "type": "object",
                    "allOf": [
                        {"properties": {"id": {"type": "string"}}, "required": ["id"]},
                        {"properties": {"name": {"type": "string"}}}
                    ]
                }),
            );
            let validator = ContractValidator::new();

            let ok =
                validator.safe_parse::<Value>(&contract, &json!({"id": "d1", "name": "Spanish"}));
            assert!(ok.is_success(), "{:?}", ok.errors());

            let extra = validator.safe_parse::<Value>(
                &contract,
                &json!({"id": "d1", "name": "Spanish", "owner": "u1"}),
            );
            assert!(!extra.is_success());

            let schema = contract.schema_for(ValidationMode::Strict);
            assert_eq!(schema["additionalProperties"], json!(false));
            assert!(schema["allOf"][0].get("additionalProperties").is_none());
            assert!(schema["allOf"][1].get("additionalProperties").is_none());
        }

        #[test]
        fn test_ref_branch_leaves_parent_open() {
            let contract = Contract::new(
                "ref",
                json!({
                    "definitions": {"base": {"properties": {"id": {"type": "string"}}}},
                    "properties": {"name": {"type": "string"}},
                    "allOf": [{"$ref": "#/definitions/base"}]
                }),
            );
            let schema = contract.schema_for(ValidationMode::Strict);
            assert!(schema.get("additionalProperties").is_none());
            assert_eq!(
                schema["definitions"]["base"]["additionalProperties"],
                json!(false)
            );
        }

        #[test]
        fn test_literals_and_property_names_untouched() {
            let contract = Contract::new(
                "literals",
                json!({
                    "properties": {
                        "properties": {"type": "object"},
                        "shape": {
                            "const": {"properties": {"a": 1}},
                            "default": {"properties": {}}
                        }
                    },
                    "examples": [{"properties": {}}]
                }),
            );
            let schema = contract.schema_for(ValidationMode::Strict);
            assert!(schema["properties"].get("additionalProperties").is_none());
            assert_eq!(schema["properties"]["shape"]["const"], json!({"properties": {"a": 1}}));
            assert_eq!(schema["properties"]["shape"]["default"], json!({"properties": {}}));
            assert_eq!(schema["examples"], json!([{"properties": {}}]));
        }

        #[test]
        fn test_schema_compiled_once_per_mode() {
            let contract = deck_contract();
            assert!(!contract.is_compiled(ValidationMode::Strict));

            let validator = ContractValidator::new();
            let _ = validator.safe_parse::<Value>(&contract, &valid_deck());
            let _ = validator.safe_parse::<Value>(&contract, &valid_deck());

            assert!(contract.is_compiled(ValidationMode::Strict));
            assert!(!contract.is_compiled(ValidationMode::Lenient));
            assert!(!contract.clone().is_compiled(ValidationMode::Strict));
        }

        #[test]
        fn test_unknown_field_rejected_only_in_strict() {
            let mut data = valid_deck();
            data["extra"] = json!(true);
            let strict = ContractValidator::new();
            assert!(!strict.safe_parse::<Value>(&deck_contract(), &data).is_success());
            let lenient = ContractValidator::with_mode(ValidationMode::Lenient);
            assert!(lenient.safe_parse::<Value>(&deck_contract(), &data).is_success());
        }
    }

    mod validate {
        use super::*;

        #[test]
        fn test_returns_typed_value() {
            let validator = ContractValidator::with_mode(ValidationMode::Lenient);
            let deck: Deck = validator
                .validate(&deck_contract(), &valid_deck(), Some("GET /decks/d1"))
                .unwrap();
            assert_eq!(deck.id, "d1");
            assert_eq!(deck.name, "Spanish");
        }

        #[test]
        fn test_violation_carries_paths_and_context() {
            let validator = ContractValidator::new();
            let data = json!({"id": 7, "name": "", "cards": [{"front": 1}]});
            let err = validator
                .validate::<Value>(&deck_contract(), &data, Some("GET /decks/7"))
                .unwrap_err();
            let WardenError::ContractValidationFailed(violation) = err else {
                panic!("expected a contract violation");
            };
            assert_eq!(violation.contract, "deck");
            assert_eq!(violation.context.as_deref(), Some("GET /decks/7"));
            let paths = violation.paths();
            assert!(paths.contains(&"/id"));
            assert!(paths.contains(&"/name"));
            assert!(paths.contains(&"/cards/0/front"));
            let text = violation.to_string();
            assert!(text.starts_with("Contract 'deck' violated (GET /decks/7):"));
        }

        #[test]
        fn test_missing_required_reported_at_root() {
            let validator = ContractValidator::new();
            let outcome = validator.safe_parse::<Value>(&deck_contract(), &json!({"id": "d1"}));
            assert!(outcome.errors().iter().all(|e| e.path == "/"));
            assert!(!outcome.errors().is_empty());
        }

        #[test]
        fn test_assert_valid() {
            let validator = ContractValidator::new();
            assert!(validator.assert_valid(&deck_contract(), &valid_deck(), None).is_ok());
            assert!(validator.assert_valid(&deck_contract(), &json!([]), None).is_err());
        }

        #[test]
        fn test_invalid_schema() {
            let validator = ContractValidator::new();
            let broken = Contract::new("broken", json!({"type": 12}));
            let err = validator.assert_valid(&broken, &json!({}), None).unwrap_err();
            assert!(matches!(err, WardenError::InvalidSchema { .. }));
            let outcome = validator.safe_parse::<Value>(&broken, &json!({}));
            assert!(!outcome.is_success());
            assert_eq!(validator.stats().failed, 2);
        }

        #[test]
        fn test_schema_passes_but_type_does_not_deserialize() {
            let validator = ContractValidator::new();
            let contract = Contract::new("anything", json!({}));
            let outcome = validator.safe_parse::<Deck>(&contract, &json!({"id": "d1"}));
            assert!(!outcome.is_success());
            assert!(outcome.errors()[0].message.contains("does not deserialize"));
        }
    }

    mod stats {
        use super::*;

        #[test]
        fn test_empty_pass_rate_is_100() {
            let stats = ContractValidator::new().stats();
            assert_eq!(stats.total, 0);
            assert_eq!(stats.pass_rate, 100.0);
        }

        #[test]
        fn test_safe_parse_counts() {
            let validator = ContractValidator::new();
            let ok = validator.safe_parse::<Value>(&deck_contract(), &valid_deck());
            assert!(ok.is_success());
            assert!(ok.errors().is_empty());
            let bad = validator.safe_parse::<Value>(&deck_contract(), &json!({"id": 1}));
            assert!(!bad.is_success());
            assert!(!bad.errors().is_empty());
            validator.safe_parse::<Value>(&deck_contract(), &json!(null));
            validator.safe_parse::<Value>(&deck_contract(), &valid_deck());

            let stats = validator.stats();
            assert_eq!(stats.total, 4);
            assert_eq!(stats.passed, 2);
            assert_eq!(stats.failed, 2);
            assert_eq!(stats.pass_rate, 50.0);
        }

        #[test]
        fn test_reset_keeps_mode() {
            let validator = ContractValidator::with_mode(ValidationMode::Lenient);
            validator.safe_parse::<Value>(&deck_contract(), &json!(1));
            validator.reset();
            assert_eq!(validator.stats().total, 0);
            assert_eq!(validator.mode(), ValidationMode::Lenient);
        }
    }
}
