//! `contract check` handler

use crate::commands::ContractCheckArgs;
use crate::error::{CliError, CliResult};
use crate::output::Reporter;
use serde_json::Value;
use std::path::Path;
use warden::{Contract, ContractValidator, ValidationMode, WardenError};

/// Read a schema file into a contract.
///
/// The contract is named `name`, or the file stem when no name is given.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not JSON.
pub fn load_contract(path: &Path, name: Option<&str>) -> CliResult<Contract> {
    let schema: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    let name = name.map_or_else(
        || {
            path.file_stem()
                .map_or_else(|| "contract".to_string(), |s| s.to_string_lossy().into_owned())
        },
        str::to_string,
    );
    Ok(Contract::new(name, schema))
}

/// Execute `contract check`
pub fn execute_contract_check(args: &ContractCheckArgs, reporter: &Reporter) -> CliResult<()> {
    let contract = load_contract(&args.schema, args.name.as_deref())?;
    let data: Value = serde_json::from_str(&std::fs::read_to_string(&args.data)?)?;
    let mode = ValidationMode::from(args.mode);
    let validator = ContractValidator::with_mode(mode);

    match validator.assert_valid(&contract, &data, args.context.as_deref()) {
        Ok(()) => {
            reporter.success(&format!("{} is valid ({mode})", contract.name()));
            Ok(())
        }
        Err(WardenError::ContractValidationFailed(violation)) => {
            reporter.failure(&violation.to_string());
            Err(CliError::contract_failed(format!(
                "{} field(s) violate '{}'",
                violation.errors.len(),
                contract.name()
            )))
        }
        Err(other) => Err(other.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::commands::ModeArg;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, value: &Value) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, value.to_string()).unwrap();
        path
    }

    fn deck_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "id": {"type": "string"},
                "name": {"type": "string"}
            },
            "required": ["id", "name"]
        })
    }

    fn args(dir: &TempDir, data: &Value, mode: ModeArg) -> ContractCheckArgs {
        ContractCheckArgs {
            schema: write(dir, "deck.json", &deck_schema()),
            data: write(dir, "response.json", data),
            name: None,
            mode,
            context: Some("GET /decks/1".to_string()),
        }
    }

    #[test]
    fn test_contract_named_after_schema_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "deck.json", &deck_schema());
        assert_eq!(load_contract(&path, None).unwrap().name(), "deck");
        assert_eq!(load_contract(&path, Some("Deck")).unwrap().name(), "Deck");
    }

    #[test]
    fn test_valid_document_passes() {
        let dir = TempDir::new().unwrap();
        let args = args(&dir, &json!({"id": "1", "name": "Spanish"}), ModeArg::Strict);
        assert!(execute_contract_check(&args, &Reporter::new(false, true)).is_ok());
    }

    #[test]
    fn test_extra_field_fails_only_in_strict_mode() {
        let dir = TempDir::new().unwrap();
        let data = json!({"id": "1", "name": "Spanish", "owner": "u1"});
        let reporter = Reporter::new(false, true);

        let strict = execute_contract_check(&args(&dir, &data, ModeArg::Strict), &reporter);
        assert!(matches!(strict, Err(CliError::ContractFailed { .. })));

        let lenient = execute_contract_check(&args(&dir, &data, ModeArg::Lenient), &reporter);
        assert!(lenient.is_ok());
    }

    #[test]
    fn test_missing_data_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let mut args = args(&dir, &json!({}), ModeArg::Strict);
        args.data = dir.path().join("missing.json");
        assert!(matches!(
            execute_contract_check(&args, &Reporter::new(false, true)),
            Err(CliError::Io(_))
        ));
    }
}
