use std::path::Path;

use seedling_core::Value;
use seedling_generate::{FactoryOptions, Overrides};

use crate::CliError;

/// Reads factory options from a TOML file; defaults when no file is given.
pub fn load_options(path: Option<&Path>) -> Result<FactoryOptions, CliError> {
    let Some(path) = path else {
        return Ok(FactoryOptions::default());
    };
    let content = std::fs::read_to_string(path)?;
    parse_options(&content)
}

pub fn parse_options(content: &str) -> Result<FactoryOptions, CliError> {
    Ok(toml::from_str(content)?)
}

/// Parses `--set key=value` pairs. Values are read as JSON when they parse
/// (`30`, `true`, `null`, `"quoted"`), as plain text otherwise.
pub fn parse_overrides(pairs: &[String]) -> Result<Overrides, CliError> {
    let mut overrides = Overrides::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| CliError::InvalidArgument(format!("expected key=value, got '{pair}'")))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(CliError::InvalidArgument(format!("missing key in '{pair}'")));
        }
        let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::from(raw));
        overrides.insert(key, value);
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_fill_missing_keys_with_defaults() {
        let options = parse_options("many_quantity = 2\nseed = 9\n").expect("parse options");
        assert_eq!(options.many_quantity, 2);
        assert_eq!(options.seed, Some(9));
        assert!(options.make_m2m);
        assert_eq!(options.max_self_reference_loops, 2);
    }

    #[test]
    fn unknown_option_types_are_rejected() {
        assert!(matches!(
            parse_options("make_m2m = \"yes\""),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn set_values_parse_as_json_or_text() {
        let pairs = vec![
            "age=30".to_string(),
            "happy=false".to_string(),
            "owner__name=Rex's Owner".to_string(),
            "nickname=\"7\"".to_string(),
        ];
        let overrides = parse_overrides(&pairs).expect("parse overrides");

        assert_eq!(overrides.direct_value("age"), Some(&Value::Int(30)));
        assert_eq!(overrides.direct_value("happy"), Some(&Value::Bool(false)));
        assert_eq!(overrides.direct_value("nickname"), Some(&Value::from("7")));
        let owner = overrides.nested("owner").expect("nested owner");
        assert_eq!(owner.direct_value("name"), Some(&Value::from("Rex's Owner")));
    }

    #[test]
    fn set_without_separator_is_rejected() {
        let result = parse_overrides(&["age".to_string()]);
        assert!(matches!(result, Err(CliError::InvalidArgument(_))));
    }
}
