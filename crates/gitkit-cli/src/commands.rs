//! One-shot command implementations

use std::path::Path;

use gitkit_engine::{
    CliGitProvider, EngineConfig, ExecutionContext, GitProvider, RequestContext,
};
use serde::Serialize;
use serde_json::Value;

use crate::error::{CliError, Result};

pub fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}

/// Parse the `--options` argument; blank means no options.
pub fn parse_options(raw: &str) -> Result<Value> {
    if raw.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(raw)
        .map_err(|e| CliError::user(format!("--options is not valid JSON: {e}")))
}

pub async fn run_operation(
    provider: &CliGitProvider,
    operation: &str,
    options: &str,
    cwd: &Path,
    request: RequestContext,
    pretty: bool,
) -> Result<()> {
    let options = parse_options(options)?;
    let cwd = std::path::absolute(cwd)?;
    let ctx = ExecutionContext::new(request).with_working_directory(cwd);

    let output = provider.execute_named(operation, options, &ctx).await?;
    print_json(&output, pretty)
}

pub fn run_capabilities(provider: &CliGitProvider, pretty: bool) -> Result<()> {
    print_json(&provider.capabilities(), pretty)
}

pub fn run_config(config: &EngineConfig) -> Result<()> {
    print!("{}", toml::to_string(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_options_are_null() {
        assert_eq!(parse_options("  ").unwrap(), Value::Null);
    }

    #[test]
    fn test_options_object() {
        let value = parse_options(r#"{"max_count": 2}"#).unwrap();
        assert_eq!(value["max_count"], 2);
    }

    #[test]
    fn test_invalid_options_are_user_error() {
        let err = parse_options("{max_count: 2}").unwrap_err();
        assert!(matches!(err, CliError::User { .. }));
        assert!(err.to_string().contains("--options"));
    }
}
