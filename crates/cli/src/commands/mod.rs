//! Subcommand implementations and shared input handling.

pub mod discounts;
pub mod evaluate;
pub mod normalize;
pub mod purchase;

use std::io::Read;
use std::path::{Path, PathBuf};

use optionset_engine::catalog::legacy;
use optionset_engine::{Product, SelectionError, SelectionSession, SelectionState};
use thiserror::Error;

/// Errors reading command input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// A `--select Option=Value` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectArg {
    pub option: String,
    pub value: String,
}

/// Parse `Option=Value`.
pub fn parse_select(raw: &str) -> Result<SelectArg, String> {
    let (option, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected Option=Value, got '{raw}'"))?;
    let (option, value) = (option.trim(), value.trim());
    if option.is_empty() || value.is_empty() {
        return Err(format!("expected Option=Value, got '{raw}'"));
    }
    Ok(SelectArg {
        option: option.to_string(),
        value: value.to_string(),
    })
}

fn read_input(path: &Path) -> Result<String, InputError> {
    let io_error = |source| InputError::Io {
        path: path.to_path_buf(),
        source,
    };

    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).map_err(io_error)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).map_err(io_error)
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(path: &Path, text: &str) -> Result<T, InputError> {
    serde_json::from_str(text).map_err(|source| InputError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a product in either variant shape.
pub fn load_product(path: &Path) -> Result<Product, InputError> {
    let value: serde_json::Value = parse_json(path, &read_input(path)?)?;
    legacy::parse_product(value).map_err(|source| InputError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load any JSON document.
pub fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, InputError> {
    parse_json(path, &read_input(path)?)
}

/// Start a session with `--select` arguments applied over the seeded
/// selection.
pub fn session_with(product: Product, selections: &[SelectArg]) -> Result<SelectionSession, InputError> {
    let mut session = if selections.is_empty() {
        SelectionSession::new(product)
    } else {
        SelectionSession::with_selection(product, SelectionState::new())
    };
    for arg in selections {
        session.select_text(&arg.option, &arg.value)?;
    }
    Ok(session)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_select() {
        assert_eq!(
            parse_select(" Color = Dark Red ").unwrap(),
            SelectArg {
                option: "Color".to_string(),
                value: "Dark Red".to_string(),
            }
        );
        assert!(parse_select("Color").is_err());
        assert!(parse_select("=Red").is_err());
        assert!(parse_select("Color=").is_err());
    }
}
