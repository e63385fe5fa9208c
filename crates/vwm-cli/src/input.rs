//! Validator list input.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use vwm_model::EntityId;

/// Validators from the command line and an optional file, one per line.
///
/// Blank lines and surrounding whitespace are ignored; repeats keep their
/// first position.
pub fn collect_validators(positional: &[String], file: Option<&Path>) -> Result<Vec<EntityId>> {
    let mut validators: Vec<EntityId> = positional
        .iter()
        .flat_map(|arg| EntityId::parse_lines(arg))
        .collect();

    if let Some(path) = file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read validators file {}", path.display()))?;
        validators.extend(EntityId::parse_lines(&text));
    }

    let mut seen = HashSet::new();
    validators.retain(|entity| seen.insert(entity.clone()));

    if validators.is_empty() {
        bail!("no validators given; pass them as arguments or with --validators-file");
    }
    Ok(validators)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_and_dedupe() {
        let args = vec!["B".to_string(), " A ".to_string(), "B".to_string()];
        let validators = collect_validators(&args, None).unwrap();
        assert_eq!(validators, vec![EntityId::new("B"), EntityId::new("A")]);
    }

    #[test]
    fn test_empty_is_error() {
        let args = vec!["   ".to_string()];
        let err = collect_validators(&args, None).unwrap_err();
        assert!(err.to_string().contains("no validators"));
    }
}
