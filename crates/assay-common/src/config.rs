//! Checker configuration.
//!
//! Options are read from a tsconfig-shaped JSON document so an existing
//! project file can drive the checker directly:
//!
//! ```json
//! { "extends": "./base.json", "compilerOptions": { "strict": true, "noImplicitAny": false } }
//! ```
//!
//! Only the options that change assignability or inference are recognized;
//! everything else in the document is ignored.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Accept `true`/`false` as well as their string spellings.
fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(b)) => Ok(Some(b)),
        Some(BoolOrString::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(Error::custom(format!(
                "invalid boolean value: '{s}'. Expected true, false, 'true', or 'false'"
            ))),
        },
    }
}

/// The top-level configuration document.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CheckerConfig {
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub compiler_options: Option<CompilerOptions>,
}

/// Raw `compilerOptions` as written. Unset fields inherit from `extends`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub strict: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub strict_null_checks: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub no_implicit_any: Option<bool>,
}

/// Resolved options consumed by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckerOptions {
    /// `null` and `undefined` are only assignable to types that admit them.
    pub strict_null_checks: bool,
    /// Unannotated parameters without a contextual type are reported.
    pub no_implicit_any: bool,
}

impl Default for CheckerOptions {
    /// Strict mode, matching `"strict": true`.
    fn default() -> Self {
        Self {
            strict_null_checks: true,
            no_implicit_any: true,
        }
    }
}

impl CheckerOptions {
    /// Options with every strict flag disabled.
    pub const fn loose() -> Self {
        Self {
            strict_null_checks: false,
            no_implicit_any: false,
        }
    }
}

impl CheckerConfig {
    /// Resolve raw options into the flags the solver uses.
    ///
    /// `strict` supplies the default for each individual flag; an explicit
    /// flag always wins. With no `strict` at all the checker runs strict,
    /// unlike tsconfig, where an absent `strict` means `false`.
    pub fn resolve_options(&self) -> CheckerOptions {
        let Some(options) = &self.compiler_options else {
            return CheckerOptions::default();
        };
        let strict = options.strict.unwrap_or(true);
        CheckerOptions {
            strict_null_checks: options.strict_null_checks.unwrap_or(strict),
            no_implicit_any: options.no_implicit_any.unwrap_or(strict),
        }
    }
}

pub fn parse_config(source: &str) -> Result<CheckerConfig> {
    let config = serde_json::from_str(source).context("failed to parse checker config JSON")?;
    Ok(config)
}

/// Load a config file, following `extends` chains.
pub fn load_config(path: &Path) -> Result<CheckerConfig> {
    let mut visited = HashSet::new();
    load_config_inner(path, &mut visited)
}

fn load_config_inner(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<CheckerConfig> {
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical.clone()) {
        bail!("config extends cycle detected at {}", canonical.display());
    }

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read checker config: {}", path.display()))?;
    let mut config = parse_config(&source)
        .with_context(|| format!("failed to parse checker config: {}", path.display()))?;

    if let Some(extends) = config.extends.take() {
        let base_path = path
            .parent()
            .map(|dir| dir.join(&extends))
            .unwrap_or_else(|| PathBuf::from(&extends));
        debug!(config = %path.display(), base = %base_path.display(), "following extends");
        let base = load_config_inner(&base_path, visited)?;
        config = merge_configs(base, config);
    }

    visited.remove(&canonical);
    Ok(config)
}

fn merge_configs(base: CheckerConfig, child: CheckerConfig) -> CheckerConfig {
    let compiler_options = match (base.compiler_options, child.compiler_options) {
        (Some(base), Some(child)) => Some(CompilerOptions {
            strict: child.strict.or(base.strict),
            strict_null_checks: child.strict_null_checks.or(base.strict_null_checks),
            no_implicit_any: child.no_implicit_any.or(base.no_implicit_any),
        }),
        (base, child) => child.or(base),
    };
    CheckerConfig {
        extends: None,
        compiler_options,
    }
}
