use super::config::*;
use std::io::Write;

#[test]
fn test_missing_compiler_options_is_strict() {
    let config = parse_config("{}").unwrap();
    assert_eq!(config.resolve_options(), CheckerOptions::default());
    assert!(config.resolve_options().strict_null_checks);
}

#[test]
fn test_absent_strict_defaults_to_strict_unlike_tsconfig() {
    let config = parse_config(r#"{"compilerOptions": {"noImplicitAny": false}}"#).unwrap();
    let options = config.resolve_options();
    assert!(options.strict_null_checks);
    assert!(!options.no_implicit_any);
}

#[test]
fn test_strict_false_disables_all_flags() {
    let config = parse_config(r#"{"compilerOptions": {"strict": false}}"#).unwrap();
    assert_eq!(config.resolve_options(), CheckerOptions::loose());
}

#[test]
fn test_explicit_flag_overrides_strict() {
    let config = parse_config(
        r#"{"compilerOptions": {"strict": true, "noImplicitAny": false}}"#,
    )
    .unwrap();
    let options = config.resolve_options();
    assert!(options.strict_null_checks);
    assert!(!options.no_implicit_any);
}

#[test]
fn test_boolean_strings_are_accepted() {
    let config = parse_config(
        r#"{"compilerOptions": {"strict": "false", "strictNullChecks": "yes"}}"#,
    )
    .unwrap();
    let options = config.resolve_options();
    assert!(options.strict_null_checks);
    assert!(!options.no_implicit_any);
}

#[test]
fn test_invalid_boolean_string_is_an_error() {
    let err = parse_config(r#"{"compilerOptions": {"strict": "maybe"}}"#).unwrap_err();
    assert!(format!("{err:#}").contains("invalid boolean value"));
}

#[test]
fn test_unknown_options_are_ignored() {
    let config =
        parse_config(r#"{"compilerOptions": {"target": "es2022", "strict": true}}"#).unwrap();
    assert_eq!(config.resolve_options(), CheckerOptions::default());
}

#[test]
fn test_load_config_follows_extends() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.json");
    let child = dir.path().join("assay.json");
    std::fs::File::create(&base)
        .unwrap()
        .write_all(br#"{"compilerOptions": {"strict": false}}"#)
        .unwrap();
    std::fs::File::create(&child)
        .unwrap()
        .write_all(br#"{"extends": "./base.json", "compilerOptions": {"strictNullChecks": true}}"#)
        .unwrap();

    let options = load_config(&child).unwrap().resolve_options();
    assert!(options.strict_null_checks);
    assert!(!options.no_implicit_any);
}

#[test]
fn test_load_config_detects_extends_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.json");
    let b = dir.path().join("b.json");
    std::fs::write(&a, r#"{"extends": "./b.json"}"#).unwrap();
    std::fs::write(&b, r#"{"extends": "./a.json"}"#).unwrap();

    let err = load_config(&a).unwrap_err();
    assert!(format!("{err:#}").contains("cycle"));
}

#[test]
fn test_load_config_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(&dir.path().join("absent.json")).unwrap_err();
    assert!(format!("{err:#}").contains("failed to read checker config"));
}
