mod common;

use std::io::Write;

use common::{fixture, fixture_with, init_logger};
use irbind_core::{ConfigError, SessionConfig};
use irbind_sys::DiagnosticSeverity;

#[test]
fn config_loads_from_a_file() {
    init_logger();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[cache]
value_capacity = 16
metadata_capacity = 8
type_capacity = 4

[diagnostics]
forward_to_log = false
min_severity = "remark"
"#
    )
    .unwrap();

    let config = SessionConfig::load(file.path()).unwrap();
    assert_eq!(config.cache.value_capacity, 16);
    assert_eq!(config.cache.metadata_capacity, 8);
    assert_eq!(config.cache.type_capacity, 4);
    assert!(!config.diagnostics.forward_to_log);
    assert_eq!(config.diagnostics.min_severity, DiagnosticSeverity::Remark);

    let text = toml::to_string(&config).unwrap();
    assert_eq!(SessionConfig::from_toml_str(&text).unwrap(), config);
}

#[test]
fn malformed_files_are_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[cache]\nvalue_capacity = \"lots\"").unwrap();
    assert!(matches!(
        SessionConfig::load(file.path()),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn diagnostics_are_forwarded_while_live() {
    let f = fixture();
    let context = f.context();
    assert!(f.sim.has_diagnostic_handler(context));
    assert!(f
        .sim
        .emit_diagnostic(context, DiagnosticSeverity::Warning, "unused variable")
        .unwrap());

    f.session.dispose();
    assert!(!f.sim.has_diagnostic_handler(context));
    assert!(f
        .sim
        .emit_diagnostic(context, DiagnosticSeverity::Error, "too late")
        .is_err());
}

#[test]
fn forwarding_can_be_disabled() {
    let mut config = SessionConfig::default();
    config.diagnostics.forward_to_log = false;
    let f = fixture_with(config);

    assert!(!f.session.config().diagnostics.forward_to_log);
    assert!(!f.sim.has_diagnostic_handler(f.context()));
    assert!(!f
        .sim
        .emit_diagnostic(f.context(), DiagnosticSeverity::Error, "dropped")
        .unwrap());
}
