//! Integration tests for configuration-driven runs.
//!
//! These tests load run configurations from YAML and JSON files, run them
//! and export their results.

use circuitry::{BlockId, CircuitError, ConfigError, Logic, SimConfig, SimConfigBuilder};

const OFF_DELAY_YAML: &str = r#"
simulation:
  resolution_ms: 100
  max_cycles: 20
  record_trace: true
  probes: [0, 1]

page:
  blocks:
    - id: 0
      name: Signal
      label: switch
      pins: [0]
    - id: 1
      name: TOF
      label: fan
      pins: [1, 2]
      properties:
        Delay: "1"
        Unit: s
  pins:
    - { id: 0, kind: output, owner: 0 }
    - { id: 1, kind: unspecified, owner: 1 }
    - { id: 2, kind: output, owner: 1 }
    - { id: 3, kind: relay }
  wires:
    - { id: 0, start: 0, end: 3 }
    - { id: 1, start: 3, end: 1 }

stimulus:
  - { cycle: 0, block: 0, value: "true" }
  - { cycle: 5, block: 0, value: "false" }
"#;

fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_run_from_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "fan.yaml", OFF_DELAY_YAML);

    let config = SimConfig::from_file(&path).unwrap();
    let exec = config.run().unwrap();

    assert_eq!(exec.clock().cycle(), 20);
    let trace = exec.trace().unwrap();
    assert_eq!(trace.labels(), ["switch".to_string(), "fan".to_string()]);

    let fan = trace.column(BlockId(1)).unwrap();
    assert!(fan[..15].iter().all(|&s| s == Logic::True));
    assert!(fan[15..].iter().all(|&s| s == Logic::False));

    let csv = trace.to_csv();
    assert!(csv.starts_with("cycle,switch,fan\n0,1,1\n"));
    assert!(csv.ends_with("19,0,0\n"));
}

#[test]
fn test_json_file_matches_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = SimConfig::from_yaml(OFF_DELAY_YAML).unwrap();

    let json_path = dir.path().join("fan.json");
    yaml.to_json_file(&json_path).unwrap();
    let json = SimConfig::from_file(&json_path).unwrap();

    assert_eq!(json, yaml);
    let a = yaml.run().unwrap();
    let b = json.run().unwrap();
    assert_eq!(a.trace().unwrap().to_csv(), b.trace().unwrap().to_csv());
}

#[test]
fn test_graph_dump_from_config() {
    let config = SimConfig::from_yaml(OFF_DELAY_YAML).unwrap();
    let graph = config.build_graph().unwrap();

    let dump = graph.dump();
    assert!(dump.contains("p1 input (b1 fan.)"));
    assert!(dump.contains("0: b0 switch"));
    assert!(dump.contains("1: b1 fan"));
}

#[test]
fn test_trace_csv_file_export() {
    let dir = tempfile::tempdir().unwrap();
    let config = SimConfig::from_yaml(OFF_DELAY_YAML).unwrap();
    let exec = config.run().unwrap();

    let path = dir.path().join("trace.csv");
    exec.trace().unwrap().write_csv_file(&path).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 21);
}

#[test]
fn test_invalid_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "broken.yml", "simulation: [not, a, map]\n");
    assert!(matches!(SimConfig::from_file(&path), Err(ConfigError::Yaml(_))));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");
    assert!(matches!(SimConfig::from_file(&path), Err(ConfigError::Io(_))));
}

#[test]
fn test_conflict_surfaces_as_circuit_error() {
    // Unspecified pin on a net with both an input and an output.
    let yaml = r#"
page:
  blocks:
    - { id: 0, name: Signal, pins: [0] }
    - { id: 1, name: Output, pins: [1] }
    - { id: 2, name: NOT, pins: [2] }
  pins:
    - { id: 0, kind: output, owner: 0 }
    - { id: 1, kind: input, owner: 1 }
    - { id: 2, kind: unspecified, owner: 2 }
  wires:
    - { id: 0, start: 0, end: 1 }
    - { id: 1, start: 2, end: 1 }
    - { id: 2, start: 2, end: 0 }
"#;
    let config = SimConfig::from_yaml(yaml).unwrap();
    match config.executor() {
        Err(ConfigError::Circuit(CircuitError::WiringConflict { pin })) => assert_eq!(pin.0, 2),
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("conflict not detected"),
    }
}

#[test]
fn test_builder_roundtrip_through_yaml() {
    let mut page = circuitry::Page::new();
    let src = page.add_block("Signal");
    page.add_output(src, "q");

    let config = SimConfigBuilder::new()
        .resolution_ms(10)
        .max_cycles(3)
        .log_level("debug")
        .page(page)
        .force_at(2, src, Logic::True)
        .build()
        .unwrap();

    let back = SimConfig::from_yaml(&config.to_yaml().unwrap()).unwrap();
    assert_eq!(back, config);

    let exec = back.run().unwrap();
    assert_eq!(exec.state(src), Some(Logic::True));
    assert!(exec.trace().is_none());
}
