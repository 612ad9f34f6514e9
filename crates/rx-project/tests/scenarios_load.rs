use std::path::Path;

#[test]
fn bundled_scenarios_load_and_validate() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../scenarios");
    let scenarios = ["default.yaml", "setpoint_step.yaml", "open_loop.json"];

    for name in scenarios {
        let path = root.join(name);
        let scenario = rx_project::load(&path)
            .unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e));
        rx_project::validate_scenario(&scenario)
            .unwrap_or_else(|e| panic!("Failed to validate {}: {}", name, e));
    }
}

#[test]
fn default_file_matches_built_in_defaults() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../scenarios/default.yaml");
    let scenario = rx_project::load(&path).unwrap();
    assert_eq!(scenario, rx_project::Scenario::default());
}

#[test]
fn setpoint_step_edits_land_inside_the_default_run() {
    // rx-cli runs for 1800 s unless told otherwise; an edit at the final
    // boundary never reaches a tick.
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../scenarios/setpoint_step.yaml");
    let scenario = rx_project::load(&path).unwrap();
    assert!(!scenario.edits.is_empty());
    for edit in &scenario.edits {
        assert!(edit.at_s < 1800.0, "edit at {} s is never applied", edit.at_s);
    }
}
