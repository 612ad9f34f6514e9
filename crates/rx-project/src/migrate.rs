//! Schema migration framework.

use crate::ProjectError;
use crate::schema::Scenario;

pub const LATEST_VERSION: u32 = 1;

pub fn migrate_to_latest(mut scenario: Scenario) -> Result<Scenario, ProjectError> {
    while scenario.version < LATEST_VERSION {
        scenario = migrate_one_version(scenario)?;
    }
    Ok(scenario)
}

fn migrate_one_version(scenario: Scenario) -> Result<Scenario, ProjectError> {
    match scenario.version {
        0 => migrate_v0_to_v1(scenario),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Files that state `version: 0` share the version 1 layout. A file with no
/// `version` key deserializes as [`LATEST_VERSION`] and skips this step.
fn migrate_v0_to_v1(mut scenario: Scenario) -> Result<Scenario, ProjectError> {
    scenario.version = 1;
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrate_latest_is_noop() {
        let scenario = Scenario::default();
        let migrated = migrate_to_latest(scenario.clone()).unwrap();
        assert_eq!(migrated, scenario);
    }

    #[test]
    fn migrate_v0_bumps_version() {
        let scenario = Scenario {
            version: 0,
            name: "legacy".to_string(),
            ..Scenario::default()
        };
        let migrated = migrate_to_latest(scenario).unwrap();
        assert_eq!(migrated.version, LATEST_VERSION);
        assert_eq!(migrated.name, "legacy");
    }

    #[test]
    fn explicit_v0_file_is_migrated_and_missing_version_is_latest() {
        let legacy = crate::from_yaml_str("version: 0\nname: legacy\n").unwrap();
        assert_eq!(legacy.version, LATEST_VERSION);
        assert_eq!(legacy.name, "legacy");

        let unversioned = crate::from_yaml_str("name: unversioned\n").unwrap();
        assert_eq!(unversioned.version, LATEST_VERSION);
    }
}
