//! Integration tests for CLI commands.
//!
//! Each test runs `mcctl` against file stores in temporary directories. The
//! management and data clusters get separate data dirs, as they would on
//! separate hosts.

#![allow(deprecated)] // Command::cargo_bin is deprecated but replacement requires newer assert_cmd

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A project directory with isolated config lookup.
struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn data_dir(&self, name: &str) -> String {
        self.path().join(name).to_str().unwrap().to_string()
    }

    /// `mcctl` against the store in `<project>/<store>`.
    fn mcctl(&self, store: &str) -> Command {
        let mut cmd = Command::cargo_bin("mcctl").unwrap();
        cmd.env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join("xdg"))
            .env_remove("RUST_LOG")
            .args([
                "--no-color",
                "--project-dir",
                self.path().to_str().unwrap(),
                "--data-dir",
                &self.data_dir(store),
            ]);
        cmd
    }

    fn init_management(&self) {
        self.mcctl("mgmt")
            .args(["registration", "init-management", "prod"])
            .assert()
            .success();
    }

    fn add_cluster(&self, name: &str, capacity: &str) {
        self.mcctl("mgmt")
            .args([
                "cluster",
                "add",
                name,
                "--connection-string",
                &format!("fdb://{name}"),
                "--capacity",
                capacity,
            ])
            .assert()
            .success();
    }

    fn export(&self, name: &str) -> String {
        let output = self
            .mcctl("mgmt")
            .args(["registration", "export-data", name])
            .output()
            .unwrap();
        assert!(output.status.success(), "export failed: {output:?}");
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }
}

// ============================================================================
// Registration Commands
// ============================================================================

#[test]
fn new_cluster_is_standalone() {
    let project = Project::new();
    project
        .mcctl("mgmt")
        .args(["registration", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("standalone"));
}

#[test]
fn init_management_registers_once() {
    let project = Project::new();
    project.init_management();

    project
        .mcctl("mgmt")
        .args(["registration", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("metacluster_management"))
        .stdout(predicate::str::contains("metacluster name: prod"));

    project
        .mcctl("mgmt")
        .args(["registration", "init-management", "prod"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already registered"));
}

#[test]
fn export_import_and_verify() {
    let project = Project::new();
    project.init_management();
    project.add_cluster("dc1", "10");

    let registration = project.export("dc1");
    assert!(!registration.is_empty());

    project
        .mcctl("dc1")
        .args(["registration", "import", &registration])
        .assert()
        .success();

    project
        .mcctl("dc1")
        .args(["registration", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("metacluster_data"))
        .stdout(predicate::str::contains("data cluster name: dc1"));

    // Exporting again yields the same registration, so a repeat import is a
    // no-op and verify passes.
    assert_eq!(project.export("dc1"), registration);
    project
        .mcctl("dc1")
        .args(["registration", "import", &registration])
        .assert()
        .success();
    project
        .mcctl("dc1")
        .args(["registration", "verify", &registration])
        .assert()
        .success()
        .stderr(predicate::str::contains("Matches local registration"));
}

#[test]
fn import_rejects_registration_for_another_cluster() {
    let project = Project::new();
    project.init_management();
    project.add_cluster("dc1", "10");
    project.add_cluster("dc2", "10");

    let dc1 = project.export("dc1");
    let dc2 = project.export("dc2");

    project
        .mcctl("dc1")
        .args(["registration", "import", &dc1])
        .assert()
        .success();
    project
        .mcctl("dc1")
        .args(["registration", "import", &dc2])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already registered"));
    project
        .mcctl("dc1")
        .args(["registration", "verify", &dc2])
        .assert()
        .failure()
        .stderr(predicate::str::contains("registration mismatch"));
}

#[test]
fn verify_rejects_garbage() {
    let project = Project::new();
    project.init_management();
    project
        .mcctl("mgmt")
        .args(["registration", "verify", "not base64!"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid base64"));
}

#[test]
fn export_requires_known_cluster() {
    let project = Project::new();
    project.init_management();
    project
        .mcctl("mgmt")
        .args(["registration", "export-data", "dc9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown data cluster dc9"));
}

#[test]
fn clear_returns_to_standalone() {
    let project = Project::new();
    project.init_management();
    project
        .mcctl("mgmt")
        .args(["registration", "clear"])
        .assert()
        .success();
    project
        .mcctl("mgmt")
        .args(["registration", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("standalone"));
}

// ============================================================================
// Cluster Commands
// ============================================================================

#[test]
fn cluster_commands_need_management_cluster() {
    let project = Project::new();
    project
        .mcctl("mgmt")
        .args(["cluster", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("standalone"));
}

#[test]
fn cluster_add_list_show() {
    let project = Project::new();
    project.init_management();
    project.add_cluster("dc1", "10");

    project
        .mcctl("mgmt")
        .args(["cluster", "add", "dc1", "--connection-string", "fdb://x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    project
        .mcctl("mgmt")
        .args(["cluster", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dc1"))
        .stdout(predicate::str::contains("fdb://dc1"))
        .stdout(predicate::str::contains("(1 cluster)"));

    project
        .mcctl("mgmt")
        .args(["cluster", "show", "dc1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"cluster_state\": \"ready\""))
        .stdout(predicate::str::contains("\"connection_string\": \"fdb://dc1\""));
}

#[test]
fn cluster_limit_comes_from_config() {
    let project = Project::new();
    fs::write(
        project.path().join("metacluster.toml"),
        "[management]\nmax_data_clusters = 1\ndefault_capacity = 3\n",
    )
    .unwrap();
    project.init_management();

    project
        .mcctl("mgmt")
        .args(["cluster", "add", "dc1", "--connection-string", "fdb://dc1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("with capacity 3"));

    project
        .mcctl("mgmt")
        .args(["cluster", "add", "dc2", "--connection-string", "fdb://dc2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("maximum of 1"));
}

#[test]
fn lifecycle_gates_configuration_and_removal() {
    let project = Project::new();
    project.init_management();
    project.add_cluster("dc1", "10");

    project
        .mcctl("mgmt")
        .args(["cluster", "remove", "dc1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("set-state dc1 removing"));

    project
        .mcctl("mgmt")
        .args(["cluster", "configure", "dc1", "--capacity", "20"])
        .assert()
        .success();

    project
        .mcctl("mgmt")
        .args(["cluster", "set-state", "dc1", "removing"])
        .assert()
        .success();

    project
        .mcctl("mgmt")
        .args(["cluster", "configure", "dc1", "--capacity", "30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("need a ready cluster"));

    project
        .mcctl("mgmt")
        .args(["cluster", "set-state", "dc1", "ready"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("illegal data cluster state transition"));

    project
        .mcctl("mgmt")
        .args(["cluster", "remove", "dc1"])
        .assert()
        .success();

    project
        .mcctl("mgmt")
        .args(["cluster", "show", "dc1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown data cluster dc1"));
}

// ============================================================================
// Capacity and Check
// ============================================================================

#[test]
fn capacity_reports_totals() {
    let project = Project::new();
    project.init_management();
    project.add_cluster("dc1", "10");
    project.add_cluster("dc2", "5");

    project
        .mcctl("mgmt")
        .arg("capacity")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tenant group capacity"))
        .stdout(predicate::str::contains("15"))
        .stdout(predicate::str::contains("dc1"))
        .stdout(predicate::str::contains("dc2"));
}

#[test]
fn check_validates_data_cluster_slots() {
    let project = Project::new();
    project.init_management();
    project.add_cluster("dc1", "10");
    project.add_cluster("dc2", "10");

    let dc1 = project.export("dc1");
    project
        .mcctl("dc1")
        .args(["registration", "import", &dc1])
        .assert()
        .success();

    project
        .mcctl("mgmt")
        .args(["check", "--data-cluster", &format!("dc1={}", project.data_dir("dc1"))])
        .assert()
        .success()
        .stderr(predicate::str::contains("Data cluster dc1 registration valid"));

    // dc2's store holds dc1's registration: the names disagree.
    project.export("dc2");
    project
        .mcctl("dc2")
        .args(["registration", "import", &dc1])
        .assert()
        .success();
    project
        .mcctl("mgmt")
        .args(["check", "--data-cluster", &format!("dc2={}", project.data_dir("dc2"))])
        .assert()
        .failure()
        .stderr(predicate::str::contains("registered as dc1 is recorded as dc2"));
}

#[test]
fn check_fails_on_standalone_cluster() {
    let project = Project::new();
    project
        .mcctl("mgmt")
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no metacluster registration"));
}
