//! Helpers for running the `pfmp` binary in isolation.
#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use pfmp::test_utils::{TEST_SECRET_KEY, TEST_TITLE_ID};

/// Variables that would leak the developer's setup into a test run.
const AMBIENT_VARS: &[&str] = &[
    "PFMP_TITLE_ID",
    "PFMP_SECRET_KEY",
    "PFMP_CONFIG",
    "PFMP_FORMAT",
    "PFMP_PRETTY",
    "PFMP_NO_COLOR",
    "PFMP_PRODUCTION_URL",
    "PFMP_TIMEOUT",
    "PFMP_PAGE_SIZE",
    "PFMP_LOG",
    "PFMP_LOG_FORMAT",
    "NO_COLOR",
    "RUST_LOG",
];

/// `pfmp` with every file under `home`, no credentials and logs sent to
/// `home/pfmp.log` so stderr only carries command output.
pub fn bare(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pfmp").unwrap();
    for var in AMBIENT_VARS {
        cmd.env_remove(var);
    }
    cmd.env("PFMP_HOME", home)
        .env("PFMP_LOG_FILE", home.join("pfmp.log"))
        .arg("--no-color");
    cmd
}

/// `pfmp` authenticated as the test title against `base_url`.
pub fn against(home: &Path, base_url: &str) -> Command {
    let mut cmd = bare(home);
    cmd.env("PFMP_TITLE_ID", TEST_TITLE_ID)
        .env("PFMP_SECRET_KEY", TEST_SECRET_KEY)
        .args(["--production-environment-url", base_url]);
    cmd
}
