// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

/// Result of one dd-pclint invocation.
pub struct Run {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Run {
    pub fn assert_code(&self, expected: i32) -> &Self {
        assert_eq!(
            self.code,
            Some(expected),
            "unexpected exit status\n--- stdout\n{}\n--- stderr\n{}",
            self.stdout,
            self.stderr
        );
        self
    }
}

/// Run dd-pclint with `args` in `dir` (or the current directory). The
/// target-file environment variable is cleared unless given in `envs`.
pub fn run_in(dir: Option<&Path>, envs: &[(&str, &str)], args: &[&str]) -> Run {
    let bin = env!("CARGO_BIN_EXE_dd-pclint");
    let mut cmd = Command::new(bin);
    cmd.args(args)
        .env_remove("DD_PCLINT_FILE")
        .env_remove("DD_PCLINT_LOG_LEVEL");
    for (key, value) in envs {
        cmd.env(key, value);
    }
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }
    let output = cmd.output().expect("failed to run dd-pclint");
    Run {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}

pub fn run(args: &[&str]) -> Run {
    run_in(None, &[], args)
}

pub fn testdata(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join(name)
}

/// Path of a testdata file as a string argument.
pub fn fixture(name: &str) -> String {
    testdata(name).display().to_string()
}

/// Write `content` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("failed to write fixture");
    path
}
