// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Shared helpers for unit tests.
#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use crate::document::Document;
use std::path::PathBuf;

/// Get the base path for testdata files.
pub fn testdata_path() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(manifest_dir).join("testdata")
}

/// Parse an inline YAML fixture, panicking on structural errors.
pub fn doc(yaml: &str) -> Document {
    match crate::parse("process-compose.yaml", yaml) {
        Ok(doc) => doc,
        Err(e) => panic!("fixture failed to parse: {e}"),
    }
}
