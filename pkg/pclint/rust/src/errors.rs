// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use thiserror::Error;

/// Structural failure: the input could not be turned into a [`crate::Document`].
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8: {source}")]
    Encoding {
        path: String,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("{path}:{line}:{column}: malformed YAML: {message}")]
    Syntax {
        path: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("{path}: top level must be a mapping")]
    NotAMapping { path: String },

    #[error("{path}: invalid document: {source}")]
    Schema {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{path}: invalid process '{process}': {source}")]
    Process {
        path: String,
        process: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A fix rule declined to rewrite the document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FixError {
    #[error("{rule}: no change made: {reason}")]
    Unsafe { rule: &'static str, reason: String },
}

impl FixError {
    pub(crate) fn unsafe_fix(rule: &'static str, reason: impl Into<String>) -> Self {
        FixError::Unsafe {
            rule,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown rule '{0}'")]
pub struct UnknownRule(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown graph format '{0}' (expected ascii, mermaid, json or yaml)")]
pub struct UnknownGraphFormat(pub String);

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("could not encode graph as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not encode graph as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
