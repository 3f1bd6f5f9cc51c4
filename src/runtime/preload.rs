//! Host-side list preloading.
//!
//! The source format is one declaration per line:
//!
//! ```text
//! # comment
//! 3: [1.0, 2.0, 3.0]
//! 7: []
//! ```
//!
//! Parsing happens once; resolution copies each bound key into the list
//! store before any context runs.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::assembler::PreloadBinding;
use crate::core::{ListStore, VmError, VmResult, LIST_CAPACITY, LIST_COUNT};

/// Parsed preload source: key to float sequence, ordered by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreloadSource {
    entries: BTreeMap<u32, Vec<f32>>,
}

impl PreloadSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse preload text. A repeated key replaces the earlier values.
    pub fn parse(text: &str) -> VmResult<Self> {
        let mut source = Self::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, values) = parse_line(line, index + 1)?;
            if source.entries.insert(key, values).is_some() {
                warn!(key, line = index + 1, "duplicate preload key replaces earlier values");
            }
        }

        debug!(keys = source.len(), "parsed preload source");
        Ok(source)
    }

    pub fn insert(&mut self, key: u32, values: Vec<f32>) -> Option<Vec<f32>> {
        self.entries.insert(key, values)
    }

    pub fn get(&self, key: u32) -> Option<&[f32]> {
        self.entries.get(&key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }
}

fn syntax(line: usize, message: impl Into<String>) -> VmError {
    VmError::PreloadSyntax {
        line,
        message: message.into(),
    }
}

fn parse_line(line: &str, number: usize) -> VmResult<(u32, Vec<f32>)> {
    let (key, rest) = line
        .split_once(':')
        .ok_or_else(|| syntax(number, "expected `key: [values]`"))?;

    let key = key
        .trim()
        .parse::<u32>()
        .map_err(|_| syntax(number, format!("invalid key `{}`", key.trim())))?;

    let body = rest
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| syntax(number, "values must be enclosed in `[` and `]`"))?
        .trim();

    if body.is_empty() {
        return Ok((key, Vec::new()));
    }

    let mut parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.last() == Some(&"") {
        parts.pop();
    }

    let values = parts
        .into_iter()
        .map(|part| {
            if part.is_empty() {
                return Err(syntax(number, "empty value"));
            }
            part.parse::<f32>()
                .map_err(|_| syntax(number, format!("invalid float `{}`", part)))
        })
        .collect::<VmResult<Vec<f32>>>()?;

    Ok((key, values))
}

/// What a resolution pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreloadSummary {
    /// Lists filled from the source.
    pub loaded: usize,
    /// Bindings whose key was absent; their lists stay undeclared.
    pub missing: usize,
    /// Bindings whose values exceeded list capacity.
    pub truncated: usize,
    /// Bindings naming a list id outside the store.
    pub skipped: usize,
}

/// Apply the assembler's side table to the list store.
pub fn resolve(lists: &ListStore, bindings: &[PreloadBinding], source: &PreloadSource) -> PreloadSummary {
    let mut summary = PreloadSummary::default();

    for binding in bindings {
        if binding.list as usize >= LIST_COUNT {
            warn!(list = binding.list, pc = binding.pc, "preload into out-of-range list skipped");
            summary.skipped += 1;
            continue;
        }

        let Some(values) = source.get(binding.key) else {
            debug!(key = binding.key, list = binding.list, "preload key absent, list left undeclared");
            summary.missing += 1;
            continue;
        };

        if values.len() > LIST_CAPACITY {
            warn!(
                key = binding.key,
                list = binding.list,
                supplied = values.len(),
                capacity = LIST_CAPACITY,
                "preload truncated to list capacity"
            );
            summary.truncated += 1;
        }

        if lists.load(binding.list, values).is_some() {
            summary.loaded += 1;
        }
    }

    info!(
        loaded = summary.loaded,
        missing = summary.missing,
        truncated = summary.truncated,
        "preload resolved"
    );
    summary
}
