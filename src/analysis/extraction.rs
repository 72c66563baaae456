// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Extraction of a JSON object from free-form model output
//!
//! Critique replies are requested as JSON but arrive as prose: leading
//! chatter, markdown fences, trailing commentary. This module pulls the
//! first object out of that text. Failures never propagate - the caller
//! gets an empty map and must treat missing keys as a valid low-quality
//! outcome.

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

/// Extract a JSON object from a model reply
///
/// Selection order:
/// 1. the interior of the first fenced code block (` ```json ... ``` `,
///    the `json` tag optional);
/// 2. otherwise the first `{ ... }` substring, matched non-greedily
///    across newlines.
///
/// The non-greedy fallback stops at the first `}`, so an unfenced reply
/// with nested objects truncates and fails to parse. That limit is part
/// of the contract; fenced replies are anchored to the closing fence and
/// survive nesting.
pub fn extract_json(text: &str) -> Map<String, Value> {
    match try_extract_object(text) {
        Ok(fields) => fields,
        Err(e) => {
            warn!("Error extracting JSON from model reply: {:#}", e);
            Map::new()
        }
    }
}

fn try_extract_object(text: &str) -> Result<Map<String, Value>> {
    let fenced = Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap();
    let bare = Regex::new(r"(?s)(\{.*?\})").unwrap();

    let candidate = match fenced.captures(text) {
        Some(caps) => caps.get(1).map(|m| m.as_str()),
        None => bare.captures(text).and_then(|caps| caps.get(1)).map(|m| m.as_str()),
    };

    let candidate = candidate.ok_or_else(|| anyhow!("no JSON object found in the reply"))?;

    serde_json::from_str::<Map<String, Value>>(candidate)
        .context("candidate substring is not a valid JSON object")
}
