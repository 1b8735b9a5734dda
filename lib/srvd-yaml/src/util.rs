/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::Path;

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, YamlLoader};

/// Parse all documents in a yaml string.
pub fn load_doc_str(content: &str) -> anyhow::Result<Vec<Yaml>> {
    YamlLoader::load_from_str(content).map_err(|e| anyhow!("invalid yaml content: {e}"))
}

/// Call `f` on each document of the yaml file at `path`.
pub fn foreach_doc<F>(path: &Path, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(usize, &Yaml) -> anyhow::Result<()>,
{
    let content = std::fs::read_to_string(path)
        .context(format!("failed to read in file {}", path.display()))?;
    let docs = load_doc_str(&content).context(format!("in file {}", path.display()))?;
    for (i, doc) in docs.iter().enumerate() {
        f(i, doc).context(format!("failed to load doc #{i} in {}", path.display()))?;
    }
    Ok(())
}
