// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use super::{read_document, runtime, Document, Project};
use crate::error::Result;

pub fn run(store: &str, file: &Path) -> Result<()> {
    let project = Project::open()?;
    let data = read_document(file)?;
    let keys = load(&project, store, data)?;
    println!("Loaded {} key(s) into '{}'", keys, store);
    Ok(())
}

/// Hydrates a store's cache with backend data; returns the number of keys.
pub(crate) fn load(project: &Project, store: &str, data: Document) -> Result<usize> {
    let runtime = runtime()?;
    let _guard = runtime.enter();
    let store = project.open_store(store)?;
    let keys = data.len();
    store.load_from_backend(data);
    Ok(keys)
}
