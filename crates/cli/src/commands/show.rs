// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ss_core::persist::load_payload;

use super::{Document, Project};
use crate::cli::OutputFormat;
use crate::config::StoreSettings;
use crate::error::Result;

pub fn run(store: &str, output: OutputFormat) -> Result<()> {
    let project = Project::open()?;
    println!("{}", render(&project, store, output)?);
    Ok(())
}

/// Renders a store's cached payload. Stores never written show as `{}`.
pub(crate) fn render(project: &Project, store: &str, output: OutputFormat) -> Result<String> {
    let settings = project.config.store(store)?;
    let persistence = project.persistence()?;
    let data: Document = load_payload(persistence.as_ref(), store)?.unwrap_or_default();

    match output {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&data)?),
        OutputFormat::Text => format_text(store, settings, &data),
    }
}

fn format_text(store: &str, settings: &StoreSettings, data: &Document) -> Result<String> {
    Ok(format!(
        "store: {}\nendpoint: {}\nstrategy: {}\ndata:\n{}",
        store,
        settings.endpoint,
        settings.strategy,
        serde_json::to_string_pretty(data)?
    ))
}

#[cfg(test)]
#[path = "show_tests.rs"]
mod tests;
