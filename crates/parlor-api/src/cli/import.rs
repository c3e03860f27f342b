//! `parlor import`: load a legacy JSON data set into SQLite.

use std::path::Path;

use anyhow::Context;

use parlor_infra::import::{ImportSummary, import_legacy};
use parlor_infra::sqlite::chat::SqliteChatRepository;
use parlor_infra::sqlite::profile::SqliteProfileRepository;
use parlor_infra::sqlite::prompt::SqlitePromptRepository;

use crate::state::AppState;

pub async fn run(state: &AppState, from: &Path, json: bool) -> anyhow::Result<()> {
    if !from.is_dir() {
        anyhow::bail!("{} is not a directory", from.display());
    }

    let summary = import_legacy(
        from,
        &SqliteChatRepository::new(state.db_pool.clone()),
        &SqliteProfileRepository::new(state.db_pool.clone()),
        &SqlitePromptRepository::new(state.db_pool.clone()),
    )
    .await
    .with_context(|| format!("import from {} failed", from.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(from, &summary);
    }
    Ok(())
}

fn print_summary(from: &Path, summary: &ImportSummary) {
    println!();
    println!(
        "  {} Imported legacy data from {}",
        console::style("✓").green().bold(),
        console::style(from.display()).cyan()
    );
    println!();
    println!(
        "  Chats:    {} imported, {} already present",
        summary.chats_imported, summary.chats_skipped
    );
    println!("  Messages: {}", summary.messages_imported);
    println!("  Profiles: {}", summary.profiles_imported);
    println!(
        "  Prompts:  {}",
        if summary.prompts_seeded {
            "catalog seeded"
        } else {
            "unchanged"
        }
    );
    println!();
}
