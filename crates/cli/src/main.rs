mod loader;

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;
use transcript_view_core::{flatten_conversation, FlattenConfig, FlattenedConversation, SearchState};
use transcript_view_types::FlattenedItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// The full flattened conversation as pretty JSON
    Json,
    /// One line per render item
    Summary,
}

#[derive(Parser)]
#[command(
    name = "transcript-view",
    about = "Flatten a chat transcript into an ordered, grouped render sequence"
)]
struct Cli {
    /// Transcript file (JSONL, JSON array, or object with `messages`)
    path: PathBuf,

    /// Hide a message uuid (repeatable)
    #[arg(long = "hide", value_name = "UUID")]
    hide: Vec<String>,

    /// TOML file with pipeline settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the task-operation grouping window
    #[arg(long, value_name = "MS")]
    window_ms: Option<u64>,

    /// Override the traversal coverage threshold (0.0 - 1.0)
    #[arg(long, value_name = "RATIO")]
    orphan_threshold: Option<f64>,

    /// Print where each uuid would scroll to (repeatable)
    #[arg(long = "locate", value_name = "UUID")]
    locate: Vec<String>,

    /// JSON search state whose matches are marked on each card
    #[arg(long, value_name = "FILE")]
    search_state: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

fn load_config(cli: &Cli) -> anyhow::Result<FlattenConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            FlattenConfig::from_toml_str(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => FlattenConfig::default(),
    };
    if let Some(window) = cli.window_ms {
        config = config.with_window_ms(window);
    }
    if let Some(threshold) = cli.orphan_threshold {
        config = config.with_orphan_threshold(threshold);
    }
    config.validate().context("invalid pipeline settings")?;
    Ok(config)
}

fn load_search_state(path: &Path) -> anyhow::Result<SearchState> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading search state {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing search state {}", path.display()))
}

fn write_summary(
    out: &mut impl Write,
    conversation: &FlattenedConversation,
    search: Option<&SearchState>,
) -> std::io::Result<()> {
    for (i, item) in conversation.items.iter().enumerate() {
        match item {
            FlattenedItem::Message(m) => {
                let mut tags = Vec::new();
                if let Some(search) = search {
                    let highlight = search.highlight_for(&m.message.uuid);
                    if highlight.is_match {
                        tags.push("match".to_string());
                    }
                    if let Some(occurrence) = highlight.current_match_index {
                        tags.push(format!("current:{occurrence}"));
                    }
                }
                if let Some(g) = &m.agent_task_group {
                    tags.push(format!("agent-tasks:{}", g.tasks.len()));
                }
                if let Some(g) = &m.agent_progress_group {
                    tags.push(format!("agent-progress:{}", g.entries.len()));
                }
                if let Some(g) = &m.task_operation_group {
                    tags.push(format!("task-ops:{}", g.operations.len()));
                }
                writeln!(
                    out,
                    "{i:>5} {indent}{uuid} [{kind:?}] {tags}",
                    indent = "  ".repeat(m.depth.min(16)),
                    uuid = m.message.uuid,
                    kind = m.message.message_type,
                    tags = tags.join(" "),
                )?;
            }
            FlattenedItem::HiddenPlaceholder(p) => {
                writeln!(out, "{i:>5} <{} hidden>", p.hidden_count)?;
            }
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,transcript_view=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let search = cli.search_state.as_deref().map(load_search_state).transpose()?;

    let messages = loader::load_messages(&cli.path)
        .with_context(|| format!("loading {}", cli.path.display()))?;
    let loaded = messages.len();
    let hidden: HashSet<String> = cli.hide.iter().cloned().collect();

    let conversation = flatten_conversation(messages, &hidden, &config);
    let diag = &conversation.diagnostics;
    info!(
        loaded,
        items = conversation.items.len(),
        cards = conversation.message_count(),
        duplicates = diag.duplicates_removed,
        merged = diag.merged_command_outputs,
        cycles = diag.cycles.len(),
        recovered = diag.recovered_orphans,
        fallback = diag.fallback_triggered,
        "Flattened transcript"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &conversation)
                .context("writing JSON output")?;
            writeln!(out)?;
        }
        OutputFormat::Summary => write_summary(&mut out, &conversation, search.as_ref())?,
    }
    if let Some(search) = search.as_ref().filter(|s| s.is_active()) {
        let cards = conversation
            .items
            .iter()
            .filter_map(FlattenedItem::uuid)
            .filter(|uuid| search.highlight_for(uuid).is_match)
            .count();
        info!(query = %search.query, matches = search.matches.len(), cards, "Applied search state");
        if let Some(current) = search.current_match() {
            match conversation.scroll_index_for(&current.message_uuid) {
                Some(idx) => info!(uuid = %current.message_uuid, index = idx, "Current search match"),
                None => info!(uuid = %current.message_uuid, "Current search match not in render sequence"),
            }
        }
    }
    for uuid in &cli.locate {
        match conversation.scroll_index_for(uuid) {
            Some(idx) => info!(%uuid, index = idx, "Located message"),
            None => info!(%uuid, "Message not in render sequence"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use transcript_view_types::Message;

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["transcript-view", "t.jsonl", "--window-ms", "2500", "--hide", "a", "--hide", "b"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.task_operation_window_ms, 2500);
        assert_eq!(cli.hide, vec!["a", "b"]);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_config_file_then_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.toml");
        std::fs::write(&path, "task_operation_window_ms = 9000\norphan_recovery_threshold = 0.5\n").unwrap();
        let path = path.to_str().unwrap();
        let cli = Cli::parse_from([
            "transcript-view",
            "t.jsonl",
            "--config",
            path,
            "--orphan-threshold",
            "0.75",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.task_operation_window_ms, 9000);
        assert_eq!(config.orphan_recovery_threshold, 0.75);
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let cli = Cli::parse_from(["transcript-view", "t.jsonl", "--orphan-threshold", "1.5"]);
        assert!(load_config(&cli).is_err());
    }

    #[test]
    fn test_summary_lines() {
        let hidden: HashSet<String> = ["b".to_string()].into();
        let conversation = flatten_conversation(
            vec![
                Message::user("a", "x"),
                Message::user("b", "y").with_parent("a"),
                Message::user("c", "z").with_parent("b"),
            ],
            &hidden,
            &FlattenConfig::default(),
        );
        let mut buf = Vec::new();
        write_summary(&mut buf, &conversation, None).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("a [User]"));
        assert!(lines[1].ends_with("<1 hidden>"));
        assert!(lines[2].contains("c [User]"));
    }

    #[test]
    fn test_search_state_marks_cards() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search.json");
        std::fs::write(
            &path,
            r#"{"query":"cargo","matches":[{"messageUuid":"a","matchIndex":0},{"messageUuid":"c","matchIndex":0},{"messageUuid":"c","matchIndex":2}],"currentMatchIndex":2}"#,
        )
        .unwrap();
        let cli = Cli::parse_from(["transcript-view", "t.jsonl", "--search-state", path.to_str().unwrap()]);
        let search = load_search_state(cli.search_state.as_deref().unwrap()).unwrap();
        assert_eq!(search.current_match().map(|m| m.message_uuid.as_str()), Some("c"));

        let conversation = flatten_conversation(
            vec![
                Message::user("a", "cargo build"),
                Message::user("b", "ok").with_parent("a"),
                Message::user("c", "cargo test, cargo run").with_parent("b"),
            ],
            &HashSet::new(),
            &FlattenConfig::default(),
        );
        let mut buf = Vec::new();
        write_summary(&mut buf, &conversation, Some(&search)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].ends_with("match"));
        assert!(!lines[1].contains("match"));
        assert!(lines[2].ends_with("match current:2"));
    }

    #[test]
    fn test_malformed_search_state_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_search_state(&path).unwrap_err();
        assert!(err.to_string().contains("search.json"));
    }
}
