//! Context command handlers

use std::io::Write;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use log::warn;

use crate::cli::{Command, IdentityField, OutputFormat};
use crate::config::Settings;
use crate::error::{GitCtxError, Result};

use super::models::{IdentityRecord, Registry};
use super::store::ContextStore;

/// Dispatch a subcommand, printing to stdout
pub fn run_context_command(settings: &Settings, command: &Command) -> Result<()> {
    let store = ContextStore::new(settings);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&store, command, &mut out)
}

fn execute(store: &ContextStore, command: &Command, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Create(args) => {
            store.create(&args.context_name, &args.user_name, &args.user_email)
        }
        Command::Use(args) => store.use_context(&args.context_name).map(|_| ()),
        Command::Update(args) => {
            store.update(&args.context_name, &args.user_name, &args.user_email)
        }
        Command::Delete(args) => store.delete(&args.context_name),
        Command::Show(args) => run_show(store, &args.fields, out),
        Command::List(args) if args.wide => run_list_wide(store, out),
        Command::List(_) => run_list(store, out),
        Command::View(args) => run_view(store, args.output, out),
    }
}

/// Print the active context name, then any requested fields
fn run_show(store: &ContextStore, fields: &[String], out: &mut impl Write) -> Result<()> {
    let registry = store.load()?;
    writeln!(out, "{}", registry.active_context)?;

    if fields.is_empty() {
        return Ok(());
    }
    let record = registry
        .active_record()
        .ok_or_else(|| GitCtxError::NotFound(registry.active_context.clone()))?;
    for name in fields {
        match IdentityField::from_name(name) {
            Some(field) => writeln!(out, "{}: {}", field, field_value(record, field))?,
            None => warn!("Ignoring unknown field '{}' (expected name or email)", name),
        }
    }
    Ok(())
}

fn field_value(record: &IdentityRecord, field: IdentityField) -> &str {
    match field {
        IdentityField::Name => &record.user_name,
        IdentityField::Email => &record.user_email,
    }
}

/// Print context names, one per line
fn run_list(store: &ContextStore, out: &mut impl Write) -> Result<()> {
    for name in store.list()? {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}

/// Print all contexts as a table
fn run_list_wide(store: &ContextStore, out: &mut impl Write) -> Result<()> {
    let registry = store.load()?;
    writeln!(out, "{}", contexts_table(&registry))?;
    Ok(())
}

fn contexts_table(registry: &Registry) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("CURRENT"),
            Cell::new("NAME"),
            Cell::new("USER NAME"),
            Cell::new("USER EMAIL"),
        ]);

    for (name, record) in &registry.contexts {
        let current_marker = if *name == registry.active_context {
            "*"
        } else {
            ""
        };
        table.add_row(vec![
            Cell::new(current_marker),
            Cell::new(name),
            Cell::new(display_or_unset(&record.user_name)),
            Cell::new(display_or_unset(&record.user_email)),
        ]);
    }
    table
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() {
        "<not set>"
    } else {
        value
    }
}

/// Display the registry contents
fn run_view(store: &ContextStore, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    let registry = store.load()?;
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&registry)?,
        OutputFormat::Yaml => serde_yml::to_string(&registry)
            .map_err(|e| GitCtxError::Config(format!("Failed to serialize registry: {}", e)))?,
    };
    writeln!(out, "{}", text.trim_end())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use tempfile::TempDir;

    fn test_store(dir: &TempDir) -> ContextStore {
        let store = ContextStore::new(&Settings::with_home(dir.path()));
        store
            .save(&Registry::with_default(IdentityRecord::new(
                "Default User",
                "default@example.com",
            )))
            .unwrap();
        store
    }

    fn run(store: &ContextStore, args: &[&str]) -> Result<String> {
        let cli = Cli::parse_from(std::iter::once("gitctx").chain(args.iter().copied()));
        let mut out = Vec::new();
        execute(store, &cli.command, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_end_to_end_work_context() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        run(
            &store,
            &[
                "create",
                "work",
                "--user-name",
                "Alice",
                "--user-email",
                "alice@example.com",
            ],
        )
        .unwrap();
        run(&store, &["use", "work"]).unwrap();

        assert_eq!(run(&store, &["show"]).unwrap(), "work\n");
        let fragment = store.writer().read("user").unwrap();
        assert_eq!(
            fragment,
            vec![
                ("name".to_string(), "Alice".to_string()),
                ("email".to_string(), "alice@example.com".to_string()),
            ]
        );
    }

    #[test]
    fn test_show_with_fields() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let output = run(&store, &["show", "--fields", "email", "--fields", "name"]).unwrap();
        assert_eq!(
            output,
            "default\nemail: default@example.com\nname: Default User\n"
        );
    }

    #[test]
    fn test_show_skips_unknown_fields() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let output = run(&store, &["show", "--fields", "user_name", "--fields", "name"]).unwrap();
        assert_eq!(output, "default\nname: Default User\n");
    }

    #[test]
    fn test_list_one_per_line() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.create("work", "Alice", "alice@example.com").unwrap();
        store.create("oss", "alice", "alice@oss.org").unwrap();
        assert_eq!(run(&store, &["list"]).unwrap(), "default\nwork\noss\n");
    }

    #[test]
    fn test_list_wide_marks_active() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.create("work", "Alice", "").unwrap();
        let output = run(&store, &["list", "--wide"]).unwrap();
        assert!(output.contains("CURRENT"));
        assert!(output.contains("USER EMAIL"));
        assert!(output.contains("default@example.com"));
        assert!(output.contains("<not set>"));
        let default_row = output.lines().find(|l| l.contains("Default User")).unwrap();
        assert!(default_row.contains('*'));
    }

    #[test]
    fn test_view_json() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let output = run(&store, &["view"]).unwrap();
        let parsed: Registry = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, store.load().unwrap());
    }

    #[test]
    fn test_view_yaml() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let output = run(&store, &["view", "-o", "yaml"]).unwrap();
        assert!(output.contains("active_context: default"));
        assert!(output.contains("user_email: default@example.com"));
    }

    #[test]
    fn test_errors_propagate() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        assert!(matches!(
            run(&store, &["use", "ghost"]).unwrap_err(),
            GitCtxError::NotFound(_)
        ));
        assert!(matches!(
            run(&store, &["delete", "default"]).unwrap_err(),
            GitCtxError::ProtectedContext(_)
        ));
    }

    #[test]
    fn test_display_or_unset() {
        assert_eq!(display_or_unset(""), "<not set>");
        assert_eq!(display_or_unset("x"), "x");
    }
}
