use clap::Parser;
use colored::*;
use notemark::api::NotemarkApi;
use notemark::commands::{CmdMessage, CmdResult, MessageLevel};
use notemark::config::{self, NotemarkConfig};
use notemark::editor::edit_text;
use notemark::error::{NotemarkError, Result};
use notemark::index::DisplayNote;
use notemark::store::fs::FileStore;
use notemark::sync::{PassAction, PassSummary, StatusReport};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use unicode_width::UnicodeWidthStr;

mod args;
use args::{Cli, Commands, NotesCommand, SyncCommand};

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("notemark=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    api: NotemarkApi<FileStore>,
    config: NotemarkConfig,
    data_dir: PathBuf,
}

impl AppContext {
    fn sync_root(&self, flag: &Option<PathBuf>) -> PathBuf {
        flag.clone()
            .unwrap_or_else(|| self.config.sync_root(&self.data_dir))
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut ctx = init_context()?;

    match cli.command {
        Commands::Notes(cmd) => handle_notes(&mut ctx, cmd),
        Commands::Folders { json } => handle_folders(&ctx, json),
        Commands::Sync(cmd) => handle_sync(&mut ctx, cmd),
    }
}

fn init_context() -> Result<AppContext> {
    let data_dir = config::data_dir()?;
    let config = NotemarkConfig::load(&data_dir).unwrap_or_default();
    let store = FileStore::new(config::store_dir(&data_dir));
    Ok(AppContext {
        api: NotemarkApi::new(store),
        config,
        data_dir,
    })
}

fn handle_notes(ctx: &mut AppContext, cmd: NotesCommand) -> Result<()> {
    match cmd {
        NotesCommand::List { folder, json } => {
            let result = ctx.api.list_notes(folder.as_deref())?;
            if json {
                print_notes_json(&result.listed_notes)?;
            } else {
                print_notes(&result.listed_notes);
            }
            print_messages(&result.messages);
        }
        NotesCommand::View { index, json } => {
            let result = ctx.api.view_note(&index)?;
            if json {
                print_view_json(&result)?;
            } else if let Some(text) = &result.body_text {
                println!("{}", text);
            }
        }
        NotesCommand::Add { folder, text } => {
            let text = match text {
                Some(text) => text,
                None => edit_text("")?,
            };
            let result = ctx.api.create_note(folder.as_deref(), &text)?;
            print_messages(&result.messages);
        }
        NotesCommand::Edit { index } => {
            let viewed = ctx.api.view_note(&index)?;
            let id = viewed.affected_notes[0].id;
            let old = viewed.body_text.unwrap_or_default();
            let new = edit_text(&old)?;
            if new == old {
                println!("{}", "No changes.".dimmed());
                return Ok(());
            }
            let result = ctx.api.update_note(id, &old, &new)?;
            print_messages(&result.messages);
        }
        NotesCommand::Replace {
            index,
            find,
            replace,
        } => {
            let result = ctx.api.replace_in_note(&index, &find, &replace)?;
            print_messages(&result.messages);
        }
        NotesCommand::Delete { index } => {
            let result = ctx.api.delete_note(&index)?;
            print_messages(&result.messages);
        }
        NotesCommand::Move { index, folder } => {
            let result = ctx.api.move_note(&index, &folder)?;
            print_messages(&result.messages);
        }
        NotesCommand::Search { query } => {
            let result = ctx.api.search_notes(&query)?;
            print_notes(&result.listed_notes);
            print_messages(&result.messages);
        }
        NotesCommand::Pin { index } => {
            let result = ctx.api.pin_note(&index)?;
            print_messages(&result.messages);
        }
        NotesCommand::Unpin { index } => {
            let result = ctx.api.unpin_note(&index)?;
            print_messages(&result.messages);
        }
        NotesCommand::Check { index, item, undo } => {
            let result = match item {
                Some(item) => ctx.api.set_checklist_item(&index, item, !undo)?,
                None => {
                    let result = ctx.api.checklist(&index)?;
                    for (i, item) in result.checklist.iter().enumerate() {
                        let marker = if item.done { "x" } else { " " };
                        println!("{:>3}. [{}] {}", i + 1, marker, item.text);
                    }
                    result
                }
            };
            print_messages(&result.messages);
        }
        NotesCommand::Table { index, number } => {
            let result = ctx.api.table(&index, number)?;
            if let Some(table) = &result.table {
                print_table(table);
            }
        }
        NotesCommand::Tags { index } => {
            let result = match index {
                Some(index) => ctx.api.note_tags(&index)?,
                None => ctx.api.tag_census()?,
            };
            for (tag, count) in &result.tags {
                if *count > 1 {
                    println!("#{} {}", tag, format!("({})", count).dimmed());
                } else {
                    println!("#{}", tag);
                }
            }
            print_messages(&result.messages);
        }
        NotesCommand::Backlinks { title } => {
            let result = ctx.api.backlinks(&title)?;
            print_notes(&result.listed_notes);
            print_messages(&result.messages);
        }
        NotesCommand::Attachments { index, json } => {
            let result = ctx.api.attachments(&index)?;
            if json {
                print_attachments_json(&result)?;
            } else {
                for (i, att) in result.attachments.iter().enumerate() {
                    println!("{:>3}. {} {}", i + 1, att.name, att.id.dimmed());
                }
            }
            print_messages(&result.messages);
        }
        NotesCommand::Attach { index, file, at } => {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .ok_or_else(|| NotemarkError::Api(format!("Not a file path: {}", file.display())))?;
            let result = ctx.api.attach(&index, &name, at)?;
            print_messages(&result.messages);
        }
        NotesCommand::Detach { index, attachment } => {
            let result = ctx.api.detach(&index, attachment)?;
            print_messages(&result.messages);
        }
    }
    Ok(())
}

fn handle_folders(ctx: &AppContext, json: bool) -> Result<()> {
    let result = ctx.api.list_folders()?;
    if json {
        let rows: Vec<_> = result
            .folders
            .iter()
            .map(|(name, count)| serde_json::json!({ "name": name, "notes": count }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for (name, count) in &result.folders {
            println!("{} {}", name, format!("({})", count).dimmed());
        }
        print_messages(&result.messages);
    }
    Ok(())
}

fn handle_sync(ctx: &mut AppContext, cmd: SyncCommand) -> Result<()> {
    let folder = ctx.config.default_folder.clone();
    match cmd {
        SyncCommand::Backup { dir } => {
            let root = ctx.sync_root(&dir);
            let summary = ctx.api.sync_backup(&root, &folder)?;
            println!(
                "Backed up {} note(s) to {}",
                summary.count(PassAction::CreatedFile),
                root.display()
            );
            print_pass_details(&summary);
        }
        SyncCommand::Run { dir } => {
            let root = ctx.sync_root(&dir);
            let summary = ctx.api.sync_run(&root, &folder)?;
            print_pass_summary(&summary);
        }
        SyncCommand::Watch { dir, interval } => {
            let root = ctx.sync_root(&dir);
            let secs = interval.unwrap_or(ctx.config.watch_interval_secs);
            println!(
                "Watching {} every {}s (Ctrl-C to stop)",
                root.display(),
                secs
            );
            let stop = AtomicBool::new(false);
            ctx.api.sync_watch(
                &root,
                &folder,
                Duration::from_secs(secs),
                &stop,
                |outcome| match outcome {
                    Ok(summary) => print_pass_summary(summary),
                    Err(e) => eprintln!("{}", format!("Pass failed: {}", e).red()),
                },
            );
        }
        SyncCommand::Status { dir } => {
            let root = ctx.sync_root(&dir);
            let reports = ctx.api.sync_status(&root, &folder)?;
            print_status(&reports);
        }
    }
    Ok(())
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const PIN_MARKER: &str = "⚲";

fn print_notes(notes: &[DisplayNote]) {
    for dn in notes {
        let idx_str = format!("{}. ", dn.index);
        let prefix = if dn.note.is_pinned {
            format!("{} ", PIN_MARKER)
        } else {
            "  ".to_string()
        };

        let title = dn.note.title();
        let preview: String = dn
            .note
            .body
            .to_editable()
            .text
            .lines()
            .skip(1)
            .collect::<Vec<_>>()
            .join(" ")
            .chars()
            .take(50)
            .collect();
        let line = if preview.trim().is_empty() {
            title
        } else {
            format!("{}  {}", title, preview.trim())
        };

        let time_ago = format_time_ago(dn.note.modified_at);
        let fixed = prefix.width() + idx_str.width() + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed);
        let shown = truncate_to_width(&line, available);
        let padding = available.saturating_sub(shown.width());

        println!(
            "{}{}{}{}{}",
            prefix,
            idx_str.yellow(),
            shown,
            " ".repeat(padding),
            time_ago.dimmed()
        );
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }
    result
}

fn format_time_ago(timestamp: chrono::DateTime<chrono::Utc>) -> String {
    let duration = chrono::Utc::now().signed_duration_since(timestamp);
    let formatter = timeago::Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

fn print_table(table: &notemark::structure::Table) {
    let mut widths: Vec<usize> = table.header.iter().map(|h| h.width()).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.width());
            } else {
                widths.push(cell.width());
            }
        }
    }

    let render_row = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let target = widths.get(i).copied().unwrap_or(0);
                format!("{}{}", cell, " ".repeat(target.saturating_sub(cell.width())))
            })
            .collect();
        padded.join("  ")
    };

    println!("{}", render_row(&table.header).bold());
    for row in &table.rows {
        println!("{}", render_row(row));
    }
}

fn print_pass_summary(summary: &PassSummary) {
    println!("{}", summary.one_line());
    print_pass_details(summary);
}

fn print_pass_details(summary: &PassSummary) {
    for report in &summary.reports {
        match report.action {
            PassAction::Unchanged => {}
            PassAction::Conflicted => {
                println!(
                    "  {} {} {}",
                    report.action.label().red(),
                    report.title,
                    report.detail.as_deref().unwrap_or("").dimmed()
                );
            }
            PassAction::Skipped => {
                println!(
                    "  {} {} {}",
                    report.action.label().yellow(),
                    report.title,
                    report.detail.as_deref().unwrap_or("").dimmed()
                );
            }
            _ => println!("  {} {}", report.action.label().green(), report.title),
        }
    }
}

fn print_status(reports: &[StatusReport]) {
    if reports.is_empty() {
        println!("{}", "Everything in sync.".dimmed());
        return;
    }
    for report in reports {
        println!("{} {}", report.status.label().yellow(), report.title);
        if let Some(diff) = &report.diff {
            for line in diff.lines() {
                let styled = if line.starts_with('+') {
                    line.green()
                } else if line.starts_with('-') {
                    line.red()
                } else {
                    line.dimmed()
                };
                println!("    {}", styled);
            }
        }
    }
}

#[derive(Serialize)]
struct NoteSummaryJson {
    index: String,
    id: String,
    title: String,
    folder: String,
    pinned: bool,
    modified_at: String,
}

fn print_notes_json(notes: &[DisplayNote]) -> Result<()> {
    let rows: Vec<NoteSummaryJson> = notes
        .iter()
        .map(|dn| NoteSummaryJson {
            index: dn.index.to_string(),
            id: dn.note.id.to_string(),
            title: dn.note.title(),
            folder: dn.note.folder.clone(),
            pinned: dn.note.is_pinned,
            modified_at: dn.note.modified_at.to_rfc3339(),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn print_view_json(result: &CmdResult) -> Result<()> {
    let note = &result.affected_notes[0];
    let payload = serde_json::json!({
        "id": note.id.to_string(),
        "title": note.title(),
        "folder": note.folder,
        "text": result.body_text,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn print_attachments_json(result: &CmdResult) -> Result<()> {
    let rows: Vec<_> = result
        .attachments
        .iter()
        .map(|a| {
            serde_json::json!({
                "id": a.id,
                "name": a.name,
                "position": a.position,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
