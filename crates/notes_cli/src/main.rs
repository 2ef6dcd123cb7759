//! Command-line entry point for the audited notes service.
//!
//! # Responsibility
//! - Map one invocation to one unit of work against the notes core.
//! - Resolve the actor from `--user-id` / `NOTES_USER_ID`.
//! - Print responses and structured errors as JSON.

use clap::{Args, Parser, Subcommand};
use log::info;
use notes_core::db::open_db;
use notes_core::{
    default_log_level, init_logging, ApiError, ErrorKind, NotePatchRequest, NoteRequest,
    NotesApi, RequestContext,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "notes", version, about = "Notes with an attributable audit trail")]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "NOTES_DB_PATH", default_value = "notes.sqlite3")]
    db: PathBuf,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "NOTES_LOG_DIR")]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "NOTES_LOG_LEVEL")]
    log_level: Option<String>,

    /// Actor recorded in the audit trail (`X-User-Id`). Defaults to `system`.
    #[arg(long, env = "NOTES_USER_ID")]
    user_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a note.
    Create(NoteFields),
    /// List all notes.
    List,
    /// Show one note.
    Get { id: Uuid },
    /// Replace title, content and tags of a note.
    Update {
        id: Uuid,
        #[command(flatten)]
        fields: NoteFields,
    },
    /// Change only the given fields of a note.
    Patch {
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        tags: Option<String>,
    },
    /// Delete a note.
    Delete { id: Uuid },
    /// Print core version and health.
    Ping,
}

#[derive(Debug, Args)]
struct NoteFields {
    #[arg(long)]
    title: String,
    #[arg(long)]
    content: Option<String>,
    /// Comma-separated tags.
    #[arg(long)]
    tags: Option<String>,
}

impl From<NoteFields> for NoteRequest {
    fn from(fields: NoteFields) -> Self {
        Self {
            title: fields.title,
            content: fields.content,
            tags: fields.tags,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    if let Command::Ping = cli.command {
        println!(
            "notes_core ping={} health={} version={}",
            notes_core::ping(),
            notes_core::health(),
            notes_core::core_version()
        );
        return ExitCode::SUCCESS;
    }

    let mut conn = match open_db(&cli.db) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("failed to open database `{}`: {err}", cli.db.display());
            return ExitCode::FAILURE;
        }
    };

    let ctx = RequestContext::new(cli.user_id.as_deref());
    info!("event=cli_command module=cli status=start");
    let mut api = NotesApi::new(&mut conn);
    let outcome = match cli.command {
        Command::Create(fields) => api
            .create(&ctx, &NoteRequest::from(fields))
            .and_then(|note| render(&note)),
        Command::List => api.list(&ctx).and_then(|notes| render(&notes)),
        Command::Get { id } => api.get(&ctx, id).and_then(|note| render(&note)),
        Command::Update { id, fields } => api
            .update(&ctx, id, &NoteRequest::from(fields))
            .and_then(|note| render(&note)),
        Command::Patch {
            id,
            title,
            content,
            tags,
        } => {
            let patch = NotePatchRequest {
                title,
                content,
                tags,
            };
            api.patch(&ctx, id, &patch).and_then(|note| render(&note))
        }
        Command::Delete { id } => api.delete(&ctx, id),
        Command::Ping => Ok(()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match serde_json::to_string_pretty(&err) {
                Ok(body) => eprintln!("{body}"),
                Err(_) => eprintln!("{err}"),
            }
            exit_code_for(&err)
        }
    }
}

fn render<T: Serialize>(value: &T) -> Result<(), ApiError> {
    let body = serde_json::to_string_pretty(value).map_err(|err| {
        ApiError::new(ErrorKind::InternalError, err.to_string(), "cli")
    })?;
    println!("{body}");
    Ok(())
}

fn exit_code_for(err: &ApiError) -> ExitCode {
    match err.code {
        ErrorKind::ValidationError => ExitCode::from(2),
        ErrorKind::NotFound => ExitCode::from(3),
        ErrorKind::InternalError => ExitCode::FAILURE,
    }
}
