//! `cotonetes` command-line entry point.
//!
//! # Responsibility
//! - Parse arguments and configure logging.
//! - Run the export or import use case and report the outcome.
//! - Ask before overwriting an existing database on import.

mod prompt;

use clap::{Parser, Subcommand};
use cotonetes_core::{
    default_log_level, import_files, init_logging, read_notes_tree, run_export, ExportOptions,
    ImportOptions, ServiceError,
};
use log::info;
use prompt::{confirm, PromptError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "cotonetes")]
#[command(version)]
#[command(about = "Export notes to LaTeX and import them back", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when omitted
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export every category of a note database to LaTeX files
    Export {
        /// Path to the database file
        #[arg(long, default_value = "cotonetes.db")]
        db: PathBuf,

        /// Existing folder receiving the exported notes
        #[arg(long, default_value = "/tmp/export")]
        notes: PathBuf,
    },

    /// Import a tree of LaTeX files into a new note database
    Import {
        /// Path to the new database file
        #[arg(long, default_value = "cotonetes.db")]
        db: PathBuf,

        /// Folder containing the notes in LaTeX format
        #[arg(long, default_value = "/tmp/notes")]
        notes: PathBuf,

        /// Delete an existing database without asking
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug)]
enum CliError {
    Logging(String),
    Prompt(PromptError),
    Io { path: PathBuf, source: io::Error },
    Service(ServiceError),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(message) => write!(f, "failed to initialize logging: {message}"),
            Self::Prompt(err) => write!(f, "{err}"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Service(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(_) => None,
            Self::Prompt(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Service(err) => Some(err),
        }
    }
}

impl From<ServiceError> for CliError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<PromptError> for CliError {
    fn from(value: PromptError) -> Self {
        Self::Prompt(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    // Dropping the handle stops file logging, so it lives until `run` returns.
    let _logger = match cli.log_dir.as_deref() {
        Some(log_dir) => {
            let level = cli.log_level.as_deref().unwrap_or(default_log_level());
            Some(init_logging(level, log_dir).map_err(CliError::Logging)?)
        }
        None => None,
    };

    match cli.command {
        Commands::Export { db, notes } => export(ExportOptions {
            db_path: db,
            notes_dir: notes,
        }),
        Commands::Import { db, notes, yes } => import(
            ImportOptions {
                db_path: db,
                notes_dir: notes,
            },
            yes,
        ),
    }
}

fn export(options: ExportOptions) -> Result<(), CliError> {
    let summary = run_export(&options)?;
    for file in &summary.files {
        println!("Processing {}", file.display());
    }
    println!(
        "Exported {} notes into {} files",
        summary.notes,
        summary.files.len()
    );
    Ok(())
}

fn import(options: ImportOptions, assume_yes: bool) -> Result<(), CliError> {
    // Parse the whole tree before touching an existing database.
    let files = read_notes_tree(&options.notes_dir)?;

    if options.db_path.exists() {
        let message = format!("File {} already exists. Delete?", options.db_path.display());
        let delete = assume_yes || {
            let stdin = io::stdin();
            confirm(&mut stdin.lock(), &mut io::stdout(), &message)?
        };
        if !delete {
            println!("Please re-run the program with another database path to continue");
            return Ok(());
        }
        fs::remove_file(&options.db_path).map_err(|source| CliError::Io {
            path: options.db_path.clone(),
            source,
        })?;
        info!("event=db_replace module=cli status=ok");
    }

    let summary = import_files(&options, &files)?;
    println!(
        "Imported {} notes in {} categories into {}",
        summary.notes,
        summary.categories.len(),
        options.db_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{import, Cli, CliError, Commands};
    use clap::{CommandFactory, Parser};
    use cotonetes_core::{ImportOptions, ServiceError};
    use std::fs;
    use std::path::Path;

    const EXISTING_DB: &[u8] = b"existing database bytes";

    #[test]
    fn import_keeps_existing_database_when_notes_dir_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("notes.db");
        fs::write(&db_path, EXISTING_DB).unwrap();

        let result = import(
            ImportOptions {
                db_path: db_path.clone(),
                notes_dir: dir.path().join("missing"),
            },
            true,
        );

        assert!(matches!(
            result,
            Err(CliError::Service(ServiceError::MissingPath(_)))
        ));
        assert_eq!(fs::read(&db_path).unwrap(), EXISTING_DB);
    }

    #[test]
    fn import_keeps_existing_database_when_a_record_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("notes.db");
        fs::write(&db_path, EXISTING_DB).unwrap();
        let notes_dir = dir.path().join("notes");
        fs::create_dir(&notes_dir).unwrap();
        fs::write(
            notes_dir.join("broken.tex"),
            "\\textbf{Title:} Broken\\\\\n\\textbf{Oops:} nothing\\\\\n\\hrulefill\n",
        )
        .unwrap();

        let result = import(
            ImportOptions {
                db_path: db_path.clone(),
                notes_dir,
            },
            true,
        );

        assert!(matches!(
            result,
            Err(CliError::Service(ServiceError::Record { .. }))
        ));
        assert_eq!(fs::read(&db_path).unwrap(), EXISTING_DB);
    }

    #[test]
    fn import_replaces_existing_database_when_tree_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("notes.db");
        fs::write(&db_path, EXISTING_DB).unwrap();
        let notes_dir = dir.path().join("notes");
        fs::create_dir_all(notes_dir.join("rust")).unwrap();
        fs::write(
            notes_dir.join("rust").join("rust.tex"),
            concat!(
                "\\section{rust}\n",
                "\n",
                "\\textbf{Title:} Ownership\\\\\n",
                "\\textbf{URL:} \\url{http://example.com}\\\\\n",
                "\\textbf{Created:} 1\\\\\n",
                "\\textbf{Last Updated:} 2\\\\\n",
                "\\\\\n",
                "borrow checker\n",
                "\\hrulefill\n",
                "\\\\\n",
            ),
        )
        .unwrap();

        import(
            ImportOptions {
                db_path: db_path.clone(),
                notes_dir,
            },
            true,
        )
        .unwrap();

        assert_ne!(fs::read(&db_path).unwrap(), EXISTING_DB);
        let conn = cotonetes_core::db::open_db(&db_path).unwrap();
        let titles: i64 = conn
            .query_row("SELECT COUNT(*) FROM notes WHERE title = 'Ownership';", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(titles, 1);
    }

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn import_defaults_match_documented_paths() {
        let cli = Cli::try_parse_from(["cotonetes", "import"]).unwrap();
        match cli.command {
            Commands::Import { db, notes, yes } => {
                assert_eq!(db, Path::new("cotonetes.db"));
                assert_eq!(notes, Path::new("/tmp/notes"));
                assert!(!yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_log_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cotonetes",
            "export",
            "--db",
            "notes.db",
            "--log-level",
            "debug",
            "--log-dir",
            "/tmp/logs",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.log_dir.as_deref(), Some(Path::new("/tmp/logs")));
        assert!(matches!(cli.command, Commands::Export { .. }));
    }
}
