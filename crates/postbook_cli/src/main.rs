//! `postbook` command-line front end.
//!
//! # Responsibility
//! - Expose post CRUD use-cases as sub-commands.
//! - Print results as pretty JSON on stdout; errors go to stderr.
//!
//! Sub-commands: `create`, `list`, `get`, `update`, `delete`.

use clap::{Parser, Subcommand};
use log::info;
use postbook_core::config::{DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
use postbook_core::db::open_db;
use postbook_core::{
    init_logging, ConfigError, PostListQuery, PostService, SqlitePostRepository, StoreConfig,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "postbook", about = "Store and edit posts in a local SQLite file", version)]
struct Cli {
    /// SQLite database file. Overrides `POSTBOOK_DB_PATH`.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Log level. Overrides `POSTBOOK_LOG_LEVEL`.
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Absolute directory for rolling log files. Overrides `POSTBOOK_LOG_DIR`.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a post.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    /// List posts in creation order.
    List {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Show one post.
    Get { id: i64 },
    /// Fetch a post, replace the given fields and save it.
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a post.
    Delete { id: i64 },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("postbook: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String, Box<dyn Error>> {
    let config = resolve_config(&cli)?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level, log_dir)?;
    }
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        config.db_path.display()
    );

    let conn = open_db(&config.db_path)?;
    let service = PostService::new(SqlitePostRepository::try_new(&conn)?);

    let output = match cli.command {
        Command::Create { title, content } => {
            serde_json::to_string_pretty(&service.create(title, content)?)?
        }
        Command::List { limit, offset } => {
            serde_json::to_string_pretty(&service.list(&PostListQuery { limit, offset })?)?
        }
        Command::Get { id } => serde_json::to_string_pretty(&service.fetch_by_id(id)?)?,
        Command::Update { id, title, content } => {
            if title.is_none() && content.is_none() {
                return Err("update needs --title and/or --content".into());
            }
            let mut post = service.fetch_by_id(id)?;
            if let Some(title) = title {
                post.title = title;
            }
            if let Some(content) = content {
                post.content = content;
            }
            service.update(&post)?;
            serde_json::to_string_pretty(&service.fetch_by_id(id)?)?
        }
        Command::Delete { id } => {
            service.destroy(id)?;
            serde_json::json!({ "deleted": id }).to_string()
        }
    };
    Ok(output)
}

fn resolve_config(cli: &Cli) -> Result<StoreConfig, ConfigError> {
    resolve_config_with(cli, |key| std::env::var(key).ok())
}

/// Flags win over `env` per key, before any value is validated.
fn resolve_config_with(
    cli: &Cli,
    env: impl Fn(&str) -> Option<String>,
) -> Result<StoreConfig, ConfigError> {
    let path_text = |path: &Path| path.to_string_lossy().into_owned();
    StoreConfig::from_lookup(|key| {
        let flag = match key {
            DB_PATH_ENV => cli.db.as_deref().map(path_text),
            LOG_LEVEL_ENV => cli.log_level.clone(),
            LOG_DIR_ENV => cli.log_dir.as_deref().map(path_text),
            _ => None,
        };
        flag.or_else(|| env(key))
    })
}

#[cfg(test)]
mod tests {
    use super::{resolve_config_with, run, Cli, Command};
    use clap::Parser;
    use postbook_core::config::{LOG_DIR_ENV, LOG_LEVEL_ENV};
    use postbook_core::ConfigError;
    use std::path::Path;

    #[test]
    fn parses_create_with_global_db_flag() {
        let cli = Cli::try_parse_from([
            "postbook",
            "create",
            "--title",
            "Título",
            "--content",
            "Conteúdo",
            "--db",
            "/tmp/p.db",
        ])
        .unwrap();
        assert_eq!(cli.db.as_deref(), Some(std::path::Path::new("/tmp/p.db")));
        assert!(matches!(
            cli.command,
            Command::Create { ref title, ref content } if title == "Título" && content == "Conteúdo"
        ));
    }

    #[test]
    fn parses_list_paging_and_defaults() {
        let cli = Cli::try_parse_from(["postbook", "list", "--limit", "5"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::List {
                limit: Some(5),
                offset: 0
            }
        ));
    }

    #[test]
    fn create_requires_title() {
        assert!(Cli::try_parse_from(["postbook", "create", "--content", "x"]).is_err());
    }

    #[test]
    fn commands_drive_full_lifecycle_against_file_db() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("cli.db");
        let db = db.to_str().unwrap();
        let invoke = |args: &[&str]| {
            run(Cli::try_parse_from(["postbook", "--db", db].iter().chain(args)).unwrap())
        };

        let created = invoke(&["create", "--title", "a"]).unwrap();
        assert!(created.contains("\"title\": \"a\""));

        let err = invoke(&["update", "1"]).unwrap_err();
        assert!(err.to_string().contains("--title"));

        let updated = invoke(&["update", "1", "--title", "b"]).unwrap();
        assert!(updated.contains("\"title\": \"b\""));

        invoke(&["delete", "1"]).unwrap();
        let err = invoke(&["get", "1"]).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn log_level_flag_replaces_invalid_environment_value() {
        let cli = Cli::try_parse_from(["postbook", "--log-level", "info", "list"]).unwrap();
        let env = |key: &str| (key == LOG_LEVEL_ENV).then(|| "verbose".to_string());

        let config = resolve_config_with(&cli, env).unwrap();
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn log_dir_flag_replaces_invalid_environment_value_and_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let padded = format!(" {} ", dir.path().display());
        let cli = Cli::try_parse_from(["postbook", "--log-dir", padded.as_str(), "list"]).unwrap();
        let env = |key: &str| (key == LOG_DIR_ENV).then(|| "relative/logs".to_string());

        let config = resolve_config_with(&cli, env).unwrap();
        assert_eq!(config.log_dir.as_deref(), Some(dir.path()));
    }

    #[test]
    fn relative_log_dir_flag_is_rejected() {
        let cli = Cli::try_parse_from(["postbook", "--log-dir", "logs", "list"]).unwrap();

        let err = resolve_config_with(&cli, |_| None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogDir(_)));
    }

    #[test]
    fn environment_applies_when_no_flag_is_given() {
        let cli = Cli::try_parse_from(["postbook", "list"]).unwrap();
        let env = |key: &str| (key == LOG_LEVEL_ENV).then(|| "error".to_string());

        let config = resolve_config_with(&cli, env).unwrap();
        assert_eq!(config.log_level, "error");
        assert!(config.log_dir.is_none());
        assert_ne!(config.db_path, Path::new(""));
    }
}
