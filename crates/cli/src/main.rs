use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgGroup, Args, Parser, Subcommand};
use sharenote_kernel::settings::{self, mask_secret, CredentialKey, Settings};
use sharenote_kernel::slugify;
use sharenote_publisher::{Clipboard, Notifier, Outcome, Publisher, PublisherConfig, Session};
use sharenote_store::{AirtableStore, Fields};

/// Publish markdown notes to the sharenote record store.
#[derive(Debug, Parser)]
#[command(name = "sharenote", version, about)]
struct Cli {
    /// Directory holding base.toml and credentials.toml
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create or overwrite the published copy of a note
    Publish {
        #[command(flatten)]
        note: NoteArgs,
        /// Title shown on the site; defaults to the file name
        #[arg(long)]
        title: Option<String>,
    },
    /// Change selected fields of an already published note
    Update(UpdateArgs),
    /// Delete the published copy of a note
    Remove {
        #[command(flatten)]
        note: NoteArgs,
    },
    /// List published notes with their links
    List,
    /// Inspect or change stored settings
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print the slug a vault path publishes under
    Slug { path: String },
}

#[derive(Debug, Args)]
struct NoteArgs {
    /// Markdown file to publish
    file: PathBuf,
    /// Vault root; the slug is derived from the path relative to it.
    /// Defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    vault: Option<PathBuf>,
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("changes")
        .required(true)
        .multiple(true)
        .args(["title", "data", "password", "clear_password"])
))]
struct UpdateArgs {
    #[command(flatten)]
    note: NoteArgs,
    #[arg(long)]
    title: Option<String>,
    /// Replace the body with the contents of this file
    #[arg(long, value_name = "FILE")]
    data: Option<PathBuf>,
    /// Protect the note with a password
    #[arg(long, conflicts_with = "clear_password")]
    password: Option<String>,
    /// Make a protected note public again
    #[arg(long)]
    clear_password: bool,
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the current settings with the API key masked
    Show,
    /// Persist one setting (api-key, base-id, table, website-url)
    Set { key: String, value: String },
}

/// Status messages go to stderr.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        eprintln!("{message}");
    }
}

/// Links go to stdout, where a shell can pipe them into a clipboard tool.
struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn write_text(&self, text: &str) -> anyhow::Result<()> {
        println!("{text}");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let settings = match &cli.config_dir {
        Some(dir) => Settings::load_in(dir),
        None => Settings::load(),
    }
    .with_context(|| "failed to load sharenote settings")?;
    sharenote_telemetry::init(&settings.telemetry);

    tracing::debug!(env = ?settings.environment, command = ?cli.command, "sharenote cli");

    match cli.command {
        Command::Config(command) => {
            let config_dir = match cli.config_dir {
                Some(dir) => dir,
                None => settings::config_dir()?,
            };
            run_config(command, &settings, &config_dir)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Slug { path } => {
            println!("{}", slugify(&path));
            Ok(ExitCode::SUCCESS)
        }
        command => run_note_command(command, &settings).await,
    }
}

async fn run_note_command(command: Command, settings: &Settings) -> anyhow::Result<ExitCode> {
    let store = AirtableStore::from_settings(&settings.store)
        .with_context(|| "failed to build record store client")?;
    let publisher = Publisher::new(store, PublisherConfig::from_settings(settings));
    let session = Session::new(&publisher, &ConsoleNotifier, &StdoutClipboard);

    let outcome = match command {
        Command::Publish { note, title } => {
            let content = read_note(&note.file)?;
            let title = match title {
                Some(title) => title,
                None => default_title(&note.file),
            };
            session.publish(&note.vault_path()?, &title, &content).await
        }
        Command::Update(args) => {
            let fields = args.changes()?;
            session.update(&args.note.vault_path()?, &fields).await
        }
        Command::Remove { note } => session.remove(&note.vault_path()?).await,
        Command::List => match session.list().await {
            Some(notes) => {
                for note in notes {
                    println!("{}\t{}", note.title, note.link);
                }
                Outcome::Done { link: None }
            }
            None => Outcome::Failed,
        },
        Command::Config(_) | Command::Slug { .. } => Outcome::Done { link: None },
    };

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_config(command: ConfigCommand, settings: &Settings, config_dir: &Path) -> anyhow::Result<()> {
    match command {
        ConfigCommand::Show => {
            for key in CredentialKey::ALL {
                let value = key.read(settings);
                let shown = if value.trim().is_empty() {
                    "(not set)".to_string()
                } else if key == CredentialKey::ApiKey {
                    mask_secret(value)
                } else {
                    value.to_string()
                };
                println!("{} = {}", key.name(), shown);
            }
        }
        ConfigCommand::Set { key, value } => {
            let key: CredentialKey = key.parse()?;
            settings::save_credential(config_dir, key, &value)?;
            println!("{} saved", key.name());
        }
    }
    Ok(())
}

impl NoteArgs {
    /// Path used for the slug: relative to the vault root (the current
    /// directory when none is given), always with `/` separators.
    fn vault_path(&self) -> anyhow::Result<String> {
        let cwd = std::env::current_dir().context("unable to resolve current directory")?;
        relative_to_vault(&self.file, self.vault.as_deref(), &cwd)
    }
}

fn relative_to_vault(file: &Path, vault: Option<&Path>, cwd: &Path) -> anyhow::Result<String> {
    let file = absolute(file, cwd);
    let vault = absolute(vault.unwrap_or(cwd), cwd);

    let relative = file.strip_prefix(&vault).map_err(|_| {
        anyhow::anyhow!(
            "{} is not inside the vault {}",
            file.display(),
            vault.display()
        )
    })?;

    let parts: Vec<_> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect();
    if parts.is_empty() {
        anyhow::bail!("{} is the vault root, not a note", file.display());
    }
    Ok(parts.join("/"))
}

/// Join onto `cwd` and resolve `.` and `..` without touching the filesystem,
/// so notes that no longer exist locally can still be removed.
fn absolute(path: &Path, cwd: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in cwd.join(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    resolved
}

impl UpdateArgs {
    fn changes(&self) -> anyhow::Result<Fields> {
        let data = self.data.as_deref().map(read_note).transpose()?;
        let password = if self.clear_password {
            Some(String::new())
        } else {
            self.password.clone()
        };

        Ok(Fields {
            title: self.title.clone(),
            data,
            password,
            ..Fields::default()
        })
    }
}

fn read_note(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn default_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
