use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vaultbook::cli::{
    handle_category_command, handle_expense_command, handle_fixed_command, handle_income_command,
    CategoryCommands, ExpenseCommands, FixedCommands, IncomeCommands,
};
use vaultbook::config::paths::FALLBACK_IDENTIFIER;
use vaultbook::config::{sanitize_identifier, Settings, VaultPaths};
use vaultbook::crypto::{PasswordCheck, SecureString};
use vaultbook::display::{format_category_list, format_password_strength, format_summary};
use vaultbook::models::ExpenseKind;
use vaultbook::storage::IdentifierRegistry;
use vaultbook::{Session, VaultError};

const PASSWORD_ENV: &str = "VAULTBOOK_PASSWORD";
const LOG_ENV: &str = "VAULTBOOK_LOG";

#[derive(Parser)]
#[command(
    name = "vaultbook",
    version,
    about = "Password-encrypted personal budget tracker",
    long_about = "vaultbook keeps income, fixed and variable expenses in a single \
                  password-encrypted file. Nothing is readable on disk without \
                  the password, and no plaintext copy outlives a command."
)]
struct Cli {
    /// Name of the budget to open
    #[arg(short, long, global = true, env = "VAULTBOOK_NAME")]
    name: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new budget (or check that an existing one opens)
    Init,

    /// Category management commands
    #[command(subcommand, alias = "cat")]
    Category(CategoryCommands),

    /// Income commands
    #[command(subcommand)]
    Income(IncomeCommands),

    /// Fixed expense commands
    #[command(subcommand)]
    Fixed(FixedCommands),

    /// Variable expense commands
    #[command(subcommand)]
    Variable(ExpenseCommands),

    /// Show totals and balance
    Summary,

    /// Show current configuration and paths
    Config,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_password(prompt: &str) -> Result<SecureString> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(SecureString::new(password));
    }
    Ok(SecureString::new(rpassword::prompt_password(prompt)?))
}

/// Ask for a new password twice and check it against the policy
fn read_new_password() -> Result<SecureString> {
    let password = read_password("New password: ")?;
    let check = PasswordCheck::evaluate(&password);
    if !check.is_acceptable() {
        eprintln!("{}", format_password_strength(&check));
        anyhow::bail!("Password is too weak to create a new budget");
    }
    if std::env::var(PASSWORD_ENV).is_err() {
        let confirm = read_password("Confirm password: ")?;
        if confirm.as_str() != password.as_str() {
            anyhow::bail!("Passwords do not match");
        }
    }
    Ok(password)
}

fn open(paths: &VaultPaths, settings: &mut Settings, identifier: &str) -> Result<Session> {
    // Collisions are reported before any password prompt
    let slug = IdentifierRegistry::load(paths.registry_file())?.resolve(identifier)?;
    let is_new = !paths.durable_file(&slug).exists();
    let password = if is_new {
        println!("Creating new budget '{}'", identifier);
        read_new_password()?
    } else {
        read_password(&format!("Password for '{}': ", identifier))?
    };

    let session = Session::new(paths.clone());
    session.open_session(identifier, &password)?;

    if settings.last_identifier.as_deref() != Some(identifier) {
        settings.last_identifier = Some(identifier.to_string());
        settings.save(paths)?;
    }
    Ok(session)
}

fn run(cli: Cli) -> Result<()> {
    let paths = VaultPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    let identifier = cli
        .name
        .clone()
        .or_else(|| settings.last_identifier.clone())
        .unwrap_or_else(|| FALLBACK_IDENTIFIER.to_string());

    let command = match cli.command {
        Some(Commands::Config) => {
            let slug = sanitize_identifier(&identifier);
            println!("vaultbook Configuration");
            println!("=======================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Data directory:  {}", paths.data_dir().display());
            println!("Settings file:   {}", paths.settings_file().display());
            println!();
            println!("Budget:          {}", identifier);
            println!("Encrypted file:  {}", paths.durable_file(&slug).display());
            println!("Date format:     {}", settings.date_format);
            return Ok(());
        }
        Some(command) => command,
        None => {
            println!("vaultbook - password-encrypted personal budget tracker");
            println!();
            println!("Run 'vaultbook --help' for usage information.");
            println!("Run 'vaultbook init' to create your first budget.");
            return Ok(());
        }
    };

    let session = open(&paths, &mut settings, &identifier)?;

    let outcome = match command {
        Commands::Init => {
            println!("Budget '{}' is ready at: {}", identifier, paths.data_dir().display());
            println!();
            println!("{}", format_category_list(&session.list_categories()?));
            Ok(())
        }
        Commands::Category(cmd) => handle_category_command(&session, cmd),
        Commands::Income(cmd) => handle_income_command(&session, &settings, cmd),
        Commands::Fixed(cmd) => handle_fixed_command(&session, &settings, cmd),
        Commands::Variable(cmd) => {
            handle_expense_command(&session, &settings, ExpenseKind::Variable, cmd)
        }
        Commands::Summary => session
            .summary()
            .map(|summary| print!("{}", format_summary(&identifier, &summary))),
        Commands::Config => Ok(()),
    };

    let closed = session.close_session();
    outcome?;
    closed?;
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        match err.downcast_ref::<VaultError>() {
            Some(vault_err) => eprintln!("Error: {}", vault_err.user_message()),
            None => eprintln!("Error: {:#}", err),
        }
        std::process::exit(1);
    }

    Ok(())
}
