mod chart;
mod table;
mod tui;

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use uuid::Uuid;

use hidrotrack_core::export::{csv_report, report_file_name};
use hidrotrack_core::{
    draft_from_fields, normalize_fields, parse_entry_args, DashboardUseCase, FileIdentityProvider,
    FileLotRepository, IdentityProvider, LedgerService, LotKey, Role, Session, UserAccount,
};

#[derive(Parser)]
#[command(name = "hidrotrack")]
#[command(about = "Condominium water-meter tracking", long_about = None)]
struct Cli {
    /// Username (falls back to HIDROTRACK_USER)
    #[arg(long, global = true)]
    user: Option<String>,

    /// Password (falls back to HIDROTRACK_SECRET)
    #[arg(long, global = true)]
    secret: Option<String>,

    /// Data directory (defaults to ~/.hidrotrack)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Record a reading (usage: add 12 current:110 [previous:100 tariff:5.5 period:2025-03])
    Add {
        /// Lot number followed by field:value pairs; omitted fields are
        /// pre-filled from the lot's last record
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Show a lot's reading history
    History { lot: String },
    /// Fleet dashboard: totals, ranking, anomalies (admin)
    Dashboard,
    /// Rewrite a record in place (admin; same fields as add)
    Edit {
        lot: String,
        id: Uuid,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Remove a record by id (admin)
    Delete { lot: String, id: Uuid },
    /// Write a lot's CSV report (admin)
    Export {
        lot: String,
        /// Output path (defaults to historico_lote_<N>.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Bulk-load a JSON ledger dump, replacing each listed lot (admin)
    Import { file: PathBuf },
    /// Full-screen consumption chart for one lot (admin)
    Chart { lot: String },
    /// Create or update an account; allowed without credentials only while
    /// the user store is empty
    Useradd {
        username: String,
        secret: String,
        /// Grant the admin role instead of plantonista
        #[arg(long)]
        admin: bool,
    },
    /// Open the terminal user interface
    Tui,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = match cli.command {
        // The TUI signs in on its own screen.
        Some(Commands::Tui) | None => return tui::run(cli.data_dir),
        Some(command) => command,
    };

    let identity = FileIdentityProvider::new(cli.data_dir.clone())?;
    let repo = FileLotRepository::new(cli.data_dir.clone())?;
    let service = LedgerService::new(repo.clone());

    // Bootstrapping: the very first account can be created without signing
    // in, since there is nobody to sign in as yet.
    let bootstrap = matches!(&command, Commands::Useradd { .. }) && !identity.has_accounts()?;
    let session = if bootstrap {
        None
    } else {
        Some(authenticate(&identity, cli.user, cli.secret)?)
    };

    match command {
        Commands::Add { args } => {
            let parsed = parse_entry_args(&args);
            if parsed.lot.is_empty() {
                println!("Error: lot number is required.");
                return Ok(());
            }
            let lot = LotKey::parse(&parsed.lot)?;
            let fields = normalize_fields(parsed.fields)?;
            let mut draft = draft_from_fields(&fields)?;

            // Pre-fill untyped fields from the lot's last record, the way the
            // entry form would. A field that was typed but did not parse must
            // still fail validation, not get papered over.
            let suggestion = service.suggestion(&lot)?;
            if draft.period.is_none()
                && !fields.contains_key("period")
                && !fields.contains_key("month")
                && !fields.contains_key("year")
            {
                draft.period = Some(suggestion.period);
            }
            if draft.previous_reading.is_none() && !fields.contains_key("previous") {
                draft.previous_reading = suggestion.previous_reading;
            }
            if draft.tariff.is_none() && !fields.contains_key("tariff") {
                draft.tariff = suggestion.tariff;
            }

            let record = service.add_record(&lot, &draft)?;
            println!(
                "Recorded {} for lot {}: {:.2} m3, R$ {:.2}",
                record.period, lot, record.consumption, record.cost
            );
        }
        Commands::History { lot } => {
            let lot = LotKey::parse(&lot)?;
            let records = service.records(&lot)?;
            let suggestion = service.suggestion(&lot)?;
            table::show_history(&lot, &records, &suggestion);
        }
        Commands::Dashboard => {
            require(&session, |s| s.capabilities.can_view_dashboard, "view the dashboard")?;
            let data = DashboardUseCase::new(&repo).summary()?;
            table::show_dashboard(&data);
        }
        Commands::Edit { lot, id, args } => {
            require(&session, |s| s.capabilities.can_edit, "edit records")?;
            let lot = LotKey::parse(&lot)?;
            let parsed = parse_entry_args(&args);
            let fields = normalize_fields(parsed.fields)?;
            let draft = draft_from_fields(&fields)?;
            let record = service.edit_record(&lot, id, &draft)?;
            println!(
                "Updated {} for lot {}: {:.2} m3, R$ {:.2}",
                record.period, lot, record.consumption, record.cost
            );
        }
        Commands::Delete { lot, id } => {
            require(&session, |s| s.capabilities.can_edit, "delete records")?;
            let lot = LotKey::parse(&lot)?;
            service.delete_record(&lot, id)?;
            println!("Removed record {} from lot {}.", id, lot);
        }
        Commands::Export { lot, out } => {
            require(&session, |s| s.capabilities.can_view_dashboard, "export reports")?;
            let lot = LotKey::parse(&lot)?;
            let records = service.records(&lot)?;
            if records.is_empty() {
                println!("No records to export for lot {}.", lot);
                return Ok(());
            }
            let path = out.unwrap_or_else(|| PathBuf::from(report_file_name(&lot)));
            fs::write(&path, csv_report(&lot, &records)?)?;
            println!("Report written to {}.", path.display());
        }
        Commands::Import { file } => {
            require(&session, |s| s.capabilities.can_edit, "import data")?;
            let json = fs::read_to_string(&file)?;
            let summary = service.import_from_json(&json)?;
            println!(
                "Imported {} records across {} lots.",
                summary.records, summary.lots
            );
        }
        Commands::Chart { lot } => {
            require(&session, |s| s.capabilities.can_view_dashboard, "view analytics")?;
            let lot = LotKey::parse(&lot)?;
            let records = service.records(&lot)?;
            if records.is_empty() {
                println!("Add at least one record for lot {} to chart it.", lot);
                return Ok(());
            }
            chart::run(&lot, records)?;
        }
        Commands::Useradd {
            username,
            secret,
            admin,
        } => {
            if let Some(session) = &session {
                if !session.capabilities.can_edit {
                    bail!("your role does not allow you to manage accounts");
                }
            }
            let role = if admin { Role::Admin } else { Role::Plantonista };
            identity.upsert_account(UserAccount {
                username: username.clone(),
                secret,
                role,
            })?;
            println!("Account '{}' saved ({:?}).", username, role);
        }
        Commands::Tui => unreachable!("handled above"),
    }
    Ok(())
}

fn authenticate(
    identity: &FileIdentityProvider,
    user: Option<String>,
    secret: Option<String>,
) -> Result<Session> {
    let user = user
        .or_else(|| env::var("HIDROTRACK_USER").ok())
        .ok_or_else(|| anyhow!("credentials required: pass --user or set HIDROTRACK_USER"))?;
    let secret = secret
        .or_else(|| env::var("HIDROTRACK_SECRET").ok())
        .ok_or_else(|| anyhow!("credentials required: pass --secret or set HIDROTRACK_SECRET"))?;
    Ok(identity.authenticate(&user, &secret)?)
}

fn require(
    session: &Option<Session>,
    allowed: impl Fn(&Session) -> bool,
    action: &str,
) -> Result<()> {
    match session {
        Some(session) if allowed(session) => Ok(()),
        _ => bail!("your role does not allow you to {}", action),
    }
}
