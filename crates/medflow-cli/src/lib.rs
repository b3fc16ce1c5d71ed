//! MedFlow command-line client
//!
//! A text presentation layer over [`medflow_core::Portal`]. All state lives in
//! a data directory shared by every invocation, so a `login` holds until the
//! next `logout`. Every command prints the outcome notice and acknowledges it.

use anyhow::{bail, Context};
use chrono::Local;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use medflow_core::{
    AccessError, AppointmentId, AppointmentRecord, NewAppointment, Portal, PortalConfig,
    Registration,
};
use medflow_store::FileStore;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// Data directory used when neither flag nor environment sets one
pub const DEFAULT_DATA_DIR: &str = ".medflow";

/// Build the argument parser
#[must_use]
pub fn command() -> Command {
    Command::new("medflow")
        .version(medflow_core::VERSION)
        .about("Personal medical appointment scheduling")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .env("MEDFLOW_DATA_DIR")
                .default_value(DEFAULT_DATA_DIR)
                .value_parser(value_parser!(PathBuf))
                .help("Directory holding session, appointments and users"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .subcommand(
            Command::new("register")
                .about("Create an account")
                .arg(Arg::new("name").long("name").required(true).help("Full name"))
                .arg(Arg::new("cc").long("cc").required(true).help("Citizen code (C.C.)"))
                .arg(Arg::new("phone").long("phone").required(true).help("Phone number"))
                .arg(password_arg()),
        )
        .subcommand(
            Command::new("login")
                .about("Open a session")
                .arg(
                    Arg::new("login")
                        .required(true)
                        .help("Citizen code or phone number"),
                )
                .arg(password_arg()),
        )
        .subcommand(Command::new("logout").about("Close the session"))
        .subcommand(Command::new("whoami").about("Show the logged-in user"))
        .subcommand(Command::new("specialties").about("List specialties and practitioners"))
        .subcommand(
            Command::new("request")
                .about("Request an appointment")
                .arg(Arg::new("specialty").long("specialty").required(true))
                .arg(Arg::new("date").long("date").required(true).help("YYYY-MM-DD"))
                .arg(Arg::new("time").long("time").required(true).help("HH:MM"))
                .arg(Arg::new("doctor").long("doctor").help("Practitioner"))
                .arg(Arg::new("notes").long("notes")),
        )
        .subcommand(
            Command::new("list").about("List appointments").arg(
                Arg::new("history")
                    .long("history")
                    .action(ArgAction::SetTrue)
                    .help("Show completed and cancelled appointments"),
            ),
        )
        .subcommand(
            Command::new("cancel")
                .about("Cancel an appointment")
                .arg(Arg::new("id").required(true)),
        )
        .subcommand(
            Command::new("complete")
                .about("Mark an appointment as held")
                .arg(Arg::new("id").required(true)),
        )
}

fn password_arg() -> Arg {
    Arg::new("password")
        .long("password")
        .env("MEDFLOW_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

/// Where state and configuration come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Data directory
    pub data_dir: PathBuf,
    /// Optional TOML configuration
    pub config: Option<PathBuf>,
}

impl Settings {
    /// Read global flags from (sub)command matches
    #[must_use]
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            data_dir: matches
                .get_one::<PathBuf>("data-dir")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            config: matches.get_one::<PathBuf>("config").cloned(),
        }
    }

    /// Configuration file contents, or defaults
    ///
    /// # Errors
    /// Returns an error if the configuration file cannot be loaded
    pub fn load_config(&self) -> anyhow::Result<PortalConfig> {
        match &self.config {
            Some(path) => PortalConfig::load(path)
                .with_context(|| format!("failed to load configuration {}", path.display())),
            None => Ok(PortalConfig::default()),
        }
    }

    /// Open the data directory
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created
    pub async fn open_store(&self) -> anyhow::Result<FileStore> {
        FileStore::open(&self.data_dir)
            .await
            .with_context(|| format!("failed to open data directory {}", self.data_dir.display()))
    }

    /// Build the portal over the data directory
    ///
    /// # Errors
    /// Returns an error if the configuration or data directory is unusable
    pub async fn open_portal(&self) -> anyhow::Result<Portal> {
        let config = self.load_config()?;
        let store = self.open_store().await?;
        Ok(Portal::new(Arc::new(store), config))
    }
}

/// One parsed subcommand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Create an account
    Register {
        /// Full name
        name: String,
        /// Citizen code
        cc: String,
        /// Phone number
        phone: String,
        /// Clear-text secret
        password: String,
    },
    /// Open a session
    Login {
        /// Citizen code or phone
        login: String,
        /// Clear-text secret
        password: String,
    },
    /// Close the session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List the catalog
    Specialties,
    /// Request an appointment
    Request(NewAppointment),
    /// List appointments
    List {
        /// History instead of upcoming
        history: bool,
    },
    /// Cancel an appointment
    Cancel(AppointmentId),
    /// Mark an appointment as held
    Complete(AppointmentId),
}

impl Action {
    /// Build from a subcommand name and its matches
    ///
    /// # Errors
    /// Returns an error on an unknown subcommand
    pub fn from_subcommand(name: &str, args: &ArgMatches) -> anyhow::Result<Self> {
        let action = match name {
            "register" => Self::Register {
                name: value(args, "name"),
                cc: value(args, "cc"),
                phone: value(args, "phone"),
                password: value(args, "password"),
            },
            "login" => Self::Login {
                login: value(args, "login"),
                password: value(args, "password"),
            },
            "logout" => Self::Logout,
            "whoami" => Self::Whoami,
            "specialties" => Self::Specialties,
            "request" => Self::Request(NewAppointment {
                specialty: value(args, "specialty"),
                practitioner: args.get_one::<String>("doctor").cloned(),
                date: value(args, "date"),
                time: value(args, "time"),
                notes: args.get_one::<String>("notes").cloned(),
            }),
            "list" => Self::List {
                history: args.get_flag("history"),
            },
            "cancel" => Self::Cancel(AppointmentId::from_raw(value(args, "id"))),
            "complete" => Self::Complete(AppointmentId::from_raw(value(args, "id"))),
            other => bail!("unknown command: {other}"),
        };
        Ok(action)
    }
}

fn value(args: &ArgMatches, name: &str) -> String {
    args.get_one::<String>(name).cloned().unwrap_or_default()
}

/// Run `action`, then print and acknowledge the pending notice
///
/// Returns `false` when the portal rejected the action; the notice printed
/// explains why.
///
/// # Errors
/// Returns an error only if writing to `out` fails
pub async fn execute<W: Write>(portal: &Portal, action: Action, out: &mut W) -> anyhow::Result<bool> {
    let outcome = dispatch(portal, action, out).await;
    if let Some(notice) = portal.take_notice() {
        writeln!(out, "{notice}")?;
    }

    match outcome {
        Ok(()) => Ok(true),
        Err(e) => match e.downcast::<AccessError>() {
            Ok(rejected) => {
                tracing::debug!(error = %rejected, "command rejected");
                Ok(false)
            }
            Err(other) => Err(other),
        },
    }
}

async fn dispatch<W: Write>(portal: &Portal, action: Action, out: &mut W) -> anyhow::Result<()> {
    match action {
        Action::Register {
            name,
            cc,
            phone,
            password,
        } => {
            portal
                .register(Registration::new(name, cc, phone, password))
                .await?;
        }
        Action::Login { login, password } => {
            portal.login(&login, &password).await?;
        }
        Action::Logout => portal.logout().await?,
        Action::Whoami => {
            let identity = portal.require_identity().await?;
            writeln!(out, "{} (C.C. {})", identity.display_name, identity.id)?;
        }
        Action::Specialties => {
            for specialty in portal.catalog().specialties() {
                writeln!(out, "{specialty}")?;
                for practitioner in portal.catalog().practitioners(specialty) {
                    writeln!(out, "  {practitioner}")?;
                }
            }
        }
        Action::Request(request) => {
            let record = portal.request_appointment(request).await?;
            writeln!(out, "{}", render_record(&record))?;
        }
        Action::List { history } => {
            let records = if history {
                portal.history().await?
            } else {
                portal.upcoming().await?
            };
            if records.is_empty() {
                writeln!(out, "No hay citas.")?;
            }
            for record in &records {
                writeln!(out, "{}", render_record(record))?;
            }
        }
        Action::Cancel(id) => {
            if let Some(record) = portal.cancel(&id).await? {
                writeln!(out, "{}", render_record(&record))?;
            }
        }
        Action::Complete(id) => {
            if let Some(record) = portal.complete(&id).await? {
                writeln!(out, "{}", render_record(&record))?;
            }
        }
    }
    Ok(())
}

/// One-line summary of a record in local time, notes on a second line
#[must_use]
pub fn render_record(record: &AppointmentRecord) -> String {
    let when = record.scheduled_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
    let mut line = format!("{}  {when}  {}", record.id, record.specialty);
    if !record.practitioner.is_empty() {
        line.push_str(&format!("  {}", record.practitioner));
    }
    line.push_str(&format!("  [{}]", record.status));
    if !record.notes.is_empty() {
        line.push_str(&format!("\n    {}", record.notes));
    }
    line
}
