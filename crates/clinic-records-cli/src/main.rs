use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use clinic_records_cli::{
    list_columns, render_matches, render_sync_log, render_table, render_upcoming, FormInput, Gate,
    Session, DEFAULT_LOG_FILTER,
};
use clinic_records_core::export::{generate_summary, table_to_csv, write_csv};
use clinic_records_core::models::{Field, Table};
use clinic_records_core::remote::{RemoteSheet, SheetsClient, UnreachableSheet};
use clinic_records_core::store::{
    find, next_patient_id, partition_appointments, partition_waiting, search, Loaded, RecordStore,
    Saved,
};
use clinic_records_core::StoreConfig;

#[derive(Parser)]
#[command(name = "clinic-records", version, about = "Clinic intake, doctor updates and appointments")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = "clinic.toml")]
    config: PathBuf,

    /// Session password; read from stdin when required and not given
    #[arg(long, global = true)]
    password: Option<String>,

    /// Skip the remote mirror for this run
    #[arg(long, global = true)]
    local_only: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new patient
    Intake {
        /// Patient id; the next free id is used when omitted
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        /// Visit date; defaults to today
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        age: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        va_right: Option<String>,
        #[arg(long)]
        va_left: Option<String>,
        #[arg(long)]
        iop_right: Option<String>,
        #[arg(long)]
        iop_left: Option<String>,
        #[arg(long)]
        medication: Option<String>,
        /// Any other field, as key=value
        #[arg(long = "set", value_name = "KEY=VALUE")]
        assignments: Vec<String>,
    },

    /// Record the doctor's findings for a patient
    Update {
        id: String,
        #[arg(long)]
        diagnosis: Option<String>,
        #[arg(long)]
        treatment: Option<String>,
        #[arg(long)]
        plan: Option<String>,
        #[arg(long)]
        ac_right: Option<String>,
        #[arg(long)]
        ac_left: Option<String>,
        #[arg(long)]
        fundus_right: Option<String>,
        #[arg(long)]
        fundus_left: Option<String>,
        #[arg(long)]
        remarks: Option<String>,
        #[arg(long)]
        surgery: Option<String>,
        #[arg(long = "set", value_name = "KEY=VALUE")]
        assignments: Vec<String>,
    },

    /// Patients still waiting for the doctor
    Waiting,

    /// Patients the doctor has seen
    Seen,

    /// Book an appointment
    Book {
        #[arg(long)]
        name: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        time: String,
        #[arg(long)]
        payment: Option<String>,
        #[arg(long = "set", value_name = "KEY=VALUE")]
        assignments: Vec<String>,
    },

    /// Upcoming appointments by day
    Appointments {
        /// Treat this date as today
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Show past appointments instead
        #[arg(long)]
        archive: bool,
    },

    /// Find patients by name
    Search {
        name: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Print the id the next intake would get
    NextId,

    /// Export the table or a view of it as CSV
    Export {
        #[arg(long, value_enum, default_value_t = View::All)]
        view: View,
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Summary of one patient record
    Summary {
        id: String,
        #[arg(long)]
        json: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Recent sync attempts
    SyncLog {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum View {
    All,
    Waiting,
    Seen,
    Upcoming,
    Archive,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = StoreConfig::load(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;

    unlock_session(&config, cli.password.as_deref())?;

    let remote = if cli.local_only { None } else { connect_remote(&config) };
    let store = RecordStore::open(&config, remote).context("failed to open record store")?;

    run(cli.command, &store, &config)
}

fn unlock_session(config: &StoreConfig, password: Option<&str>) -> Result<()> {
    let gate = Gate::new(config.session.password.clone());
    if !gate.is_enabled() {
        return Ok(());
    }

    let attempt = match password {
        Some(p) => p.to_string(),
        None => {
            eprint!("Password: ");
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .context("failed to read password")?;
            line
        }
    };

    match gate.unlock(Some(attempt.as_str())) {
        Session::Unlocked => Ok(()),
        Session::Locked => bail!("incorrect password"),
    }
}

/// Connect to the configured spreadsheet.
///
/// A configured remote that cannot be reached still counts as a mirror, so
/// writes report a failed sync and are queued for the next load.
fn connect_remote(config: &StoreConfig) -> Option<Box<dyn RemoteSheet>> {
    let remote = config.active_remote()?;
    let described = format!("spreadsheet {} tab '{}'", remote.spreadsheet_id, remote.worksheet);
    let connected = remote
        .target()
        .map_err(|e| e.to_string())
        .and_then(|target| SheetsClient::connect(target).map_err(|e| e.to_string()));

    match connected {
        Ok(client) => Some(Box::new(client)),
        Err(reason) => {
            tracing::warn!(remote = %described, error = %reason, "remote unreachable, working locally");
            Some(Box::new(UnreachableSheet::new(described, reason)))
        }
    }
}

fn load(store: &RecordStore) -> Result<Table> {
    let Loaded { table, warnings, .. } = store.load().context("failed to load records")?;
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(table)
}

fn report(saved: &Saved) {
    if let Some(id) = &saved.patient_id {
        println!("Saved record {}", id);
    } else {
        println!("Saved record");
    }
    if let Some(warning) = saved.sync.warning() {
        eprintln!("warning: {}", warning);
    }
    if saved.pruned {
        println!("Removed from the local waiting list (kept in the remote sheet)");
    }
}

fn run(command: Command, store: &RecordStore, config: &StoreConfig) -> Result<()> {
    let schema = store.schema().clone();

    match command {
        Command::Intake {
            id,
            name,
            date,
            age,
            gender,
            phone,
            va_right,
            va_left,
            iop_right,
            iop_left,
            medication,
            assignments,
        } => {
            let record = FormInput::new()
                .field(Field::PatientId, id.as_deref())
                .field(Field::FullName, name.as_deref())
                .field(Field::Date, date.as_deref())
                .field(Field::Age, age.as_deref())
                .field(Field::Gender, gender.as_deref())
                .field(Field::Phone, phone.as_deref())
                .eye_pair(Field::VisualAcuity, va_right.as_deref(), va_left.as_deref())
                .eye_pair(Field::Iop, iop_right.as_deref(), iop_left.as_deref())
                .field(Field::Medication, medication.as_deref())
                .assignments(&assignments)?
                .into_record(&schema)?;

            let table = load(store)?;
            let saved = store.add_record(&table, record)?;
            report(&saved);
        }

        Command::Update {
            id,
            diagnosis,
            treatment,
            plan,
            ac_right,
            ac_left,
            fundus_right,
            fundus_left,
            remarks,
            surgery,
            assignments,
        } => {
            let record = FormInput::new()
                .field(Field::Diagnosis, diagnosis.as_deref())
                .field(Field::Treatment, treatment.as_deref())
                .field(Field::Plan, plan.as_deref())
                .eye_pair(Field::Ac, ac_right.as_deref(), ac_left.as_deref())
                .eye_pair(Field::Fundus, fundus_right.as_deref(), fundus_left.as_deref())
                .field(Field::Remarks, remarks.as_deref())
                .field(Field::SurgeryScheduled, surgery.as_deref())
                .assignments(&assignments)?
                .into_doctor_update(&schema)?;

            let table = load(store)?;
            let saved = store.update_record(&table, &id, &record)?;
            report(&saved);
        }

        Command::Waiting => {
            let (waiting, _) = partition_waiting(&load(store)?);
            print!("{}", render_table(&waiting, &list_columns(&schema)));
        }

        Command::Seen => {
            let (_, seen) = partition_waiting(&load(store)?);
            print!("{}", render_table(&seen, &list_columns(&schema)));
        }

        Command::Book {
            name,
            date,
            time,
            payment,
            assignments,
        } => {
            let mut form = FormInput::new()
                .field(Field::ApptName, Some(name.as_str()))
                .field(Field::ApptDate, Some(date.as_str()))
                .field(Field::ApptTime, Some(time.as_str()))
                .field(Field::ApptPayment, payment.as_deref());
            // Combined rows need a patient name of their own.
            if schema.has(Field::FullName) {
                form = form.field(Field::FullName, Some(name.as_str()));
            }
            let record = form.assignments(&assignments)?.into_record(&schema)?;

            let table = load(store)?;
            let saved = store.add_record(&table, record)?;
            report(&saved);
        }

        Command::Appointments { today, archive } => {
            let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
            let table = load(store)?;
            let partition = partition_appointments(&table, today);
            let columns = list_columns(&schema);
            if archive {
                print!("{}", render_table(&partition.archive, &columns));
            } else {
                print!("{}", render_upcoming(&partition, &columns));
            }
            if partition.malformed > 0 {
                eprintln!(
                    "warning: {} appointment(s) skipped because their date could not be read",
                    partition.malformed
                );
            }
        }

        Command::Search { name, limit } => {
            let table = load(store)?;
            print!("{}", render_matches(&search(&table, &name, limit)));
        }

        Command::NextId => {
            let table = load(store)?;
            println!("{}", next_patient_id(&table));
        }

        Command::Export { view, out } => {
            let table = load(store)?;
            let today = chrono::Local::now().date_naive();
            let selected = match view {
                View::All => table,
                View::Waiting => partition_waiting(&table).0,
                View::Seen => partition_waiting(&table).1,
                View::Upcoming => partition_appointments(&table, today).upcoming_table(),
                View::Archive => partition_appointments(&table, today).archive,
            };
            match out {
                Some(path) => {
                    write_csv(&selected, &path)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Exported {} rows to {}", selected.len(), path.display());
                }
                None => print!("{}", table_to_csv(&selected)?),
            }
        }

        Command::Summary { id, json, out } => {
            let table = load(store)?;
            let record = find(&table, &id)
                .with_context(|| format!("no single record with patient id '{}'", id))?;
            let doc = generate_summary(record, &schema, &config.clinic_name);
            let text = if json { doc.to_json()? } else { doc.to_text() };
            emit(&text, out.as_deref())?;
        }

        Command::SyncLog { limit } => {
            let attempts = store.journal().recent_sync_attempts(limit)?;
            print!("{}", render_sync_log(&attempts));
        }
    }

    Ok(())
}

fn emit(text: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}
