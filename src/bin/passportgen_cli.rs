//! PassportGen CLI - Drives one wizard session from the command line
//!
//! Commands: countries, regions, generate
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 when a record is rejected

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use passportgen_core::{
    Catalog, RecordBuilder, SeededTokens, SessionController, SessionError, WizardSettings,
    ALL_REGIONS,
};

#[derive(Parser)]
#[command(name = "passportgen-cli")]
#[command(about = "PassportGen CLI - Passport Wizard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file holding the country catalog (built-in catalog if omitted)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// JSON file holding wizard settings
    #[arg(short, long)]
    settings: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List countries matching a search and region
    Countries {
        #[arg(long, default_value = "")]
        search: String,

        #[arg(long, default_value = ALL_REGIONS)]
        region: String,
    },

    /// List catalog regions
    Regions,

    /// Sign in, pick a country, submit the form and preview the record
    Generate {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Sign up under this name instead of logging in
        #[arg(long)]
        name: Option<String>,

        /// Country code, e.g. FR
        #[arg(long)]
        country: String,

        /// JSON object of form fields, e.g. {"firstName": "Jane"}
        #[arg(short, long)]
        payload: String,

        /// Image file for the photo
        #[arg(long)]
        photo: Option<PathBuf>,

        /// Seed for reproducible document numbers
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(out) => {
            println!("{}", out);
            ExitCode::SUCCESS
        }
        Err(e) => fail(1, e),
    }
}

fn fail(code: u8, error: impl Display) -> ExitCode {
    let output = serde_json::json!({
        "success": false,
        "error": error.to_string(),
    });
    println!("{}", output);
    ExitCode::from(code)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let catalog = match &cli.catalog {
        Some(path) => match Catalog::load_from_file(path) {
            Ok(c) => c,
            Err(e) => return fail(1, format!("Failed to load catalog: {}", e)),
        },
        None => Catalog::builtin(),
    };

    let settings = match &cli.settings {
        Some(path) => match WizardSettings::load_from_file(path) {
            Ok(s) => s,
            Err(e) => return fail(1, format!("Failed to load settings: {}", e)),
        },
        None => WizardSettings::default(),
    };

    match cli.command {
        Commands::Countries { search, region } => print_json(&catalog.filter(&search, &region)),

        Commands::Regions => print_json(&catalog.regions()),

        Commands::Generate {
            email,
            password,
            name,
            country,
            payload,
            photo,
            seed,
            format,
        } => {
            let built = match seed {
                Some(seed) => RecordBuilder::with_tokens(settings, Box::new(SeededTokens::new(seed))),
                None => RecordBuilder::new(settings),
            };
            let builder = match built {
                Ok(b) => b,
                Err(e) => return fail(1, e),
            };
            let mut controller = SessionController::new(builder);

            let signed_in = match &name {
                Some(name) => controller.signup(name, &email, &password),
                None => controller.login(&email, &password),
            };
            if let Err(e) = signed_in {
                return fail(1, e);
            }

            let selected = match catalog.select(&country) {
                Ok(c) => controller.select_country(c),
                Err(e) => return fail(1, e),
            };
            if let Err(e) = selected {
                return fail(1, e);
            }

            let fields: BTreeMap<String, String> = match serde_json::from_str(&payload) {
                Ok(f) => f,
                Err(e) => return fail(1, format!("Invalid payload: {}", e)),
            };
            let mut form = match controller.draft() {
                Ok(f) => f,
                Err(e) => return fail(1, e),
            };
            for (key, value) in fields {
                if let Err(e) = form.set(&key, value) {
                    return fail(1, e);
                }
            }
            if let Some(path) = &photo {
                form.attach_photo_file(path);
            }

            match controller.submit_record(&form) {
                Ok(_) => {}
                Err(SessionError::RecordRejected(validation)) => {
                    let output = serde_json::json!({
                        "success": false,
                        "validation": validation,
                    });
                    println!("{}", output);
                    return ExitCode::from(2);
                }
                Err(e) => return fail(1, e),
            }

            let presenter = match controller.preview() {
                Ok(p) => p,
                Err(e) => return fail(1, e),
            };
            match format {
                OutputFormat::Text => {
                    print!("{}", presenter.render_text());
                    ExitCode::SUCCESS
                }
                OutputFormat::Json => print_json(&serde_json::json!({
                    "success": true,
                    "greeting": controller.session().greeting(),
                    "record": presenter.record(),
                    "preview": presenter.view(),
                })),
            }
        }
    }
}
