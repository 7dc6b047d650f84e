use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use client_core::{
    load_settings, CinemaController, ControllerError, HttpCinemaStore, MutationOutcome,
};
use shared::domain::{CinemaField, CinemaId, CinemaRecord};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cinema", about = "Manage a remote cinema collection")]
struct Args {
    /// Overrides the configured cinema resource url.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Print records as JSON instead of a table.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every record.
    List,
    /// Create a record.
    Add {
        #[arg(long, default_value = "")]
        movie: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        image: String,
    },
    /// Replace fields of an existing record.
    Edit {
        id: String,
        #[command(flatten)]
        fields: FieldOverrides,
    },
    /// Delete a record without confirmation.
    Delete { id: String },
}

#[derive(ClapArgs, Debug)]
struct FieldOverrides {
    #[arg(long)]
    movie: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    image: Option<String>,
}

impl Command {
    /// Commands that read the listed records cannot run without a successful load.
    fn needs_records(&self) -> bool {
        matches!(self, Command::List | Command::Edit { .. })
    }
}

impl FieldOverrides {
    fn entries(self) -> impl Iterator<Item = (CinemaField, String)> {
        [
            (CinemaField::Movie, self.movie),
            (CinemaField::Description, self.description),
            (CinemaField::Image, self.image),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    let store = HttpCinemaStore::from_settings(&settings)?;
    tracing::info!(api_url = %store.base_url(), "using cinema store");
    let controller = CinemaController::new(Arc::new(store));

    if let Err(err) = controller.refresh().await {
        if args.command.needs_records() {
            return Err(err).context("failed to load cinema records");
        }
        tracing::warn!(error = %err, "could not load cinema records; continuing");
    }

    match args.command {
        Command::List => {}
        Command::Add {
            movie,
            description,
            image,
        } => {
            controller.set_field(CinemaField::Movie, movie).await;
            controller
                .set_field(CinemaField::Description, description)
                .await;
            controller.set_field(CinemaField::Image, image).await;
            let outcome = alert_on_validation(controller.submit_create().await)?;
            report(&outcome);
        }
        Command::Edit { id, fields } => {
            let id = CinemaId::new(id);
            let snapshot = controller.snapshot().await;
            let Some(record) = snapshot.record(&id) else {
                bail!("no cinema record with id {id}");
            };
            controller.begin_edit(record).await;
            for (field, value) in fields.entries() {
                controller.set_field(field, value).await;
            }
            let outcome = alert_on_validation(controller.submit_edit().await)?;
            report(&outcome);
        }
        Command::Delete { id } => {
            let outcome = controller.delete_record(&CinemaId::new(id)).await?;
            report(&outcome);
        }
    }

    let snapshot = controller.snapshot().await;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot.records)?);
    } else {
        print_records(&snapshot.records);
    }
    Ok(())
}

fn alert_on_validation(
    result: Result<MutationOutcome, ControllerError>,
) -> Result<MutationOutcome> {
    match result {
        Err(ControllerError::Validation(err)) => {
            eprintln!("{err}");
            bail!("record not submitted")
        }
        other => Ok(other?),
    }
}

fn report(outcome: &MutationOutcome) {
    if outcome.refreshed {
        eprintln!("{} done", outcome.op);
    } else {
        eprintln!("{} done; list could not be refreshed", outcome.op);
    }
}

fn print_records(records: &[CinemaRecord]) {
    if records.is_empty() {
        println!("No cinema records.");
        return;
    }
    let id_width = records
        .iter()
        .map(|record| record.id.as_str().len())
        .max()
        .unwrap_or(2)
        .max(2);
    for record in records {
        println!(
            "{:<id_width$}  {}\n{:<id_width$}  {}\n{:<id_width$}  {}",
            record.id.as_str(),
            record.movie,
            "",
            record.description,
            "",
            record.image,
        );
    }
}
