use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    AttachmentValidator, BillListController, ChannelNavigator, CurrentUser, HttpBillStore,
    NewBillController, NewBillForm, PersistedSession, RemoteBillStore, SelectedFile,
    UploadPolicy,
};
use shared::domain::{is_known_expense_type, EXPENSE_TYPES};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(name = "billed", about = "Submit and review expense claims")]
struct Args {
    /// Overrides the configured bill store URL.
    #[arg(long)]
    store_url: Option<String>,
    /// Overrides the configured session file.
    #[arg(long)]
    session_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Records the employee the next commands act for.
    SetUser {
        #[arg(long)]
        email: String,
    },
    /// Checks whether a receipt file would be accepted.
    Validate { file: String },
    /// Uploads a receipt and submits the expense claim.
    Submit {
        file: PathBuf,
        #[arg(long = "type", value_parser = parse_expense_type)]
        expense_type: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        amount: String,
        /// `YYYY-MM-DD` or `YYYY/MM/DD`.
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "")]
        vat: String,
        #[arg(long, default_value = "")]
        pct: String,
        #[arg(long, default_value = "")]
        commentary: String,
    },
    /// Lists submitted claims, most recent first.
    List,
}

fn parse_expense_type(raw: &str) -> Result<String, String> {
    if is_known_expense_type(raw) {
        Ok(raw.to_string())
    } else {
        Err(format!("expected one of: {}", EXPENSE_TYPES.join(", ")))
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
    if let Some(store_url) = args.store_url {
        settings.store_url = store_url;
    }
    if let Some(session_file) = args.session_file {
        settings.session_file = session_file;
    }

    match args.command {
        Command::SetUser { email } => set_user(&settings, email),
        Command::Validate { file } => {
            let check = AttachmentValidator::new(settings.extension_match).validate(&file);
            let verdict = if check.ok { "accepted" } else { "rejected" };
            println!("{}: {verdict} (extension '{}')", check.file_name, check.extension);
            Ok(())
        }
        Command::Submit {
            file,
            expense_type,
            name,
            amount,
            date,
            vat,
            pct,
            commentary,
        } => {
            let form = NewBillForm {
                expense_type,
                name,
                amount,
                date,
                vat,
                pct,
                commentary,
            };
            submit(&settings, file, form).await
        }
        Command::List => list(&settings).await,
    }
}

fn set_user(settings: &Settings, email: String) -> Result<()> {
    if let Some(parent) = settings.session_file.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("failed to create session directory '{}'", parent.display())
        })?;
    }
    PersistedSession::new(&settings.session_file).persist(&CurrentUser::employee(&email))?;
    println!("Session saved for {email}");
    Ok(())
}

fn connect_store(settings: &Settings) -> Result<Arc<dyn RemoteBillStore>> {
    let store = HttpBillStore::new(&settings.store_url)
        .with_context(|| format!("invalid store url '{}'", settings.store_url))?;
    Ok(Arc::new(store))
}

async fn submit(settings: &Settings, file: PathBuf, form: NewBillForm) -> Result<()> {
    let bytes = tokio::fs::read(&file)
        .await
        .with_context(|| format!("failed to read receipt '{}'", file.display()))?;
    let mime_type = mime_guess::from_path(&file).first_raw().map(str::to_string);

    let (navigator, mut routes) = ChannelNavigator::new();
    let controller = NewBillController::new(
        Arc::new(PersistedSession::new(&settings.session_file)),
        Some(connect_store(settings)?),
        Arc::new(navigator),
    )
    .with_validator(AttachmentValidator::new(settings.extension_match))
    .with_upload_policy(settings.upload_policy);

    let outcome = controller
        .on_attachment_selected(SelectedFile {
            path: file.display().to_string(),
            bytes,
            mime_type,
        })
        .await?;
    if let Some(rejection) = &outcome.rejection {
        if settings.upload_policy == UploadPolicy::RejectInvalid {
            bail!("{rejection}");
        }
        eprintln!("warning: {rejection}");
    }
    if let Some(upload) = outcome.upload {
        if let Err(err) = upload.await? {
            eprintln!("warning: {err}; the claim will be submitted without a receipt");
        }
    }

    let submitted = controller.on_submit(&form).await?;
    if let Some(persistence) = submitted.persistence {
        match persistence.await? {
            Ok(bill) => println!(
                "Submitted bill {}",
                bill.id.map(|id| id.to_string()).unwrap_or_default()
            ),
            Err(err) => eprintln!("error: {err}"),
        }
    }

    drop(controller);
    while let Some(route) = routes.recv().await {
        println!("-> {route}");
    }
    Ok(())
}

async fn list(settings: &Settings) -> Result<()> {
    let (navigator, _routes) = ChannelNavigator::new();
    let controller = BillListController::new(
        Arc::new(PersistedSession::new(&settings.session_file)),
        Some(connect_store(settings)?),
        Arc::new(navigator),
    )
    .with_ordering(settings.date_ordering);

    match controller.load().await {
        Ok(bills) => {
            println!("{}", controller.render().await);
            for row in &bills {
                if let Some(preview) = controller.preview(row) {
                    println!("receipt for '{}': {}", row.name, preview.file_url);
                }
            }
            Ok(())
        }
        Err(err) => {
            println!("{}", err.render());
            bail!("failed to load bills")
        }
    }
}
