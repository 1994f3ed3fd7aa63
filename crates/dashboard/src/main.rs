// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use badge_dashboard::client::{BadgeApi, HttpBadgeApi};
use badge_dashboard::controller::{Command, Controller};
use badge_dashboard::render::{render, to_table};
use badge_dashboard::session::{Toast, ToastKind};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "badges")]
#[command(about = "Manage user badges on a badge dashboard server", long_about = None)]
struct Cli {
    /// Base URL of the badge server
    #[arg(long, env = "BADGES_SERVER", default_value = "http://localhost:4000")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List badges, optionally only users whose id contains TERM
    List {
        #[arg(long, short)]
        search: Option<String>,
    },
    /// Add a badge from a URL or an image file
    Add {
        #[arg(long)]
        user: String,

        #[arg(long)]
        tooltip: String,

        /// Public image URL
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        url: Option<String>,

        /// Image to upload to the image host first
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Delete the badge at INDEX of USER (positions as shown by `list`)
    Delete {
        user: String,
        index: usize,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Upload an image and print its public URL
    Upload { file: PathBuf },
}

type Dashboard = Controller<HttpBadgeApi>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let api = HttpBadgeApi::new(&cli.server)?;
    let mut dashboard = Controller::new(api);
    let mut shown = None;

    match cli.command {
        Commands::List { search } => {
            dashboard.handle(Command::Reload, Instant::now()).await;
            report(&dashboard, &mut shown)?;
            if let Some(term) = search {
                dashboard.handle(Command::Search(term), Instant::now()).await;
            }
            println!("{}", to_table(&render(dashboard.session())));
        }
        Commands::Add { user, tooltip, url, file } => {
            let now = Instant::now();
            dashboard.handle(Command::SetUserId(user), now).await;
            dashboard.handle(Command::SetTooltip(tooltip), now).await;
            if let Some(path) = file {
                let bytes = tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let name = file_name(&path);
                dashboard.handle(Command::AttachFile { name, bytes }, now).await;
            } else if let Some(url) = url {
                dashboard.handle(Command::SetUrl(url), now).await;
            }
            dashboard.handle(Command::Submit, now).await;
            report(&dashboard, &mut shown)?;
            while dashboard.session().is_busy() {
                if dashboard.session().is_uploading() {
                    eprintln!("Uploading image...");
                }
                dashboard.handle(Command::Advance, Instant::now()).await;
                report(&dashboard, &mut shown)?;
            }
            println!("{}", to_table(&render(dashboard.session())));
        }
        Commands::Delete { user, index, yes } => {
            dashboard.handle(Command::Reload, Instant::now()).await;
            report(&dashboard, &mut shown)?;
            dashboard
                .handle(Command::RequestDelete { user_id: user, index }, Instant::now())
                .await;
            report(&dashboard, &mut shown)?;

            if !yes && !confirm(&dashboard)? {
                dashboard.handle(Command::CancelDelete, Instant::now()).await;
                println!("Cancelled");
                return Ok(());
            }

            dashboard.handle(Command::ConfirmDelete, Instant::now()).await;
            report(&dashboard, &mut shown)?;
        }
        Commands::Upload { file } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let url = dashboard.api().upload(bytes, &file_name(&file)).await?;
            println!("{}", url);
        }
    }

    Ok(())
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

/// Prints the current toast unless it was already printed. An error toast
/// fails the command; a warning does not.
fn report(dashboard: &Dashboard, shown: &mut Option<Toast>) -> anyhow::Result<()> {
    let toast = dashboard.session().toast.as_ref();
    if toast == shown.as_ref() {
        return Ok(());
    }
    *shown = toast.cloned();

    match toast {
        Some(toast) if toast.kind == ToastKind::Error => bail!("{}", toast.message),
        Some(toast) if toast.kind == ToastKind::Warning => {
            eprintln!("warning: {}", toast.message);
            Ok(())
        }
        Some(toast) => {
            eprintln!("{}", toast.message);
            Ok(())
        }
        None => Ok(()),
    }
}

fn confirm(dashboard: &Dashboard) -> anyhow::Result<bool> {
    let Some(modal) = render(dashboard.session()).delete_modal else {
        return Ok(false);
    };

    println!("{}", modal.user_label);
    println!("Tooltip: {}", modal.tooltip);
    println!("Image:   {}", modal.image_url);
    print!("Delete this badge? [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
