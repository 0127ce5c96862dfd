// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// contentbridge: command-line controller for the content bridge.
//
// Entry point. Initialises logging and services, then runs one subcommand.
// Logs go to stderr so that `cat` output on stdout stays clean.

mod player;
mod services;

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use contentbridge_core::codec::decode_path;
use contentbridge_core::error::Result;
use contentbridge_core::human_errors::humanize_error;
use contentbridge_core::{ResourceIdentifier, canonicalize};

use player::{PlayerController, Track};
use services::app_services::AppServices;

#[derive(Debug, Parser)]
#[command(name = "contentbridge", version, about = "Content resolver and player notification bridge")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/contentbridge/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the canonical form of a resource identifier
    Canonicalize { raw: String },
    /// Print the display name of a resource (empty if unknown)
    Name { id: String },
    /// Print the size of a resource in bytes
    Size { id: String },
    /// Write a resource to stdout
    Cat { id: String },
    /// Copy one resource to another and print the byte count
    Copy { source: String, destination: String },
    /// Show the player notification and apply action names read from stdin
    Player {
        /// Notification icon
        #[arg(long, value_name = "PATH", default_value = "")]
        icon: String,
        #[arg(required = true)]
        tracks: Vec<String>,
    },
    /// Print the effective config as JSON
    Config {
        /// Also write it to the config file
        #[arg(long)]
        save: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            let human = humanize_error(&e);
            eprintln!("error: {}", human.message);
            eprintln!("  {}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Command::Canonicalize { raw } = &cli.command {
        println!("{}", canonicalize(raw));
        return Ok(());
    }

    let svc = AppServices::init(cli.config)?;
    tracing::info!(platform = svc.platform_name(), "contentbridge starting");

    match cli.command {
        Command::Canonicalize { .. } => Ok(()),
        Command::Name { id } => {
            println!("{}", svc.file_io().display_name(&canonicalize(&id))?);
            Ok(())
        }
        Command::Size { id } => {
            let io = svc.file_io();
            let mut handle = io.open_read(&canonicalize(&id))?;
            let size = io.size(&handle);
            io.close_read(&mut handle)?;
            println!("{}", size?);
            Ok(())
        }
        Command::Cat { id } => cat(&svc, &canonicalize(&id)),
        Command::Copy {
            source,
            destination,
        } => {
            let copied = svc.file_io().copy(
                &canonicalize(&source),
                &canonicalize(&destination),
                svc.transfer_options(),
            )?;
            println!("{copied}");
            Ok(())
        }
        Command::Player { icon, tracks } => run_player(&svc, icon, &tracks),
        Command::Config { save } => {
            let config = svc.config();
            if save {
                svc.save_config(&config)?;
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn cat(svc: &AppServices, id: &ResourceIdentifier) -> Result<()> {
    let io = svc.file_io();
    let mut handle = io.open_read(id)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let streamed = io.for_each_chunk(&mut handle, svc.transfer_options(), |chunk| {
        out.write_all(chunk)?;
        Ok(())
    });
    let closed = io.close_read(&mut handle);
    let bytes = streamed?;
    closed?;
    out.flush()?;
    tracing::debug!(bytes, "cat complete");
    Ok(())
}

fn run_player(svc: &AppServices, icon: String, raw_tracks: &[String]) -> Result<()> {
    let mut tracks = Vec::with_capacity(raw_tracks.len());
    for raw in raw_tracks {
        let id = canonicalize(raw);
        let mut title = svc.file_io().display_name(&id)?;
        if title.is_empty() {
            title = fallback_title(&id);
        }
        tracks.push(Track {
            title,
            resource: id.to_string(),
        });
    }

    let player = Arc::new(PlayerController::new(tracks, icon, Arc::clone(svc.surface()))?);
    player.start()?;
    player.attach(svc.actions());

    // Action names arrive one per line, as the notification buttons would send them.
    let stdin = std::io::stdin();
    let mut delivered: Result<()> = Ok(());
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                delivered = Err(e.into());
                break;
            }
        };
        let name = line.trim();
        if name.is_empty() {
            continue;
        }
        svc.actions().dispatch(name);
    }

    let detached = player.detach(svc.actions());
    delivered.and(detached)
}

fn fallback_title(id: &ResourceIdentifier) -> String {
    let path = decode_path(id);
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(path.as_str())
        .to_string()
}
