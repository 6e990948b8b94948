use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::checker::Violation;
use crate::models::{Filling, ReservationBook, Room};

mod checker;
mod models;
mod parser;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Checks a proposed filling against the room layout, constraints and reservations
  Check {
    layout: PathBuf,
    constraints: PathBuf,
    reservations: PathBuf,
    filling: PathBuf,
    /// Print the verdict as JSON instead of plain text
    #[arg(short, long)]
    json: bool,
  },
  /// Recomputes the distance sum and occupancy rate a filling should claim
  Score {
    layout: PathBuf,
    constraints: PathBuf,
    reservations: PathBuf,
    filling: PathBuf,
  },
}

#[derive(serde::Serialize)]
struct VerdictReport {
  passed: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  violation: Option<Violation>,
  #[serde(skip_serializing_if = "Option::is_none")]
  reason: Option<String>,
}

fn main() -> Result<(), anyhow::Error> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let cli: Cli = Cli::parse();

  match &cli.command {
    Commands::Check {
      layout,
      constraints,
      reservations,
      filling,
      json,
    } => {
      let (room, book, filling) = load_inputs(layout, constraints, reservations, filling)?;
      let verdict = checker::validate(&room, &book, &filling);
      if *json {
        let report = VerdictReport {
          passed: verdict.is_ok(),
          reason: verdict.as_ref().err().map(|violation| violation.to_string()),
          violation: verdict.as_ref().err().cloned(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
      } else {
        match &verdict {
          Ok(()) => println!("filling accepted: every constraint and performance criterion holds"),
          Err(violation) => println!("filling rejected: {violation}"),
        }
      }
      if verdict.is_err() {
        std::process::exit(1);
      }
    }
    Commands::Score {
      layout,
      constraints,
      reservations,
      filling,
    } => {
      let (room, book, filling) = load_inputs(layout, constraints, reservations, filling)?;
      let spectators: i64 = book.reservations.iter().map(|r| r.party_size).sum();
      let sum = checker::distance_sum(&room, &filling)?;
      let rate = checker::occupancy_rate(&room, &filling);
      println!(
        "reservations: {} groups, {} spectators",
        book.reservations.len(),
        spectators
      );
      println!("distance sum: {sum}");
      println!(
        "occupancy: {}/{} ({rate:.3})",
        filling.used_seats(),
        room.total_seats()
      );
    }
  }

  Ok(())
}

fn load_inputs(
  layout: &Path,
  constraints: &Path,
  reservations: &Path,
  filling: &Path,
) -> Result<(Room, ReservationBook, Filling), anyhow::Error> {
  let rows = parser::parse_layout(&read(layout)?)
    .with_context(|| format!("parsing layout {}", layout.display()))?;
  let constraints = parser::parse_constraints(&read(constraints)?)
    .with_context(|| format!("parsing constraints {}", constraints.display()))?;
  let book = parser::parse_reservations(&read(reservations)?)
    .with_context(|| format!("parsing reservations {}", reservations.display()))?;
  let filling = parser::parse_filling(&read(filling)?)
    .with_context(|| format!("parsing filling {}", filling.display()))?;

  let room = Room { constraints, rows };
  debug!(
    rows = room.rows.len(),
    seats = room.total_seats(),
    groups = book.reservations.len(),
    entries = filling.entries.len(),
    "inputs loaded"
  );
  Ok((room, book, filling))
}

fn read(path: &Path) -> Result<String, anyhow::Error> {
  std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
