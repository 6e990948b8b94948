use serde::Serialize;
use thiserror::Error;

use crate::models::{Distance, Filling, ReservationBook, Room};

/// Absolute tolerance when comparing the claimed occupancy rate.
pub const OCCUPANCY_TOLERANCE: f32 = 0.01;

/// First rule a filling breaks, in check order.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum Violation {
  #[error("groups are closer than {gap} seats apart in row {row}")]
  RowSpacing { row: usize, gap: i64 },
  #[error("row {row} is within {gap} rows of occupied row {previous}")]
  RowBuffer {
    row: usize,
    previous: usize,
    gap: i64,
  },
  #[error("group {group} is divided between rows")]
  GroupDivided { group: usize },
  #[error("group {group} is not placed")]
  GroupNotPlaced { group: usize },
  #[error("row {row} places group {group}, which has no reservation")]
  UnknownGroup { row: usize, group: usize },
  #[error("filling refers to row {row} but the room has {room_rows} rows")]
  UnknownRow { row: usize, room_rows: usize },
  #[error("claimed distance sum {claimed} does not match the computed sum {computed}")]
  DistanceSum {
    claimed: Distance,
    computed: Distance,
  },
  #[error("claimed occupancy rate {claimed} does not match the computed rate {computed}")]
  OccupancyRate { claimed: f32, computed: f32 },
}

/// Judges a proposed filling. Checks run in a fixed order (seat spacing,
/// row buffer, group placement, distance sum, occupancy rate) and stop at
/// the first broken rule; a passing filling satisfies all five.
pub fn validate(
  room: &Room,
  book: &ReservationBook,
  filling: &Filling,
) -> Result<(), Violation> {
  check_seat_spacing(room, book, filling)?;
  check_row_buffer(room, filling)?;
  check_group_placement(book, filling)?;
  check_distance_sum(room, filling)?;
  check_occupancy_rate(room, filling)
}

// Q: walks each row's groups in listed order, carrying the previous
// group's size as the seat position the next group is measured against.
// The virtual predecessor sits Q seats before the row starts so the
// first group is never rejected.
fn check_seat_spacing(
  room: &Room,
  book: &ReservationBook,
  filling: &Filling,
) -> Result<(), Violation> {
  let gap = room.constraints.seat_gap;
  for entry in &filling.entries {
    let mut last_seat = -gap;
    for &group in &entry.groups {
      let reservation = book.by_group(group).ok_or(Violation::UnknownGroup {
        row: entry.row.0,
        group: group.0,
      })?;
      if last_seat + gap > reservation.party_size {
        return Err(Violation::RowSpacing {
          row: entry.row.0,
          gap,
        });
      }
      last_seat = reservation.party_size;
    }
  }
  Ok(())
}

// P: entries are taken in submission order, which well-formed fillings
// keep non-decreasing by row; no sort is applied.
fn check_row_buffer(room: &Room, filling: &Filling) -> Result<(), Violation> {
  let gap = room.constraints.row_gap;
  let mut last_occupied: i64 = -gap - 1;
  for entry in &filling.entries {
    let row = entry.row.0 as i64;
    if row <= last_occupied + gap {
      return Err(Violation::RowBuffer {
        row: entry.row.0,
        previous: last_occupied as usize,
        gap,
      });
    }
    last_occupied = row;
  }
  Ok(())
}

// Every reserved group must appear in exactly one entry. Repeats within
// a single entry are not flagged; only cross-entry division is.
fn check_group_placement(book: &ReservationBook, filling: &Filling) -> Result<(), Violation> {
  for reservation in &book.reservations {
    let mut placed = false;
    for entry in &filling.entries {
      if entry.groups.contains(&reservation.group) {
        if placed {
          return Err(Violation::GroupDivided {
            group: reservation.group.0,
          });
        }
        placed = true;
      }
    }
    if !placed {
      return Err(Violation::GroupNotPlaced {
        group: reservation.group.0,
      });
    }
  }
  Ok(())
}

/// Recomputes the distance-to-stage sum a filling should have claimed:
/// for each entry, the distances of the seats its row assigns to the
/// entry's row group.
pub fn distance_sum(room: &Room, filling: &Filling) -> Result<Distance, Violation> {
  let mut sum = 0;
  for entry in &filling.entries {
    let seats = room.row(entry.row).ok_or(Violation::UnknownRow {
      row: entry.row.0,
      room_rows: room.rows.len(),
    })?;
    sum += seats
      .iter()
      .filter(|seat| seat.group == entry.row_group)
      .map(|seat| seat.distance_to_stage)
      .sum::<Distance>();
  }
  Ok(sum)
}

fn check_distance_sum(room: &Room, filling: &Filling) -> Result<(), Violation> {
  let computed = distance_sum(room, filling)?;
  if computed != filling.claimed_distance_sum {
    return Err(Violation::DistanceSum {
      claimed: filling.claimed_distance_sum,
      computed,
    });
  }
  Ok(())
}

/// Fraction of the room's seats the filling actually uses.
pub fn occupancy_rate(room: &Room, filling: &Filling) -> f32 {
  filling.used_seats() as f32 / room.total_seats() as f32
}

fn check_occupancy_rate(room: &Room, filling: &Filling) -> Result<(), Violation> {
  let computed = occupancy_rate(room, filling);
  if (computed - filling.claimed_occupancy).abs() > OCCUPANCY_TOLERANCE {
    return Err(Violation::OccupancyRate {
      claimed: filling.claimed_occupancy,
      computed,
    });
  }
  Ok(())
}
