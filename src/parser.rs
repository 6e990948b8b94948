use std::str::FromStr;

use thiserror::Error;

use crate::models::{
  Constraints, Filling, FillingEntry, GroupId, Reservation, ReservationBook, RowId, Seat,
};

/// Marker line ending the placement section of a filling file.
/// Compared exactly, untrimmed; anything after it is left unparsed.
pub const PLACEMENTS_END: &str = "Non places";

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum FormatError {
  #[error("line {line}: expected an integer, found {token:?}")]
  BadInteger { line: usize, token: String },
  #[error("line {line}: expected {expected}")]
  MissingField { line: usize, expected: &'static str },
  #[error("line {line}: trailing tokens after {expected}")]
  TrailingTokens { line: usize, expected: &'static str },
  #[error("line {line}: seat descriptors come in (group, distance) pairs")]
  DanglingSeatToken { line: usize },
  #[error("line {line}: reservation ids must be consecutive from 1, found {found}")]
  OutOfOrderReservation { line: usize, found: usize },
  #[error("invalid occupancy rate {token:?}: expected \"used/total\"")]
  BadOccupancyRate { token: String },
  #[error("filling file is missing its header line")]
  MissingHeader,
}

fn parse_int<T: FromStr>(line: usize, token: &str) -> Result<T, FormatError> {
  token.parse().map_err(|_| FormatError::BadInteger {
    line,
    token: token.to_string(),
  })
}

/// Parses the room layout: line i describes row i as (group, distance)
/// pairs, one pair per seat, left to right. A blank line is a row with
/// no seats; group 0 marks a seat the plan leaves unassigned.
pub fn parse_layout(input: &str) -> Result<Vec<Vec<Seat>>, FormatError> {
  let mut rows = Vec::new();
  for (idx, line) in input.lines().enumerate() {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() % 2 != 0 {
      return Err(FormatError::DanglingSeatToken { line: idx + 1 });
    }
    let mut seats = Vec::with_capacity(tokens.len() / 2);
    for pair in tokens.chunks(2) {
      seats.push(Seat {
        group: GroupId(parse_int(idx + 1, pair[0])?),
        distance_to_stage: parse_int(idx + 1, pair[1])?,
      });
    }
    rows.push(seats);
  }
  Ok(rows)
}

/// Parses the constraints file: a single `<Q> <P>` line.
pub fn parse_constraints(input: &str) -> Result<Constraints, FormatError> {
  const EXPECTED: &str = "the two constraint values Q and P";
  let line = input.lines().next().ok_or(FormatError::MissingField {
    line: 1,
    expected: EXPECTED,
  })?;
  let tokens: Vec<&str> = line.split_whitespace().collect();
  match tokens.len() {
    0 | 1 => Err(FormatError::MissingField {
      line: 1,
      expected: EXPECTED,
    }),
    2 => Ok(Constraints {
      seat_gap: parse_int(1, tokens[0])?,
      row_gap: parse_int(1, tokens[1])?,
    }),
    _ => Err(FormatError::TrailingTokens {
      line: 1,
      expected: EXPECTED,
    }),
  }
}

/// Parses the reservations file: one `<groupId> <size>` line per group.
/// Ids must be consecutive from 1; the checker relies on that for its
/// positional lookups.
pub fn parse_reservations(input: &str) -> Result<ReservationBook, FormatError> {
  const EXPECTED: &str = "a group id and a party size";
  let mut reservations = Vec::new();
  for (idx, line) in input.lines().enumerate() {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
      return Err(FormatError::MissingField {
        line: idx + 1,
        expected: EXPECTED,
      });
    }
    if tokens.len() > 2 {
      return Err(FormatError::TrailingTokens {
        line: idx + 1,
        expected: EXPECTED,
      });
    }
    let group: usize = parse_int(idx + 1, tokens[0])?;
    if group != reservations.len() + 1 {
      return Err(FormatError::OutOfOrderReservation {
        line: idx + 1,
        found: group,
      });
    }
    reservations.push(Reservation {
      group: GroupId(group),
      party_size: parse_int(idx + 1, tokens[1])?,
    });
  }
  Ok(ReservationBook { reservations })
}

/// Parses a filling file: a `<rowsUsed> <distanceSum> <used/total>` header,
/// then one placement line per occupied row until the end marker.
pub fn parse_filling(input: &str) -> Result<Filling, FormatError> {
  const HEADER: &str = "rows used, claimed distance sum and occupancy rate";
  let mut lines = input.lines().enumerate();
  let (_, header) = lines.next().ok_or(FormatError::MissingHeader)?;
  let tokens: Vec<&str> = header.split_whitespace().collect();
  if tokens.len() < 3 {
    return Err(FormatError::MissingField {
      line: 1,
      expected: HEADER,
    });
  }
  if tokens.len() > 3 {
    return Err(FormatError::TrailingTokens {
      line: 1,
      expected: HEADER,
    });
  }
  let rows_used = parse_int(1, tokens[0])?;
  let claimed_distance_sum = parse_int(1, tokens[1])?;
  let claimed_occupancy = parse_occupancy_rate(tokens[2])?;

  let mut entries = Vec::new();
  for (idx, line) in lines {
    if line == PLACEMENTS_END {
      break;
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
      return Err(FormatError::MissingField {
        line: idx + 1,
        expected: "a row group, a row, placed groups and a seat count",
      });
    }
    let row_group = GroupId(parse_int(idx + 1, tokens[0])?);
    let row = RowId(parse_int(idx + 1, tokens[1])?);
    // the last integer on the line is the seat count; everything between
    // the first two and it is the ordered group list (possibly empty)
    let seats_used = parse_int(idx + 1, tokens[tokens.len() - 1])?;
    let groups = tokens[2..tokens.len() - 1]
      .iter()
      .map(|token| parse_int(idx + 1, token).map(GroupId))
      .collect::<Result<Vec<_>, _>>()?;
    entries.push(FillingEntry {
      row_group,
      row,
      seats_used,
      groups,
    });
  }

  Ok(Filling {
    rows_used,
    claimed_distance_sum,
    claimed_occupancy,
    entries,
  })
}

fn parse_occupancy_rate(token: &str) -> Result<f32, FormatError> {
  let bad = || FormatError::BadOccupancyRate {
    token: token.to_string(),
  };
  let parts: Vec<&str> = token.split('/').collect();
  if parts.len() != 2 {
    return Err(bad());
  }
  let used: f32 = parts[0].parse().map_err(|_| bad())?;
  let total: f32 = parts[1].parse().map_err(|_| bad())?;
  Ok(used / total)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn layout_rows_are_seat_pairs() {
    let rows = parse_layout("1 1 1 1 1 0 0 5\n0 4 0 4 0 4\n2 1 2 1 2 1\n").unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].len(), 4);
    assert_eq!(rows[1].len(), 3);
    assert_eq!(
      rows[2][0],
      Seat {
        group: GroupId(2),
        distance_to_stage: 1
      }
    );
  }

  #[test]
  fn blank_layout_line_is_an_empty_row() {
    let rows = parse_layout("1 1\n\n2 3\n").unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows[1].is_empty());
  }

  #[test]
  fn layout_rejects_dangling_seat_token() {
    assert_eq!(
      parse_layout("1 1 2\n"),
      Err(FormatError::DanglingSeatToken { line: 1 })
    );
  }

  #[test]
  fn layout_rejects_non_numeric_token() {
    assert_eq!(
      parse_layout("1 x\n"),
      Err(FormatError::BadInteger {
        line: 1,
        token: "x".to_string()
      })
    );
  }

  #[test]
  fn constraints_line_holds_q_then_p() {
    let constraints = parse_constraints("2 1\n").unwrap();
    assert_eq!(constraints.seat_gap, 2);
    assert_eq!(constraints.row_gap, 1);
  }

  #[test]
  fn constraints_reject_wrong_field_counts() {
    assert!(matches!(
      parse_constraints("2\n"),
      Err(FormatError::MissingField { .. })
    ));
    assert!(matches!(
      parse_constraints("2 1 7\n"),
      Err(FormatError::TrailingTokens { .. })
    ));
    assert!(matches!(
      parse_constraints(""),
      Err(FormatError::MissingField { .. })
    ));
  }

  #[test]
  fn reservations_parse_in_file_order() {
    let book = parse_reservations("1 3\n2 4\n3 3\n").unwrap();
    assert_eq!(book.reservations.len(), 3);
    assert_eq!(book.by_group(GroupId(2)).unwrap().party_size, 4);
    assert!(book.by_group(GroupId(4)).is_none());
    assert!(book.by_group(GroupId(0)).is_none());
  }

  #[test]
  fn reservations_reject_gapped_ids() {
    assert_eq!(
      parse_reservations("1 3\n3 4\n"),
      Err(FormatError::OutOfOrderReservation { line: 2, found: 3 })
    );
  }

  #[test]
  fn reservations_reject_short_lines() {
    assert!(matches!(
      parse_reservations("1\n"),
      Err(FormatError::MissingField { .. })
    ));
  }

  #[test]
  fn filling_header_and_entries_parse() {
    let filling = parse_filling("2 5 6/10\n1 0 1 3\n2 2 2 3\nNon places\n").unwrap();
    assert_eq!(filling.rows_used, 2);
    assert_eq!(filling.claimed_distance_sum, 5);
    assert!((filling.claimed_occupancy - 0.6).abs() < f32::EPSILON);
    assert_eq!(filling.entries.len(), 2);
    let entry = &filling.entries[1];
    assert_eq!(entry.row_group, GroupId(2));
    assert_eq!(entry.row, RowId(2));
    assert_eq!(entry.groups, vec![GroupId(2)]);
    assert_eq!(entry.seats_used, 3);
    assert_eq!(filling.used_seats(), 6);
  }

  #[test]
  fn filling_entry_pops_trailing_seat_count() {
    let filling = parse_filling("1 12 10/10\n2 2 2 3 7\nNon places\n").unwrap();
    let entry = &filling.entries[0];
    assert_eq!(entry.groups, vec![GroupId(2), GroupId(3)]);
    assert_eq!(entry.seats_used, 7);
  }

  #[test]
  fn filling_entry_group_list_may_be_empty() {
    let filling = parse_filling("1 0 0/10\n4 2 0\nNon places\n").unwrap();
    let entry = &filling.entries[0];
    assert!(entry.groups.is_empty());
    assert_eq!(entry.seats_used, 0);
  }

  #[test]
  fn text_after_end_marker_is_ignored() {
    let filling = parse_filling("1 5 6/10\n1 0 1 3\nNon places\nanything at all\n").unwrap();
    assert_eq!(filling.entries.len(), 1);
  }

  #[test]
  fn filling_without_header_is_rejected() {
    assert_eq!(parse_filling(""), Err(FormatError::MissingHeader));
  }

  #[test]
  fn filling_rejects_short_entry_line() {
    assert!(matches!(
      parse_filling("1 5 6/10\n1 0\nNon places\n"),
      Err(FormatError::MissingField { line: 2, .. })
    ));
  }

  #[test]
  fn occupancy_rate_must_be_a_two_part_fraction() {
    assert!(matches!(
      parse_filling("1 5 0.6\n"),
      Err(FormatError::BadOccupancyRate { .. })
    ));
    assert!(matches!(
      parse_filling("1 5 6/10/2\n"),
      Err(FormatError::BadOccupancyRate { .. })
    ));
    assert!(matches!(
      parse_filling("1 5 a/b\n"),
      Err(FormatError::BadOccupancyRate { .. })
    ));
  }
}
