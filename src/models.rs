pub type Distance = i64;

/// 1-based spectator group id, shared by the reservations and filling files.
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct GroupId(pub usize);

/// 0-based row index into the room layout.
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct RowId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seat {
  pub group: GroupId,
  pub distance_to_stage: Distance,
}

/// Room-wide placement rules: Q seats between groups sharing a row,
/// P empty rows between occupied rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraints {
  pub seat_gap: i64,
  pub row_gap: i64,
}

#[derive(Debug, PartialEq)]
pub struct Room {
  pub constraints: Constraints,
  pub rows: Vec<Vec<Seat>>,
}

impl Room {
  pub fn row(&self, row: RowId) -> Option<&[Seat]> {
    self.rows.get(row.0).map(Vec::as_slice)
  }

  pub fn total_seats(&self) -> usize {
    self.rows.iter().map(Vec::len).sum()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
  pub group: GroupId,
  pub party_size: i64,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReservationBook {
  pub reservations: Vec<Reservation>,
}

impl ReservationBook {
  /// Group ids are consecutive from 1, so lookup is positional.
  pub fn by_group(&self, group: GroupId) -> Option<&Reservation> {
    self.reservations.get(group.0.checked_sub(1)?)
  }
}

/// One placement line of a filling file: a row, the groups seated there
/// in order, and how many seats they take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillingEntry {
  pub row_group: GroupId,
  pub row: RowId,
  pub seats_used: i64,
  pub groups: Vec<GroupId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filling {
  /// Header field; stored as submitted, never checked.
  pub rows_used: usize,
  pub claimed_distance_sum: Distance,
  pub claimed_occupancy: f32,
  pub entries: Vec<FillingEntry>,
}

impl Filling {
  pub fn used_seats(&self) -> i64 {
    self.entries.iter().map(|entry| entry.seats_used).sum()
  }
}
