//! Board rules: per-cell validation while editing, lock preconditions and
//! bingo line counting on the 5×5 grid.

use std::collections::BTreeSet;

use thiserror::Error;

/// Number of cells on one side of the board.
pub const BOARD_SIDE: usize = 5;
/// Total number of cells on a board.
pub const BOARD_CELLS: usize = BOARD_SIDE * BOARD_SIDE;
/// Highest number a cell may hold (the lowest is 1).
pub const MAX_NUMBER: u8 = BOARD_CELLS as u8;
/// Rows, columns and the two diagonals.
pub const MAX_LINES: u8 = (2 * BOARD_SIDE + 2) as u8;

/// Errors raised while editing or locking a board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// The board does not have exactly [`BOARD_CELLS`] cells.
    #[error("board must have exactly {expected} cells, got {len}", expected = BOARD_CELLS)]
    WrongSize {
        /// Number of cells received.
        len: usize,
    },
    /// A cell index outside the board was addressed.
    #[error("cell index {index} is outside the board")]
    CellOutOfBounds {
        /// Offending index.
        index: usize,
    },
    /// A value outside `1..=25` was entered.
    #[error("number {value} is outside 1..={max}", max = MAX_NUMBER)]
    OutOfRange {
        /// Value as received.
        value: i64,
    },
    /// The value already appears in another cell.
    #[error(
        "number {value} is already on the board; available numbers: {}",
        join_numbers(.available_numbers)
    )]
    DuplicateNumber {
        /// The duplicated value.
        value: u8,
        /// Cell holding the rejected entry.
        index: usize,
        /// Sorted numbers absent from the other 24 cells.
        available_numbers: Vec<u8>,
    },
    /// Lock attempted while some cells are still empty.
    #[error("all cells must be filled before locking ({} empty)", .empty_cells.len())]
    IncompleteBoard {
        /// Indices of the empty cells.
        empty_cells: Vec<usize>,
    },
}

fn join_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check that a raw value is a valid board number.
pub fn check_number(value: i64) -> Result<u8, BoardError> {
    u8::try_from(value)
        .ok()
        .filter(|n| (1..=MAX_NUMBER).contains(n))
        .ok_or(BoardError::OutOfRange { value })
}

/// Numbers in `1..=25` that do not appear in any cell other than `skip`.
pub fn available_numbers(cells: &[Option<u8>], skip: usize) -> Vec<u8> {
    let taken: BTreeSet<u8> = cells
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != skip)
        .filter_map(|(_, cell)| *cell)
        .collect();

    (1..=MAX_NUMBER).filter(|n| !taken.contains(n)).collect()
}

/// Blur-time check for the cell at `index`.
///
/// Fails only when the value at `index` is already present among the other
/// 24 cells. Empty cells always pass. Nothing is modified; clearing the
/// offending cell is left to the caller (see [`BoardDraft::commit_cell`]).
pub fn validate_cell(cells: &[Option<u8>; BOARD_CELLS], index: usize) -> Result<(), BoardError> {
    let Some(slot) = cells.get(index) else {
        return Err(BoardError::CellOutOfBounds { index });
    };
    let Some(value) = *slot else {
        return Ok(());
    };

    let duplicated = cells
        .iter()
        .enumerate()
        .any(|(i, other)| i != index && *other == Some(value));

    if duplicated {
        return Err(BoardError::DuplicateNumber {
            value,
            index,
            available_numbers: available_numbers(cells, index),
        });
    }

    Ok(())
}

fn line(cell: impl Fn(usize) -> usize) -> [usize; BOARD_SIDE] {
    std::array::from_fn(cell)
}

/// Flat indices of every line: 5 rows, 5 columns, main and anti diagonal.
fn lines() -> impl Iterator<Item = [usize; BOARD_SIDE]> {
    let rows = (0..BOARD_SIDE).map(|row| line(|col| row * BOARD_SIDE + col));
    let cols = (0..BOARD_SIDE).map(|col| line(|row| row * BOARD_SIDE + col));
    let main = line(|i| i * BOARD_SIDE + i);
    let anti = line(|i| i * BOARD_SIDE + (BOARD_SIDE - 1 - i));

    rows.chain(cols).chain([main, anti])
}

/// Count the rows, columns and diagonals whose five numbers are all in `completed`.
pub fn count_lines(cells: &[u8; BOARD_CELLS], completed: &BTreeSet<u8>) -> u8 {
    lines()
        .filter(|line| line.iter().all(|&i| completed.contains(&cells[i])))
        .count() as u8
}

/// Board being filled in by a player before it is locked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardDraft {
    cells: [Option<u8>; BOARD_CELLS],
}

impl BoardDraft {
    /// Empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a draft from raw client cells, rejecting wrong sizes and out-of-range values.
    pub fn from_raw(raw: &[Option<i64>]) -> Result<Self, BoardError> {
        if raw.len() != BOARD_CELLS {
            return Err(BoardError::WrongSize { len: raw.len() });
        }

        let mut draft = Self::new();
        for (index, value) in raw.iter().enumerate() {
            draft.cells[index] = value.map(check_number).transpose()?;
        }
        Ok(draft)
    }

    /// Build a draft from previously persisted numbers (possibly partial).
    pub fn from_numbers(numbers: &[u8]) -> Self {
        let mut draft = Self::new();
        for (slot, number) in draft.cells.iter_mut().zip(numbers) {
            *slot = check_number(i64::from(*number)).ok();
        }
        draft
    }

    /// Current cell contents.
    pub fn cells(&self) -> &[Option<u8>; BOARD_CELLS] {
        &self.cells
    }

    /// Replace the value of a single cell.
    pub fn set(&mut self, index: usize, value: Option<u8>) -> Result<(), BoardError> {
        let value = value
            .map(|n| check_number(i64::from(n)))
            .transpose()?;
        let slot = self
            .cells
            .get_mut(index)
            .ok_or(BoardError::CellOutOfBounds { index })?;
        *slot = value;
        Ok(())
    }

    /// Run the blur-time check on `index`, clearing the cell when its value is a duplicate.
    pub fn commit_cell(&mut self, index: usize) -> Result<(), BoardError> {
        match validate_cell(&self.cells, index) {
            Err(err @ BoardError::DuplicateNumber { .. }) => {
                self.cells[index] = None;
                Err(err)
            }
            other => other,
        }
    }

    /// Check the lock preconditions and freeze the board.
    pub fn lock(&self) -> Result<LockedBoard, BoardError> {
        let empty_cells: Vec<usize> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(i, _)| i)
            .collect();
        if !empty_cells.is_empty() {
            return Err(BoardError::IncompleteBoard { empty_cells });
        }

        for index in 0..BOARD_CELLS {
            validate_cell(&self.cells, index)?;
        }

        Ok(LockedBoard(self.cells.map(|cell| cell.unwrap_or_default())))
    }
}

/// Full board of 25 distinct numbers that can no longer be edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockedBoard([u8; BOARD_CELLS]);

impl LockedBoard {
    /// Cell contents in row-major order.
    pub fn cells(&self) -> &[u8; BOARD_CELLS] {
        &self.0
    }

    /// Whether `number` sits on this board.
    pub fn contains(&self, number: u8) -> bool {
        self.0.contains(&number)
    }

    /// Completed lines for the given set of completed numbers.
    pub fn count_lines(&self, completed: &BTreeSet<u8>) -> u8 {
        count_lines(&self.0, completed)
    }
}

impl TryFrom<&[u8]> for LockedBoard {
    type Error = BoardError;

    fn try_from(numbers: &[u8]) -> Result<Self, Self::Error> {
        if numbers.len() != BOARD_CELLS {
            return Err(BoardError::WrongSize { len: numbers.len() });
        }
        let raw: Vec<Option<i64>> = numbers.iter().map(|n| Some(i64::from(*n))).collect();
        BoardDraft::from_raw(&raw)?.lock()
    }
}

#[cfg(test)]
mod tests {
    use rand::seq::SliceRandom;

    use super::*;

    fn sequential() -> [u8; BOARD_CELLS] {
        std::array::from_fn(|i| i as u8 + 1)
    }

    fn all_numbers() -> BTreeSet<u8> {
        (1..=MAX_NUMBER).collect()
    }

    #[test]
    fn full_completion_counts_twelve_for_any_permutation() {
        let mut rng = rand::rng();
        let mut cells = sequential();
        for _ in 0..50 {
            cells.shuffle(&mut rng);
            assert_eq!(count_lines(&cells, &all_numbers()), MAX_LINES);
        }
        cells.reverse();
        assert_eq!(count_lines(&cells, &all_numbers()), MAX_LINES);
    }

    #[test]
    fn nothing_completed_counts_zero() {
        let mut rng = rand::rng();
        let mut cells = sequential();
        for _ in 0..20 {
            cells.shuffle(&mut rng);
            assert_eq!(count_lines(&cells, &BTreeSet::new()), 0);
        }
    }

    #[test]
    fn single_row_counts_one() {
        let mut rng = rand::rng();
        let mut cells = sequential();
        for row in 0..BOARD_SIDE {
            cells.shuffle(&mut rng);
            let completed: BTreeSet<u8> = cells[row * BOARD_SIDE..(row + 1) * BOARD_SIDE]
                .iter()
                .copied()
                .collect();
            assert_eq!(count_lines(&cells, &completed), 1);
        }
    }

    #[test]
    fn columns_and_diagonals_are_counted() {
        let cells = sequential();
        let first_column: BTreeSet<u8> = [1, 6, 11, 16, 21].into();
        assert_eq!(count_lines(&cells, &first_column), 1);

        let main: BTreeSet<u8> = [1, 7, 13, 19, 25].into();
        assert_eq!(count_lines(&cells, &main), 1);

        let anti: BTreeSet<u8> = [5, 9, 13, 17, 21].into();
        assert_eq!(count_lines(&cells, &anti), 1);

        // First row plus first column share cell 1.
        let cross: BTreeSet<u8> = [1, 2, 3, 4, 5, 6, 11, 16, 21].into();
        assert_eq!(count_lines(&cells, &cross), 2);
    }

    #[test]
    fn completed_numbers_off_board_do_not_matter() {
        let cells = sequential();
        let completed: BTreeSet<u8> = [1, 2, 3, 4, 5, 40, 0].into();
        assert_eq!(count_lines(&cells, &completed), 1);
    }

    #[test]
    fn duplicate_last_cell_reports_remaining_number() {
        let mut raw: Vec<Option<i64>> = (1..=24).map(Some).collect();
        raw.push(Some(24));
        let draft = BoardDraft::from_raw(&raw).unwrap();

        let err = validate_cell(draft.cells(), 24).unwrap_err();
        assert_eq!(
            err,
            BoardError::DuplicateNumber {
                value: 24,
                index: 24,
                available_numbers: vec![25],
            }
        );
    }

    #[test]
    fn commit_clears_duplicate_cell_only() {
        let mut draft = BoardDraft::new();
        draft.set(0, Some(7)).unwrap();
        draft.set(3, Some(7)).unwrap();

        let err = draft.commit_cell(3).unwrap_err();
        assert!(matches!(err, BoardError::DuplicateNumber { value: 7, .. }));
        assert_eq!(draft.cells()[3], None);
        assert_eq!(draft.cells()[0], Some(7));

        assert!(draft.commit_cell(0).is_ok());
    }

    #[test]
    fn empty_cell_passes_validation() {
        let draft = BoardDraft::new();
        assert!(validate_cell(draft.cells(), 12).is_ok());
        assert_eq!(
            validate_cell(draft.cells(), BOARD_CELLS),
            Err(BoardError::CellOutOfBounds { index: BOARD_CELLS })
        );
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert_eq!(check_number(0), Err(BoardError::OutOfRange { value: 0 }));
        assert_eq!(check_number(26), Err(BoardError::OutOfRange { value: 26 }));
        assert_eq!(check_number(-3), Err(BoardError::OutOfRange { value: -3 }));
        assert_eq!(check_number(25), Ok(25));

        let mut raw = vec![None; BOARD_CELLS];
        raw[4] = Some(99);
        assert_eq!(
            BoardDraft::from_raw(&raw),
            Err(BoardError::OutOfRange { value: 99 })
        );
    }

    #[test]
    fn lock_refuses_incomplete_board() {
        let mut raw: Vec<Option<i64>> = (1..=24).map(Some).collect();
        raw.push(None);
        let draft = BoardDraft::from_raw(&raw).unwrap();

        assert_eq!(
            draft.lock(),
            Err(BoardError::IncompleteBoard {
                empty_cells: vec![24]
            })
        );
    }

    #[test]
    fn lock_refuses_duplicates() {
        let mut raw: Vec<Option<i64>> = (1..=24).map(Some).collect();
        raw.push(Some(1));
        let draft = BoardDraft::from_raw(&raw).unwrap();

        assert!(matches!(
            draft.lock(),
            Err(BoardError::DuplicateNumber { value: 1, .. })
        ));
    }

    #[test]
    fn lock_keeps_cell_order() {
        let mut cells = sequential();
        cells.reverse();
        let locked = LockedBoard::try_from(&cells[..]).unwrap();
        assert_eq!(locked.cells(), &cells);
        assert!(locked.contains(25));
        assert!(!locked.contains(26));
    }

    #[test]
    fn wrong_size_is_rejected() {
        assert_eq!(
            BoardDraft::from_raw(&[Some(1)]),
            Err(BoardError::WrongSize { len: 1 })
        );
        assert_eq!(
            LockedBoard::try_from(&[1u8, 2, 3][..]),
            Err(BoardError::WrongSize { len: 3 })
        );
    }

    #[test]
    fn duplicate_message_lists_available_numbers() {
        let err = BoardError::DuplicateNumber {
            value: 3,
            index: 1,
            available_numbers: vec![4, 9],
        };
        assert_eq!(
            err.to_string(),
            "number 3 is already on the board; available numbers: 4, 9"
        );
    }
}
