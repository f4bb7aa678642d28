#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Jail management.
//!
//! [`JailManager`] owns the cells and the prisoner register and reads and
//! writes `jail.json`. Prisoners move between cells only through
//! [`JailManager::admit`], [`JailManager::release`], and
//! [`JailManager::transfer`], which keep each cell's occupant list and each
//! prisoner's `cell_id` in agreement.

use std::path::Path;

use lems_jail_models::{Cell, CellRow, JailDocument, Prisoner};
use lems_officer::OfficerLookup;
use lems_officer::models::Officer;
use lems_record_store::{
    DanglingReference, FieldPatch, KindCounts, Record, RecordError, RecordId, RecordManager,
    Tally, legacy, persist,
};
use thiserror::Error;

pub use lems_jail_models as models;

/// Errors from jail operations.
#[derive(Debug, Error)]
pub enum JailError {
    /// A record lookup, insert, or field update failed.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// The cell has no free place.
    #[error("Cell {cell_id} is full ({capacity} place(s))")]
    CellFull {
        /// The full cell.
        cell_id: RecordId,
        /// Its capacity.
        capacity: u32,
    },

    /// The prisoner is already housed.
    #[error("Prisoner {prisoner_id} is already in cell {cell_id}")]
    AlreadyHoused {
        /// The prisoner.
        prisoner_id: RecordId,
        /// Cell currently housing them.
        cell_id: RecordId,
    },

    /// The prisoner is not housed in any cell.
    #[error("Prisoner {0} is not in a cell")]
    NotHoused(RecordId),

    /// The cell still houses prisoners.
    #[error("Cell {cell_id} still holds {occupants} prisoner(s)")]
    CellOccupied {
        /// The occupied cell.
        cell_id: RecordId,
        /// Number of prisoners in it.
        occupants: usize,
    },
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Running aggregates over the cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellStatistics {
    /// Cell counts by kind.
    pub by_kind: KindCounts,
    /// Sum of cell capacities.
    pub total_capacity: u64,
    /// Prisoners housed across all cells.
    pub total_occupancy: usize,
}

impl CellStatistics {
    /// Housed prisoners as a percentage of total capacity. Zero when there
    /// is no capacity.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn occupancy_rate(&self) -> f64 {
        if self.total_capacity == 0 {
            return 0.0;
        }
        self.total_occupancy as f64 * 100.0 / self.total_capacity as f64
    }
}

impl Tally<Cell> for CellStatistics {
    fn absorb(&mut self, cell: &Cell) {
        self.by_kind.increment(cell.kind());
        self.total_capacity += u64::from(cell.capacity);
        self.total_occupancy += cell.occupancy();
    }

    fn retract(&mut self, cell: &Cell) {
        self.by_kind.decrement(cell.kind());
        self.total_capacity -= u64::from(cell.capacity);
        self.total_occupancy -= cell.occupancy();
    }
}

/// Running aggregates over the prisoner register.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrisonerStatistics {
    /// Prisoner counts by offense.
    pub by_kind: KindCounts,
    /// Prisoners currently housed in a cell.
    pub housed: usize,
}

impl Tally<Prisoner> for PrisonerStatistics {
    fn absorb(&mut self, prisoner: &Prisoner) {
        self.by_kind.increment(prisoner.kind());
        if prisoner.cell_id.is_some() {
            self.housed += 1;
        }
    }

    fn retract(&mut self, prisoner: &Prisoner) {
        self.by_kind.decrement(prisoner.kind());
        if prisoner.cell_id.is_some() {
            self.housed -= 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Owns every cell and prisoner.
#[derive(Debug, Clone, Default)]
pub struct JailManager {
    cells: RecordManager<Cell, CellStatistics>,
    prisoners: RecordManager<Prisoner, PrisonerStatistics>,
}

impl JailManager {
    /// Creates an empty jail.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Cells --------------------------------------------------------------

    /// Adds an empty cell.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::DuplicateId`] if the id is taken or
    /// [`RecordError::InvalidField`] if the cell lists occupants.
    pub fn add_cell(&mut self, cell: Cell) -> Result<RecordId, RecordError> {
        if !cell.occupants.is_empty() {
            return Err(RecordError::invalid_field(
                "occupants",
                "new cells start empty; admit prisoners instead",
            ));
        }
        let id = self.cells.insert(cell)?;
        log::debug!("Added cell {id}");
        Ok(id)
    }

    /// Builds a cell of `kind` and applies `fields` before inserting it.
    /// Nothing is inserted if any field fails to apply.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidField`] for a bad field or
    /// [`RecordError::DuplicateId`] if the id is taken.
    pub fn add_cell_from_fields(
        &mut self,
        kind: &str,
        id: Option<RecordId>,
        capacity: u32,
        fields: &[(&str, &str)],
    ) -> Result<RecordId, RecordError> {
        let id = id.unwrap_or_else(|| self.cells.next_id());
        let mut cell = Cell::from_kind(kind, id, capacity);
        for (field, value) in fields {
            cell.set_field(field, value)?;
        }
        self.add_cell(cell)
    }

    /// The id the next auto-numbered cell will get.
    #[must_use]
    pub const fn next_cell_id(&self) -> RecordId {
        self.cells.next_id()
    }

    /// Looks up a cell.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if absent.
    pub fn find_cell(&self, id: RecordId) -> Result<&Cell, RecordError> {
        self.cells.find(id)
    }

    /// All cells in insertion order.
    pub fn cells(&self) -> impl ExactSizeIterator<Item = &Cell> + '_ {
        self.cells.list()
    }

    /// Cells of one kind.
    #[must_use]
    pub fn cells_of_kind(&self, kind: &str) -> Vec<&Cell> {
        self.cells.filter_by_kind(kind)
    }

    /// Cells with at least one free place.
    #[must_use]
    pub fn cells_with_space(&self) -> Vec<&Cell> {
        self.cells.filter(|c| !c.is_full())
    }

    /// Sets one cell field from text input.
    ///
    /// Officer ids set this way are not checked; use
    /// [`JailManager::assign_officer`] to validate against the roster.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] or [`RecordError::InvalidField`].
    pub fn update_cell(
        &mut self,
        id: RecordId,
        field: &str,
        value: &str,
    ) -> Result<&Cell, RecordError> {
        self.cells.update(id, |c| c.set_field(field, value))
    }

    /// Puts an officer in charge of a cell, or clears the assignment when
    /// `officer_id` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`JailError::Record`] with [`RecordError::NotFound`] if the
    /// cell or officer is absent.
    pub fn assign_officer(
        &mut self,
        cell_id: RecordId,
        officer_id: Option<RecordId>,
        officers: &dyn OfficerLookup,
    ) -> Result<&Cell, JailError> {
        if let Some(officer_id) = officer_id
            && !officers.has_officer(officer_id)
        {
            return Err(RecordError::not_found(Officer::FAMILY, officer_id).into());
        }
        let cell = self
            .cells
            .update(cell_id, |c: &mut Cell| -> Result<(), RecordError> {
                c.assigned_officer_id = officer_id;
                Ok(())
            })?;
        Ok(cell)
    }

    /// Deletes an empty cell.
    ///
    /// # Errors
    ///
    /// Returns [`JailError::Record`] with [`RecordError::NotFound`] if
    /// absent, or [`JailError::CellOccupied`] if prisoners are still housed
    /// there.
    pub fn delete_cell(&mut self, id: RecordId) -> Result<Cell, JailError> {
        let occupants = self.cells.find(id)?.occupancy();
        if occupants > 0 {
            return Err(JailError::CellOccupied {
                cell_id: id,
                occupants,
            });
        }
        let cell = self.cells.delete(id)?;
        log::debug!("Deleted cell {id}");
        Ok(cell)
    }

    // -- Prisoners ----------------------------------------------------------

    /// Registers a prisoner without housing them.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::DuplicateId`] if the id is taken or
    /// [`RecordError::InvalidField`] if the prisoner already names a cell.
    pub fn add_prisoner(&mut self, prisoner: Prisoner) -> Result<RecordId, RecordError> {
        if prisoner.cell_id.is_some() {
            return Err(RecordError::invalid_field(
                "cellId",
                "register the prisoner first, then admit them to a cell",
            ));
        }
        let id = self.prisoners.insert(prisoner)?;
        log::debug!("Registered prisoner {id}");
        Ok(id)
    }

    /// Builds a prisoner and applies `fields` before registering them.
    /// Nothing is inserted if any field fails to apply.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidField`] for a bad field or
    /// [`RecordError::DuplicateId`] if the id is taken.
    pub fn add_prisoner_from_fields(
        &mut self,
        id: Option<RecordId>,
        name: &str,
        fields: &[(&str, &str)],
    ) -> Result<RecordId, RecordError> {
        let id = id.unwrap_or_else(|| self.prisoners.next_id());
        let mut prisoner = Prisoner::new(id, name.trim());
        for (field, value) in fields {
            prisoner.set_field(field, value)?;
        }
        self.add_prisoner(prisoner)
    }

    /// The id the next auto-numbered prisoner will get.
    #[must_use]
    pub const fn next_prisoner_id(&self) -> RecordId {
        self.prisoners.next_id()
    }

    /// Looks up a prisoner.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if absent.
    pub fn find_prisoner(&self, id: RecordId) -> Result<&Prisoner, RecordError> {
        self.prisoners.find(id)
    }

    /// All prisoners in insertion order.
    pub fn prisoners(&self) -> impl ExactSizeIterator<Item = &Prisoner> + '_ {
        self.prisoners.list()
    }

    /// Prisoners housed in a cell.
    #[must_use]
    pub fn prisoners_in_cell(&self, cell_id: RecordId) -> Vec<&Prisoner> {
        self.prisoners.filter(|p| p.cell_id == Some(cell_id))
    }

    /// Prisoners not housed anywhere.
    #[must_use]
    pub fn unhoused_prisoners(&self) -> Vec<&Prisoner> {
        self.prisoners.filter(|p| p.cell_id.is_none())
    }

    /// Sets one prisoner field from text input.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] or [`RecordError::InvalidField`].
    pub fn update_prisoner(
        &mut self,
        id: RecordId,
        field: &str,
        value: &str,
    ) -> Result<&Prisoner, RecordError> {
        self.prisoners.update(id, |p| p.set_field(field, value))
    }

    /// Deletes a prisoner, releasing them from their cell first.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if absent.
    pub fn delete_prisoner(&mut self, id: RecordId) -> Result<Prisoner, RecordError> {
        if let Some(cell_id) = self.prisoners.find(id)?.cell_id {
            self.remove_occupant(cell_id, id)?;
        }
        let prisoner = self.prisoners.delete(id)?;
        log::debug!("Deleted prisoner {id}");
        Ok(prisoner)
    }

    /// Houses a registered prisoner in a cell.
    ///
    /// # Errors
    ///
    /// Returns [`JailError::Record`] with [`RecordError::NotFound`] if the
    /// prisoner or cell is absent, [`JailError::AlreadyHoused`], or
    /// [`JailError::CellFull`].
    pub fn admit(&mut self, prisoner_id: RecordId, cell_id: RecordId) -> Result<(), JailError> {
        if let Some(current) = self.prisoners.find(prisoner_id)?.cell_id {
            return Err(JailError::AlreadyHoused {
                prisoner_id,
                cell_id: current,
            });
        }
        self.check_space(cell_id)?;

        self.add_occupant(cell_id, prisoner_id)?;
        self.set_cell_id(prisoner_id, Some(cell_id))?;
        log::info!("Admitted prisoner {prisoner_id} to cell {cell_id}");
        Ok(())
    }

    /// Releases a prisoner from their cell and returns the cell id. The
    /// prisoner stays on the register.
    ///
    /// # Errors
    ///
    /// Returns [`JailError::Record`] with [`RecordError::NotFound`] if the
    /// prisoner is absent, or [`JailError::NotHoused`].
    pub fn release(&mut self, prisoner_id: RecordId) -> Result<RecordId, JailError> {
        let cell_id = self
            .prisoners
            .find(prisoner_id)?
            .cell_id
            .ok_or(JailError::NotHoused(prisoner_id))?;

        self.remove_occupant(cell_id, prisoner_id)?;
        self.set_cell_id(prisoner_id, None)?;
        log::info!("Released prisoner {prisoner_id} from cell {cell_id}");
        Ok(cell_id)
    }

    /// Moves a housed prisoner to another cell. Transferring to the cell
    /// they are already in does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`JailError::Record`] with [`RecordError::NotFound`] if the
    /// prisoner or target cell is absent, [`JailError::NotHoused`], or
    /// [`JailError::CellFull`].
    pub fn transfer(&mut self, prisoner_id: RecordId, to_cell: RecordId) -> Result<(), JailError> {
        let from_cell = self
            .prisoners
            .find(prisoner_id)?
            .cell_id
            .ok_or(JailError::NotHoused(prisoner_id))?;
        if from_cell == to_cell {
            return Ok(());
        }
        self.check_space(to_cell)?;

        self.remove_occupant(from_cell, prisoner_id)?;
        self.add_occupant(to_cell, prisoner_id)?;
        self.set_cell_id(prisoner_id, Some(to_cell))?;
        log::info!("Transferred prisoner {prisoner_id} from cell {from_cell} to cell {to_cell}");
        Ok(())
    }

    fn check_space(&self, cell_id: RecordId) -> Result<(), JailError> {
        let cell = self.cells.find(cell_id)?;
        if cell.is_full() {
            return Err(JailError::CellFull {
                cell_id,
                capacity: cell.capacity,
            });
        }
        Ok(())
    }

    fn add_occupant(&mut self, cell_id: RecordId, prisoner_id: RecordId) -> Result<(), RecordError> {
        self.cells
            .update(cell_id, |c: &mut Cell| -> Result<(), RecordError> {
                c.occupants.push(prisoner_id);
                Ok(())
            })?;
        Ok(())
    }

    /// Drops a prisoner from a cell's occupant list. A cell that no longer
    /// exists is skipped.
    fn remove_occupant(
        &mut self,
        cell_id: RecordId,
        prisoner_id: RecordId,
    ) -> Result<(), RecordError> {
        if self.cells.get(cell_id).is_none() {
            log::warn!("Prisoner {prisoner_id} was in cell {cell_id}, which no longer exists");
            return Ok(());
        }
        self.cells
            .update(cell_id, |c: &mut Cell| -> Result<(), RecordError> {
                c.occupants.retain(|&id| id != prisoner_id);
                Ok(())
            })?;
        Ok(())
    }

    fn set_cell_id(
        &mut self,
        prisoner_id: RecordId,
        cell_id: Option<RecordId>,
    ) -> Result<(), RecordError> {
        self.prisoners
            .update(prisoner_id, |p: &mut Prisoner| -> Result<(), RecordError> {
                p.cell_id = cell_id;
                Ok(())
            })?;
        Ok(())
    }

    // -- Statistics ---------------------------------------------------------

    /// Maintained cell statistics.
    #[must_use]
    pub const fn cell_statistics(&self) -> &CellStatistics {
        self.cells.statistics()
    }

    /// Cell statistics rebuilt from the current cells.
    #[must_use]
    pub fn recompute_cell_statistics(&self) -> CellStatistics {
        self.cells.recompute_statistics()
    }

    /// Maintained prisoner statistics.
    #[must_use]
    pub const fn prisoner_statistics(&self) -> &PrisonerStatistics {
        self.prisoners.statistics()
    }

    /// Prisoner statistics rebuilt from the current register.
    #[must_use]
    pub fn recompute_prisoner_statistics(&self) -> PrisonerStatistics {
        self.prisoners.recompute_statistics()
    }

    /// Sum of every prisoner's sentence.
    #[must_use]
    pub fn total_sentence_years(&self) -> f64 {
        self.prisoners.list().map(|p| p.sentence_years).sum()
    }

    /// Cells whose officer is not on the roster and prisoners whose cell
    /// does not exist.
    #[must_use]
    pub fn dangling_references(&self, officers: &dyn OfficerLookup) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        for cell in self.cells.list() {
            if let Some(officer_id) = cell.assigned_officer_id
                && !officers.has_officer(officer_id)
            {
                dangling.push(DanglingReference::new(
                    Cell::FAMILY,
                    cell.id,
                    "assignedOfficerId",
                    Officer::FAMILY,
                    officer_id,
                ));
            }
        }
        for prisoner in self.prisoners.list() {
            if let Some(cell_id) = prisoner.cell_id
                && self.cells.get(cell_id).is_none()
            {
                dangling.push(DanglingReference::new(
                    Prisoner::FAMILY,
                    prisoner.id,
                    "cellId",
                    Cell::FAMILY,
                    cell_id,
                ));
            }
        }
        dangling
    }

    // -- Persistence --------------------------------------------------------

    /// Writes every cell and prisoner to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Io`] or [`RecordError::Json`] on failure.
    pub fn save(&self, path: &Path) -> Result<(), RecordError> {
        let document = JailDocument {
            cells: self.cells.list().map(CellRow::from).collect(),
            prisoners: self.prisoners.list().cloned().collect(),
        };
        persist::save_document(path, &document)?;
        log::info!(
            "Saved {} cell(s) and {} prisoner(s) to {}",
            self.cells.len(),
            self.prisoners.len(),
            path.display()
        );
        Ok(())
    }

    /// Replaces the in-memory state with the contents of `path`.
    ///
    /// Cells and prisoners are loaded first; each cell's occupant list is
    /// then rebuilt from the prisoners' `cellId`, whatever order the file
    /// lists them in. Returns the number of prisoners loaded.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::MalformedInput`] if the file is unreadable,
    /// malformed, or repeats an id; the manager is left empty.
    pub fn load(&mut self, path: &Path) -> Result<usize, RecordError> {
        self.clear();
        let Some(document) = persist::load_document::<JailDocument>(path)? else {
            return Ok(0);
        };

        let result = self
            .cells
            .replace_all(document.cells.into_iter().map(Cell::from))
            .and_then(|_| self.prisoners.replace_all(document.prisoners))
            .and_then(|count| {
                self.rebuild_occupants()?;
                Ok(count)
            });

        match result {
            Ok(count) => {
                log::info!(
                    "Loaded {} cell(s) and {count} prisoner(s) from {}",
                    self.cells.len(),
                    path.display()
                );
                Ok(count)
            }
            Err(e) => {
                self.clear();
                Err(RecordError::malformed(path, e.to_string()))
            }
        }
    }

    fn rebuild_occupants(&mut self) -> Result<(), RecordError> {
        for cell_id in self.cells.store().ids() {
            let occupants: Vec<RecordId> = self
                .prisoners
                .filter(|p| p.cell_id == Some(cell_id))
                .iter()
                .map(|p| p.id)
                .collect();

            let cell = self.cells.find(cell_id)?;
            if cell.occupants == occupants {
                continue;
            }
            if !cell.occupants.is_empty() {
                log::warn!(
                    "Cell {cell_id} listed occupants {:?}; prisoners place {occupants:?} there",
                    cell.occupants
                );
            }
            if occupants.len() > cell.capacity as usize {
                log::warn!(
                    "Cell {cell_id} holds {} prisoner(s) but has capacity {}",
                    occupants.len(),
                    cell.capacity
                );
            }

            self.cells
                .update(cell_id, |c: &mut Cell| -> Result<(), RecordError> {
                    c.occupants = occupants;
                    Ok(())
                })?;
        }

        for prisoner in self.prisoners.list() {
            if let Some(cell_id) = prisoner.cell_id
                && self.cells.get(cell_id).is_none()
            {
                log::warn!(
                    "Prisoner {} is recorded in cell {cell_id}, which does not exist",
                    prisoner.id
                );
            }
        }
        Ok(())
    }

    /// Imports empty cells from a legacy `id,capacity,type` text file.
    ///
    /// Lines with a bad id or capacity, or an id already present, are
    /// skipped with a warning. Returns the number of cells imported.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::MalformedInput`] if the file cannot be opened.
    pub fn import_legacy(&mut self, path: &Path) -> Result<usize, RecordError> {
        let mut imported = 0;
        for row in legacy::read_rows(path)? {
            let (Ok(id), Ok(capacity)) = (
                row.field(0).parse::<RecordId>(),
                row.field(1).parse::<u32>(),
            ) else {
                log::warn!("{}:{}: invalid cell id or capacity", path.display(), row.line);
                continue;
            };

            match self.add_cell(Cell::from_kind(row.field(2), id, capacity)) {
                Ok(_) => imported += 1,
                Err(e) => log::warn!("{}:{}: {e}", path.display(), row.line),
            }
        }
        Ok(imported)
    }

    /// Removes every cell and prisoner.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.prisoners.clear();
    }
}
