//! Undo history over immutable definition snapshots.

use strata_core::errors::StrataError;

use crate::definition::GraphDefinition;
use crate::serde::{snapshot_from_bytes, snapshot_to_bytes};

/// Linear undo history of definition snapshots.
///
/// Every committed edit stores a full binary snapshot; the cursor points at
/// the snapshot describing the current definition. Committing while undone
/// truncates the redo tail, as editors conventionally do. Snapshots are
/// immutable byte payloads, so restored definitions are always equal to what
/// was committed, generator parameters included.
#[derive(Debug, Clone)]
pub struct DefinitionHistory {
    snapshots: Vec<Vec<u8>>,
    cursor: usize,
}

impl DefinitionHistory {
    /// Starts a history with the given initial definition.
    pub fn new(initial: &GraphDefinition) -> Result<Self, StrataError> {
        Ok(Self {
            snapshots: vec![snapshot_to_bytes(initial)?],
            cursor: 0,
        })
    }

    /// Number of snapshots currently held.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Returns true when the history holds no snapshots.
    ///
    /// Never true in practice; the constructor stores the initial snapshot.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Returns true when an undo step is available.
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Returns true when a redo step is available.
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Commits the definition as the newest snapshot.
    pub fn commit(&mut self, definition: &GraphDefinition) -> Result<(), StrataError> {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(snapshot_to_bytes(definition)?);
        self.cursor = self.snapshots.len() - 1;
        Ok(())
    }

    /// Restores the definition the cursor currently points at.
    pub fn current(&self) -> Result<GraphDefinition, StrataError> {
        snapshot_from_bytes(&self.snapshots[self.cursor])
    }

    /// Steps back one snapshot and restores it.
    ///
    /// Restored definitions must be rebuilt fully; the change-token rule
    /// only covers forward edits.
    pub fn undo(&mut self) -> Result<Option<GraphDefinition>, StrataError> {
        if !self.can_undo() {
            return Ok(None);
        }
        self.cursor -= 1;
        Ok(Some(self.current()?))
    }

    /// Steps forward one snapshot and restores it.
    pub fn redo(&mut self) -> Result<Option<GraphDefinition>, StrataError> {
        if !self.can_redo() {
            return Ok(None);
        }
        self.cursor += 1;
        Ok(Some(self.current()?))
    }
}
