//! Per-call storage for wire keys.

use crate::GarbleError;
use circuit::{WireId, CONSTANT_WIRE};

/// An arena holding one value per wire of a circuit.
///
/// Wire `w` lives at slot `w + 1`; slot 0 is the reserved constant wire
/// ([`CONSTANT_WIRE`]).
#[derive(Clone, Debug)]
pub struct WireStore<T> {
    slots: Vec<Option<T>>,
}

impl<T: Copy> WireStore<T> {
    /// Allocate slots for wires `0..=last_wire_index` plus the constant wire.
    pub fn new(last_wire_index: WireId) -> Result<Self, GarbleError> {
        let len = usize::try_from(last_wire_index)
            .ok()
            .and_then(|n| n.checked_add(2))
            .ok_or(GarbleError::AllocationFailure { wires: 0, rows: 0 })?;
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(len)
            .map_err(|_| GarbleError::AllocationFailure { wires: len, rows: 0 })?;
        slots.resize(len, None);
        Ok(WireStore { slots })
    }

    #[inline]
    fn slot(&self, wire: WireId) -> Option<usize> {
        let slot = usize::try_from(wire.checked_add(1)?).ok()?;
        (slot < self.slots.len()).then_some(slot)
    }

    /// The value on `wire`, or [`GarbleError::MissingKey`] if it was never set.
    #[inline]
    pub fn get(&self, wire: WireId) -> Result<T, GarbleError> {
        self.slot(wire)
            .and_then(|s| self.slots[s])
            .ok_or(GarbleError::MissingKey(wire))
    }

    #[inline]
    pub fn set(&mut self, wire: WireId, value: T) -> Result<(), GarbleError> {
        let slot = self.slot(wire).ok_or(GarbleError::MissingKey(wire))?;
        self.slots[slot] = Some(value);
        Ok(())
    }

    #[inline]
    pub fn constant_wire(&self) -> Result<T, GarbleError> {
        self.get(CONSTANT_WIRE)
    }

    #[inline]
    pub fn set_constant_wire(&mut self, value: T) {
        self.slots[0] = Some(value);
    }

    /// Number of circuit wires, not counting the constant wire.
    pub fn len(&self) -> usize {
        self.slots.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
