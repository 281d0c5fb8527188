//! # Columnar→Row reconstruction engine
//!
//! The reverse direction merges one or more columnar table shards back into a
//! stream of fixed-layout rows. It is a two-phase protocol by necessity: a
//! sequence field's output slot width is the maximum list length observed
//! across every row of every shard, which is only known after a full
//! pre-scan.
//!
//! 1. [`Restorer::add_shard`] — accumulate shards (one per input file).
//! 2. [`Restorer::plan_layout`] — reconcile field kinds across shards
//!    (first occurrence wins; a conflicting shard's column is dropped for
//!    that field, recorded, and the run continues) and compute per-array
//!    slot widths with a floor of 1.
//! 3. [`Restorer::emit_rows`] — lazily emit rows in shard order then row
//!    order. Scalars copy verbatim, with a zero/false default where a shard
//!    lacks the field or holds a null; array slots copy
//!    `min(list_len, width)` elements and zero-fill the rest.

mod error;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int16Array, Int32Array,
    Int64Array, Int8Array, ListArray, UInt16Array, UInt32Array, UInt64Array, UInt8Array,
};
use log::warn;

pub use error::RestoreError;

use crate::row::{CellValue, OutputCell, OutputRow, SlotField};
use crate::schema::FieldKind;
use crate::table::ColumnarTable;

/// A kind conflict discovered while reconciling shard schemas.
///
/// The conflicting shard contributes defaults for the field instead of its
/// own column; everything else in that shard is still used.
#[derive(Debug, Clone)]
pub struct ColumnConflict {
    /// Label of the shard whose column was dropped (usually the file name).
    pub shard: String,
    /// Field name.
    pub field: String,
    /// Kind reconciled from the first shard that carried the field.
    pub expected: FieldKind,
    /// Kind the conflicting shard declared.
    pub found: FieldKind,
}

struct Shard {
    label: String,
    table: ColumnarTable,
}

struct Plan {
    slots: Vec<SlotField>,
    /// For every shard, the column index backing each slot (`None` when the
    /// shard lacks the field or its column was dropped in a conflict).
    per_shard: Vec<Vec<Option<usize>>>,
    conflicts: Vec<ColumnConflict>,
}

/// Merges columnar shards back into rows.
#[derive(Default)]
pub struct Restorer {
    shards: Vec<Shard>,
    plan: Option<Plan>,
}

impl Restorer {
    /// Creates an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one shard. Shards are expected, but not required, to share a
    /// schema; reconciliation happens in [`plan_layout`](Self::plan_layout).
    pub fn add_shard(
        &mut self,
        label: impl Into<String>,
        table: ColumnarTable,
    ) -> Result<(), RestoreError> {
        if self.plan.is_some() {
            return Err(RestoreError::InvalidState(
                "add_shard called after plan_layout",
            ));
        }
        self.shards.push(Shard {
            label: label.into(),
            table,
        });
        Ok(())
    }

    /// Number of shards added.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Total row count across all shards.
    pub fn total_rows(&self) -> usize {
        self.shards.iter().map(|s| s.table.num_rows()).sum()
    }

    /// Reconciles field kinds across shards and computes the fixed output
    /// width of every sequence field.
    ///
    /// Slot order is first-seen order across shards. Idempotent; fails with
    /// `InvalidState` when no shard has been added.
    pub fn plan_layout(&mut self) -> Result<&[SlotField], RestoreError> {
        let plan = match self.plan.take() {
            Some(plan) => plan,
            None => {
                if self.shards.is_empty() {
                    return Err(RestoreError::InvalidState(
                        "plan_layout called before any shard was added",
                    ));
                }
                self.build_plan()?
            }
        };
        Ok(&self.plan.insert(plan).slots)
    }

    /// The planned slot layout, if `plan_layout` has run.
    pub fn layout(&self) -> Option<&[SlotField]> {
        self.plan.as_ref().map(|p| p.slots.as_slice())
    }

    /// Kind conflicts recorded during planning, for post-hoc auditing.
    pub fn conflicts(&self) -> &[ColumnConflict] {
        self.plan.as_ref().map(|p| p.conflicts.as_slice()).unwrap_or(&[])
    }

    fn build_plan(&self) -> Result<Plan, RestoreError> {
        struct SlotDraft {
            name: String,
            kind: FieldKind,
            is_array: bool,
            max_len: usize,
        }

        let mut drafts: Vec<SlotDraft> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut conflicts: Vec<ColumnConflict> = Vec::new();
        // (shard, slot) -> column, finalized into dense tables afterwards.
        let mut bindings: Vec<HashMap<usize, usize>> = Vec::with_capacity(self.shards.len());

        for shard in &self.shards {
            let mut shard_bindings = HashMap::new();
            for (col, field) in shard.table.fields().iter().enumerate() {
                let slot = match index.get(&field.name) {
                    Some(&slot) => {
                        let draft = &drafts[slot];
                        if draft.kind != field.kind || draft.is_array != field.is_array() {
                            warn!(
                                "field {}: shard {} declares {}{}, expected {}{}; \
                                 dropping this shard's column",
                                field.name,
                                shard.label,
                                if field.is_array() { "list of " } else { "" },
                                field.kind,
                                if draft.is_array { "list of " } else { "" },
                                draft.kind,
                            );
                            conflicts.push(ColumnConflict {
                                shard: shard.label.clone(),
                                field: field.name.clone(),
                                expected: draft.kind,
                                found: field.kind,
                            });
                            continue;
                        }
                        slot
                    }
                    None => {
                        let slot = drafts.len();
                        drafts.push(SlotDraft {
                            name: field.name.clone(),
                            kind: field.kind,
                            is_array: field.is_array(),
                            max_len: 0,
                        });
                        index.insert(field.name.clone(), slot);
                        slot
                    }
                };

                if drafts[slot].is_array {
                    let list = as_list(&shard.table.columns()[col], &field.name)?;
                    let offsets = list.offsets();
                    for row in 0..shard.table.num_rows() {
                        let len = (offsets[row + 1] - offsets[row]) as usize;
                        if len > drafts[slot].max_len {
                            drafts[slot].max_len = len;
                        }
                    }
                }
                shard_bindings.insert(slot, col);
            }
            bindings.push(shard_bindings);
        }

        let slots: Vec<SlotField> = drafts
            .into_iter()
            .map(|d| SlotField {
                name: d.name,
                kind: d.kind,
                // Floor of 1 keeps the output slot well formed even when
                // every observed list was empty.
                width: d.is_array.then_some(d.max_len.max(1)),
            })
            .collect();
        let per_shard = bindings
            .into_iter()
            .map(|b| (0..slots.len()).map(|s| b.get(&s).copied()).collect())
            .collect();

        Ok(Plan {
            slots,
            per_shard,
            conflicts,
        })
    }

    /// Lazily emits one output row per input row, shard order then row order.
    ///
    /// Fails with `InvalidState` before [`plan_layout`](Self::plan_layout)
    /// has run.
    pub fn emit_rows(&self) -> Result<RowEmitter<'_>, RestoreError> {
        let plan = self.plan.as_ref().ok_or(RestoreError::InvalidState(
            "emit_rows called before plan_layout",
        ))?;
        Ok(RowEmitter {
            shards: &self.shards,
            plan,
            shard: 0,
            row: 0,
        })
    }
}

/// Lazy, finite, single-pass iterator over reconstructed rows.
pub struct RowEmitter<'a> {
    shards: &'a [Shard],
    plan: &'a Plan,
    shard: usize,
    row: usize,
}

impl RowEmitter<'_> {
    fn emit(&self, shard: &Shard, row: usize) -> Result<OutputRow, RestoreError> {
        let bindings = &self.plan.per_shard[self.shard];
        let mut cells = Vec::with_capacity(self.plan.slots.len());
        for (slot, field) in self.plan.slots.iter().enumerate() {
            let cell = match (field.width, bindings[slot]) {
                (None, Some(col)) => {
                    OutputCell::Scalar(scalar_at(&shard.table.columns()[col], field.kind, row, &field.name)?)
                }
                (None, None) => OutputCell::Scalar(CellValue::default_for(field.kind)),
                (Some(width), Some(col)) => {
                    let list = as_list(&shard.table.columns()[col], &field.name)?;
                    let values = list.value(row);
                    let copied = values.len().min(width);
                    let mut slot_values = Vec::with_capacity(width);
                    for i in 0..copied {
                        slot_values.push(scalar_at(&values, field.kind, i, &field.name)?);
                    }
                    slot_values.resize(width, CellValue::default_for(field.kind));
                    OutputCell::Array(slot_values)
                }
                (Some(width), None) => {
                    OutputCell::Array(vec![CellValue::default_for(field.kind); width])
                }
            };
            cells.push(cell);
        }
        Ok(OutputRow { cells })
    }
}

impl Iterator for RowEmitter<'_> {
    type Item = Result<OutputRow, RestoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let shard = self.shards.get(self.shard)?;
            if self.row < shard.table.num_rows() {
                let result = self.emit(shard, self.row);
                self.row += 1;
                return Some(result);
            }
            self.shard += 1;
            self.row = 0;
        }
    }
}

fn as_list<'a>(column: &'a ArrayRef, field: &str) -> Result<&'a ListArray, RestoreError> {
    column
        .as_any()
        .downcast_ref::<ListArray>()
        .ok_or_else(|| RestoreError::ColumnLayout {
            field: field.to_string(),
        })
}

/// Reads one value out of a flat typed array, dispatching on the reconciled
/// kind. Nulls read as the zero/false default.
fn scalar_at(
    array: &ArrayRef,
    kind: FieldKind,
    row: usize,
    field: &str,
) -> Result<CellValue, RestoreError> {
    if array.is_null(row) {
        return Ok(CellValue::default_for(kind));
    }
    macro_rules! read {
        ($array_ty:ty, $variant:ident) => {
            array
                .as_any()
                .downcast_ref::<$array_ty>()
                .map(|a| CellValue::$variant(a.value(row)))
        };
    }
    let value = match kind {
        FieldKind::Float32 => read!(Float32Array, Float32),
        FieldKind::Float64 => read!(Float64Array, Float64),
        FieldKind::Int8 => read!(Int8Array, Int8),
        FieldKind::UInt8 => read!(UInt8Array, UInt8),
        FieldKind::Int16 => read!(Int16Array, Int16),
        FieldKind::UInt16 => read!(UInt16Array, UInt16),
        FieldKind::Int32 => read!(Int32Array, Int32),
        FieldKind::UInt32 => read!(UInt32Array, UInt32),
        FieldKind::Int64 => read!(Int64Array, Int64),
        FieldKind::UInt64 => read!(UInt64Array, UInt64),
        FieldKind::Bool => read!(BooleanArray, Bool),
    };
    value.ok_or_else(|| RestoreError::ColumnLayout {
        field: field.to_string(),
    })
}
