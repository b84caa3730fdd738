//! The ECC operation queue
//!
//! Records every elliptic-curve operation requested by the circuits of a session.
//! Each op lands in the current subtable of both the ultra table (two rows per op)
//! and the ECC VM table (one row per op), so the 2:1 ratio holds at all times.
//! A native accumulator tracks the running point across subtables; equality ops
//! read it, so a reset span may cover ops from several circuits.

use crate::ecc_ops::{EccOpCode, EccvmOperation, UltraOp, NUM_OP_WIRES, ULTRA_ROWS_PER_OP};
use crate::ecc_ops_table::{EccOpsTable, MergeSettings};
use crate::{GroupElement, GroupProjective, Scalar};
use group::Curve;
use tracing::{debug, trace};

/// Four op-wire columns
pub type TableColumns = [Vec<Scalar>; NUM_OP_WIRES];

#[derive(Clone, Debug)]
pub struct EccOpQueue {
    accumulator: GroupProjective,
    ultra_ops_table: EccOpsTable<UltraOp>,
    eccvm_ops_table: EccOpsTable<EccvmOperation>,
}

impl Default for EccOpQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EccOpQueue {
    pub fn new() -> Self {
        Self {
            accumulator: GroupProjective::identity(),
            ultra_ops_table: EccOpsTable::new(),
            eccvm_ops_table: EccOpsTable::new(),
        }
    }

    /// Queue whose first subtable is a fixed mock subtable (`add(G)`, `eq_and_reset`)
    ///
    /// Every later merge then has a non-empty previous table to merge against.
    pub fn seeded() -> Self {
        let mut queue = Self::new();
        queue.initialize_new_subtable(MergeSettings::Prepend);
        queue.add_accumulate(GroupElement::generator());
        queue.eq_and_reset();
        queue
    }

    pub fn initialize_new_subtable(&mut self, settings: MergeSettings) {
        self.ultra_ops_table.create_new_subtable(settings);
        self.eccvm_ops_table.create_new_subtable(settings);
        trace!(?settings, "opened op subtable");
    }

    pub fn merge_settings(&self) -> MergeSettings {
        self.ultra_ops_table.settings()
    }

    fn append(&mut self, op: EccvmOperation) -> UltraOp {
        let ultra_op = op.to_ultra_op();
        self.ultra_ops_table.push(ultra_op);
        self.eccvm_ops_table.push(op);
        ultra_op
    }

    pub fn add_accumulate(&mut self, point: GroupElement) -> UltraOp {
        self.accumulator += point;
        self.append(EccvmOperation::new(EccOpCode::Add, point, Scalar::zero()))
    }

    pub fn mul_accumulate(&mut self, point: GroupElement, scalar: Scalar) -> UltraOp {
        self.accumulator += point * scalar;
        self.append(EccvmOperation::new(EccOpCode::Mul, point, scalar))
    }

    /// Record an equality op against the current accumulator, then reset it
    ///
    /// Returns the accumulator value from before the reset.
    pub fn eq_and_reset(&mut self) -> GroupElement {
        let expected = self.accumulator.to_affine();
        self.accumulator = GroupProjective::identity();
        self.append(EccvmOperation::new(
            EccOpCode::EqualityAndReset,
            expected,
            Scalar::zero(),
        ));
        expected
    }

    /// A no-op row pair, keeping both tables aligned
    pub fn empty_row(&mut self) {
        self.append(EccvmOperation::new(
            EccOpCode::Null,
            GroupElement::identity(),
            Scalar::zero(),
        ));
    }

    /// Open a subtable with `settings` and replay `ops` into it
    ///
    /// Equality ops take their point from the queue's accumulator, which may
    /// hold ops from earlier subtables. Returns the ops as recorded.
    pub fn append_subtable(
        &mut self,
        ops: &[EccvmOperation],
        settings: MergeSettings,
    ) -> Vec<EccvmOperation> {
        self.initialize_new_subtable(settings);
        let resolved: Vec<EccvmOperation> = ops
            .iter()
            .map(|op| match op.op_code {
                EccOpCode::Add => {
                    self.add_accumulate(op.base_point);
                    *op
                }
                EccOpCode::Mul => {
                    self.mul_accumulate(op.base_point, op.mul_scalar_full);
                    *op
                }
                EccOpCode::EqualityAndReset => {
                    let point = self.eq_and_reset();
                    if point != op.base_point {
                        trace!("equality op resolved from the queue accumulator");
                    }
                    EccvmOperation::new(EccOpCode::EqualityAndReset, point, Scalar::zero())
                }
                EccOpCode::Null => {
                    self.empty_row();
                    *op
                }
            })
            .collect();
        debug!(
            num_ops = ops.len(),
            table_rows = self.get_ultra_ops_table_num_rows(),
            "appended op subtable"
        );
        resolved
    }

    /// Running point since the last reset
    pub fn accumulator(&self) -> GroupElement {
        self.accumulator.to_affine()
    }

    pub fn get_ultra_ops(&self) -> Vec<UltraOp> {
        self.ultra_ops_table.iter().copied().collect()
    }

    pub fn get_eccvm_ops(&self) -> Vec<EccvmOperation> {
        self.eccvm_ops_table.iter().copied().collect()
    }

    pub fn num_eccvm_ops(&self) -> usize {
        self.eccvm_ops_table.size()
    }

    pub fn get_ultra_ops_table_num_rows(&self) -> usize {
        self.ultra_ops_table.size() * ULTRA_ROWS_PER_OP
    }

    pub fn get_current_subtable_num_rows(&self) -> usize {
        self.ultra_ops_table.current_subtable_size() * ULTRA_ROWS_PER_OP
    }

    pub fn get_previous_table_num_rows(&self) -> usize {
        self.ultra_ops_table.previous_size() * ULTRA_ROWS_PER_OP
    }

    pub fn construct_table_columns(&self) -> TableColumns {
        columns_from_ops(self.ultra_ops_table.iter())
    }

    pub fn construct_previous_table_columns(&self) -> TableColumns {
        columns_from_ops(self.ultra_ops_table.iter_previous())
    }

    pub fn construct_current_subtable_columns(&self) -> TableColumns {
        columns_from_ops(self.ultra_ops_table.current_subtable().iter())
    }
}

fn columns_from_ops<'a>(ops: impl Iterator<Item = &'a UltraOp>) -> TableColumns {
    let mut columns: TableColumns = Default::default();
    for op in ops {
        for row in op.rows() {
            for (column, value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }
    }
    columns
}
