//! Circuits accumulated by the IVC
//!
//! A circuit is a list of variables plus three kinds of gates, laid out in the
//! execution trace in this order: public inputs, ECC op gates, arithmetic gates.
//! Equality between gates is expressed by reusing a variable index; the
//! permutation argument enforces it.
//!
//! ECC operations are recorded on the circuit itself together with a local
//! running accumulator. The IVC later replays them into the session's op queue;
//! the queue's accumulator is authoritative for equality ops, and the resolved
//! points are written back into the circuit's op rows before it is proven.

use crate::{CoreError, GroupElement, GroupProjective, Result, Scalar};
use goblin::{EccOpCode, EccvmOperation, MergeSettings, UltraOp, NUM_OP_WIRES, ULTRA_ROWS_PER_OP};
use group::Curve;

/// Index of a circuit variable
pub type Variable = u32;

/// `q_m a b + q_l a + q_r b + q_o c + q_4 d + q_c = 0`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArithmeticGate {
    pub a: Variable,
    pub b: Variable,
    pub c: Variable,
    pub d: Variable,
    pub q_m: Scalar,
    pub q_l: Scalar,
    pub q_r: Scalar,
    pub q_o: Scalar,
    pub q_4: Scalar,
    pub q_c: Scalar,
}

impl ArithmeticGate {
    pub fn evaluate(&self, values: &[Scalar]) -> Scalar {
        let [a, b, c, d] = [self.a, self.b, self.c, self.d].map(|v| values[v as usize]);
        self.q_m * a * b + self.q_l * a + self.q_r * b + self.q_o * c + self.q_4 * d + self.q_c
    }

    pub fn wires(&self) -> [Variable; 4] {
        [self.a, self.b, self.c, self.d]
    }
}

#[derive(Clone, Debug)]
pub struct Circuit {
    variables: Vec<Scalar>,
    public_inputs: Vec<Variable>,
    arithmetic_gates: Vec<ArithmeticGate>,
    ecc_op_rows: Vec<[Variable; NUM_OP_WIRES]>,
    ecc_ops: Vec<EccvmOperation>,
    ecc_accumulator: GroupProjective,
    merge_settings: MergeSettings,
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

impl Circuit {
    pub fn new() -> Self {
        let mut circuit = Self {
            variables: vec![Scalar::zero()],
            public_inputs: Vec::new(),
            arithmetic_gates: Vec::new(),
            ecc_op_rows: Vec::new(),
            ecc_ops: Vec::new(),
            ecc_accumulator: GroupProjective::identity(),
            merge_settings: MergeSettings::Prepend,
        };
        let zero = circuit.zero_idx();
        circuit.fix_witness(zero, Scalar::zero());
        circuit
    }

    pub fn with_merge_settings(mut self, settings: MergeSettings) -> Self {
        self.merge_settings = settings;
        self
    }

    pub fn merge_settings(&self) -> MergeSettings {
        self.merge_settings
    }

    /// Start the local ECC accumulator at `point` instead of the identity
    ///
    /// Use the session queue's running point so `queue_ecc_eq` returns the
    /// value the queue will record.
    pub fn with_ecc_accumulator(mut self, point: GroupElement) -> Self {
        self.ecc_accumulator = point.into();
        self
    }

    /// Variable constrained to zero, also used to fill unused wires
    pub fn zero_idx(&self) -> Variable {
        0
    }

    pub fn add_variable(&mut self, value: Scalar) -> Variable {
        self.variables.push(value);
        (self.variables.len() - 1) as Variable
    }

    pub fn add_public_variable(&mut self, value: Scalar) -> Variable {
        let index = self.add_variable(value);
        self.public_inputs.push(index);
        index
    }

    pub fn get_variable(&self, index: Variable) -> Scalar {
        self.variables[index as usize]
    }

    pub fn variables(&self) -> &[Scalar] {
        &self.variables
    }

    pub fn public_input_indices(&self) -> &[Variable] {
        &self.public_inputs
    }

    pub fn public_inputs(&self) -> Vec<Scalar> {
        self.public_inputs.iter().map(|v| self.get_variable(*v)).collect()
    }

    pub fn num_public_inputs(&self) -> usize {
        self.public_inputs.len()
    }

    pub fn arithmetic_gates(&self) -> &[ArithmeticGate] {
        &self.arithmetic_gates
    }

    pub fn ecc_op_rows(&self) -> &[[Variable; NUM_OP_WIRES]] {
        &self.ecc_op_rows
    }

    pub fn ecc_ops(&self) -> &[EccvmOperation] {
        &self.ecc_ops
    }

    /// Trace rows used: public inputs, op rows and arithmetic gates
    pub fn num_rows(&self) -> usize {
        self.public_inputs.len() + self.ecc_op_rows.len() + self.arithmetic_gates.len()
    }

    pub fn create_arithmetic_gate(&mut self, gate: ArithmeticGate) {
        self.arithmetic_gates.push(gate);
    }

    /// `a + b = c`
    pub fn create_add_gate(&mut self, a: Variable, b: Variable, c: Variable) {
        let zero = self.zero_idx();
        self.create_arithmetic_gate(ArithmeticGate {
            a,
            b,
            c,
            d: zero,
            q_m: Scalar::zero(),
            q_l: Scalar::one(),
            q_r: Scalar::one(),
            q_o: -Scalar::one(),
            q_4: Scalar::zero(),
            q_c: Scalar::zero(),
        });
    }

    /// `a * b = c`
    pub fn create_mul_gate(&mut self, a: Variable, b: Variable, c: Variable) {
        let zero = self.zero_idx();
        self.create_arithmetic_gate(ArithmeticGate {
            a,
            b,
            c,
            d: zero,
            q_m: Scalar::one(),
            q_l: Scalar::zero(),
            q_r: Scalar::zero(),
            q_o: -Scalar::one(),
            q_4: Scalar::zero(),
            q_c: Scalar::zero(),
        });
    }

    /// `a + b + c = d`
    pub fn create_big_add_gate(&mut self, a: Variable, b: Variable, c: Variable, d: Variable) {
        self.create_arithmetic_gate(ArithmeticGate {
            a,
            b,
            c,
            d,
            q_m: Scalar::zero(),
            q_l: Scalar::one(),
            q_r: Scalar::one(),
            q_o: Scalar::one(),
            q_4: -Scalar::one(),
            q_c: Scalar::zero(),
        });
    }

    /// `a = value`
    pub fn fix_witness(&mut self, a: Variable, value: Scalar) {
        let zero = self.zero_idx();
        self.create_arithmetic_gate(ArithmeticGate {
            a,
            b: zero,
            c: zero,
            d: zero,
            q_m: Scalar::zero(),
            q_l: Scalar::one(),
            q_r: Scalar::zero(),
            q_o: Scalar::zero(),
            q_4: Scalar::zero(),
            q_c: -value,
        });
    }

    /// `a = b`
    pub fn assert_equal(&mut self, a: Variable, b: Variable) {
        let zero = self.zero_idx();
        self.create_arithmetic_gate(ArithmeticGate {
            a,
            b,
            c: zero,
            d: zero,
            q_m: Scalar::zero(),
            q_l: Scalar::one(),
            q_r: -Scalar::one(),
            q_o: Scalar::zero(),
            q_4: Scalar::zero(),
            q_c: Scalar::zero(),
        });
    }

    fn record_ecc_op(&mut self, op: EccvmOperation) -> UltraOp {
        let ultra_op = op.to_ultra_op();
        for row in ultra_op.rows() {
            let row_vars = row.map(|value| self.add_variable(value));
            self.ecc_op_rows.push(row_vars);
        }
        self.ecc_ops.push(op);
        ultra_op
    }

    pub fn queue_ecc_add_accum(&mut self, point: GroupElement) -> UltraOp {
        self.ecc_accumulator += point;
        self.record_ecc_op(EccvmOperation::new(EccOpCode::Add, point, Scalar::zero()))
    }

    pub fn queue_ecc_mul_accum(&mut self, point: GroupElement, scalar: Scalar) -> UltraOp {
        self.ecc_accumulator += point * scalar;
        self.record_ecc_op(EccvmOperation::new(EccOpCode::Mul, point, scalar))
    }

    /// Equality op against the running point; returns it and resets to identity
    pub fn queue_ecc_eq(&mut self) -> GroupElement {
        let expected = self.ecc_accumulator.to_affine();
        self.ecc_accumulator = GroupProjective::identity();
        self.record_ecc_op(EccvmOperation::new(
            EccOpCode::EqualityAndReset,
            expected,
            Scalar::zero(),
        ));
        expected
    }

    pub fn queue_ecc_no_op(&mut self) {
        self.record_ecc_op(EccvmOperation::new(
            EccOpCode::Null,
            GroupElement::identity(),
            Scalar::zero(),
        ));
    }

    /// Overwrite the recorded ECC ops with `ops`, as resolved by the op queue
    ///
    /// Opcodes must match one for one; only op-row values change.
    pub fn sync_ecc_ops(&mut self, ops: &[EccvmOperation]) -> Result<()> {
        if ops.len() != self.ecc_ops.len() {
            return Err(CoreError::InvalidCircuit(format!(
                "expected {} ECC ops, got {}",
                self.ecc_ops.len(),
                ops.len()
            )));
        }
        for (index, op) in ops.iter().enumerate() {
            if op.op_code != self.ecc_ops[index].op_code {
                return Err(CoreError::InvalidCircuit(format!(
                    "ECC op {} changed its opcode",
                    index
                )));
            }
        }
        for (index, op) in ops.iter().enumerate() {
            if *op == self.ecc_ops[index] {
                continue;
            }
            let rows = op.to_ultra_op().rows();
            let first_row = ULTRA_ROWS_PER_OP * index;
            let row_vars = &self.ecc_op_rows[first_row..first_row + ULTRA_ROWS_PER_OP];
            for (vars, values) in row_vars.iter().zip(rows) {
                for (var, value) in vars.iter().zip(values) {
                    self.variables[*var as usize] = value;
                }
            }
            self.ecc_ops[index] = *op;
        }
        Ok(())
    }

    /// Check every arithmetic gate against the assigned values
    pub fn check_circuit(&self) -> Result<()> {
        for (index, gate) in self.arithmetic_gates.iter().enumerate() {
            if gate
                .wires()
                .iter()
                .any(|v| *v as usize >= self.variables.len())
            {
                return Err(CoreError::InvalidCircuit(format!(
                    "gate {} references an unknown variable",
                    index
                )));
            }
            if gate.evaluate(&self.variables) != Scalar::zero() {
                return Err(CoreError::UnsatisfiedGate { index });
            }
        }
        Ok(())
    }
}
