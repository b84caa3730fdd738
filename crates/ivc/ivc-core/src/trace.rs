//! Execution trace: circuit gates laid out as rows of the column layout
//!
//! Rows `[0, p)` hold public inputs, followed by the op rows, then the arithmetic
//! gates; the rest is zero padding wired to the zero variable. The permutation
//! columns link every cell holding the same variable into one cycle.

use crate::circuit::{Circuit, Variable};
use crate::flavor::{column, ProverPolynomials, NUM_WIRES};
use crate::{CoreError, Result, Scalar};
use tracing::trace;

/// Build selectors, permutation columns and wires for `circuit` in a trace of
/// `2^log_circuit_size` rows. Sorted accumulator and grand product stay zero.
pub fn construct_trace(circuit: &Circuit, log_circuit_size: usize) -> Result<ProverPolynomials> {
    let circuit_size = 1usize << log_circuit_size;
    let num_rows = circuit.num_rows();
    if num_rows > circuit_size {
        return Err(CoreError::CircuitTooLarge {
            rows: num_rows,
            capacity: circuit_size,
        });
    }

    let zero = circuit.zero_idx();
    let mut wires: Vec<[Variable; NUM_WIRES]> = vec![[zero; NUM_WIRES]; circuit_size];
    let mut polys = ProverPolynomials::new(circuit_size);

    let mut row = 0;
    for var in circuit.public_input_indices() {
        wires[row][0] = *var;
        polys.get_mut(column::Q_PUB)[row] = Scalar::one();
        row += 1;
    }

    for op_row in circuit.ecc_op_rows() {
        wires[row] = *op_row;
        polys.get_mut(column::Q_ECC)[row] = Scalar::one();
        for (j, var) in op_row.iter().enumerate() {
            polys.get_mut(column::ECC_OP_WIRE_1 + j)[row] = circuit.get_variable(*var);
        }
        row += 1;
    }

    for gate in circuit.arithmetic_gates() {
        wires[row] = gate.wires();
        let selectors = [
            (column::Q_M, gate.q_m),
            (column::Q_L, gate.q_l),
            (column::Q_R, gate.q_r),
            (column::Q_O, gate.q_o),
            (column::Q_4, gate.q_4),
            (column::Q_C, gate.q_c),
        ];
        for (selector, value) in selectors {
            polys.get_mut(selector)[row] = value;
        }
        row += 1;
    }

    for (i, row_wires) in wires.iter().enumerate() {
        for (j, var) in row_wires.iter().enumerate() {
            polys.get_mut(column::W_1 + j)[i] = circuit.get_variable(*var);
        }
    }

    compute_permutation_columns(&mut polys, &wires, circuit.variables().len());
    polys.get_mut(column::LAGRANGE_FIRST)[0] = Scalar::one();

    trace!(num_rows, circuit_size, "constructed execution trace");
    Ok(polys)
}

/// Cell label `j * n + i` of wire `j` at row `i`
fn cell_label(j: usize, i: usize, n: usize) -> Scalar {
    Scalar::from((j * n + i) as u64)
}

fn compute_permutation_columns(
    polys: &mut ProverPolynomials,
    wires: &[[Variable; NUM_WIRES]],
    num_variables: usize,
) {
    let n = wires.len();
    let mut cycles: Vec<Vec<(usize, usize)>> = vec![Vec::new(); num_variables];
    for (i, row_wires) in wires.iter().enumerate() {
        for (j, var) in row_wires.iter().enumerate() {
            cycles[*var as usize].push((j, i));
        }
    }

    for j in 0..NUM_WIRES {
        let ids = polys.get_mut(column::ID_1 + j);
        for (i, id) in ids.iter_mut().enumerate() {
            *id = cell_label(j, i, n);
        }
    }

    for cycle in cycles.iter().filter(|c| !c.is_empty()) {
        for (k, &(j, i)) in cycle.iter().enumerate() {
            let (next_j, next_i) = cycle[(k + 1) % cycle.len()];
            polys.get_mut(column::SIGMA_1 + j)[i] = cell_label(next_j, next_i, n);
        }
    }
}
