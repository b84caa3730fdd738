//! Column layout and protocol constants
//!
//! There is a single arithmetization: four wires, arithmetic and public-input
//! gates, the op-wire gates fed by the ECC op queue, a linear "sorted accumulator"
//! column bound by the eta challenge, and a grand-product copy constraint.

use crate::Scalar;
use std::ops::Index;

pub const NUM_WIRES: usize = 4;

/// Selectors, permutation columns and the first-row Lagrange column
pub const NUM_PRECOMPUTED_ENTITIES: usize = 17;

/// Wires, op wires, sorted accumulator and grand product
pub const NUM_WITNESS_ENTITIES: usize = 10;

/// Committed polynomials
pub const NUM_ENTITIES: usize = NUM_PRECOMPUTED_ENTITIES + NUM_WITNESS_ENTITIES;

/// Committed polynomials plus the shifted grand product and the public-input column
pub const ROW_WIDTH: usize = NUM_ENTITIES + 2;

pub const NUM_SUBRELATIONS: usize = 13;

/// Separators batch subrelations 1..13; subrelation 0 has an implicit weight of one
pub const NUM_SUBRELATION_SEPARATORS: usize = NUM_SUBRELATIONS - 1;

/// Degree of the full batched relation in the folding variable
pub const BATCHED_RELATION_DEGREE: usize = 10;

/// Points {0, .., 10} on which the combiner is evaluated
pub const BATCHED_EXTENDED_LENGTH: usize = BATCHED_RELATION_DEGREE + 1;

/// Column indices into [`ProverPolynomials`] and [`Row`]
pub mod column {
    pub const Q_M: usize = 0;
    pub const Q_L: usize = 1;
    pub const Q_R: usize = 2;
    pub const Q_O: usize = 3;
    pub const Q_4: usize = 4;
    pub const Q_C: usize = 5;
    pub const Q_PUB: usize = 6;
    pub const Q_ECC: usize = 7;
    pub const SIGMA_1: usize = 8;
    pub const ID_1: usize = 12;
    pub const LAGRANGE_FIRST: usize = 16;
    pub const W_1: usize = 17;
    pub const ECC_OP_WIRE_1: usize = 21;
    pub const SORTED_ACCUM: usize = 25;
    pub const Z_PERM: usize = 26;
    pub const Z_PERM_SHIFT: usize = 27;
    pub const PUBLIC_INPUT: usize = 28;
}

pub const ENTITY_LABELS: [&str; NUM_ENTITIES] = [
    "q_m",
    "q_l",
    "q_r",
    "q_o",
    "q_4",
    "q_c",
    "q_pub",
    "q_ecc",
    "sigma_1",
    "sigma_2",
    "sigma_3",
    "sigma_4",
    "id_1",
    "id_2",
    "id_3",
    "id_4",
    "lagrange_first",
    "w_l",
    "w_r",
    "w_o",
    "w_4",
    "ecc_op_wire_1",
    "ecc_op_wire_2",
    "ecc_op_wire_3",
    "ecc_op_wire_4",
    "sorted_accum",
    "z_perm",
];

/// Labels of the committed witness columns, in commitment order
pub fn witness_labels() -> &'static [&'static str] {
    &ENTITY_LABELS[NUM_PRECOMPUTED_ENTITIES..]
}

/// Labels of the precomputed columns, in verification key order
pub fn precomputed_labels() -> &'static [&'static str] {
    &ENTITY_LABELS[..NUM_PRECOMPUTED_ENTITIES]
}

/// Every committed polynomial of an instance, in Lagrange basis over the rows
#[derive(Clone, Debug, PartialEq)]
pub struct ProverPolynomials {
    polys: Vec<Vec<Scalar>>,
}

impl ProverPolynomials {
    pub fn new(circuit_size: usize) -> Self {
        Self {
            polys: vec![vec![Scalar::zero(); circuit_size]; NUM_ENTITIES],
        }
    }

    /// Wrap columns received or folded elsewhere; all must share one length
    pub fn from_columns(polys: Vec<Vec<Scalar>>) -> Option<Self> {
        if polys.len() != NUM_ENTITIES {
            return None;
        }
        let size = polys[0].len();
        if size == 0 || polys.iter().any(|p| p.len() != size) {
            return None;
        }
        Some(Self { polys })
    }

    pub fn circuit_size(&self) -> usize {
        self.polys[0].len()
    }

    pub fn get(&self, column: usize) -> &[Scalar] {
        &self.polys[column]
    }

    pub fn get_mut(&mut self, column: usize) -> &mut Vec<Scalar> {
        &mut self.polys[column]
    }

    pub fn get_all(&self) -> &[Vec<Scalar>] {
        &self.polys
    }

    pub fn get_all_mut(&mut self) -> &mut [Vec<Scalar>] {
        &mut self.polys
    }

    pub fn precomputed(&self) -> &[Vec<Scalar>] {
        &self.polys[..NUM_PRECOMPUTED_ENTITIES]
    }

    pub fn witness(&self) -> &[Vec<Scalar>] {
        &self.polys[NUM_PRECOMPUTED_ENTITIES..]
    }

    /// Values of every column at row `i`, with the grand product shifted
    /// cyclically and the public-input column taken from `public_inputs`
    pub fn row(&self, i: usize, public_inputs: &[Scalar]) -> Row {
        let n = self.circuit_size();
        let mut values = [Scalar::zero(); ROW_WIDTH];
        for (value, poly) in values.iter_mut().zip(self.polys.iter()) {
            *value = poly[i];
        }
        values[column::Z_PERM_SHIFT] = self.polys[column::Z_PERM][(i + 1) % n];
        values[column::PUBLIC_INPUT] = public_inputs.get(i).copied().unwrap_or(Scalar::zero());
        Row { values }
    }
}

/// Evaluations of all relation inputs at one row (or at one folding point)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Row {
    values: [Scalar; ROW_WIDTH],
}

impl Row {
    /// `a + k * (b - a)`: the row of the instance interpolated through `a` at 0 and `b` at 1
    pub fn interpolate(a: &Row, b: &Row, k: Scalar) -> Row {
        let mut values = a.values;
        for (value, (x, y)) in values.iter_mut().zip(a.values.iter().zip(b.values.iter())) {
            *value = x + k * (y - x);
        }
        Row { values }
    }

    pub fn wire(&self, j: usize) -> Scalar {
        self.values[column::W_1 + j]
    }

    pub fn ecc_op_wire(&self, j: usize) -> Scalar {
        self.values[column::ECC_OP_WIRE_1 + j]
    }

    pub fn sigma(&self, j: usize) -> Scalar {
        self.values[column::SIGMA_1 + j]
    }

    pub fn id(&self, j: usize) -> Scalar {
        self.values[column::ID_1 + j]
    }
}

impl Index<usize> for Row {
    type Output = Scalar;

    fn index(&self, column: usize) -> &Scalar {
        &self.values[column]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_contiguous() {
        assert_eq!(column::SIGMA_1 + NUM_WIRES, column::ID_1);
        assert_eq!(column::ID_1 + NUM_WIRES, column::LAGRANGE_FIRST);
        assert_eq!(column::LAGRANGE_FIRST + 1, NUM_PRECOMPUTED_ENTITIES);
        assert_eq!(column::W_1, NUM_PRECOMPUTED_ENTITIES);
        assert_eq!(column::ECC_OP_WIRE_1 + NUM_WIRES, column::SORTED_ACCUM);
        assert_eq!(column::Z_PERM + 1, NUM_ENTITIES);
        assert_eq!(ENTITY_LABELS[column::Z_PERM], "z_perm");
        assert_eq!(witness_labels().len(), NUM_WITNESS_ENTITIES);
    }

    #[test]
    fn test_row_shift_wraps() {
        let mut polys = ProverPolynomials::new(4);
        for (i, value) in polys.get_mut(column::Z_PERM).iter_mut().enumerate() {
            *value = Scalar::from(i as u64 + 1);
        }
        let public_inputs = [Scalar::from(9u64)];

        let first = polys.row(0, &public_inputs);
        assert_eq!(first[column::Z_PERM_SHIFT], Scalar::from(2u64));
        assert_eq!(first[column::PUBLIC_INPUT], Scalar::from(9u64));

        let last = polys.row(3, &public_inputs);
        assert_eq!(last[column::Z_PERM_SHIFT], Scalar::from(1u64));
        assert_eq!(last[column::PUBLIC_INPUT], Scalar::zero());
    }

    #[test]
    fn test_row_interpolation() {
        let mut a = ProverPolynomials::new(1);
        let mut b = ProverPolynomials::new(1);
        a.get_mut(column::Q_M)[0] = Scalar::from(2u64);
        b.get_mut(column::Q_M)[0] = Scalar::from(5u64);
        let row = Row::interpolate(&a.row(0, &[]), &b.row(0, &[]), Scalar::from(3u64));
        assert_eq!(row[column::Q_M], Scalar::from(11u64));
    }

    #[test]
    fn test_from_columns_rejects_ragged() {
        let mut columns = vec![vec![Scalar::zero(); 4]; NUM_ENTITIES];
        assert!(ProverPolynomials::from_columns(columns.clone()).is_some());
        columns[3].pop();
        assert!(ProverPolynomials::from_columns(columns).is_none());
    }
}
