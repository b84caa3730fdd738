//! Prover and verifier views of a foldable instance
//!
//! A fresh instance comes from one circuit. After its first fold it becomes an
//! accumulator: a relaxed instance whose batched relation, weighted by the gate
//! separators of `gate_challenges`, sums to `target_sum` instead of zero.

use crate::circuit::Circuit;
use crate::flavor::{column, ProverPolynomials, Row, NUM_PRECOMPUTED_ENTITIES, NUM_WIRES};
use crate::gate_separator::separated_sum;
use crate::relations::{compute_row_evaluations, RelationParameters};
use crate::trace::construct_trace;
use crate::{CoreError, GroupElement, Result, Scalar};
use ivc_commitments::CommitmentKey;
use tracing::debug;

/// Commitments to the precomputed columns plus the sizes a verifier must know
#[derive(Clone, Debug, PartialEq)]
pub struct VerificationKey {
    pub circuit_size: usize,
    pub log_circuit_size: usize,
    pub num_public_inputs: usize,
    pub commitments: Vec<GroupElement>,
}

impl VerificationKey {
    pub fn from_polynomials(
        polynomials: &ProverPolynomials,
        num_public_inputs: usize,
        ck: &CommitmentKey,
    ) -> Result<Self> {
        let circuit_size = polynomials.circuit_size();
        let precomputed: Vec<&[Scalar]> = polynomials
            .precomputed()
            .iter()
            .map(Vec::as_slice)
            .collect();
        Ok(Self {
            circuit_size,
            log_circuit_size: circuit_size.trailing_zeros() as usize,
            num_public_inputs,
            commitments: ck.commit_all(&precomputed)?,
        })
    }
}

#[derive(Clone, Debug)]
pub struct ProverInstance {
    pub polynomials: ProverPolynomials,
    pub public_inputs: Vec<Scalar>,
    pub verification_key: VerificationKey,
    pub witness_commitments: Vec<GroupElement>,
    pub relation_parameters: RelationParameters,
    pub alphas: Vec<Scalar>,
    pub target_sum: Scalar,
    pub gate_challenges: Vec<Scalar>,
    pub is_accumulator: bool,
}

impl ProverInstance {
    /// Lay out `circuit` and resolve its verification key
    ///
    /// A supplied key is used as is after a size check; otherwise the precomputed
    /// columns are committed.
    pub fn new(
        circuit: &Circuit,
        log_circuit_size: usize,
        ck: &CommitmentKey,
        precomputed_vk: Option<VerificationKey>,
    ) -> Result<Self> {
        let polynomials = construct_trace(circuit, log_circuit_size)?;
        let public_inputs = circuit.public_inputs();

        let verification_key = match precomputed_vk {
            Some(vk) => {
                if vk.circuit_size != polynomials.circuit_size()
                    || vk.num_public_inputs != public_inputs.len()
                    || vk.commitments.len() != NUM_PRECOMPUTED_ENTITIES
                {
                    return Err(CoreError::VerificationKeyMismatch(format!(
                        "precomputed key for {} rows / {} public inputs, circuit has {} / {}",
                        vk.circuit_size,
                        vk.num_public_inputs,
                        polynomials.circuit_size(),
                        public_inputs.len()
                    )));
                }
                vk
            }
            None => VerificationKey::from_polynomials(&polynomials, public_inputs.len(), ck)?,
        };

        debug!(
            rows = circuit.num_rows(),
            circuit_size = polynomials.circuit_size(),
            public_inputs = public_inputs.len(),
            "constructed prover instance"
        );

        Ok(Self {
            polynomials,
            public_inputs,
            verification_key,
            witness_commitments: Vec::new(),
            relation_parameters: RelationParameters::default(),
            alphas: Vec::new(),
            target_sum: Scalar::zero(),
            gate_challenges: Vec::new(),
            is_accumulator: false,
        })
    }

    pub fn circuit_size(&self) -> usize {
        self.polynomials.circuit_size()
    }

    pub fn log_circuit_size(&self) -> usize {
        self.verification_key.log_circuit_size
    }

    pub fn row(&self, i: usize) -> Row {
        self.polynomials.row(i, &self.public_inputs)
    }

    /// `sorted = w_l + eta w_r + eta^2 w_o`
    pub fn compute_sorted_accumulator(&mut self, eta: Scalar) {
        let eta_sqr = eta.square();
        let n = self.circuit_size();
        let sorted: Vec<Scalar> = (0..n)
            .map(|i| {
                let w = |j: usize| self.polynomials.get(column::W_1 + j)[i];
                w(0) + eta * w(1) + eta_sqr * w(2)
            })
            .collect();
        *self.polynomials.get_mut(column::SORTED_ACCUM) = sorted;
    }

    /// Grand product `z[0] = 1`, `z[i+1] = z[i] * num_i / den_i`
    pub fn compute_grand_product(&mut self, beta: Scalar, gamma: Scalar) -> Result<()> {
        let n = self.circuit_size();
        let mut numerators = vec![Scalar::one(); n];
        let mut denominators = vec![Scalar::one(); n];
        for j in 0..NUM_WIRES {
            let wire = self.polynomials.get(column::W_1 + j);
            let id = self.polynomials.get(column::ID_1 + j);
            let sigma = self.polynomials.get(column::SIGMA_1 + j);
            for i in 0..n {
                numerators[i] *= wire[i] + beta * id[i] + gamma;
                denominators[i] *= wire[i] + beta * sigma[i] + gamma;
            }
        }

        let mut z_perm = vec![Scalar::one(); n];
        for i in 0..n - 1 {
            let inverse = Option::<Scalar>::from(denominators[i].invert())
                .ok_or(CoreError::ZeroDenominator { row: i })?;
            z_perm[i + 1] = z_perm[i] * numerators[i] * inverse;
        }
        *self.polynomials.get_mut(column::Z_PERM) = z_perm;
        Ok(())
    }

    /// Batched relation value at every row under this instance's challenges
    pub fn row_evaluations(&self) -> Vec<Scalar> {
        compute_row_evaluations(
            &self.polynomials,
            &self.public_inputs,
            &self.alphas,
            &self.relation_parameters,
        )
    }

    /// `sum_i pow_i(gate_challenges) f_i`, which equals `target_sum` for a valid accumulator
    pub fn compute_relation_sum(&self) -> Scalar {
        separated_sum(&self.gate_challenges, &self.row_evaluations())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VerifierInstance {
    pub verification_key: VerificationKey,
    pub public_inputs: Vec<Scalar>,
    pub witness_commitments: Vec<GroupElement>,
    pub relation_parameters: RelationParameters,
    pub alphas: Vec<Scalar>,
    pub target_sum: Scalar,
    pub gate_challenges: Vec<Scalar>,
    pub is_accumulator: bool,
}

impl VerifierInstance {
    /// An instance that has not been through the folding transcript yet
    pub fn new(verification_key: VerificationKey) -> Self {
        Self {
            verification_key,
            public_inputs: Vec::new(),
            witness_commitments: Vec::new(),
            relation_parameters: RelationParameters::default(),
            alphas: Vec::new(),
            target_sum: Scalar::zero(),
            gate_challenges: Vec::new(),
            is_accumulator: false,
        }
    }
}
