//! Merge prover
//!
//! Proves that the aggregate op table is the concatenation of the previous table
//! and the newest subtable, in the order given by the queue's merge settings. Each
//! of the four columns is treated as a polynomial in monomial form, so for
//! prepending `T(X) = t(X) + X^|t| * T_prev(X)`, and for appending
//! `T(X) = T_prev(X) + X^|T_prev| * t(X)`. The identity is checked at a single
//! challenge point.
//!
//! The identity only pins `T` down if `deg t < |t|`. The prover therefore also
//! commits to `X^(K - |t|) * t(X)`, where `K` is the commitment key size; that
//! commitment exists only if the bound holds. All sixteen evaluations are opened
//! with one batched KZG proof.

use crate::ecc_ops::NUM_OP_WIRES;
use crate::op_queue::{EccOpQueue, TableColumns};
use crate::{GoblinError, GroupElement, Result, Scalar};
use ivc_commitments::{polynomial, CommitmentKey, Kzg, OpeningPair, Proof, Transcript};
use tracing::{debug, instrument};

pub(crate) const MERGE_TRANSCRIPT_LABEL: &[u8] = b"goblin-merge";

/// Commitment labels for subtable, previous table, current table and shifted
/// subtable columns
pub(crate) const COMMITMENT_LABELS: [&str; 4] =
    ["t_CURRENT", "T_PREV", "T_CURRENT", "t_SHIFTED"];

/// Evaluation labels, same order as [`COMMITMENT_LABELS`]
pub(crate) const EVALUATION_LABELS: [&str; 4] =
    ["t_eval", "T_prev_eval", "T_eval", "t_shifted_eval"];

/// `X^(key_size - |column|) * column(X)`
pub(crate) fn degree_check_column(column: &[Scalar], key_size: usize) -> Vec<Scalar> {
    let mut shifted = vec![Scalar::zero(); key_size.saturating_sub(column.len())];
    shifted.extend_from_slice(column);
    shifted
}

/// Commit to the four columns of a table
pub fn commit_table_columns(
    ck: &CommitmentKey,
    columns: &TableColumns,
) -> Result<[GroupElement; NUM_OP_WIRES]> {
    let polys: Vec<&[Scalar]> = columns.iter().map(Vec::as_slice).collect();
    let commitments = ck.commit_all(&polys)?;
    let mut result = [GroupElement::identity(); NUM_OP_WIRES];
    result.copy_from_slice(&commitments);
    Ok(result)
}

pub struct MergeProver<'a> {
    op_queue: &'a EccOpQueue,
    commitment_key: &'a CommitmentKey,
    transcript: Transcript,
}

impl<'a> MergeProver<'a> {
    pub fn new(op_queue: &'a EccOpQueue, commitment_key: &'a CommitmentKey) -> Self {
        Self {
            op_queue,
            commitment_key,
            transcript: Transcript::new(MERGE_TRANSCRIPT_LABEL),
        }
    }

    #[instrument(skip_all, name = "merge_prove")]
    pub fn construct_proof(self) -> Result<Proof> {
        let subtable_rows = self.op_queue.get_current_subtable_num_rows();
        self.prove_claiming(subtable_rows)
    }

    /// Proof that announces `subtable_rows` as the subtable size
    pub(crate) fn prove_claiming(mut self, subtable_rows: usize) -> Result<Proof> {
        let previous_rows = self.op_queue.get_previous_table_num_rows();
        if previous_rows == 0 {
            return Err(GoblinError::EmptyPreviousTable);
        }

        let subtable = self.op_queue.construct_current_subtable_columns();
        let previous_table = self.op_queue.construct_previous_table_columns();
        let current_table = self.op_queue.construct_table_columns();

        let key_size = self.commitment_key.size();
        self.transcript
            .send_to_verifier("subtable_size", &(subtable_rows as u32));

        let mut shifted_subtable: TableColumns = Default::default();
        for (shifted, column) in shifted_subtable.iter_mut().zip(subtable.iter()) {
            *shifted = degree_check_column(column, key_size);
        }

        let tables = [&subtable, &previous_table, &current_table, &shifted_subtable];
        for (table, label) in tables.iter().zip(COMMITMENT_LABELS) {
            let commitments = commit_table_columns(self.commitment_key, table)?;
            self.transcript.send_all_to_verifier(label, &commitments);
        }

        let kappa = self.transcript.get_challenge("kappa");

        let mut evaluations = Vec::with_capacity(tables.len() * NUM_OP_WIRES);
        for (table, label) in tables.iter().zip(EVALUATION_LABELS) {
            let table_evals: Vec<Scalar> = table
                .iter()
                .map(|column| polynomial::evaluate(column, kappa))
                .collect();
            self.transcript.send_all_to_verifier(label, &table_evals);
            evaluations.extend(table_evals);
        }

        let alpha = self.transcript.get_challenge("alpha");

        let mut batched_polynomial = vec![Scalar::zero(); key_size];
        let mut batched_evaluation = Scalar::zero();
        let mut alpha_pow = Scalar::one();
        let columns = tables.iter().flat_map(|table| table.iter());
        for (column, evaluation) in columns.zip(evaluations.iter()) {
            polynomial::add_scaled(&mut batched_polynomial, column, alpha_pow);
            batched_evaluation += alpha_pow * evaluation;
            alpha_pow *= alpha;
        }

        let opening_pair = OpeningPair {
            challenge: kappa,
            evaluation: batched_evaluation,
        };
        Kzg::compute_opening_proof(
            self.commitment_key,
            &batched_polynomial,
            &opening_pair,
            &mut self.transcript,
        )?;

        let proof = self.transcript.export_proof();
        debug!(
            subtable_rows,
            table_rows = current_table[0].len(),
            proof_bytes = proof.len(),
            "constructed merge proof"
        );
        Ok(proof)
    }
}
