//! The IVC session
//!
//! Each accumulated circuit goes through three steps:
//!
//! 1. If a folding proof from the previous step exists, its verifier is run
//!    natively and recorded in the circuit, advancing the verifier accumulator.
//! 2. The circuit's ECC ops are replayed into the session's op queue as a new
//!    subtable, equality ops are resolved against the queue's accumulator, and
//!    a merge proof is produced.
//! 3. The circuit's instance is folded into the running prover accumulator.
//!
//! [`ClientIvc::prove`] then decides the final accumulator and bundles the last
//! folding proof, the decider proof and the merge chain.

use crate::config::IvcConfig;
use crate::errors::{IvcError, Result};
use crate::proof::{ClientIvcProof, IvcVerificationInputs};
use goblin::{
    initial_table_commitments, EccOpQueue, GoblinProof, GoblinVerifier, MergeProver,
    MergeSettings, NUM_OP_WIRES,
};
use ivc_commitments::{setup, CommitmentKey, GroupElement, Proof, VerifierCommitmentKey};
use ivc_core::{
    Circuit, DeciderProver, DeciderVerifier, ProverInstance, VerificationKey, VerifierInstance,
};
use protogalaxy::{add_recursive_folding_verifier, FoldingResult, ProtogalaxyProver, ProtogalaxyVerifier};
use rand_core::RngCore;
use tracing::{debug, info, instrument, warn};

pub struct ClientIvc {
    config: IvcConfig,
    commitment_key: CommitmentKey,
    verifier_commitment_key: VerifierCommitmentKey,
    initial_table_commitments: [GroupElement; NUM_OP_WIRES],

    op_queue: EccOpQueue,
    prover_accumulator: Option<ProverInstance>,
    verifier_accumulator: Option<VerifierInstance>,
    /// Proof of the most recent fold, not yet verified in-circuit
    folding_proof: Option<Proof>,
    /// Key of the most recently accumulated instance
    instance_vk: Option<VerificationKey>,
    is_kernel: bool,
    initialized: bool,
    /// Folding proofs since the last kernel circuit
    fold_output_history: Vec<Proof>,
    merge_proofs: Vec<Proof>,
    merge_settings: Vec<MergeSettings>,
}

impl ClientIvc {
    /// Start a session, generating the commitment key from `rng`
    pub fn new(config: IvcConfig, rng: &mut impl RngCore) -> Result<Self> {
        config.validate()?;
        let (commitment_key, verifier_commitment_key) = setup(config.commitment_key_size, rng)?;
        let initial_table_commitments = initial_table_commitments(&commitment_key)?;
        info!(
            log_circuit_size = config.log_circuit_size,
            commitment_key_size = config.commitment_key_size,
            "started client IVC session"
        );
        Ok(Self {
            config,
            commitment_key,
            verifier_commitment_key,
            initial_table_commitments,
            op_queue: EccOpQueue::seeded(),
            prover_accumulator: None,
            verifier_accumulator: None,
            folding_proof: None,
            instance_vk: None,
            is_kernel: false,
            initialized: false,
            fold_output_history: Vec::new(),
            merge_proofs: Vec::new(),
            merge_settings: Vec::new(),
        })
    }

    /// Add `circuit` to the chain
    ///
    /// With `precomputed_vk` the precomputed columns are not recommitted; the
    /// key is only checked against the circuit's sizes. On error the session is
    /// left exactly as it was.
    #[instrument(skip_all, fields(step = self.merge_proofs.len()))]
    pub fn accumulate(
        &mut self,
        mut circuit: Circuit,
        precomputed_vk: Option<VerificationKey>,
    ) -> Result<()> {
        let folded_verifier = match &self.folding_proof {
            Some(folding_proof) => {
                let (accumulator, instance_vk) =
                    match (&self.verifier_accumulator, &self.instance_vk) {
                        (Some(accumulator), Some(instance_vk)) => (accumulator, instance_vk),
                        _ => {
                            return Err(IvcError::InvalidState(
                                "folding proof without a verifier accumulator".to_string(),
                            ))
                        }
                    };
                Some(add_recursive_folding_verifier(
                    &mut circuit,
                    accumulator,
                    instance_vk,
                    folding_proof,
                )?)
            }
            None => None,
        };

        let is_kernel = if self.initialized {
            !self.is_kernel
        } else {
            self.is_kernel
        };

        let settings = circuit.merge_settings();
        let mut op_queue = self.op_queue.clone();
        let resolved_ops = op_queue.append_subtable(circuit.ecc_ops(), settings);
        circuit.sync_ecc_ops(&resolved_ops)?;
        let merge_proof = MergeProver::new(&op_queue, &self.commitment_key).construct_proof()?;

        let instance = ProverInstance::new(
            &circuit,
            self.config.log_circuit_size,
            &self.commitment_key,
            precomputed_vk,
        )?;
        let instance_vk = instance.verification_key.clone();

        let (prover_accumulator, fold_proof) = match &self.prover_accumulator {
            None => (instance, None),
            Some(accumulator) => {
                let FoldingResult { accumulator, proof } =
                    ProtogalaxyProver::new(accumulator.clone(), instance, &self.commitment_key)
                        .prove()?;
                (accumulator, Some(proof))
            }
        };

        self.op_queue = op_queue;
        self.merge_proofs.push(merge_proof);
        self.merge_settings.push(settings);
        if let Some(folded) = folded_verifier {
            self.verifier_accumulator = Some(folded);
        }
        if self.initialized && is_kernel {
            self.fold_output_history.clear();
        }
        self.is_kernel = is_kernel;
        match fold_proof {
            None => {
                self.verifier_accumulator = Some(VerifierInstance::new(instance_vk.clone()));
                self.initialized = true;
            }
            Some(proof) => {
                self.fold_output_history.push(proof.clone());
                self.folding_proof = Some(proof);
            }
        }
        self.prover_accumulator = Some(prover_accumulator);
        self.instance_vk = Some(instance_vk);

        debug!(
            is_kernel = self.is_kernel,
            op_table_rows = self.op_queue.get_ultra_ops_table_num_rows(),
            "accumulated circuit"
        );
        Ok(())
    }

    /// Decide the final accumulator
    ///
    /// A session holding a single circuit folds that instance with itself
    /// first, so every proof carries one folding step.
    #[instrument(skip_all, name = "client_ivc_prove")]
    pub fn prove(&mut self) -> Result<ClientIvcProof> {
        if self.folding_proof.is_none() {
            let accumulator = self
                .prover_accumulator
                .as_ref()
                .ok_or(IvcError::NothingAccumulated)?;
            let FoldingResult { accumulator, proof } = ProtogalaxyProver::new(
                accumulator.clone(),
                accumulator.clone(),
                &self.commitment_key,
            )
            .prove()?;
            self.prover_accumulator = Some(accumulator);
            self.fold_output_history.push(proof.clone());
            self.folding_proof = Some(proof);
        }

        let (accumulator, folding_proof) = match (&self.prover_accumulator, &self.folding_proof) {
            (Some(accumulator), Some(proof)) => (accumulator, proof.clone()),
            _ => return Err(IvcError::NothingAccumulated),
        };
        let decider_proof = DeciderProver::new(accumulator).construct_proof()?;
        let proof = ClientIvcProof {
            folding_proof,
            decider_proof,
            goblin_proof: GoblinProof {
                merge_proofs: self.merge_proofs.clone(),
            },
        };
        info!(
            steps = self.merge_proofs.len(),
            proof_bytes = proof.size(),
            "constructed client IVC proof"
        );
        Ok(proof)
    }

    /// Data a verifier needs for the proof returned by [`ClientIvc::prove`]
    pub fn verification_inputs(&self) -> Result<IvcVerificationInputs> {
        match (&self.verifier_accumulator, &self.instance_vk) {
            (Some(accumulator), Some(instance_vk)) => Ok(IvcVerificationInputs {
                accumulator: accumulator.clone(),
                instance_vk: instance_vk.clone(),
                merge_settings: self.merge_settings.clone(),
            }),
            _ => Err(IvcError::NothingAccumulated),
        }
    }

    /// Accept iff the merge chain, the final fold and the decider all verify
    #[instrument(skip_all, name = "client_ivc_verify")]
    pub fn verify(&self, proof: &ClientIvcProof, inputs: &IvcVerificationInputs) -> bool {
        let goblin_verified =
            GoblinVerifier::new(&self.verifier_commitment_key, self.initial_table_commitments)
                .verify(&proof.goblin_proof, &inputs.merge_settings);

        let folded = match ProtogalaxyVerifier::new(&inputs.accumulator, &inputs.instance_vk)
            .verify_folding_proof(&proof.folding_proof)
        {
            Ok(folded) => folded,
            Err(err) => {
                warn!(%err, "folding proof rejected");
                return false;
            }
        };
        let decider_verified =
            DeciderVerifier::new(&folded, &self.commitment_key).verify_proof(&proof.decider_proof);

        let verified = goblin_verified && decider_verified;
        if verified {
            info!("verified client IVC proof");
        } else {
            warn!(goblin_verified, decider_verified, "client IVC proof rejected");
        }
        verified
    }

    /// Verification key of each circuit as it would be accumulated in this order
    ///
    /// Runs the whole chain on copies of the circuits and resets the session.
    pub fn precompute_folding_verification_keys(
        &mut self,
        circuits: &[Circuit],
    ) -> Result<Vec<VerificationKey>> {
        self.reset();
        let mut vks = Vec::with_capacity(circuits.len());
        for circuit in circuits {
            self.accumulate(circuit.clone(), None)?;
            let vk = self
                .instance_vk
                .clone()
                .ok_or_else(|| IvcError::InvalidState("no key after accumulate".to_string()))?;
            vks.push(vk);
        }
        self.reset();
        Ok(vks)
    }

    /// Drop all accumulated state, keeping the keys
    pub fn reset(&mut self) {
        self.op_queue = EccOpQueue::seeded();
        self.prover_accumulator = None;
        self.verifier_accumulator = None;
        self.folding_proof = None;
        self.instance_vk = None;
        self.is_kernel = false;
        self.initialized = false;
        self.fold_output_history.clear();
        self.merge_proofs.clear();
        self.merge_settings.clear();
    }

    pub fn config(&self) -> &IvcConfig {
        &self.config
    }

    pub fn commitment_key(&self) -> &CommitmentKey {
        &self.commitment_key
    }

    pub fn op_queue(&self) -> &EccOpQueue {
        &self.op_queue
    }

    /// Running point of the op queue, for seeding the next circuit
    pub fn ecc_accumulator(&self) -> GroupElement {
        self.op_queue.accumulator()
    }

    pub fn prover_accumulator(&self) -> Option<&ProverInstance> {
        self.prover_accumulator.as_ref()
    }

    pub fn verifier_accumulator(&self) -> Option<&VerifierInstance> {
        self.verifier_accumulator.as_ref()
    }

    pub fn fold_output_history(&self) -> &[Proof] {
        &self.fold_output_history
    }

    pub fn merge_proofs(&self) -> &[Proof] {
        &self.merge_proofs
    }

    pub fn is_kernel(&self) -> bool {
        self.is_kernel
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of circuits accumulated since the session started or was reset
    pub fn num_accumulated(&self) -> usize {
        self.merge_proofs.len()
    }
}
