use client_ivc::{ClientIvc, ClientIvcProof, IvcConfig, IvcError, IvcVerificationInputs};
use goblin::{EccOpCode, MergeSettings};
use group::Curve;
use ivc_core::{Circuit, GroupElement, Scalar};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn session() -> ClientIvc {
    client_ivc::logging::init_with_level(Some("warn"));
    ClientIvc::new(IvcConfig::default(), &mut StdRng::seed_from_u64(42)).unwrap()
}

fn point(multiple: u64) -> GroupElement {
    (GroupElement::generator() * Scalar::from(multiple)).to_affine()
}

/// add(P1), mul(P2, s), eq_and_reset plus a little arithmetic
fn sample_circuit(i: u64, settings: MergeSettings) -> Circuit {
    let mut circuit = Circuit::new().with_merge_settings(settings);
    circuit.queue_ecc_add_accum(point(i + 1));
    circuit.queue_ecc_mul_accum(point(i + 2), Scalar::from(i + 5));
    circuit.queue_ecc_eq();

    let a = circuit.add_public_variable(Scalar::from(i + 3));
    let b = circuit.add_variable(Scalar::from(i + 4));
    let sum = circuit.add_variable(Scalar::from(2 * i + 7));
    let product = circuit.add_variable(Scalar::from((i + 3) * (i + 4)));
    circuit.create_add_gate(a, b, sum);
    circuit.create_mul_gate(a, b, product);
    circuit
}

fn settings_for(i: usize) -> MergeSettings {
    if i % 2 == 0 {
        MergeSettings::Prepend
    } else {
        MergeSettings::Append
    }
}

fn run(ivc: &mut ClientIvc, num_circuits: usize) -> (ClientIvcProof, IvcVerificationInputs) {
    for i in 0..num_circuits {
        ivc.accumulate(sample_circuit(i as u64, settings_for(i)), None)
            .unwrap();
    }
    let proof = ivc.prove().unwrap();
    let inputs = ivc.verification_inputs().unwrap();
    (proof, inputs)
}

fn flip_byte(proof: &mut ivc_commitments::Proof, index: usize) {
    proof.data[index] ^= 0x01;
}

#[test]
fn test_single_circuit() {
    let mut ivc = session();
    let (proof, inputs) = run(&mut ivc, 1);
    assert!(ivc.verify(&proof, &inputs));
    assert_eq!(proof.goblin_proof.len(), 1);
}

#[test]
fn test_two_circuits() {
    let mut ivc = session();
    let (proof, inputs) = run(&mut ivc, 2);
    assert!(ivc.verify(&proof, &inputs));
}

#[test]
fn test_four_circuits() {
    let mut ivc = session();
    let (proof, inputs) = run(&mut ivc, 4);
    assert!(ivc.verify(&proof, &inputs));
    assert_eq!(inputs.merge_settings.len(), 4);
    assert!(inputs.accumulator.is_accumulator);
}

#[test]
fn test_op_table_grows_six_rows_per_circuit() {
    let mut ivc = session();
    let mut rows = ivc.op_queue().get_ultra_ops_table_num_rows();
    for i in 0..3u64 {
        ivc.accumulate(sample_circuit(i, MergeSettings::Prepend), None)
            .unwrap();
        let grown = ivc.op_queue().get_ultra_ops_table_num_rows();
        assert_eq!(grown, rows + 6);
        assert_eq!(ivc.op_queue().get_current_subtable_num_rows(), 6);
        rows = grown;
    }
    assert_eq!(ivc.op_queue().num_eccvm_ops() * 2, rows);

    let proof = ivc.prove().unwrap();
    let inputs = ivc.verification_inputs().unwrap();
    assert!(ivc.verify(&proof, &inputs));
}

#[test]
fn test_tampered_folding_proof_fails() {
    let mut ivc = session();
    let (proof, inputs) = run(&mut ivc, 2);
    for index in [0, proof.folding_proof.len() / 2, proof.folding_proof.len() - 1] {
        let mut tampered = proof.clone();
        flip_byte(&mut tampered.folding_proof, index);
        assert!(!ivc.verify(&tampered, &inputs), "flip at {index} accepted");
    }
}

#[test]
fn test_tampered_decider_proof_fails() {
    let mut ivc = session();
    let (proof, inputs) = run(&mut ivc, 2);
    for index in [0, proof.decider_proof.len() / 3, proof.decider_proof.len() - 1] {
        let mut tampered = proof.clone();
        flip_byte(&mut tampered.decider_proof, index);
        assert!(!ivc.verify(&tampered, &inputs), "flip at {index} accepted");
    }
}

#[test]
fn test_tampered_merge_proof_fails() {
    let mut ivc = session();
    let (proof, inputs) = run(&mut ivc, 2);
    for step in 0..proof.goblin_proof.len() {
        let len = proof.goblin_proof.merge_proofs[step].len();
        let mut tampered = proof.clone();
        flip_byte(&mut tampered.goblin_proof.merge_proofs[step], len / 2);
        assert!(!ivc.verify(&tampered, &inputs), "flip in step {step} accepted");
    }

    let mut dropped = proof.clone();
    dropped.goblin_proof.merge_proofs.pop();
    assert!(!ivc.verify(&dropped, &inputs));
}

#[test]
fn test_wrong_merge_settings_fail() {
    let mut ivc = session();
    let (proof, mut inputs) = run(&mut ivc, 2);
    inputs.merge_settings[1] = MergeSettings::Prepend;
    assert!(!ivc.verify(&proof, &inputs));
}

#[test]
fn test_stale_verification_inputs_fail() {
    let mut ivc = session();
    for i in 0..2 {
        ivc.accumulate(sample_circuit(i as u64, settings_for(i)), None)
            .unwrap();
    }
    let stale = ivc.verification_inputs().unwrap();
    ivc.accumulate(sample_circuit(2, settings_for(2)), None)
        .unwrap();
    let proof = ivc.prove().unwrap();
    assert!(!ivc.verify(&proof, &stale));
    assert!(ivc.verify(&proof, &ivc.verification_inputs().unwrap()));
}

#[test]
fn test_precomputed_verification_keys() {
    let mut ivc = session();
    let circuits: Vec<Circuit> = (0..3)
        .map(|i| sample_circuit(i as u64, settings_for(i)))
        .collect();
    let vks = ivc.precompute_folding_verification_keys(&circuits).unwrap();
    assert_eq!(vks.len(), 3);
    assert!(!ivc.is_initialized());

    for (circuit, vk) in circuits.iter().zip(vks.iter()) {
        ivc.accumulate(circuit.clone(), Some(vk.clone())).unwrap();
        assert_eq!(&ivc.verification_inputs().unwrap().instance_vk, vk);
    }
    let proof = ivc.prove().unwrap();
    let inputs = ivc.verification_inputs().unwrap();
    assert!(ivc.verify(&proof, &inputs));
}

#[test]
fn test_precomputed_key_of_wrong_size_is_rejected() {
    let mut ivc = session();
    let circuits = vec![sample_circuit(0, MergeSettings::Prepend)];
    let mut vk = ivc
        .precompute_folding_verification_keys(&circuits)
        .unwrap()
        .remove(0);
    vk.num_public_inputs += 1;
    assert!(matches!(
        ivc.accumulate(circuits[0].clone(), Some(vk)),
        Err(IvcError::Core(_))
    ));
}

#[test]
fn test_kernel_alternates_and_history_resets() {
    let mut ivc = session();
    let mut roles = Vec::new();
    let mut history = Vec::new();
    for i in 0..4 {
        ivc.accumulate(sample_circuit(i as u64, settings_for(i)), None)
            .unwrap();
        roles.push(ivc.is_kernel());
        history.push(ivc.fold_output_history().len());
    }
    assert_eq!(roles, vec![false, true, false, true]);
    assert_eq!(history, vec![0, 1, 2, 1]);
    assert_eq!(ivc.num_accumulated(), 4);
}

#[test]
fn test_prove_without_circuits() {
    let mut ivc = session();
    assert!(matches!(ivc.prove(), Err(IvcError::NothingAccumulated)));
    assert!(matches!(
        ivc.verification_inputs(),
        Err(IvcError::NothingAccumulated)
    ));
}

#[test]
fn test_reset_starts_a_new_chain() {
    let mut ivc = session();
    run(&mut ivc, 2);
    ivc.reset();
    assert!(ivc.prover_accumulator().is_none());
    assert!(ivc.merge_proofs().is_empty());

    let (proof, inputs) = run(&mut ivc, 1);
    assert!(ivc.verify(&proof, &inputs));
}

#[test]
fn test_accumulation_spans_circuits() {
    let mut ivc = session();
    let mut first = Circuit::new();
    first.queue_ecc_add_accum(point(1));
    ivc.accumulate(first, None).unwrap();
    assert_eq!(ivc.ecc_accumulator(), point(1));

    let mut second = Circuit::new().with_merge_settings(MergeSettings::Append);
    second.queue_ecc_add_accum(point(2));
    second.queue_ecc_eq();
    ivc.accumulate(second, None).unwrap();

    let resolved: Vec<GroupElement> = ivc
        .op_queue()
        .get_eccvm_ops()
        .iter()
        .filter(|op| op.op_code == EccOpCode::EqualityAndReset)
        .map(|op| op.base_point)
        .collect();
    assert!(resolved.contains(&point(3)));
    assert_eq!(ivc.ecc_accumulator(), GroupElement::identity());

    let proof = ivc.prove().unwrap();
    let inputs = ivc.verification_inputs().unwrap();
    assert!(ivc.verify(&proof, &inputs));
}

#[test]
fn test_seeded_circuit_sees_queue_accumulator() {
    let mut ivc = session();
    let mut first = Circuit::new();
    first.queue_ecc_mul_accum(point(1), Scalar::from(4u64));
    ivc.accumulate(first, None).unwrap();

    let mut second = Circuit::new().with_ecc_accumulator(ivc.ecc_accumulator());
    second.queue_ecc_add_accum(point(1));
    assert_eq!(second.queue_ecc_eq(), point(5));
    ivc.accumulate(second, None).unwrap();

    let proof = ivc.prove().unwrap();
    assert!(ivc.verify(&proof, &ivc.verification_inputs().unwrap()));
}

#[test]
fn test_failed_accumulate_leaves_session_unchanged() {
    let mut ivc = session();
    for i in 0..2 {
        ivc.accumulate(sample_circuit(i as u64, settings_for(i)), None)
            .unwrap();
    }
    let rows = ivc.op_queue().get_ultra_ops_table_num_rows();
    let ecc_accumulator = ivc.ecc_accumulator();
    let inputs = ivc.verification_inputs().unwrap();
    let merge_proofs = ivc.merge_proofs().to_vec();
    let history = ivc.fold_output_history().len();
    let is_kernel = ivc.is_kernel();

    // Enough gates to overflow the 128-row trace, with an open ECC accumulation
    let mut oversized = sample_circuit(2, settings_for(2));
    oversized.queue_ecc_add_accum(point(9));
    let one = oversized.add_variable(Scalar::one());
    let two = oversized.add_variable(Scalar::from(2u64));
    for _ in 0..ivc.config().circuit_size() {
        oversized.create_add_gate(one, one, two);
    }
    assert!(matches!(
        ivc.accumulate(oversized, None),
        Err(IvcError::Core(ivc_core::CoreError::CircuitTooLarge { .. }))
    ));

    assert_eq!(ivc.op_queue().get_ultra_ops_table_num_rows(), rows);
    assert_eq!(ivc.ecc_accumulator(), ecc_accumulator);
    assert_eq!(ivc.verification_inputs().unwrap(), inputs);
    assert_eq!(ivc.merge_proofs(), &merge_proofs[..]);
    assert_eq!(ivc.fold_output_history().len(), history);
    assert_eq!(ivc.is_kernel(), is_kernel);

    ivc.accumulate(sample_circuit(2, settings_for(2)), None)
        .unwrap();
    let proof = ivc.prove().unwrap();
    let inputs = ivc.verification_inputs().unwrap();
    assert!(ivc.verify(&proof, &inputs));
}
