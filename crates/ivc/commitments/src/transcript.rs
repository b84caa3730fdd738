//! Fiat-Shamir transcript with an explicit proof buffer
//!
//! The prover appends every message both to a Merlin transcript and to a byte
//! buffer that becomes the proof. The verifier replays the same buffer: each
//! `receive_from_prover` consumes bytes, absorbs them exactly as the prover did,
//! so both sides derive identical challenges.

use crate::{CommitmentError, GroupElement, Result, Scalar};
use byteorder::{ByteOrder, LittleEndian};
use merlin::Transcript as MerlinTranscript;
use std::fmt;

/// Serialized proof bytes
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Proof {
    pub data: Vec<u8>,
}

impl Proof {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for Proof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = &self.data[..self.data.len().min(16)];
        write!(f, "Proof({} bytes, {}..)", self.data.len(), hex::encode(prefix))
    }
}

/// Anything that can travel through the transcript
pub trait TranscriptElement: Sized {
    /// Encoded length in bytes
    const SIZE: usize;

    fn write_bytes(&self, out: &mut Vec<u8>);

    /// Returns `None` for non-canonical encodings
    fn read_bytes(bytes: &[u8]) -> Option<Self>;
}

impl TranscriptElement for Scalar {
    const SIZE: usize = 32;

    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_bytes());
    }

    fn read_bytes(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; 32] = bytes.try_into().ok()?;
        Scalar::from_bytes(&arr).into()
    }
}

impl TranscriptElement for GroupElement {
    const SIZE: usize = 48;

    fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_compressed());
    }

    fn read_bytes(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; 48] = bytes.try_into().ok()?;
        GroupElement::from_compressed(&arr).into()
    }
}

impl TranscriptElement for u32 {
    const SIZE: usize = 4;

    fn write_bytes(&self, out: &mut Vec<u8>) {
        let mut buf = [0u8; 4];
        LittleEndian::write_u32(&mut buf, *self);
        out.extend_from_slice(&buf);
    }

    fn read_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 4 {
            return None;
        }
        Some(LittleEndian::read_u32(bytes))
    }
}

/// Prover/verifier transcript wrapper around Merlin
#[derive(Clone)]
pub struct Transcript {
    transcript: MerlinTranscript,
    proof_data: Vec<u8>,
    num_bytes_read: usize,
    num_bytes_exported: usize,
}

impl Transcript {
    /// Prover transcript with an empty proof buffer
    pub fn new(label: &'static [u8]) -> Self {
        Self {
            transcript: MerlinTranscript::new(label),
            proof_data: Vec::new(),
            num_bytes_read: 0,
            num_bytes_exported: 0,
        }
    }

    /// Verifier transcript replaying `proof`
    pub fn from_proof(label: &'static [u8], proof: &Proof) -> Self {
        Self {
            transcript: MerlinTranscript::new(label),
            proof_data: proof.data.clone(),
            num_bytes_read: 0,
            num_bytes_exported: 0,
        }
    }

    fn absorb(&mut self, label: &str, bytes: &[u8]) {
        self.transcript.append_message(b"label", label.as_bytes());
        self.transcript.append_message(b"element", bytes);
    }

    /// Absorb `element` and append it to the proof
    pub fn send_to_verifier<T: TranscriptElement>(&mut self, label: &str, element: &T) {
        let mut bytes = Vec::with_capacity(T::SIZE);
        element.write_bytes(&mut bytes);
        self.absorb(label, &bytes);
        self.proof_data.extend_from_slice(&bytes);
    }

    pub fn send_all_to_verifier<T: TranscriptElement>(&mut self, label: &str, elements: &[T]) {
        for (i, element) in elements.iter().enumerate() {
            self.send_to_verifier(&format!("{}_{}", label, i), element);
        }
    }

    /// Read the next element from the proof and absorb it
    pub fn receive_from_prover<T: TranscriptElement>(&mut self, label: &str) -> Result<T> {
        let start = self.num_bytes_read;
        let end = start + T::SIZE;
        if end > self.proof_data.len() {
            return Err(CommitmentError::ProofExhausted {
                label: label.to_string(),
            });
        }
        let bytes = self.proof_data[start..end].to_vec();
        let element = T::read_bytes(&bytes).ok_or_else(|| CommitmentError::MalformedElement {
            label: label.to_string(),
        })?;
        self.num_bytes_read = end;
        self.absorb(label, &bytes);
        Ok(element)
    }

    pub fn receive_all_from_prover<T: TranscriptElement>(
        &mut self,
        label: &str,
        count: usize,
    ) -> Result<Vec<T>> {
        (0..count)
            .map(|i| self.receive_from_prover(&format!("{}_{}", label, i)))
            .collect()
    }

    /// Squeeze a challenge scalar bound to everything absorbed so far
    pub fn get_challenge(&mut self, label: &str) -> Scalar {
        self.transcript.append_message(b"challenge", label.as_bytes());
        let mut buf = [0u8; 64];
        self.transcript.challenge_bytes(b"challenge-bytes", &mut buf);
        Scalar::from_bytes_wide(&buf)
    }

    pub fn get_challenges(&mut self, labels: &[String]) -> Vec<Scalar> {
        labels.iter().map(|label| self.get_challenge(label)).collect()
    }

    /// Proof bytes produced since the previous export
    pub fn export_proof(&mut self) -> Proof {
        let data = self.proof_data[self.num_bytes_exported..].to_vec();
        self.num_bytes_exported = self.proof_data.len();
        Proof::new(data)
    }

    /// True once the verifier has consumed every byte of the proof
    pub fn is_exhausted(&self) -> bool {
        self.num_bytes_read == self.proof_data.len()
    }
}
