//! ECC operation records in their two encodings
//!
//! Every queued operation is stored twice: once as an [`UltraOp`], the limb
//! encoding that fills two rows of the arithmetization's op wires, and once as
//! an [`EccvmOperation`], the native record consumed by the ECC VM.

use crate::curve::{point_limbs, split_scalar};
use crate::{GroupElement, Scalar};

/// Op-wire rows produced by one operation
pub const ULTRA_ROWS_PER_OP: usize = 2;

/// Number of op wires
pub const NUM_OP_WIRES: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EccOpCode {
    Null,
    Add,
    Mul,
    EqualityAndReset,
}

impl EccOpCode {
    /// Packed flags `add << 3 | mul << 2 | eq << 1 | reset`
    pub fn value(&self) -> u64 {
        match self {
            EccOpCode::Add => 8,
            EccOpCode::Mul => 4,
            EccOpCode::EqualityAndReset => 3,
            EccOpCode::Null => 0,
        }
    }

    pub fn as_scalar(&self) -> Scalar {
        Scalar::from(self.value())
    }

    pub fn is_add(&self) -> bool {
        matches!(self, EccOpCode::Add)
    }

    pub fn is_mul(&self) -> bool {
        matches!(self, EccOpCode::Mul)
    }

    pub fn is_eq(&self) -> bool {
        matches!(self, EccOpCode::EqualityAndReset)
    }

    pub fn is_reset(&self) -> bool {
        matches!(self, EccOpCode::EqualityAndReset)
    }
}

/// Limb encoding of an operation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UltraOp {
    pub op_code: EccOpCode,
    pub x_lo: Scalar,
    pub x_hi: Scalar,
    pub y_lo: Scalar,
    pub y_hi: Scalar,
    pub z_1: Scalar,
    pub z_2: Scalar,
    pub return_is_infinity: bool,
}

impl UltraOp {
    pub fn new(op_code: EccOpCode, point: &GroupElement, scalar: &Scalar) -> Self {
        let [x_lo, x_hi, y_lo, y_hi] = point_limbs(point);
        let (z_1, z_2) = split_scalar(scalar);
        Self {
            op_code,
            x_lo,
            x_hi,
            y_lo,
            y_hi,
            z_1,
            z_2,
            return_is_infinity: bool::from(point.is_identity()),
        }
    }

    pub fn null() -> Self {
        Self::new(EccOpCode::Null, &GroupElement::identity(), &Scalar::zero())
    }

    /// `[opcode, x_lo, x_hi, y_lo]` then `[0, y_hi, z_1, z_2]`
    pub fn rows(&self) -> [[Scalar; NUM_OP_WIRES]; ULTRA_ROWS_PER_OP] {
        [
            [self.op_code.as_scalar(), self.x_lo, self.x_hi, self.y_lo],
            [Scalar::zero(), self.y_hi, self.z_1, self.z_2],
        ]
    }
}

/// Native encoding of an operation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EccvmOperation {
    pub op_code: EccOpCode,
    pub base_point: GroupElement,
    pub z1: Scalar,
    pub z2: Scalar,
    pub mul_scalar_full: Scalar,
}

impl EccvmOperation {
    pub fn new(op_code: EccOpCode, base_point: GroupElement, scalar: Scalar) -> Self {
        let (z1, z2) = split_scalar(&scalar);
        Self {
            op_code,
            base_point,
            z1,
            z2,
            mul_scalar_full: scalar,
        }
    }

    pub fn to_ultra_op(&self) -> UltraOp {
        UltraOp::new(self.op_code, &self.base_point, &self.mul_scalar_full)
    }
}
