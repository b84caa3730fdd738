//! Session configuration

use crate::errors::{IvcError, Result};
use serde::{Deserialize, Serialize};

/// Parameters shared by every circuit of a session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IvcConfig {
    /// Every circuit is padded to `2^log_circuit_size` rows
    pub log_circuit_size: usize,
    /// Number of monomials in the commitment key; bounds both circuit columns
    /// and the aggregate op table
    pub commitment_key_size: usize,
}

impl Default for IvcConfig {
    fn default() -> Self {
        Self {
            log_circuit_size: 7,
            commitment_key_size: 256,
        }
    }
}

impl IvcConfig {
    pub fn circuit_size(&self) -> usize {
        1 << self.log_circuit_size
    }

    pub fn validate(&self) -> Result<()> {
        if self.log_circuit_size == 0 || self.log_circuit_size >= usize::BITS as usize {
            return Err(IvcError::InvalidConfig(format!(
                "log circuit size {} out of range",
                self.log_circuit_size
            )));
        }
        if self.commitment_key_size < self.circuit_size() {
            return Err(IvcError::InvalidConfig(format!(
                "commitment key of size {} cannot commit to {} rows",
                self.commitment_key_size,
                self.circuit_size()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = IvcConfig::default();
        assert_eq!(config.circuit_size(), 128);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_small_commitment_key_is_rejected() {
        let config = IvcConfig {
            log_circuit_size: 8,
            commitment_key_size: 128,
        };
        assert!(matches!(config.validate(), Err(IvcError::InvalidConfig(_))));
    }

    proptest! {
        #[test]
        fn prop_key_must_cover_circuit(log_circuit_size in 1usize..16, slack in 0usize..64) {
            let circuit_size = 1usize << log_circuit_size;
            let fits = IvcConfig { log_circuit_size, commitment_key_size: circuit_size + slack };
            let short = IvcConfig { log_circuit_size, commitment_key_size: circuit_size - 1 };
            prop_assert!(fits.validate().is_ok());
            prop_assert!(short.validate().is_err());
        }
    }
}
