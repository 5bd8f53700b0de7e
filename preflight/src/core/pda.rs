//! Program-derived address derivation for NTT peer accounts.
//!
//! A program-derived address is the first `sha256(seeds || bump || program_id
//! || "ProgramDerivedAddress")` that is *not* a valid ed25519 point, trying
//! bumps from 255 down to 0.

use curve25519_dalek::edwards::CompressedEdwardsY;
use sha2::{Digest, Sha256};
use thiserror::Error;

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";
const MAX_SEED_LEN: usize = 32;
const MAX_SEEDS: usize = 16;
const PEER_SEED: &[u8] = b"peer";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PdaError {
    #[error("invalid program id '{0}': not a base58 32-byte public key")]
    InvalidProgramId(String),
    #[error("seed exceeds {MAX_SEED_LEN} bytes")]
    SeedTooLong,
    #[error("more than {MAX_SEEDS} seeds")]
    TooManySeeds,
    #[error("no viable bump seed found")]
    NoViableBump,
}

/// Derived address plus the bump that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramAddress {
    pub address: [u8; 32],
    pub bump: u8,
}

impl ProgramAddress {
    pub fn to_base58(&self) -> String {
        bs58::encode(self.address).into_string()
    }
}

pub fn decode_program_id(program_id: &str) -> Result<[u8; 32], PdaError> {
    let bytes = bs58::decode(program_id.trim())
        .into_vec()
        .map_err(|_| PdaError::InvalidProgramId(program_id.to_string()))?;
    bytes
        .try_into()
        .map_err(|_| PdaError::InvalidProgramId(program_id.to_string()))
}

pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &[u8; 32],
) -> Result<ProgramAddress, PdaError> {
    if seeds.len() >= MAX_SEEDS {
        return Err(PdaError::TooManySeeds);
    }
    if seeds.iter().any(|seed| seed.len() > MAX_SEED_LEN) {
        return Err(PdaError::SeedTooLong);
    }

    for bump in (0..=u8::MAX).rev() {
        let mut hasher = Sha256::new();
        for seed in seeds {
            hasher.update(seed);
        }
        hasher.update([bump]);
        hasher.update(program_id);
        hasher.update(PDA_MARKER);
        let address: [u8; 32] = hasher.finalize().into();

        if CompressedEdwardsY(address).decompress().is_none() {
            return Ok(ProgramAddress { address, bump });
        }
    }
    Err(PdaError::NoViableBump)
}

/// Peer account of a manager program: seeds `["peer", u16_le(chain_id)]`.
pub fn peer_account_address(program_id: &str, chain_id: u16) -> Result<String, PdaError> {
    let program = decode_program_id(program_id)?;
    let chain_seed = chain_id.to_le_bytes();
    let derived = find_program_address(&[PEER_SEED, &chain_seed], &program)?;
    Ok(derived.to_base58())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peer_address_matches_known_derivation() {
        let address = peer_account_address("NTTuVTKkaskKDKjRo3WmkWBvFbcyhTLCYQA3eosyQ6P", 2)
            .expect("derive");
        assert_eq!(address, "9NDSoJZyxswfKsEtQfsgjNuH8ugnKFCyFrWtxxe3Ze34");
    }

    #[test]
    fn derivation_walks_bumps_down_until_off_curve() {
        let program =
            decode_program_id("NTTManager111111111111111111111111111111111").expect("program");
        let derived = find_program_address(&[PEER_SEED, &1u16.to_le_bytes()], &program)
            .expect("derive");
        assert_eq!(derived.bump, 253);
        assert_eq!(
            derived.to_base58(),
            "JAQXfaFxDy9xZRWNydTBePGqES6JLbQ5EXmMARZLNCh3"
        );
    }

    #[test]
    fn rejects_program_id_of_wrong_length() {
        assert_eq!(
            decode_program_id("1111"),
            Err(PdaError::InvalidProgramId("1111".to_string()))
        );
        assert!(matches!(
            peer_account_address("not-base58!", 2),
            Err(PdaError::InvalidProgramId(_))
        ));
    }

    #[test]
    fn rejects_oversized_seed() {
        let long = [0u8; 33];
        assert_eq!(
            find_program_address(&[&long], &[0u8; 32]),
            Err(PdaError::SeedTooLong)
        );
    }
}
