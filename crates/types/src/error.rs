#[derive(Debug, thiserror::Error)]
pub enum SigError {
    #[error("invalid signature bytes")]
    InvalidBlsSignatureBytes,

    #[error("invalid pubkey bytes")]
    InvalidBlsPubkeyBytes,

    #[error("invalid signature")]
    InvalidBlsSignature,
}

pub type CryptoError = lh_bls::Error;
