use alloy::primitives::{keccak256, Bytes};
use alloy::signers::{local::PrivateKeySigner, Signer};
use alloy::sol_types::SolValue;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SigningError {
    #[error("Signing message failed: {0}")]
    SignMessageError(#[from] alloy::signers::Error),

    #[error("At least one signer is required")]
    NoSigners,
}

/// Signs `keccak256(data)` as an EIP-191 personal message and returns the 65 byte
/// `r || s || v` signature.
pub async fn sign_execute_data(
    data: &[u8],
    signer: &PrivateKeySigner,
) -> Result<Bytes, SigningError> {
    let digest = keccak256(data);
    let signature = signer.sign_message(digest.as_slice()).await?;
    Ok(Bytes::copy_from_slice(&signature.as_bytes()))
}

/// `abi.encode(bytes data, bytes signature)`, the input a single-operator gateway expects.
pub async fn get_signed_execute_input(
    data: &Bytes,
    signer: &PrivateKeySigner,
) -> Result<Bytes, SigningError> {
    let signature = sign_execute_data(data, signer).await?;
    Ok((data.clone(), signature).abi_encode_params().into())
}

/// `abi.encode(bytes data, bytes[] signatures)` with the signatures ordered by signer address.
pub async fn get_signed_multisig_execute_input(
    data: &Bytes,
    signers: &[PrivateKeySigner],
) -> Result<Bytes, SigningError> {
    if signers.is_empty() {
        return Err(SigningError::NoSigners);
    }

    let mut sorted: Vec<&PrivateKeySigner> = signers.iter().collect();
    sorted.sort_by_key(|signer| signer.address());

    let mut signatures = Vec::with_capacity(sorted.len());
    for signer in sorted {
        signatures.push(sign_execute_data(data, signer).await?);
    }

    Ok((data.clone(), signatures).abi_encode_params().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::default_accounts;
    use alloy::primitives::{Address, Signature};

    fn signers(n: usize) -> Vec<PrivateKeySigner> {
        default_accounts(n, "signing").iter().map(|account| account.signer().unwrap()).collect()
    }

    fn recover(data: &Bytes, signature: &Bytes) -> Address {
        let signature = Signature::from_raw(signature).unwrap();
        signature.recover_address_from_msg(keccak256(data).as_slice()).unwrap()
    }

    #[tokio::test]
    async fn execute_input_carries_data_and_a_recoverable_signature() {
        let signer = &signers(1)[0];
        let data = Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]);

        let input = get_signed_execute_input(&data, signer).await.unwrap();
        let (decoded_data, signature) = <(Bytes, Bytes)>::abi_decode_params(&input).unwrap();

        assert_eq!(decoded_data, data);
        assert_eq!(signature.len(), 65);
        assert!(signature[64] == 27 || signature[64] == 28);
        assert_eq!(recover(&data, &signature), signer.address());
    }

    #[tokio::test]
    async fn multisig_signatures_are_sorted_by_signer_address() {
        let mut wallets = signers(4);
        wallets.reverse();
        let data = Bytes::from_static(b"approveContractCall");

        let input = get_signed_multisig_execute_input(&data, &wallets).await.unwrap();
        let (decoded_data, signatures) =
            <(Bytes, Vec<Bytes>)>::abi_decode_params(&input).unwrap();

        assert_eq!(decoded_data, data);
        let recovered: Vec<Address> =
            signatures.iter().map(|signature| recover(&data, signature)).collect();

        let mut expected: Vec<Address> = wallets.iter().map(|wallet| wallet.address()).collect();
        expected.sort();
        assert_eq!(recovered, expected);
    }

    #[tokio::test]
    async fn multisig_without_signers_fails() {
        let data = Bytes::from_static(b"nothing");
        assert!(matches!(
            get_signed_multisig_execute_input(&data, &[]).await,
            Err(SigningError::NoSigners)
        ));
    }
}
