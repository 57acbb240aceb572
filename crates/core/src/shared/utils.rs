use alloy::primitives::{keccak256, B256, U256};
use alloy::rpc::types::Log;
use rand::Rng;
use reqwest::{header::CONTENT_TYPE, StatusCode};
use thiserror::Error;

/// Upper bound (exclusive) of the integer hashed by [`random_id`].
const RANDOM_ID_MAX: u64 = 10_000_000_000;

/// Returns the keccak256 of a random decimal integer in `[0, 10^10)`.
///
/// Used wherever a unique 32 byte id is needed and determinism is not, such as one-off command
/// ids in tests.
pub fn random_id() -> B256 {
    let value = rand::thread_rng().gen_range(0..RANDOM_ID_MAX);
    keccak256(value.to_string())
}

/// Deterministic id of a log on a given chain: `keccak256("chain:block:txIndex:logIndex")`.
pub fn log_id(chain: &str, block_number: u64, transaction_index: u64, log_index: u64) -> B256 {
    keccak256(format!("{}:{}:{}:{}", chain, block_number, transaction_index, log_index))
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LogIdError {
    #[error("Log is missing its {0}, it has probably not been mined yet")]
    MissingField(&'static str),
}

/// [`log_id`] for an rpc log; pending logs have no position and are rejected.
pub fn log_id_for(chain: &str, log: &Log) -> Result<B256, LogIdError> {
    let block_number = log.block_number.ok_or(LogIdError::MissingField("block number"))?;
    let transaction_index =
        log.transaction_index.ok_or(LogIdError::MissingField("transaction index"))?;
    let log_index = log.log_index.ok_or(LogIdError::MissingField("log index"))?;

    Ok(log_id(chain, block_number, transaction_index, log_index))
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConversionError {
    #[error("{0} does not fit in a u64")]
    Overflow(U256),
}

pub fn big_number_to_number(value: U256) -> Result<u64, ConversionError> {
    if value > U256::from(u64::MAX) {
        return Err(ConversionError::Overflow(value));
    }
    Ok(value.to::<u64>())
}

pub fn format_wei_to_eth(wei: &U256) -> String {
    let eth_divisor = U256::from(10u64.pow(18));
    let whole_eth = wei / eth_divisor;
    let remainder = wei % eth_divisor;

    if remainder.is_zero() {
        format!("{}", whole_eth)
    } else {
        let decimal_str = format!("{:018}", remainder);
        let decimal_trimmed = decimal_str.trim_end_matches('0');
        format!("{}.{}", whole_eth, decimal_trimmed)
    }
}

#[derive(Error, Debug)]
pub enum HttpGetError {
    #[error("Request Failed.\nStatus Code: {status}")]
    RequestFailed { status: u16 },

    #[error("Invalid content-type.\nExpected application/json but received {content_type}")]
    InvalidContentType { content_type: String },

    #[error("Response body is not valid json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Request could not be sent: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Fetches `url` and parses the body as JSON.
///
/// Only a `200` with an `application/json` content type is accepted; anything else is rejected
/// before the body is parsed. Redirects are not followed, a `3xx` is a
/// [`HttpGetError::RequestFailed`] like any other status. A response without a content type is
/// reported as `undefined`.
pub async fn http_get(url: &str) -> Result<serde_json::Value, HttpGetError> {
    let client = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none()).build()?;
    let response = client.get(url).send().await?;

    let status = response.status();
    if status != StatusCode::OK {
        // drain so the connection can be reused
        let _ = response.bytes().await;
        return Err(HttpGetError::RequestFailed { status: status.as_u16() });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .map(|value| value.to_str().unwrap_or_default().to_string())
        .unwrap_or_else(|| "undefined".to_string());
    if !content_type.starts_with("application/json") {
        let _ = response.bytes().await;
        return Err(HttpGetError::InvalidContentType { content_type });
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_id_hashes_the_colon_joined_position() {
        assert_eq!(log_id("Avalanche", 12, 0, 3), keccak256("Avalanche:12:0:3"));
        assert_ne!(log_id("Avalanche", 12, 0, 3), log_id("Fantom", 12, 0, 3));
    }

    #[test]
    fn log_id_for_rejects_pending_logs() {
        let log = Log::default();
        assert_eq!(log_id_for("Ethereum", &log), Err(LogIdError::MissingField("block number")));

        let mined = Log {
            block_number: Some(7),
            transaction_index: Some(1),
            log_index: Some(2),
            ..Default::default()
        };
        assert_eq!(log_id_for("Ethereum", &mined).unwrap(), log_id("Ethereum", 7, 1, 2));
    }

    #[test]
    fn random_ids_are_hashes_of_small_integers() {
        let first = random_id();
        let second = random_id();
        assert_ne!(first, B256::ZERO);
        // collisions are possible but one in ten billion
        assert_ne!(first, second);
    }

    #[test]
    fn big_number_to_number_checks_bounds() {
        assert_eq!(big_number_to_number(U256::from(2500u64)), Ok(2500));
        assert_eq!(big_number_to_number(U256::from(u64::MAX)), Ok(u64::MAX));

        let too_big = U256::from(u64::MAX) + U256::from(1u64);
        assert_eq!(big_number_to_number(too_big), Err(ConversionError::Overflow(too_big)));
    }

    #[test]
    fn formats_wei() {
        assert_eq!(format_wei_to_eth(&U256::from(100_000_000_000_000_000_000u128)), "100");
        assert_eq!(format_wei_to_eth(&U256::from(1_500_000_000_000_000_000u128)), "1.5");
    }
}
