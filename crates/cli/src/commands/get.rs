use localnet_core::http_get;

use crate::error::CliError;

pub async fn handle_get(url: &str) -> Result<(), CliError> {
    let body = http_get(url).await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
