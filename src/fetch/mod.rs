mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::Result;

/// Fetches a resource over HTTP and returns its body.
///
/// # Errors
///
/// Returns an error on transport failure or a non-success status code.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        anyhow::bail!("'{url}' returned status {status}");
    }
    Ok(resp.bytes().await?.to_vec())
}
