use tracing::{debug, warn};

use crate::domains::scraping::{ExtractionError, ExtractionResult};

/// Some boards serve an empty shell to unknown agents.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// GET `url` and return the body. Non-2xx statuses are errors.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> ExtractionResult<String> {
    debug!(url = %url, "HTTP fetch starting");

    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await
        .map_err(|e| {
            warn!(url = %url, error = %e, "HTTP request failed");
            ExtractionError::from_reqwest(url, e)
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExtractionError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response
        .text()
        .await
        .map_err(|e| ExtractionError::from_reqwest(url, e))
}
