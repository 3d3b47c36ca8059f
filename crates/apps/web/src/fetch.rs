use entities::{Collection, EntityError, LinkRecord};
use gloo_net::http::Request;

#[derive(Debug, thiserror::Error)]
pub(crate) enum LoadError {
    #[error("request failed: {0}")]
    Request(#[from] gloo_net::Error),
    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error(transparent)]
    Parse(#[from] EntityError),
}

async fn fetch_text(url: &str) -> Result<String, LoadError> {
    let resp = Request::get(url).send().await?;
    if !resp.ok() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status: resp.status(),
        });
    }
    Ok(resp.text().await?)
}

pub(crate) async fn fetch_collection(url: &str) -> Result<Collection, LoadError> {
    let raw = fetch_text(url).await?;
    Ok(Collection::from_json(&raw)?)
}

pub(crate) async fn fetch_links(url: &str) -> Result<LinkRecord, LoadError> {
    let raw = fetch_text(url).await?;
    Ok(LinkRecord::from_json(&raw)?)
}
