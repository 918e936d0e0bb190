use url::Url;

/// Deterministic identity of a job posting, used as the dedup key.
///
/// MD5 hex digest of `"{title}-{company}-{apply_url}"` where the apply URL is
/// normalized first. Computed once at extraction time.
pub fn job_fingerprint(title: &str, company: &str, apply_url: &str) -> String {
    let data = format!("{}-{}-{}", title, company, normalize_apply_url(apply_url));
    format!("{:x}", md5::compute(data.as_bytes()))
}

/// Parse the URL (which lowercases scheme and host) and drop the fragment.
/// Unparseable input is only trimmed.
pub fn normalize_apply_url(apply_url: &str) -> String {
    let trimmed = apply_url.trim();
    match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => trimmed.to_string(),
    }
}
