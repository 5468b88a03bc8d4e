// 📍 Map Link Generator

/// Map provider endpoint
pub const MAPS_BASE_URL: &str = "https://www.google.com/maps";

/// Embeddable map URL for an address. The address goes into the query
/// verbatim; no validation, normalization or escaping.
pub fn map_link(address: &str) -> String {
    format!("{}?q={}&output=embed", MAPS_BASE_URL, address)
}

/// Same link with the address percent-encoded, for transports (iframe src
/// attributes, JSON consumers) that need a strictly valid URL.
pub fn embed_url(address: &str) -> String {
    map_link(&urlencoding::encode(address))
}
