//! Log endpoint URL derived from the page location.

/// Build the socket URL for `path` on the page's own host. Pages served over
/// https get `wss:`, everything else `ws:`.
pub fn endpoint_url(page_protocol: &str, host: &str, path: &str) -> String {
    let ws_protocol = if page_protocol == "https:" { "wss:" } else { "ws:" };
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    format!("{}//{}{}", ws_protocol, host, path)
}

/// Socket URL for the current page.
#[cfg(target_arch = "wasm32")]
pub fn page_endpoint(path: &str) -> String {
    if let Some(window) = web_sys::window() {
        let location = window.location();
        if let (Ok(protocol), Ok(host)) = (location.protocol(), location.host())
            && !host.is_empty()
        {
            return endpoint_url(&protocol, &host, path);
        }
    }
    endpoint_url("http:", "localhost", path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_follows_page() {
        assert_eq!(
            endpoint_url("http:", "127.0.0.1:5000", "/ws/logs"),
            "ws://127.0.0.1:5000/ws/logs"
        );
        assert_eq!(
            endpoint_url("https:", "console.example.org", "/ws/logs"),
            "wss://console.example.org/ws/logs"
        );
        assert_eq!(
            endpoint_url("file:", "localhost", "ws/logs"),
            "ws://localhost/ws/logs"
        );
    }
}
