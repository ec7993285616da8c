//! Tenant subdomain extraction.
//!
//! Resolves the tenant label from a request's `Host` header and URL.
//! Rules are evaluated in order and the first one that applies decides;
//! later rules assume the earlier ones did not apply.
//!
//! ```text
//! 1. local development   URL mentions localhost / 127.0.0.1
//!      http://acme.localhost:3000/x      → acme
//!      acme.localhost (host header)      → acme
//!      anything else                     → none
//! 2. preview deployment  host has "---" and a preview-platform suffix
//!      acme---app-abc123.vercel.app      → acme
//! 3. production          host is "<label>.<root>"
//!      acme.example.com                  → acme
//!      example.com / www.example.com     → none
//!      notexample.com                    → none
//! ```
//!
//! Ports are ignored for comparison on both the host and the configured
//! root domain. Host names compare case-insensitively and labels are
//! returned lowercased. A host or label with characters outside
//! `[a-z0-9-.]`, or with an empty dot-separated segment, never resolves.

use regex::Regex;
use std::sync::LazyLock;

/// `http://<label>.localhost`, where the label has no dots.
static LOCAL_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"http://([^.]+)\.localhost").expect("LOCAL_URL is a valid regex pattern")
});

const LOCALHOST: &str = "localhost";
const LOOPBACK: &str = "127.0.0.1";
const PREVIEW_SEPARATOR: &str = "---";

/// Remove a `:port` suffix. Everything after the first colon is dropped.
pub fn strip_port(host: &str) -> &str {
    host.split(':').next().unwrap_or(host)
}

/// The configured root domain, e.g. `example.com` or `localhost:3000`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootDomain {
    raw: String,
    host: String,
}

impl RootDomain {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into().trim().to_ascii_lowercase();
        let host = strip_port(&raw).to_string();
        Self { raw, host }
    }

    /// The root domain as configured (lowercased), port included.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The root domain without its port, used for hostname comparison.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Whether the root domain points at a local development host.
    pub fn is_local(&self) -> bool {
        self.host == LOCALHOST || self.host.ends_with(".localhost") || self.host == LOOPBACK
    }

    /// Scheme used for links to this domain.
    pub fn protocol(&self) -> &'static str {
        if self.is_local() {
            "http"
        } else {
            "https"
        }
    }

    /// Origin of a tenant, e.g. `https://acme.example.com`.
    pub fn tenant_origin(&self, label: &str) -> String {
        format!("{}://{}.{}", self.protocol(), label, self.raw)
    }

    /// Origin of the signed-in application entry point.
    pub fn app_origin(&self) -> String {
        self.tenant_origin("app")
    }
}

/// Stateless resolver holding the root domain and preview suffixes.
#[derive(Debug, Clone)]
pub struct SubdomainResolver {
    root: RootDomain,
    preview_suffixes: Vec<String>,
}

impl SubdomainResolver {
    pub fn new<S: AsRef<str>>(root: RootDomain, preview_suffixes: &[S]) -> Self {
        Self {
            root,
            preview_suffixes: preview_suffixes
                .iter()
                .map(|s| s.as_ref().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn root_domain(&self) -> &RootDomain {
        &self.root
    }

    /// Resolve the tenant label for a request.
    ///
    /// Returns `None` for the root domain, its `www.` alias, unrelated hosts
    /// and empty or malformed host values.
    pub fn extract(&self, host: &str, url: &str) -> Option<String> {
        let hostname = strip_port(host.trim()).to_ascii_lowercase();
        if !is_valid_hostname(&hostname) {
            return None;
        }
        let url = url.to_ascii_lowercase();

        if url.contains(LOCALHOST) || url.contains(LOOPBACK) {
            return local_label(&url, &hostname);
        }

        if hostname.contains(PREVIEW_SEPARATOR)
            && self.preview_suffixes.iter().any(|s| hostname.ends_with(s.as_str()))
        {
            return hostname
                .split(PREVIEW_SEPARATOR)
                .next()
                .and_then(tenant_label);
        }

        let root = self.root.host();
        if hostname == root || hostname == format!("www.{}", root) {
            return None;
        }
        hostname
            .strip_suffix(&format!(".{}", root))
            .and_then(tenant_label)
    }
}

fn local_label(url: &str, hostname: &str) -> Option<String> {
    if let Some(captures) = LOCAL_URL.captures(url) {
        return tenant_label(&captures[1]);
    }
    if hostname.contains(".localhost") {
        return hostname.split('.').next().and_then(tenant_label);
    }
    None
}

/// Dot-separated segments of `[a-z0-9-]`, none empty.
fn is_valid_hostname(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        })
}

fn tenant_label(label: &str) -> Option<String> {
    is_valid_hostname(label).then(|| label.to_string())
}
