//! SSRF-guarded page fetching.
//!
//! Every fetch target is validated before any network I/O: the URL must
//! parse, use an http(s) scheme, and must not resolve to a loopback,
//! link-local, or private-network address. Downloads are bounded by a
//! caller-supplied deadline and byte cap, and [`extract_text`] turns fetched
//! HTML into plain text for the synthesizer.

use crate::types::{AppError, Result};
use async_trait::async_trait;
use futures::StreamExt;
use scraper::{ElementRef, Html, Node};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;
use url::{Host, Url};

const USER_AGENT: &str = "research-agent/1.0";

/// Abstraction over page fetching so the orchestrator can be tested without
/// the network.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Download `url` as text, failing past `timeout` or beyond `max_bytes`.
    async fn fetch(&self, url: &str, timeout: Duration, max_bytes: usize) -> Result<String>;
}

/// Fetcher that rejects unsafe targets before issuing any request.
pub struct SafeFetcher {
    client: reqwest::Client,
    allow_private_targets: bool,
}

impl SafeFetcher {
    /// Build a fetcher with the standard research-agent user agent.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Fetch(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            allow_private_targets: false,
        })
    }

    /// Disable the private-address guard.
    ///
    /// Only intended for test fixtures served from loopback; production
    /// callers must keep the guard on.
    pub fn permit_private_targets(mut self) -> Self {
        self.allow_private_targets = true;
        self
    }

    async fn assert_safe_url(&self, input: &str) -> Result<Url> {
        let url = Url::parse(input).map_err(|_| AppError::BlockedUrl("Invalid URL".to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::BlockedUrl("Blocked URL protocol".to_string()));
        }

        let host = url
            .host()
            .ok_or_else(|| AppError::BlockedUrl("Missing host".to_string()))?;

        if self.allow_private_targets {
            return Ok(url);
        }

        match host {
            Host::Domain(domain) => {
                let name = domain.to_ascii_lowercase();
                if name == "localhost" || name.ends_with(".local") {
                    return Err(AppError::BlockedUrl("Blocked localhost URL".to_string()));
                }
                let port = url.port_or_known_default().unwrap_or(80);
                let addrs = tokio::net::lookup_host((name.as_str(), port))
                    .await
                    .map_err(|e| AppError::Fetch(format!("DNS lookup failed: {}", e)))?;
                for addr in addrs {
                    assert_public_ip(addr.ip())?;
                }
            }
            Host::Ipv4(ip) => assert_public_ip(IpAddr::V4(ip))?,
            Host::Ipv6(ip) => assert_public_ip(IpAddr::V6(ip))?,
        }

        Ok(url)
    }

    async fn fetch_inner(&self, url: Url, max_bytes: usize) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch(format!("status {}", status.as_u16())));
        }

        let mut body: Vec<u8> = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| AppError::Fetch(format!("Body read failed: {}", e)))?;
            if body.len() + chunk.len() > max_bytes {
                return Err(AppError::SizeExceeded);
            }
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[async_trait]
impl PageFetcher for SafeFetcher {
    async fn fetch(&self, url: &str, timeout: Duration, max_bytes: usize) -> Result<String> {
        let target = self.assert_safe_url(url).await?;
        tracing::debug!(url = %target, "fetching page");

        tokio::time::timeout(timeout, self.fetch_inner(target, max_bytes))
            .await
            .map_err(|_| {
                AppError::Timeout(format!("Fetch timed out after {}ms", timeout.as_millis()))
            })?
    }
}

fn assert_public_ip(ip: IpAddr) -> Result<()> {
    let blocked = match ip {
        IpAddr::V4(v4) => is_private_ipv4(v4),
        IpAddr::V6(v6) => is_private_ipv6(v6),
    };
    if blocked {
        return Err(AppError::BlockedUrl("Blocked private IP".to_string()));
    }
    Ok(())
}

fn is_private_ipv4(ip: Ipv4Addr) -> bool {
    let [a, b, _, _] = ip.octets();
    a == 0
        || a == 10
        || a == 127
        || (a == 169 && b == 254)
        || (a == 172 && (16..=31).contains(&b))
        || (a == 192 && b == 168)
}

fn is_private_ipv6(ip: Ipv6Addr) -> bool {
    // IPv4-mapped addresses smuggle v4 targets through a v6 literal.
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_private_ipv4(v4);
    }
    let seg0 = ip.segments()[0];
    ip.is_loopback() || (seg0 & 0xfe00) == 0xfc00 || (seg0 & 0xffc0) == 0xfe80
}

/// Strip fetched HTML down to plain text.
///
/// Script and style subtrees are skipped, block-level elements become line
/// breaks, and whitespace is collapsed. Pure, no network.
pub fn extract_text(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let document = Html::parse_document(html);
    let mut raw = String::with_capacity(html.len() / 4);
    collect_text(&document.root_element(), &mut raw);
    collapse_whitespace(&raw)
}

fn collect_text(element: &ElementRef<'_>, buf: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => buf.push_str(text),
            Node::Element(el) => {
                let tag = el.name();
                if matches!(tag, "script" | "style" | "noscript") {
                    continue;
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(&child_ref, buf);
                }
                if matches!(
                    tag,
                    "p" | "div"
                        | "li"
                        | "br"
                        | "tr"
                        | "h1"
                        | "h2"
                        | "h3"
                        | "h4"
                        | "h5"
                        | "h6"
                ) {
                    buf.push('\n');
                }
            }
            _ => {}
        }
    }
}

fn collapse_whitespace(raw: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in raw.lines() {
        let compact = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if !compact.is_empty() {
            lines.push(compact);
        }
    }
    lines.join("\n")
}
