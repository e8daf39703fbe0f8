// src/core/net.rs
//
// Thin layer over a blocking reqwest client: cookie jar on, redirects
// followed, hard timeout on every request.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;

use crate::config::consts::USER_AGENT;
use crate::error::Result;

/// A finished response, body already read.
#[derive(Debug, Clone)]
pub struct Page {
    pub status: u16,
    /// URL after redirects
    pub url: String,
    pub body: String,
}

impl Page {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fresh client with its own cookie store; one per login.
pub fn client(timeout: Duration) -> Result<Client> {
    let c = Client::builder()
        .user_agent(USER_AGENT)
        .cookie_store(true)
        .redirect(Policy::limited(10))
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()?;
    Ok(c)
}

pub fn http_get(client: &Client, url: &str) -> Result<Page> {
    logd!("GET {url}");
    let resp = client.get(url).send()?;
    read(resp)
}

/// POST `application/x-www-form-urlencoded`.
pub fn http_post_form(client: &Client, url: &str, form: &[(String, String)]) -> Result<Page> {
    logd!("POST {url} ({} fields)", form.len());
    let resp = client.post(url).form(form).send()?;
    read(resp)
}

fn read(resp: reqwest::blocking::Response) -> Result<Page> {
    let status = resp.status().as_u16();
    let url = resp.url().to_string();
    let body = resp.text()?;
    logd!("{status} {url} ({} bytes)", body.len());
    Ok(Page { status, url, body })
}

/// Resolve a form `action` against the page it came from.
pub fn resolve(base: &str, href: &str) -> Result<String> {
    let base = reqwest::Url::parse(base)
        .map_err(|e| crate::Error::Network(format!("bad URL {base}: {e}")))?;
    let joined = base
        .join(href)
        .map_err(|e| crate::Error::Network(format!("bad link {href} on {base}: {e}")))?;
    Ok(joined.to_string())
}
