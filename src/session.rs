// src/session.rs
//
// Logging in and fetching the raw report. The `SessionClient` trait is the
// seam the runner is written against; `HttpClient` talks to the real site.

use std::fmt;

use reqwest::blocking::Client;

use crate::config::consts::{FORM_ID_FIELD, FORM_PASSWORD_FIELD, LOGIN_OK_MARKERS};
use crate::config::options::{NetOptions, Source};
use crate::core::html::{self, Markup};
use crate::core::net::{self, Page};
use crate::error::{Error, Result};
use crate::specs::plots::SERIES;

/// Team login. Both parts are opaque to us; the site decides if they're valid.
#[derive(Clone)]
pub struct Credentials {
    team_id: String,
    password: String,
}

impl Credentials {
    pub fn new(team_id: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let team_id = team_id.into();
        let password = password.into();
        if team_id.trim().is_empty() {
            return Err(Error::Auth(s!("team id is empty")));
        }
        if password.is_empty() {
            return Err(Error::Auth(s!("password is empty")));
        }
        Ok(Self { team_id, password })
    }

    pub fn team_id(&self) -> &str {
        &self.team_id
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("team_id", &self.team_id)
            .field("password", &"***")
            .finish()
    }
}

/// One plot page, tagged with the series label it was requested for.
#[derive(Clone, Debug)]
pub struct PlotPage {
    pub label: String,
    pub html: String,
}

/// Markup fetched for one run. Consumed by `specs::extract`.
#[derive(Clone, Debug)]
pub enum RawPage {
    Table(String),
    Plots(Vec<PlotPage>),
}

pub trait SessionClient {
    type Session;

    /// Log in; `Error::Auth` when the site turns the credentials down.
    fn authenticate(&self, creds: &Credentials) -> Result<Self::Session>;

    /// Fetch the report for the active run. `Error::AuthExpired` means
    /// "log in again and retry".
    fn fetch_report(&self, session: &Self::Session) -> Result<RawPage>;
}

/// Cookie state for one login. Dropped at the end of the run.
pub struct HttpSession {
    client: Client,
    team_id: String,
}

impl HttpSession {
    pub fn team_id(&self) -> &str {
        &self.team_id
    }
}

pub struct HttpClient {
    net: NetOptions,
    source: Source,
}

impl HttpClient {
    pub fn new(net: NetOptions, source: Source) -> Self {
        Self { net, source }
    }

    fn get_report_page(&self, session: &HttpSession, url: &str) -> Result<Page> {
        let page = net::http_get(&session.client, url)?;
        if matches!(page.status, 401 | 403) {
            return Err(Error::AuthExpired(format!(
                "HTTP {} from {} for team {}",
                page.status,
                page.url,
                session.team_id()
            )));
        }
        if !page.is_success() {
            return Err(Error::Network(format!("HTTP {} from {}", page.status, page.url)));
        }
        if is_login_page(&page.body) {
            return Err(Error::AuthExpired(format!(
                "{url} redirected to the login form for team {}",
                session.team_id()
            )));
        }
        Ok(page)
    }
}

impl SessionClient for HttpClient {
    type Session = HttpSession;

    fn authenticate(&self, creds: &Credentials) -> Result<HttpSession> {
        let client = net::client(self.net.timeout)?;

        let entry = net::http_get(&client, &self.net.login_url)?;
        if !entry.is_success() {
            return Err(Error::Network(format!("HTTP {} from {}", entry.status, entry.url)));
        }

        let (action, fields) = login_form(&entry, creds)?;
        let resp = net::http_post_form(&client, &action, &fields)?;

        if matches!(resp.status, 401 | 403) {
            return Err(Error::Auth(format!("HTTP {} for team {}", resp.status, creds.team_id())));
        }
        if !resp.is_success() {
            return Err(Error::Network(format!("HTTP {} from {}", resp.status, resp.url)));
        }
        if is_login_page(&resp.body) {
            return Err(Error::Auth(format!("site showed the login form again for team {}", creds.team_id())));
        }
        if !is_logged_in_page(&resp.body) {
            logd!("Login response from {} has no app markup:\n{}", resp.url, html::strip_tags(&resp.body));
            return Err(Error::Auth(format!("no logged-in page after login for team {}", creds.team_id())));
        }

        logf!("Logged in as team {}", creds.team_id());
        Ok(HttpSession { client, team_id: creds.team_id().to_string() })
    }

    fn fetch_report(&self, session: &HttpSession) -> Result<RawPage> {
        match &self.source {
            Source::Table { url } => {
                let page = self.get_report_page(session, url)?;
                Ok(RawPage::Table(page.body))
            }
            Source::Plots => {
                let mut pages = Vec::with_capacity(SERIES.len());
                for (label, _) in SERIES {
                    let page = self.get_report_page(session, &self.net.plot_url(label))?;
                    pages.push(PlotPage { label: s!(*label), html: page.body });
                }
                logd!("Fetched {} plot pages", pages.len());
                Ok(RawPage::Plots(pages))
            }
        }
    }
}

/// A page that still asks for a password is the login form, whatever URL it came from.
pub fn is_login_page(body: &str) -> bool {
    Markup::new(body)
        .open_tags("input")
        .iter()
        .any(|tag| html::attr(tag, "type").is_some_and(|t| t.eq_ignore_ascii_case("password")))
}

/// The page served right after a good login: the app shell, not an error note.
pub fn is_logged_in_page(body: &str) -> bool {
    let doc = Markup::new(body);
    LOGIN_OK_MARKERS.iter().any(|m| doc.contains_ci(m))
}

/// Fill the first form on the entry page: its hidden inputs, the first named
/// submit control, then our id/password. Returns the resolved action URL.
pub fn login_form(entry: &Page, creds: &Credentials) -> Result<(String, Vec<(String, String)>)> {
    let doc = Markup::new(&entry.body);
    let form = doc
        .blocks("form")
        .into_iter()
        .next()
        .ok_or_else(|| Error::Parse(format!("no login form on {}", entry.url)))?;

    let action = html::attr(html::opener(form), "action").unwrap_or("");
    let action = net::resolve(&entry.url, action)?;

    let mut fields: Vec<(String, String)> = Vec::new();
    let mut took_submit = false;
    for input in Markup::new(form).open_tags("input") {
        let Some(name) = html::attr(input, "name") else { continue };
        let kind = html::attr(input, "type").unwrap_or("text").to_ascii_lowercase();
        let value = html::attr(input, "value").unwrap_or("");
        let carry = match kind.as_str() {
            "hidden" => true,
            "submit" | "image" if !took_submit => {
                took_submit = true;
                true
            }
            _ => false,
        };
        if carry && name != FORM_ID_FIELD && name != FORM_PASSWORD_FIELD {
            fields.push((s!(name), s!(value)));
        }
    }
    fields.push((s!(FORM_ID_FIELD), s!(creds.team_id())));
    fields.push((s!(FORM_PASSWORD_FIELD), s!(creds.password())));

    Ok((action, fields))
}
