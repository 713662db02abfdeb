//! Stateful client for the origin's WebForms menu page.
//!
//! Every postback must echo the view state and event validation tokens the
//! server issued on the previous response, and the session cookie has to be
//! replayed. A fresh client establishes that state lazily on its first query
//! (load page, renew session, load page again) and then posts one form per
//! query, refreshing the tokens from each response.

use std::{fmt, time::Duration};

use reqwest::{
    header::{ORIGIN, REFERER},
    Client, Response,
};
use tracing::{instrument, Level};
use url::Url;

use super::{make_client, make_rate_limiter, throttle, DebugDump, RateLimiter, DEFAULT_TIMEOUT};
use crate::{
    error::{Error, Phase, Result},
    menu::MenuQuery,
    parse::{
        extract_event_validation, extract_menu_items, extract_view_state,
        extract_view_state_generator,
    },
};

const MENU_PAGE: &str = "Menu.aspx";
const RENEW_PAGE: &str = "RenewSession.aspx";

/// Control that raises the "day changed" postback on the menu form.
const EVENT_TARGET: &str = "GetMenulstDay";
const LOCATION_FIELD: &str = "ctl00$MainContent$lstLocations";
const DAY_FIELD: &str = "ctl00$MainContent$lstDay";
const MEAL_TYPE_FIELD: &str = "ctl00$MainContent$lstMealType";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    /// Tokens loaded from the menu page, handshake not finished.
    Initialized,
    Active,
    /// A request failed; the next query redoes the handshake.
    Stale,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tokens {
    pub view_state: String,
    pub event_validation: String,
    pub view_state_generator: String,
}

/// Not safe to share between concurrent callers; wrap it in a mutex.
pub struct DiningHallClient {
    client: Client,
    base_url: Url,
    tokens: Tokens,
    state: SessionState,
    rate_limiter: RateLimiter,
    debug: Option<DebugDump>,
}

impl fmt::Debug for DiningHallClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiningHallClient")
            .field("base_url", &self.base_url.as_str())
            .field("state", &self.state)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl DiningHallClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: make_client(DEFAULT_TIMEOUT).map_err(Error::Client)?,
            base_url: Url::parse(base_url)?,
            tokens: Tokens::default(),
            state: SessionState::Uninitialized,
            rate_limiter: make_rate_limiter(),
            debug: None,
        })
    }

    /// Rebuilds the HTTP client, so call it before the first query; cookies
    /// from an earlier session are dropped.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = make_client(timeout).map_err(Error::Client)?;
        self.state = SessionState::Uninitialized;
        Ok(self)
    }

    #[must_use]
    pub fn with_debug_dump(mut self, dump: DebugDump) -> Self {
        self.debug = Some(dump);
        self
    }

    fn endpoint(&self, page: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{page}"))?)
    }

    fn needs_handshake(&self) -> bool {
        self.state != SessionState::Active || self.tokens.view_state.is_empty()
    }

    fn mark_failed(&mut self) {
        if self.state != SessionState::Uninitialized {
            self.state = SessionState::Stale;
        }
    }

    /// An empty list means the origin has no menu for that day and meal.
    #[instrument(skip(self, query), fields(
        location = %query.location(),
        date = %query.date(),
        meal_type = %query.meal_type(),
    ), level = Level::TRACE)]
    pub async fn fetch_menu(&mut self, query: &MenuQuery) -> Result<Vec<String>> {
        if self.needs_handshake() {
            if let Err(e) = self.establish_session().await {
                self.mark_failed();
                return Err(e);
            }
        }
        let res = self.post_menu(query).await;
        if res.is_err() {
            self.mark_failed();
        }
        res
    }

    async fn establish_session(&mut self) -> Result<()> {
        log::debug!("Establishing session with {}", self.base_url);
        self.initialize(Phase::Initializing).await?;
        self.renew().await?;
        // renewing invalidates the tokens from the first load
        self.initialize(Phase::Reinitializing).await?;
        self.state = SessionState::Active;
        Ok(())
    }

    async fn send_get(&self, page: &str, phase: Phase) -> Result<Response> {
        let url = self.endpoint(page)?;
        throttle(&self.rate_limiter).await;
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::request(phase, e))
    }

    async fn initialize(&mut self, phase: Phase) -> Result<()> {
        let response = self.send_get(MENU_PAGE, phase).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status { phase, status });
        }
        let body = response.text().await.map_err(|e| Error::request(phase, e))?;
        if let Some(dump) = &self.debug {
            dump.initial_page(&body).await;
        }

        self.tokens = Tokens {
            view_state: extract_view_state(&body).to_owned(),
            event_validation: extract_event_validation(&body).to_owned(),
            view_state_generator: extract_view_state_generator(&body).to_owned(),
        };
        log::trace!(
            "Extracted view state ({} bytes), event validation ({} bytes), generator {:?}",
            self.tokens.view_state.len(),
            self.tokens.event_validation.len(),
            self.tokens.view_state_generator,
        );
        if self.tokens.view_state.is_empty() {
            log::debug!("Menu page had no view state");
        }
        self.state = SessionState::Initialized;
        Ok(())
    }

    /// Only a failed round trip is fatal here; the status is ignored.
    async fn renew(&self) -> Result<()> {
        let response = self.send_get(RENEW_PAGE, Phase::Renewing).await?;
        log::debug!("Session renewed (status {})", response.status());
        Ok(())
    }

    async fn post_menu(&mut self, query: &MenuQuery) -> Result<Vec<String>> {
        const PHASE: Phase = Phase::Fetching;
        let url = self.endpoint(MENU_PAGE)?;
        let form = [
            ("__EVENTTARGET", EVENT_TARGET),
            ("__EVENTARGUMENT", ""),
            ("__VIEWSTATE", self.tokens.view_state.as_str()),
            ("__VIEWSTATEGENERATOR", self.tokens.view_state_generator.as_str()),
            ("__EVENTVALIDATION", self.tokens.event_validation.as_str()),
            (LOCATION_FIELD, query.location().code()),
            (DAY_FIELD, query.date()),
            (MEAL_TYPE_FIELD, query.meal_type().as_str()),
        ];

        throttle(&self.rate_limiter).await;
        let response = self
            .client
            .post(url)
            .header(ORIGIN, self.base_url.origin().ascii_serialization())
            .header(REFERER, self.base_url.as_str())
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::request(PHASE, e))?;

        let status = response.status();
        if !status.is_success() {
            log::debug!("Menu postback rejected with {status}");
            return Err(Error::Status {
                phase: PHASE,
                status,
            });
        }
        let body = response.text().await.map_err(|e| Error::request(PHASE, e))?;

        // the generator is only issued with the full page load
        self.tokens.view_state = extract_view_state(&body).to_owned();
        self.tokens.event_validation = extract_event_validation(&body).to_owned();

        if let Some(dump) = &self.debug {
            dump.response(query.location().name(), query.date(), &body).await;
        }
        let items = extract_menu_items(&body, self.debug.is_some());
        log::debug!(
            "{} {} on {}: {} items",
            query.location(),
            query.meal_type(),
            query.date(),
            items.len()
        );
        Ok(items)
    }
}
