//! In-process stand-in for the menu site, for tests.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use axum::{
    extract::{Form, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;

pub const SESSION_COOKIE: &str = "ASP.NET_SessionId=abc123";

#[derive(Default)]
pub struct Origin {
    pub page_loads: AtomicUsize,
    pub renewals: AtomicUsize,
    pub postbacks: AtomicUsize,
    pub fail_page_loads: AtomicBool,
    /// 1-based number of a single page load to answer with a 500.
    pub fail_page_load: AtomicUsize,
    pub fail_renewals: AtomicBool,
    /// Renewals hang up without a response.
    pub drop_renewals: AtomicBool,
    pub fail_postbacks: AtomicBool,
    last_form: Mutex<HashMap<String, String>>,
    last_headers: Mutex<HeaderMap>,
}

impl Origin {
    /// (page loads, renewals, postbacks)
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.page_loads.load(Ordering::SeqCst),
            self.renewals.load(Ordering::SeqCst),
            self.postbacks.load(Ordering::SeqCst),
        )
    }

    pub fn form_value(&self, field: &str) -> String {
        self.last_form.lock().unwrap().get(field).cloned().unwrap_or_default()
    }

    pub fn header(&self, name: HeaderName) -> String {
        self.last_headers
            .lock()
            .unwrap()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned()
    }

    pub fn set(flag: &AtomicBool, value: bool) {
        flag.store(value, Ordering::SeqCst);
    }
}

async fn menu_page(State(origin): State<Arc<Origin>>) -> Response {
    let n = origin.page_loads.fetch_add(1, Ordering::SeqCst) + 1;
    if origin.fail_page_loads.load(Ordering::SeqCst)
        || origin.fail_page_load.load(Ordering::SeqCst) == n
    {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let html = format!(
        r#"<html><body><form method="post" action="./Menu.aspx">
        <input type="hidden" name="__VIEWSTATE" id="__VIEWSTATE" value="vs_get{n}" />
        <input type="hidden" name="__VIEWSTATEGENERATOR" id="__VIEWSTATEGENERATOR" value="gen_get{n}" />
        <input type="hidden" name="__EVENTVALIDATION" id="__EVENTVALIDATION" value="ev_get{n}" />
        </form></body></html>"#
    );
    (
        [(header::SET_COOKIE, format!("{SESSION_COOKIE}; Path=/"))],
        Html(html),
    )
        .into_response()
}

async fn renew_session(State(origin): State<Arc<Origin>>) -> StatusCode {
    origin.renewals.fetch_add(1, Ordering::SeqCst);
    // a panicking handler makes hyper close the connection
    assert!(!origin.drop_renewals.load(Ordering::SeqCst), "renewal dropped");
    if origin.fail_renewals.load(Ordering::SeqCst) {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

/// Answers with fresh tokens and two items. Brunch has no menu.
async fn postback(
    State(origin): State<Arc<Origin>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let n = origin.postbacks.fetch_add(1, Ordering::SeqCst) + 1;
    let no_menu = form.get("ctl00$MainContent$lstMealType").map(String::as_str) == Some("Brunch");
    *origin.last_form.lock().unwrap() = form;
    *origin.last_headers.lock().unwrap() = headers;
    if origin.fail_postbacks.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let rows = if no_menu {
        r#"<tr><td>No menu available for this date.</td></tr>"#
    } else {
        r#"<tr><td class="MenuItem">Scrambled Eggs</td></tr>
        <tr><td class="MenuItem">Bacon</td></tr>"#
    };
    Html(format!(
        r#"<html><body><form>
        <input type="hidden" name="__VIEWSTATE" value="vs_post{n}" />
        <input type="hidden" name="__EVENTVALIDATION" value="ev_post{n}" />
        <table>{rows}</table>
        </form></body></html>"#
    ))
    .into_response()
}

/// Serves the origin on a random local port and returns its base URL.
pub async fn spawn_origin(origin: Arc<Origin>) -> String {
    let app = Router::new()
        .route("/dininghallmenu/Menu.aspx", get(menu_page).post(postback))
        .route("/dininghallmenu/RenewSession.aspx", get(renew_session))
        .with_state(origin);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}/dininghallmenu/")
}
