//! SRRC calendar scraper: produces the records published as `srrc_events.json`.
//!
//! The calendar's "Load More" button posts to WordPress' `admin-ajax.php`
//! with `action=mec_list_load_more` and gets back a JSON envelope carrying an
//! HTML fragment of `mec-event-article` entries. The scraper walks a window
//! of monthly start dates, pages through each with an offset, and turns the
//! HTML (plus the JSON-LD emitted alongside it) into [`Event`]s.

use chrono::{Datelike, NaiveDate};
use html_escape::decode_html_entities;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::time::Duration;

use crate::error::ScrapeError;
use crate::events::{value_text, Event};

/// WordPress AJAX endpoint of srrc.ch.
pub const AJAX_URL: &str = "https://srrc.ch/wp-admin/admin-ajax.php";
/// Monthly start dates scanned, beginning with the current month.
pub const MONTHS_AHEAD: i64 = 24;
/// Highest load-more offset requested for one start date.
pub const MAX_OFFSET: u32 = 20;

const LOAD_MORE_ACTION: &str = "mec_list_load_more";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// One load-more response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadMorePage {
    pub html: String,
    pub has_more_event: i64,
    pub count: i64,
}

fn as_count(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n.as_i64().unwrap_or_else(|| n.as_f64().unwrap_or(0.0) as i64),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

impl LoadMorePage {
    /// Reads the envelope. A non-object or empty object means "nothing here".
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object().filter(|o| !o.is_empty())?;
        Some(LoadMorePage {
            html: object.get("html").map(value_text).unwrap_or_default(),
            has_more_event: as_count(object.get("has_more_event")),
            count: as_count(object.get("count")),
        })
    }
}

/// Offset to request after `page` was served for `offset`, if any.
///
/// Paging stops when the calendar reports no further events or an empty
/// page, and never goes past [`MAX_OFFSET`].
pub fn next_offset(page: &LoadMorePage, offset: u32) -> Option<u32> {
    if page.has_more_event == 0 || page.count == 0 {
        return None;
    }
    let next = offset + 1;
    if next > MAX_OFFSET {
        log::warn!("reached max offset {MAX_OFFSET}, stopping this range");
        return None;
    }
    Some(next)
}

/// First-of-month start dates covering the scan window.
///
/// Months are stepped in 30-day increments from the first of `today`'s month.
pub fn date_ranges(today: NaiveDate) -> Vec<String> {
    let first = today - chrono::Duration::days(i64::from(today.day0()));
    (0..MONTHS_AHEAD)
        .map(|i| {
            (first + chrono::Duration::days(30 * i))
                .format("%Y-%m-01")
                .to_string()
        })
        .collect()
}

/// `YYYY-MM-DD` -> `YYYYMM`, as the calendar expects in `current_month_divider`.
pub fn month_divider(start_date: &str) -> String {
    start_date.chars().take(7).filter(|c| *c != '-').collect()
}

struct Selectors {
    entry: Selector,
    date: Selector,
    day: Selector,
    month: Selector,
    weekday: Selector,
    title: Selector,
    link: Selector,
    location: Selector,
}

fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Selector(format!("{css}: {e}")))
}

impl Selectors {
    fn new() -> Result<Self, ScrapeError> {
        Ok(Selectors {
            entry: selector(r#"script[type="application/ld+json"], article.mec-event-article"#)?,
            date: selector("div.mec-event-date")?,
            day: selector("div.event-d")?,
            month: selector("div.event-f")?,
            weekday: selector("div.event-da")?,
            title: selector("h4.mec-event-title")?,
            link: selector("a")?,
            location: selector("div.mec-event-loc-place")?,
        })
    }
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> String {
    scope.select(selector).next().map(text_of).unwrap_or_default()
}

fn apply_structured_data(event: &mut Event, raw: &str) {
    let Ok(Value::Object(data)) = serde_json::from_str::<Value>(raw) else {
        return;
    };
    let field = |key: &str| data.get(key).map(value_text).unwrap_or_default();
    event.start_date = field("startDate");
    event.end_date = field("endDate");
    event.description = field("description");
    if let Some(Value::Object(organizer)) = data.get("organizer") {
        event.organizer = organizer.get("name").map(value_text).unwrap_or_default();
    }
}

fn parse_article(article: ElementRef<'_>, structured: Option<&str>, sel: &Selectors) -> Event {
    let mut event = Event::default();

    if let Some(date) = article.select(&sel.date).next() {
        event.date_display = first_text(date, &sel.day);
        event.month = first_text(date, &sel.month);
        event.weekday = first_text(date, &sel.weekday);
    }

    if let Some(link) = article
        .select(&sel.title)
        .next()
        .and_then(|title| title.select(&sel.link).next())
    {
        event.title = decode_html_entities(&text_of(link)).into_owned();
        event.url = link.value().attr("href").unwrap_or_default().to_string();
        event.event_id = link.value().attr("data-event-id").unwrap_or_default().to_string();
    }

    event.location = first_text(article, &sel.location);

    if let Some(raw) = structured {
        apply_structured_data(&mut event, raw);
    }
    event
}

/// Extracts events from a load-more HTML fragment.
///
/// Each article takes its dates, description and organizer from the nearest
/// JSON-LD script preceding it in the fragment.
pub fn parse_events_html(html: &str) -> Result<Vec<Event>, ScrapeError> {
    let sel = Selectors::new()?;
    let fragment = Html::parse_fragment(html);

    let mut structured: Option<String> = None;
    let mut events = Vec::new();
    for element in fragment.select(&sel.entry) {
        if element.value().name() == "script" {
            structured = Some(element.text().collect());
        } else {
            events.push(parse_article(element, structured.as_deref(), &sel));
        }
    }
    Ok(events)
}

/// Client for the calendar's load-more endpoint.
pub struct CalendarScraper {
    client: reqwest::Client,
    ajax_url: String,
}

impl CalendarScraper {
    pub fn new(ajax_url: impl Into<String>) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(CalendarScraper {
            client,
            ajax_url: ajax_url.into(),
        })
    }

    /// One page of events starting at `start_date` (`YYYY-MM-DD`).
    pub async fn fetch_page(&self, start_date: &str, offset: u32) -> Result<Option<LoadMorePage>, ScrapeError> {
        let form = [
            ("action", LOAD_MORE_ACTION.to_string()),
            ("mec_start_date", start_date.to_string()),
            ("mec_offset", offset.to_string()),
            ("atts[id]", "0".to_string()),
            ("current_month_divider", month_divider(start_date)),
            ("apply_sf_date", "0".to_string()),
        ];

        let response = self
            .client
            .post(&self.ajax_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded; charset=UTF-8")
            .header("X-Requested-With", "XMLHttpRequest")
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .body(serde_urlencoded::to_string(form)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        let value: Value = serde_json::from_slice(&body)?;
        Ok(LoadMorePage::from_value(&value))
    }

    /// Every event for one start date, following the load-more offsets.
    ///
    /// A failed page ends the range; events already collected are kept.
    pub async fn fetch_range(&self, start_date: &str) -> Vec<Event> {
        let mut events = Vec::new();
        let mut offset = 0;

        loop {
            let page = match self.fetch_page(start_date, offset).await {
                Ok(Some(page)) => page,
                Ok(None) => break,
                Err(err) => {
                    log::warn!("error fetching {start_date} (offset {offset}): {err}");
                    break;
                }
            };

            if !page.html.trim().is_empty() {
                match parse_events_html(&page.html) {
                    Ok(parsed) => events.extend(parsed),
                    Err(err) => log::warn!("could not parse {start_date} (offset {offset}): {err}"),
                }
            }

            match next_offset(&page, offset) {
                Some(next) => offset = next,
                None => break,
            }
        }

        events
    }

    /// Events for every start date, in order. Not deduplicated.
    pub async fn fetch_all(&self, start_dates: &[String]) -> Vec<Event> {
        log::info!("scanning {} date ranges", start_dates.len());
        let mut all = Vec::new();
        for start_date in start_dates {
            let events = self.fetch_range(start_date).await;
            if !events.is_empty() {
                log::info!("{start_date}: found {} events", events.len());
            }
            all.extend(events);
        }
        all
    }
}
