use super::{CalendarError, CalendarService};
use crate::config::GoogleConfig;
use crate::event::{EventStart, NewEvent, RemoteEvent, TimeRange};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat};
use log::{debug, info};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Local wall-clock format sent next to an explicit `timeZone`.
const LOCAL_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Google Calendar REST client bound to one calendar and one access token.
#[derive(Debug)]
pub struct GoogleCalendarClient {
    client: Client,
    events_url: Url,
    access_token: SecretString,
}

impl GoogleCalendarClient {
    pub fn new(
        config: &GoogleConfig,
        calendar_id: &str,
        access_token: SecretString,
    ) -> Result<Self> {
        let mut events_url = Url::parse(&config.api_base_url)
            .with_context(|| format!("Invalid Google API base URL '{}'", config.api_base_url))?;
        events_url
            .path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Google API base URL cannot have a path"))?
            .pop_if_empty()
            .extend(["calendars", calendar_id, "events"]);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        debug!("Google Calendar events endpoint: {}", events_url);
        Ok(Self {
            client,
            events_url,
            access_token,
        })
    }

    async fn fetch_page(
        &self,
        range: &TimeRange,
        page_token: Option<&str>,
    ) -> Result<EventsPage, CalendarError> {
        let mut url = self.events_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("timeMin", &range.start.to_rfc3339_opts(SecondsFormat::Secs, true))
                .append_pair("timeMax", &range.end.to_rfc3339_opts(SecondsFormat::Secs, true))
                .append_pair("singleEvents", "true")
                .append_pair("orderBy", "startTime");
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }

        let response = self
            .client
            .get(url)
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| CalendarError::Request(e.to_string()))?;

        decode(response).await
    }
}

#[async_trait]
impl CalendarService for GoogleCalendarClient {
    async fn create_event(&self, event: &NewEvent) -> Result<RemoteEvent, CalendarError> {
        let body = GoogleEventRequest::from(event);
        debug!("Creating Google Calendar event: {:?}", body);

        let response = self
            .client
            .post(self.events_url.clone())
            .bearer_auth(self.access_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| CalendarError::Request(e.to_string()))?;

        let created: GoogleEvent = decode(response).await?;
        let created = created.into_remote()?;
        info!(
            "Event created: {}",
            created.html_link.as_deref().unwrap_or(created.id.as_str())
        );
        Ok(created)
    }

    async fn list_events(&self, range: &TimeRange) -> Result<Vec<RemoteEvent>, CalendarError> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(range, page_token.as_deref()).await?;
            for item in page.items {
                events.push(item.into_remote()?);
            }
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!("Listed {} events between {} and {}", events.len(), range.start, range.end);
        Ok(events)
    }
}

/// Turn a response into `T`, or into the service's own error message.
async fn decode<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, CalendarError> {
    let status = response.status();
    let body = response.text().await.map_err(|e| CalendarError::Request(e.to_string()))?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|parsed| parsed.error.message)
            .ok()
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("Unknown error").to_string()
                } else {
                    body.trim().to_string()
                }
            });
        return Err(CalendarError::Api {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| CalendarError::Decode(e.to_string()))
}

#[derive(Debug, Serialize)]
struct GoogleEventRequest {
    summary: String,
    description: String,
    start: GoogleEventTime,
    end: GoogleEventTime,
}

impl From<&NewEvent> for GoogleEventRequest {
    fn from(event: &NewEvent) -> Self {
        let at = |local: NaiveDateTime| GoogleEventTime {
            date_time: Some(local.format(LOCAL_DATE_TIME_FORMAT).to_string()),
            date: None,
            time_zone: Some(event.time_zone.name().to_string()),
        };
        Self {
            summary: event.summary.clone(),
            description: event.description.clone(),
            start: at(event.start),
            end: at(event.end),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEventTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_zone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEvent {
    id: String,
    summary: Option<String>,
    start: Option<GoogleEventTime>,
    html_link: Option<String>,
}

impl GoogleEvent {
    fn into_remote(self) -> Result<RemoteEvent, CalendarError> {
        let start = self
            .start
            .ok_or_else(|| CalendarError::Decode(format!("event {} has no start", self.id)))?;

        let start = match (start.date_time, start.date) {
            (Some(date_time), _) => DateTime::parse_from_rfc3339(&date_time)
                .map(EventStart::DateTime)
                .map_err(|e| CalendarError::Decode(format!("bad start '{}': {}", date_time, e)))?,
            (None, Some(date)) => NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map(EventStart::AllDay)
                .map_err(|e| CalendarError::Decode(format!("bad start date '{}': {}", date, e)))?,
            (None, None) => {
                return Err(CalendarError::Decode(format!("event {} has an empty start", self.id)));
            }
        };

        Ok(RemoteEvent {
            id: self.id,
            summary: self.summary.unwrap_or_default(),
            start,
            html_link: self.html_link,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<GoogleEvent>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}
