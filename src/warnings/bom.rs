//! Bureau of Meteorology warnings RSS feed

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::feed::{WarningFeed, http_client};
use crate::models::{Coordinates, EmergencyWarning, WarningSeverity, WarningType};
use crate::{HandsUpError, Result};

pub const BOM_SOURCE: &str = "Bureau of Meteorology";

#[derive(Debug, Deserialize)]
struct RssDocument {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    #[serde(default)]
    title: String,
    description: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    #[serde(rename = "point", alias = "georss:point")]
    point: Option<String>, // Format: "latitude longitude"
}

pub struct BomWarningFeed {
    client: ClientWithMiddleware,
    feed_url: String,
    region: String,
}

impl BomWarningFeed {
    /// `region` labels warnings whose title names no area
    pub fn new(
        feed_url: impl Into<String>,
        region: impl Into<String>,
        request_timeout: Duration,
        max_retries: u32,
    ) -> Result<Self> {
        Ok(Self {
            client: http_client(request_timeout, max_retries)?,
            feed_url: feed_url.into(),
            region: region.into(),
        })
    }

    fn endpoint(&self) -> Result<Url> {
        let url =
            Url::parse(&self.feed_url).map_err(|_| HandsUpError::invalid_endpoint(&self.feed_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(HandsUpError::invalid_endpoint(&self.feed_url));
        }
        Ok(url)
    }
}

#[async_trait]
impl WarningFeed for BomWarningFeed {
    fn name(&self) -> &str {
        BOM_SOURCE
    }

    #[tracing::instrument(skip(self), fields(url = %self.feed_url))]
    async fn fetch(&self) -> Result<Vec<EmergencyWarning>> {
        let url = self.endpoint()?;
        debug!("Requesting warnings feed");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HandsUpError::network(format!("Warning feed request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HandsUpError::network(format!(
                "Warning feed returned status {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| HandsUpError::network(format!("Failed to read warning feed: {}", e)))?;

        let warnings = parse_feed(&body, &self.region, Utc::now())?;
        info!("Fetched {} warnings from {}", warnings.len(), BOM_SOURCE);
        Ok(warnings)
    }
}

/// Parse an RSS warnings document.
///
/// Items without a publication date are stamped with `fetched_at`.
pub fn parse_feed(
    xml: &str,
    region: &str,
    fetched_at: DateTime<Utc>,
) -> Result<Vec<EmergencyWarning>> {
    let document: RssDocument = from_str(xml)
        .map_err(|e| HandsUpError::parse(format!("Malformed warnings feed: {}", e)))?;

    let mut warnings = Vec::with_capacity(document.channel.items.len());
    for item in document.channel.items {
        match item.into_warning(region, fetched_at) {
            Some(warning) => warnings.push(warning),
            None => warn!("Skipping warnings feed item without a title"),
        }
    }
    Ok(warnings)
}

impl RssItem {
    fn into_warning(self, region: &str, fetched_at: DateTime<Utc>) -> Option<EmergencyWarning> {
        let title = strip_issue_prefix(&self.title).to_string();
        if title.is_empty() {
            return None;
        }

        let issued_at = self
            .pub_date
            .as_deref()
            .and_then(|date| DateTime::parse_from_rfc2822(date.trim()).ok())
            .map_or(fetched_at, |date| date.with_timezone(&Utc));

        let description = self
            .description
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| title.clone());

        let lowered = title.to_lowercase();
        Some(EmergencyWarning {
            id: Uuid::new_v4(),
            warning_type: classify_type(&lowered),
            severity: classify_severity(&lowered),
            location: area_from_title(&title).unwrap_or(region).to_string(),
            coordinates: self.point.as_deref().and_then(parse_point),
            description,
            title,
            issued_at,
            expires_at: None,
            source: match self.link.as_deref().map(str::trim) {
                Some(link) if !link.is_empty() => format!("{} ({})", BOM_SOURCE, link),
                _ => BOM_SOURCE.to_string(),
            },
        })
    }
}

/// Drop the "18/14:33 EDT" issue stamp that leads bureau titles
fn strip_issue_prefix(title: &str) -> &str {
    let title = title.trim();
    let Some((stamp, rest)) = title.split_once(' ') else {
        return title;
    };
    let is_stamp = stamp.contains('/')
        && stamp.contains(':')
        && stamp.chars().all(|c| c.is_ascii_digit() || c == '/' || c == ':');
    if !is_stamp {
        return title;
    }

    let rest = rest.trim_start();
    match rest.split_once(' ') {
        Some((zone, remainder))
            if zone.len() <= 5 && zone.chars().all(|c| c.is_ascii_uppercase()) =>
        {
            remainder.trim_start()
        }
        _ => rest,
    }
}

fn area_from_title(title: &str) -> Option<&str> {
    title
        .rsplit_once(" for ")
        .map(|(_, area)| area.trim().trim_end_matches('.'))
        .filter(|area| !area.is_empty())
}

fn classify_type(title: &str) -> WarningType {
    if title.contains("fire") {
        WarningType::Fire
    } else if title.contains("flood") {
        WarningType::Flood
    } else if title.contains("heatwave") {
        WarningType::Heatwave
    } else if title.contains("storm") || title.contains("cyclone") {
        WarningType::Storm
    } else if ["severe weather", "wind", "surf", "blizzard", "snow"]
        .iter()
        .any(|keyword| title.contains(keyword))
    {
        WarningType::SevereWeather
    } else {
        WarningType::Other
    }
}

fn classify_severity(title: &str) -> WarningSeverity {
    if title.contains("cancellation") || title.contains("cancelled") || title.starts_with("final") {
        WarningSeverity::Low
    } else if ["emergency", "extreme", "catastrophic"]
        .iter()
        .any(|keyword| title.contains(keyword))
    {
        WarningSeverity::Critical
    } else if title.contains("severe") {
        WarningSeverity::Severe
    } else if title.contains("warning") {
        WarningSeverity::High
    } else {
        WarningSeverity::Moderate
    }
}

fn parse_point(point: &str) -> Option<Coordinates> {
    let mut parts = point.split_whitespace();
    let latitude = parts.next()?.parse().ok()?;
    let longitude = parts.next()?.parse().ok()?;
    Some(Coordinates::new(latitude, longitude)).filter(Coordinates::is_valid)
}
