use super::ForecastSource;
use crate::RainAlertError;
use crate::config::FetchConfig;
use crate::models::{District, ForecastDay, HourlyObservation};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

const HOUR_BLOCK: &str = "div.accordion-item.hour";
const HOUR_LABEL: &str = ".date";
const TEMPERATURE: &str = ".temp.metric";
const PHRASE: &str = ".phrase";
const PANEL_ITEM: &str = ".panel.no-realfeel-phrase p";
const PANEL_VALUE: &str = ".value";

const WIND_LABEL: &str = "Gió";
const HUMIDITY_LABEL: &str = "Độ ẩm";
const UV_LABEL: &str = "Chỉ số UV tối đa";

/// Scrapes AccuWeather hourly forecast pages
#[derive(Debug, Clone)]
pub struct AccuWeatherClient {
    client: Client,
}

impl AccuWeatherClient {
    pub fn new(config: &FetchConfig) -> Result<Self, RainAlertError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| RainAlertError::fetch(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ForecastSource for AccuWeatherClient {
    #[instrument(name = "fetch_day", level = "debug", skip_all, fields(district = %district.name, day = %day))]
    async fn fetch_day(
        &self,
        district: &District,
        day: ForecastDay,
    ) -> Result<Vec<HourlyObservation>, RainAlertError> {
        let url = district.url_for_day(day.index());
        debug!("Requesting {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RainAlertError::fetch(format!(
                "{url} returned HTTP {status}"
            )));
        }
        let body = response.text().await?;

        let observations = parse_hourly_page(&body)?;
        debug!("Parsed {} hourly entries", observations.len());
        Ok(observations)
    }
}

fn selector(css: &str) -> Result<Selector, RainAlertError> {
    Selector::parse(css)
        .map_err(|e| RainAlertError::parse(format!("Invalid selector '{css}': {e}")))
}

/// Concatenated text of an element with every text piece trimmed
fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

fn first_text(parent: ElementRef<'_>, selector: &Selector) -> Option<String> {
    parent.select(selector).next().map(stripped_text)
}

/// Extract hourly observations from an hourly forecast page.
///
/// Hour blocks without an hour label are skipped. Missing temperature, phrase or
/// detail values become empty strings.
pub fn parse_hourly_page(html: &str) -> Result<Vec<HourlyObservation>, RainAlertError> {
    let block_sel = selector(HOUR_BLOCK)?;
    let hour_sel = selector(HOUR_LABEL)?;
    let temp_sel = selector(TEMPERATURE)?;
    let phrase_sel = selector(PHRASE)?;
    let panel_sel = selector(PANEL_ITEM)?;
    let value_sel = selector(PANEL_VALUE)?;

    let document = Html::parse_document(html);
    let mut observations = Vec::new();

    for block in document.select(&block_sel) {
        let Some(hour) = first_text(block, &hour_sel).filter(|hour| !hour.is_empty()) else {
            continue;
        };

        let details: HashMap<String, String> = block
            .select(&panel_sel)
            .filter_map(|item| {
                let label = item
                    .children()
                    .next()?
                    .value()
                    .as_text()?
                    .trim()
                    .replace(':', "");
                let value = first_text(item, &value_sel).unwrap_or_default();
                Some((label, value))
            })
            .collect();
        let detail = |label: &str| details.get(label).cloned().unwrap_or_default();

        observations.push(HourlyObservation {
            hour,
            temperature: first_text(block, &temp_sel).unwrap_or_default(),
            content: first_text(block, &phrase_sel).unwrap_or_default(),
            wind: detail(WIND_LABEL),
            humidity: detail(HUMIDITY_LABEL),
            uv_index: detail(UV_LABEL),
        });
    }

    Ok(observations)
}
