//! Refresh pipeline: fetch the forecast, roll the hourly block up into
//! 12-hour intervals, and merge the result into the snapshot store.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ServiceError;
use crate::fetch::{HttpClient, fetch_bytes};
use crate::forecast::parse_forecast;
use crate::rollup::{IntervalSeries, NumericPolicy};
use crate::store::SnapshotStore;

/// What a refresh hands to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    #[serde(rename = "12_hour_data")]
    pub twelve_hour_data: IntervalSeries,
    pub daily_data: Value,
}

pub struct WeatherService<C, S> {
    client: C,
    store: S,
    url: String,
    policy: NumericPolicy,
}

impl<C: HttpClient, S: SnapshotStore> WeatherService<C, S> {
    /// Creates a service using the default numeric policy.
    pub fn new(client: C, store: S, url: impl Into<String>) -> Self {
        Self {
            client,
            store,
            url: url.into(),
            policy: NumericPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: NumericPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetches the forecast and runs [`Self::refresh_from_bytes`] on it.
    #[tracing::instrument(skip(self), fields(url = %self.url))]
    pub async fn refresh(&self) -> Result<WeatherReport, ServiceError> {
        let bytes = fetch_bytes(&self.client, &self.url).await.map_err(|e| {
            warn!(error = %e, "Forecast fetch failed");
            ServiceError::Upstream(e)
        })?;
        debug!(bytes = bytes.len(), "Forecast bytes received");

        self.refresh_from_bytes(&bytes)
    }

    /// Decodes a forecast body, aggregates its hourly block and merges the
    /// intervals into the store.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Upstream`] if the body is not a forecast document,
    /// [`ServiceError::InvalidData`] if the hourly block cannot be aggregated,
    /// [`ServiceError::Store`] if the snapshot cannot be updated.
    pub fn refresh_from_bytes(&self, bytes: &[u8]) -> Result<WeatherReport, ServiceError> {
        let forecast = parse_forecast(bytes).map_err(ServiceError::Upstream)?;

        let twelve_hour_data = forecast.data_1h.aggregate(&self.policy)?;
        info!(
            hourly_rows = forecast.data_1h.time.len(),
            intervals = twelve_hour_data.len(),
            fields = twelve_hour_data.fields.len(),
            "Hourly data aggregated"
        );

        let snapshot = self
            .store
            .merge(twelve_hour_data.to_document())
            .map_err(ServiceError::Store)?;
        debug!(keys = snapshot.len(), "Snapshot merged");

        Ok(WeatherReport {
            twelve_hour_data,
            daily_data: forecast.data_day,
        })
    }
}
