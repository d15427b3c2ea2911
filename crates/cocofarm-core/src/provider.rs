//! Task catalog and weather provider client with offline fallback.
//!
//! [`ApiClient`] talks to the farm API:
//!
//! | Endpoint                       | Payload                         |
//! |--------------------------------|---------------------------------|
//! | `GET {base}/tasks`             | task catalog array              |
//! | `GET {base}/weather?lat=&lon=` | one live or stored observation  |
//! | `GET {base}/forecast?lat=&lon=`| forecast list                   |
//!
//! [`OfflineFirst`] wraps the client with a [`KeyValueStore`]: fresh bodies
//! are cached, and when the network fails the cached body is served instead.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::ProviderError;
use crate::storage::cache::{KeyValueStore, CURRENT_WEATHER_KEY, FORECAST_KEY, TASKS_KEY};
use crate::storage::Config;

/// Where a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Network,
    Cache,
}

/// A provider payload tagged with its source.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub payload: Value,
    pub source: DataSource,
}

/// HTTP client for the farm API.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    location: Option<(f64, f64)>,
}

impl ApiClient {
    /// # Errors
    /// Returns an error if `base_url` is not a valid URL or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        // a trailing slash makes Url::join append instead of replacing the last segment
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ProviderError::Http {
                url: base_url.to_string(),
                source,
            })?;
        Ok(Self {
            client,
            base_url,
            location: None,
        })
    }

    /// Build a client from the `[api]` and `[farm]` config sections.
    ///
    /// # Errors
    /// Returns an error if the configured base URL is invalid.
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let client = Self::new(&config.api.base_url, config.api.timeout())?;
        Ok(match (config.farm.latitude, config.farm.longitude) {
            (Some(lat), Some(lon)) => client.with_location(lat, lon),
            _ => client,
        })
    }

    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.location = Some((latitude, longitude));
        self
    }

    fn endpoint(&self, path: &str, with_location: bool) -> Result<Url, ProviderError> {
        let mut url = self.base_url.join(path)?;
        if with_location {
            if let Some((lat, lon)) = self.location {
                url.query_pairs_mut()
                    .append_pair("lat", &lat.to_string())
                    .append_pair("lon", &lon.to_string());
            }
        }
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value, ProviderError> {
        let url_text = url.to_string();
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ProviderError::Http {
                url: url_text.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                url: url_text,
                status: status.as_u16(),
            });
        }

        resp.json::<Value>()
            .await
            .map_err(|e| ProviderError::InvalidBody {
                url: url_text,
                message: e.to_string(),
            })
    }

    /// Fetch the raw task catalog.
    pub async fn fetch_tasks(&self) -> Result<Value, ProviderError> {
        self.get_json(self.endpoint("tasks", false)?).await
    }

    /// Fetch the current weather observation.
    pub async fn fetch_current_weather(&self) -> Result<Value, ProviderError> {
        self.get_json(self.endpoint("weather", true)?).await
    }

    /// Fetch the forecast list.
    pub async fn fetch_forecast(&self) -> Result<Value, ProviderError> {
        self.get_json(self.endpoint("forecast", true)?).await
    }
}

/// Network-first fetches that fall back to, and refresh, a local cache.
pub struct OfflineFirst<S: KeyValueStore> {
    client: Option<ApiClient>,
    store: S,
}

impl<S: KeyValueStore> OfflineFirst<S> {
    pub fn new(client: ApiClient, store: S) -> Self {
        Self {
            client: Some(client),
            store,
        }
    }

    /// Serve only cached payloads; never touch the network.
    pub fn offline(store: S) -> Self {
        Self {
            client: None,
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn tasks(&self) -> Result<Fetched, ProviderError> {
        match &self.client {
            Some(client) => self.resolve(TASKS_KEY, client.fetch_tasks().await),
            None => self.cached(TASKS_KEY),
        }
    }

    pub async fn current_weather(&self) -> Result<Fetched, ProviderError> {
        match &self.client {
            Some(client) => self.resolve(CURRENT_WEATHER_KEY, client.fetch_current_weather().await),
            None => self.cached(CURRENT_WEATHER_KEY),
        }
    }

    pub async fn forecast(&self) -> Result<Fetched, ProviderError> {
        match &self.client {
            Some(client) => self.resolve(FORECAST_KEY, client.fetch_forecast().await),
            None => self.cached(FORECAST_KEY),
        }
    }

    fn resolve(
        &self,
        key: &str,
        fetched: Result<Value, ProviderError>,
    ) -> Result<Fetched, ProviderError> {
        match fetched {
            Ok(payload) => {
                // a failed cache write must not hide a good network response
                if let Err(e) = self.store.set(key, &payload.to_string()) {
                    tracing::warn!(key, error = %e, "failed to cache provider payload");
                }
                Ok(Fetched {
                    payload,
                    source: DataSource::Network,
                })
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "provider unreachable, using cached copy");
                self.cached(key)
            }
        }
    }

    fn cached(&self, key: &str) -> Result<Fetched, ProviderError> {
        let text = self
            .store
            .get(key)?
            .ok_or_else(|| ProviderError::Unavailable {
                key: key.to_string(),
            })?;
        let payload = serde_json::from_str(&text).map_err(|e| ProviderError::InvalidBody {
            url: format!("cache:{key}"),
            message: e.to_string(),
        })?;
        tracing::debug!(key, "served from cache");
        Ok(Fetched {
            payload,
            source: DataSource::Cache,
        })
    }
}
