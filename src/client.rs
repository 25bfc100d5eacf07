//! The Chargeprice client: scheduling, cancellation and the public calls.
//!
//! [`ChargepriceClient`] is the single entry point. Every `get_*` call
//! builds an endpoint description, wraps it in a
//! [`crate::operation::RequestOperation`], submits it to a
//! bounded-concurrency run queue and returns a [`RequestHandle`]
//! immediately, before the transfer necessarily started. Results reach
//! the caller through the completion callback, invoked at most once on a
//! Tokio worker thread.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Semaphore, watch};

use crate::codec::Json;
use crate::endpoint::{ApiEndpoint, DEFAULT_BASE_URL, Route};
use crate::error::ClientError;
use crate::operation::{CodingPart, OperationState, RequestHandle, RequestOperation};
use crate::resolve::{included_index, resolve_related};
use crate::resources::{
    ChargingStation, ChargingStationResponse, Coordinate, Operator, StationDocument,
    StationFilter, Tariff, TariffDocument, TariffFilter, Vehicle, VehicleDocument,
};

/// Default bound on simultaneously executing operations.
const DEFAULT_MAX_CONCURRENCY: usize = 10;

struct ClientInner {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    permits: Arc<Semaphore>,
}

/// Asynchronous client for the Chargeprice API.
///
/// Cheap to clone; clones share the HTTP connection pool and the run
/// queue. The client is stateless between calls apart from those two
/// and the API key.
///
/// All `get_*` methods must be called from within a Tokio runtime.
#[derive(Clone)]
pub struct ChargepriceClient {
    inner: Arc<ClientInner>,
}

impl ChargepriceClient {
    /// Create a client with the given API key and default settings.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::builder(api_key).build()
    }

    /// Start building a client with non-default settings.
    #[must_use]
    pub fn builder(api_key: impl Into<String>) -> ChargepriceClientBuilder {
        ChargepriceClientBuilder {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Load the vehicles.
    ///
    /// The completion callback receives the full vehicle list or a
    /// [`ClientError`]; it is never invoked when the returned handle is
    /// cancelled first.
    pub fn get_vehicles<C>(&self, completion: C) -> RequestHandle
    where
        C: FnOnce(Result<Vec<Vehicle>, ClientError>) + Send + 'static,
    {
        self.submit::<VehicleDocument, (), _, _, _>(
            Route::Vehicles,
            None,
            |document| {
                let success = document.into_success()?;
                let data = success.data.ok_or(ClientError::EmptyData)?;
                data.into_iter()
                    .map(|resource| Vehicle::from_resource(resource).map_err(ClientError::from))
                    .collect()
            },
            completion,
        )
    }

    /// Load the charging stations inside a bounding box.
    ///
    /// Station operators are resolved from the side-loaded company
    /// resources; a station whose operator was not side-loaded fails the
    /// whole call with [`ClientError::MissingRelatedResource`].
    pub fn get_charging_stations<C>(
        &self,
        top_left: Coordinate,
        bottom_right: Coordinate,
        filter: StationFilter,
        completion: C,
    ) -> RequestHandle
    where
        C: FnOnce(Result<ChargingStationResponse, ClientError>) + Send + 'static,
    {
        self.submit::<StationDocument, (), _, _, _>(
            Route::ChargingStations {
                top_left,
                bottom_right,
                filter,
            },
            None,
            |document| {
                let success = document.into_success()?;
                let data = success.data.ok_or(ClientError::EmptyData)?;
                let disabled_going_electric =
                    success.meta.map(|meta| meta.countries).unwrap_or_default();

                // An empty page needs no resolution and no included set.
                if data.is_empty() {
                    return Ok(ChargingStationResponse {
                        stations: Vec::new(),
                        disabled_going_electric,
                    });
                }

                let included = success
                    .included
                    .filter(|included| !included.is_empty())
                    .ok_or(ClientError::EmptyIncluded)?;
                let index = included_index(included);

                let stations = resolve_related(data, &index, |id, attributes, operator_id, company| {
                    ChargingStation::new(
                        id,
                        attributes,
                        Operator {
                            id: operator_id.to_owned(),
                            name: company.name.clone(),
                        },
                    )
                })?;

                Ok(ChargingStationResponse {
                    stations,
                    disabled_going_electric,
                })
            },
            completion,
        )
    }

    /// Load the tariffs.
    pub fn get_tariffs<C>(&self, filter: TariffFilter, completion: C) -> RequestHandle
    where
        C: FnOnce(Result<Vec<Tariff>, ClientError>) + Send + 'static,
    {
        self.submit::<TariffDocument, (), _, _, _>(
            Route::Tariffs { filter },
            None,
            |document| {
                let success = document.into_success()?;
                let data = success.data.ok_or(ClientError::EmptyData)?;
                Ok(data.into_iter().map(Tariff::from_resource).collect())
            },
            completion,
        )
    }

    /// Enqueue one operation and hand its handle back synchronously.
    ///
    /// The spawned worker waits for a run-queue permit, re-checks
    /// cancellation, races the transfer against the cancel signal and
    /// finally maps the envelope through `post` before invoking the
    /// completion callback. The submitting context never blocks, no
    /// matter how deep the queue is.
    fn submit<Resp, B, T, P, C>(
        &self,
        route: Route,
        encoding: Option<CodingPart<B, Json>>,
        post: P,
        completion: C,
    ) -> RequestHandle
    where
        Resp: DeserializeOwned + Send + 'static,
        B: Serialize + Send + 'static,
        T: Send + 'static,
        P: FnOnce(Resp) -> Result<T, ClientError> + Send + 'static,
        C: FnOnce(Result<T, ClientError>) + Send + 'static,
    {
        let (handle, mut cancelled) = RequestHandle::new();
        let worker_handle = handle.clone();
        let permits = Arc::clone(&self.inner.permits);

        let operation = RequestOperation::new(
            self.inner.http.clone(),
            self.inner.api_key.clone(),
            ApiEndpoint {
                base_url: self.inner.base_url.clone(),
                route,
            },
            encoding,
            Json,
        );

        tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                // The semaphore is never closed while a client exists.
                return;
            };

            if !worker_handle.try_start() {
                tracing::debug!("operation cancelled before start");
                return;
            }

            tokio::select! {
                () = wait_cancelled(&mut cancelled) => {
                    // The in-flight transfer is dropped; the callback
                    // stays silent, see RequestHandle::cancel.
                    tracing::debug!("operation cancelled during transfer");
                }
                result = operation.execute::<Resp>() => {
                    let outcome = result.and_then(post);
                    let terminal = if outcome.is_ok() {
                        OperationState::Succeeded
                    } else {
                        OperationState::Failed
                    };
                    // A cancel that landed after the transfer finished
                    // loses the race here and suppresses the callback.
                    if worker_handle.mark(terminal) {
                        completion(outcome);
                    }
                }
            }
        });

        handle
    }
}

/// Resolves once the cancel flag is raised; pends forever when no
/// cancellation can arrive anymore.
async fn wait_cancelled(cancelled: &mut watch::Receiver<bool>) {
    if cancelled.wait_for(|flag| *flag).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Builder for [`ChargepriceClient`].
#[derive(Debug, Clone)]
pub struct ChargepriceClientBuilder {
    api_key: String,
    base_url: String,
    max_concurrency: usize,
}

impl ChargepriceClientBuilder {
    /// Override the API host. Mainly useful for tests.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the bound on simultaneously executing operations
    /// (default 10). A bound of zero would stall every call and is
    /// raised to one.
    #[must_use]
    pub const fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = if max_concurrency == 0 {
            1
        } else {
            max_concurrency
        };
        self
    }

    /// Build the client.
    #[must_use]
    pub fn build(self) -> ChargepriceClient {
        ChargepriceClient {
            inner: Arc::new(ClientInner {
                http: reqwest::Client::new(),
                api_key: self.api_key,
                base_url: self.base_url,
                permits: Arc::new(Semaphore::new(self.max_concurrency)),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_defaults() {
        let client = ChargepriceClient::new("secret");
        assert_eq!(client.inner.base_url, DEFAULT_BASE_URL);
        assert_eq!(client.inner.api_key, "secret");
        assert_eq!(client.inner.permits.available_permits(), DEFAULT_MAX_CONCURRENCY);
    }

    #[test]
    fn builder_overrides_base_url_and_concurrency() {
        let client = ChargepriceClient::builder("secret")
            .base_url("http://127.0.0.1:9000")
            .max_concurrency(2)
            .build();
        assert_eq!(client.inner.base_url, "http://127.0.0.1:9000");
        assert_eq!(client.inner.permits.available_permits(), 2);
    }

    #[test]
    fn zero_concurrency_is_raised_to_one() {
        let client = ChargepriceClient::builder("secret").max_concurrency(0).build();
        assert_eq!(client.inner.permits.available_permits(), 1);
    }
}
