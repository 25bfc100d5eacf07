//! Endpoint descriptions and URL construction for the Chargeprice API.
//!
//! An [`Endpoint`] is pure data: host, path, method and a flat list of
//! query parameters. Parameters with a `None` value are still emitted as
//! a bare key, matching the server's filter-bracket query convention
//! (e.g. `filter[latitude.gte]=47`).

use reqwest::Url;
use thiserror::Error;

use crate::resources::{Coordinate, StationFilter, TariffFilter};

/// Default host of the Chargeprice API.
pub(crate) const DEFAULT_BASE_URL: &str = "https://api.chargeprice.app";

/// An endpoint description that did not yield a valid URL.
#[derive(Debug, Error)]
#[error("invalid endpoint URL: {0}")]
pub(crate) struct InvalidUrlError(pub(crate) String);

/// HTTP method of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Method {
    Get,
    /// Reserved for future write endpoints.
    #[allow(dead_code)]
    Post,
    /// Reserved for future write endpoints.
    #[allow(dead_code)]
    Put,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
        }
    }
}

/// A request target: base host plus path, method and query parameters.
pub(crate) trait Endpoint {
    fn base_url(&self) -> &str;
    fn path(&self) -> &'static str;
    fn method(&self) -> Method;
    fn query_parameters(&self) -> Vec<(String, Option<String>)>;
}

/// The routes of the Chargeprice API, with their filter parameters.
#[derive(Debug, Clone)]
pub(crate) enum Route {
    Vehicles,
    ChargingStations {
        top_left: Coordinate,
        bottom_right: Coordinate,
        filter: StationFilter,
    },
    Tariffs {
        filter: TariffFilter,
    },
}

/// A [`Route`] bound to the host configured on the client.
#[derive(Debug, Clone)]
pub(crate) struct ApiEndpoint {
    pub(crate) base_url: String,
    pub(crate) route: Route,
}

impl Endpoint for ApiEndpoint {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn path(&self) -> &'static str {
        match self.route {
            Route::Vehicles => "/v1/vehicles",
            Route::ChargingStations { .. } => "/v1/charging_stations",
            Route::Tariffs { .. } => "/v1/tariffs",
        }
    }

    fn method(&self) -> Method {
        Method::Get
    }

    fn query_parameters(&self) -> Vec<(String, Option<String>)> {
        let mut parameters: Vec<(String, Option<String>)> = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            parameters.push((key.to_string(), value));
        };

        match &self.route {
            Route::Vehicles => {}
            Route::ChargingStations {
                top_left,
                bottom_right,
                filter,
            } => {
                push("filter[latitude.gte]", Some(bottom_right.latitude.to_string()));
                push("filter[latitude.lte]", Some(top_left.latitude.to_string()));
                push("filter[longitude.gte]", Some(top_left.longitude.to_string()));
                push("filter[longitude.lte]", Some(bottom_right.longitude.to_string()));

                if let Some(free_charging) = filter.free_charging {
                    push("filter[free_charging]", Some(free_charging.to_string()));
                }
                if let Some(free_parking) = filter.free_parking {
                    push("filter[free_parking]", Some(free_parking.to_string()));
                }
                if let Some(min_power) = filter.min_power {
                    push("filter[power.gte]", Some(min_power.to_string()));
                }
                if let Some(plugs) = &filter.plugs {
                    let joined = plugs
                        .iter()
                        .map(|plug| plug.as_str())
                        .collect::<Vec<_>>()
                        .join(",");
                    push("filter[plugs]", Some(joined));
                }
                if let Some(operator_id) = &filter.operator_id {
                    push("filter[operator.id]", Some(operator_id.clone()));
                }
            }
            Route::Tariffs { filter } => {
                if let Some(direct_payment) = filter.direct_payment {
                    push("filter[is_direct_payment]", Some(direct_payment.to_string()));
                }
                if let Some(customer_only) = filter.provider_customer_only {
                    push("filter[provider_customer_only]", Some(customer_only.to_string()));
                }
            }
        }

        parameters
    }
}

/// Build the request URL for an endpoint description.
pub(crate) fn encode_url<E: Endpoint>(endpoint: &E) -> Result<Url, InvalidUrlError> {
    let mut url =
        Url::parse(endpoint.base_url()).map_err(|error| InvalidUrlError(error.to_string()))?;
    url.set_path(endpoint.path());

    let parameters = endpoint.query_parameters();
    if !parameters.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &parameters {
            match value {
                Some(value) => {
                    pairs.append_pair(key, value);
                }
                None => {
                    pairs.append_key_only(key);
                }
            }
        }
    }

    Ok(url)
}
