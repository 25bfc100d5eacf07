//! Domain resources served by the Chargeprice API.
//!
//! Each endpoint contributes a flat attribute bag (the decoded wire
//! payload, crate-private) and a public entity built from it. Entities
//! are constructed once and immutable afterwards; the caller owns them
//! outright.

use serde::Deserialize;

use crate::codec::DecodingError;
use crate::document::{
    Document, NoData, NoRelationships, RelationshipRef, ResourceAttributes, ResourceObject,
};

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude, positive north.
    pub latitude: f64,
    /// Longitude, positive east.
    pub longitude: f64,
}

/// The different kinds of available plugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plug {
    /// CCS type
    Ccs,
    /// Tesla CCS type
    TeslaCcs,
    /// CHAdeMO type
    Chademo,
    /// Schuko type
    Schuko,
    /// Tesla supercharger type
    TeslaSuc,
    /// Type 1
    Type1,
    /// Type 2
    Type2,
    /// Type 3
    Type3,
}

impl Plug {
    /// Wire value of the plug kind, as used in attributes and filters.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ccs => "ccs",
            Self::TeslaCcs => "tesla_ccs",
            Self::Chademo => "chademo",
            Self::Schuko => "schuko",
            Self::TeslaSuc => "tesla_suc",
            Self::Type1 => "type1",
            Self::Type2 => "type2",
            Self::Type3 => "type3",
        }
    }
}

// ---------------------------------------------------------------------------
// Vehicles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VehicleAttributes {
    pub name: String,
    pub brand: String,
    #[serde(rename = "dc_charge_ports")]
    pub charge_ports: Vec<Plug>,
}

impl ResourceAttributes for VehicleAttributes {
    const TYPE_NAME: &'static str = "car";
}

/// Marker for the manufacturer relationship; never decoded itself.
pub(crate) struct ManufacturerAttributes;

impl ResourceAttributes for ManufacturerAttributes {
    const TYPE_NAME: &'static str = "manufacturer";
}

pub(crate) type VehicleDocument =
    Document<VehicleAttributes, RelationshipRef<ManufacturerAttributes>, NoData>;

/// A vehicle entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    /// The identifier of the vehicle.
    pub id: String,
    /// The name of the vehicle.
    pub name: String,
    /// The brand of the vehicle.
    pub brand: String,
    /// Available charge ports. See [`Plug`] for possible values.
    pub charge_ports: Vec<Plug>,
    /// The identifier of the manufacturer. The manufacturer itself is
    /// not side-loaded by the API, so only the id is available.
    pub manufacturer_id: String,
}

impl Vehicle {
    pub(crate) fn from_resource(
        resource: ResourceObject<VehicleAttributes, RelationshipRef<ManufacturerAttributes>>,
    ) -> Result<Self, DecodingError> {
        let Some(relationship) = resource.relationships else {
            return Err(DecodingError::MissingRelationship(resource.id));
        };

        Ok(Self {
            id: resource.id,
            name: resource.attributes.name,
            brand: resource.attributes.brand,
            charge_ports: resource.attributes.charge_ports,
            manufacturer_id: relationship.id,
        })
    }
}

// ---------------------------------------------------------------------------
// Charging stations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChargingStationAttributes {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: String,
    pub address: String,
    pub free_parking: Option<bool>,
    pub free_charging: Option<bool>,
    pub charge_points: Vec<ChargePoint>,
}

impl ResourceAttributes for ChargingStationAttributes {
    const TYPE_NAME: &'static str = "charging_station";
}

/// Marker for the operator relationship; never decoded itself.
pub(crate) struct OperatorAttributes;

impl ResourceAttributes for OperatorAttributes {
    const TYPE_NAME: &'static str = "operator";
}

/// Attributes of a side-loaded company resource. Only the name is
/// consumed when resolving station operators.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CompanyAttributes {
    pub name: String,
}

impl ResourceAttributes for CompanyAttributes {
    const TYPE_NAME: &'static str = "company";
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChargingStationMeta {
    #[serde(rename = "disabled_going_electric_countries")]
    pub countries: Vec<String>,
}

pub(crate) type StationDocument = Document<
    ChargingStationAttributes,
    RelationshipRef<OperatorAttributes>,
    CompanyAttributes,
    ChargingStationMeta,
>;

/// A group of charge points at a station sharing power and plug type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChargePoint {
    /// Plug kind of this group.
    pub plug: Plug,
    /// The maximum power in kW.
    pub power: f32,
    /// Total number of charge points of this type at the station.
    pub count: u32,
    /// Number of charge points of this type which are ready to use and
    /// not occupied. `None` means unknown.
    #[serde(rename = "availableCount")]
    pub available_count: Option<u32>,
}

/// The operator entity, resolved from the side-loaded companies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    /// The identifier of the operator.
    pub id: String,
    /// The name of the operator.
    pub name: String,
}

/// The charging station entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargingStation {
    /// The identifier of the charging station.
    pub id: String,
    /// The operator relation.
    pub operator: Operator,
    /// The name of the station.
    pub name: String,
    /// The location of the station.
    pub position: Coordinate,
    /// The ISO 3166 country code of the location.
    pub country: String,
    /// Address of the station.
    pub address: String,
    /// Parking at the station is free of charge (`None` = unknown).
    pub free_parking: Option<bool>,
    /// Charging at the station is free of charge (`None` = unknown).
    pub free_charging: Option<bool>,
    /// Charge points at this station, grouped by power and plug type.
    pub charge_points: Vec<ChargePoint>,
}

impl ChargingStation {
    pub(crate) fn new(id: String, attributes: ChargingStationAttributes, operator: Operator) -> Self {
        Self {
            id,
            operator,
            name: attributes.name,
            position: Coordinate {
                latitude: attributes.latitude,
                longitude: attributes.longitude,
            },
            country: attributes.country,
            address: attributes.address,
            free_parking: attributes.free_parking,
            free_charging: attributes.free_charging,
            charge_points: attributes.charge_points,
        }
    }
}

/// The response from a charging-station request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargingStationResponse {
    /// The stations, in the order the server returned them.
    pub stations: Vec<ChargingStation>,
    /// Countries where the Chargeprice data has likely better quality
    /// than the GoingElectric data, which should then not be shown.
    pub disabled_going_electric: Vec<String>,
}

/// Optional filters for charging-station queries.
#[derive(Debug, Clone, Default)]
pub struct StationFilter {
    /// Only stations where charging is free.
    pub free_charging: Option<bool>,
    /// Only stations where parking is free.
    pub free_parking: Option<bool>,
    /// Only stations with at least this power in kW.
    pub min_power: Option<f32>,
    /// Only stations offering one of these plugs.
    pub plugs: Option<Vec<Plug>>,
    /// Only stations run by this operator.
    pub operator_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Tariffs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TariffAttributes {
    pub provider: String,
    pub name: String,
    #[serde(rename = "provider_customer_only")]
    pub is_provider_customer_only: bool,
    pub is_direct_payment: bool,
    pub charge_card_id: Option<String>,
}

impl ResourceAttributes for TariffAttributes {
    const TYPE_NAME: &'static str = "tariff";
}

pub(crate) type TariffDocument = Document<TariffAttributes, NoRelationships, NoData>;

/// The tariff entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tariff {
    /// The identifier of the tariff.
    pub id: String,
    /// Name of the charge card provider.
    pub provider: String,
    /// Name of the tariff.
    pub name: String,
    /// If true, the tariff is only available for customers of a
    /// provider (e.g. the electricity provider for the home).
    pub is_provider_customer_only: bool,
    /// This tariff can be used without registration.
    pub is_direct_payment: bool,
    /// GoingElectric charge card id.
    pub charge_card_id: Option<String>,
}

impl Tariff {
    pub(crate) fn from_resource(
        resource: ResourceObject<TariffAttributes, NoRelationships>,
    ) -> Self {
        Self {
            id: resource.id,
            provider: resource.attributes.provider,
            name: resource.attributes.name,
            is_provider_customer_only: resource.attributes.is_provider_customer_only,
            is_direct_payment: resource.attributes.is_direct_payment,
            charge_card_id: resource.attributes.charge_card_id,
        }
    }
}

/// Optional filters for tariff queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct TariffFilter {
    /// Only tariffs usable without registration.
    pub direct_payment: Option<bool>,
    /// Only tariffs restricted to existing provider customers.
    pub provider_customer_only: Option<bool>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn plug_decodes_wire_values() {
        let plugs: Vec<Plug> =
            serde_json::from_str(r#"["ccs", "tesla_ccs", "chademo", "type2"]"#).unwrap();
        assert_eq!(plugs, vec![Plug::Ccs, Plug::TeslaCcs, Plug::Chademo, Plug::Type2]);
    }

    #[test]
    fn plug_rejects_unknown_values() {
        let result: Result<Plug, _> = serde_json::from_str(r#""usb_c""#);
        assert!(result.is_err());
    }

    #[test]
    fn vehicle_document_decodes_and_maps() {
        let json = r#"{
            "data": [{
                "id": "v-1",
                "type": "car",
                "attributes": {
                    "name": "Model 3 LR",
                    "brand": "Tesla",
                    "dc_charge_ports": ["ccs", "tesla_suc"]
                },
                "relationships": {"manufacturer": {"data": {"id": "m-7", "type": "manufacturer"}}}
            }]
        }"#;

        let document: VehicleDocument = serde_json::from_str(json).unwrap();
        let data = document.into_success().unwrap().data.unwrap();
        let vehicle = Vehicle::from_resource(data.into_iter().next().unwrap()).unwrap();

        assert_eq!(vehicle.id, "v-1");
        assert_eq!(vehicle.brand, "Tesla");
        assert_eq!(vehicle.charge_ports, vec![Plug::Ccs, Plug::TeslaSuc]);
        assert_eq!(vehicle.manufacturer_id, "m-7");
    }

    #[test]
    fn vehicle_without_relationship_is_a_decode_failure() {
        let json = r#"{
            "data": [{
                "id": "v-2",
                "attributes": {"name": "e-208", "brand": "Peugeot", "dc_charge_ports": []}
            }]
        }"#;

        let document: VehicleDocument = serde_json::from_str(json).unwrap();
        let data = document.into_success().unwrap().data.unwrap();
        let result = Vehicle::from_resource(data.into_iter().next().unwrap());
        assert!(matches!(result, Err(DecodingError::MissingRelationship(id)) if id == "v-2"));
    }

    #[test]
    fn station_document_decodes_meta_and_included() {
        let json = r#"{
            "data": [{
                "id": "s-1",
                "type": "charging_station",
                "attributes": {
                    "name": "Parkhaus Mitte",
                    "latitude": 47.36,
                    "longitude": 8.53,
                    "country": "CH",
                    "address": "Bahnhofstrasse 1",
                    "free_parking": true,
                    "free_charging": null,
                    "charge_points": [
                        {"plug": "ccs", "power": 50.0, "count": 2, "availableCount": 1}
                    ]
                },
                "relationships": {"operator": {"data": {"id": "c-1", "type": "company"}}}
            }],
            "meta": {"disabled_going_electric_countries": ["CH", "DE"]},
            "included": [{
                "id": "c-1",
                "type": "company",
                "attributes": {"name": "EW Zuerich"}
            }]
        }"#;

        let document: StationDocument = serde_json::from_str(json).unwrap();
        let success = document.into_success().unwrap();

        assert_eq!(success.meta.unwrap().countries, vec!["CH", "DE"]);
        let included = success.included.unwrap();
        assert_eq!(included[0].attributes.name, "EW Zuerich");

        let data = success.data.unwrap();
        assert_eq!(data[0].relationships.as_ref().unwrap().id, "c-1");
        assert_eq!(data[0].attributes.charge_points[0].available_count, Some(1));
        assert_eq!(data[0].attributes.free_charging, None);
    }

    #[test]
    fn tariff_document_decodes_without_relationships() {
        let json = r#"{
            "data": [{
                "id": "t-1",
                "type": "tariff",
                "attributes": {
                    "provider": "Maingau",
                    "name": "EinfachStromLaden",
                    "provider_customer_only": false,
                    "is_direct_payment": false,
                    "charge_card_id": "1206"
                }
            }]
        }"#;

        let document: TariffDocument = serde_json::from_str(json).unwrap();
        let data = document.into_success().unwrap().data.unwrap();
        let tariff = Tariff::from_resource(data.into_iter().next().unwrap());

        assert_eq!(tariff.provider, "Maingau");
        assert!(!tariff.is_provider_customer_only);
        assert_eq!(tariff.charge_card_id.as_deref(), Some("1206"));
    }
}
