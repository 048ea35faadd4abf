/*!
# Valframe Entities

Record types understood by the validation pipeline, each with its schema and
business rules.
*/

pub mod shipment;

pub use shipment::{Shipment, ShipmentRulesValidator, SERVICE_TYPES, STATION_CODES};
