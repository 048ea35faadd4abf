use chrono::NaiveDateTime;
use std::sync::OnceLock;
use valframe_csvs::{Record, RecordMeta, Schema};
use valframe_sdk::{BusinessRuleValidator, RuleViolation};

/// Station codes accepted as origin or destination.
pub const STATION_CODES: [&str; 6] = ["ABL", "CGO", "CCI", "CLV", "CMB", "CRD"];

pub const SERVICE_TYPES: [&str; 1] = ["Standard"];

/// One shipment row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shipment {
    pub shipment_origin: String,
    pub shipment_destination: String,
    pub pickup_date: NaiveDateTime,
    pub weight: i32,
    pub cube: i32,
    pub service_type: String,
    pub meta: RecordMeta,
}

impl Record for Shipment {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<Shipment>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::builder()
                .text(
                    "ShipmentOrigin",
                    |s: &Shipment| s.shipment_origin.as_str(),
                    |s, v| s.shipment_origin = v,
                )
                .text(
                    "ShipmentDestination",
                    |s: &Shipment| s.shipment_destination.as_str(),
                    |s, v| s.shipment_destination = v,
                )
                .date_time(
                    "PickupDate",
                    |s: &Shipment| s.pickup_date,
                    |s, v| s.pickup_date = v,
                )
                .int32("Weight", |s: &Shipment| s.weight, |s, v| s.weight = v)
                .int32("Cube", |s: &Shipment| s.cube, |s, v| s.cube = v)
                .text(
                    "ServiceType",
                    |s: &Shipment| s.service_type.as_str(),
                    |s, v| s.service_type = v,
                )
                .build()
        })
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}

/// Routing and service rules for shipments.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShipmentRulesValidator;

impl ShipmentRulesValidator {
    fn check(shipment: &Shipment) -> Vec<&'static str> {
        let mut findings = Vec::new();
        if shipment.shipment_origin == shipment.shipment_destination {
            findings.push("Origin and Destination cannot be same");
        }
        if !SERVICE_TYPES.contains(&shipment.service_type.as_str()) {
            findings.push("Invalid service type value");
        }
        if !STATION_CODES.contains(&shipment.shipment_origin.as_str()) {
            findings.push("Invalid origin code");
        }
        if !STATION_CODES.contains(&shipment.shipment_destination.as_str()) {
            findings.push("Invalid destination code");
        }
        findings
    }
}

impl BusinessRuleValidator<Shipment> for ShipmentRulesValidator {
    fn name(&self) -> &str {
        "shipment-rules"
    }

    fn validate(&self, records: &[Shipment]) -> Vec<RuleViolation> {
        records
            .iter()
            .enumerate()
            .flat_map(|(row, shipment)| {
                Self::check(shipment)
                    .into_iter()
                    .map(move |message| RuleViolation::new(row, message))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipment(origin: &str, destination: &str, service_type: &str) -> Shipment {
        Shipment {
            shipment_origin: origin.to_string(),
            shipment_destination: destination.to_string(),
            service_type: service_type.to_string(),
            weight: 100,
            cube: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_shipment_passes() {
        let violations = ShipmentRulesValidator.validate(&[shipment("ABL", "CGO", "Standard")]);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_same_origin_and_destination() {
        let violations = ShipmentRulesValidator.validate(&[
            shipment("ABL", "CGO", "Standard"),
            shipment("CRD", "CRD", "Standard"),
        ]);
        assert_eq!(
            violations,
            vec![RuleViolation::new(1, "Origin and Destination cannot be same")]
        );
    }

    #[test]
    fn test_every_rule_reports_separately() {
        let violations = ShipmentRulesValidator.validate(&[shipment("XYZ", "XYZ", "Express")]);
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Origin and Destination cannot be same",
                "Invalid service type value",
                "Invalid origin code",
                "Invalid destination code",
            ]
        );
        assert!(violations.iter().all(|v| v.row == 0));
    }

    #[test]
    fn test_schema_columns() {
        assert_eq!(
            Shipment::schema().inferred_columns(),
            vec![
                "ShipmentOrigin",
                "ShipmentDestination",
                "PickupDate",
                "Weight",
                "Cube",
                "ServiceType",
                "Description",
            ]
        );
    }
}
