use chrono::NaiveDateTime;
use std::sync::OnceLock;
use valframe_csvs::{Record, RecordMeta, Schema};
use valframe_sdk::{BusinessRuleValidator, RuleViolation};

pub const ROUTE_LEG_HEADER: &str = "Origin,Destination,PickupDate,Weight";

/// Minimal four-column record used by the pipeline scenarios.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteLeg {
    pub origin: String,
    pub destination: String,
    pub pickup_date: NaiveDateTime,
    pub weight: i32,
    pub meta: RecordMeta,
}

impl Record for RouteLeg {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<RouteLeg>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::builder()
                .text("Origin", |r: &RouteLeg| r.origin.as_str(), |r, v| r.origin = v)
                .text(
                    "Destination",
                    |r: &RouteLeg| r.destination.as_str(),
                    |r, v| r.destination = v,
                )
                .date_time(
                    "PickupDate",
                    |r: &RouteLeg| r.pickup_date,
                    |r, v| r.pickup_date = v,
                )
                .int32("Weight", |r: &RouteLeg| r.weight, |r, v| r.weight = v)
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

/// Flags legs whose origin equals their destination.
#[derive(Debug, Clone, Copy, Default)]
pub struct SameEndpointsValidator;

impl BusinessRuleValidator<RouteLeg> for SameEndpointsValidator {
    fn name(&self) -> &str {
        "same-endpoints"
    }

    fn validate(&self, records: &[RouteLeg]) -> Vec<RuleViolation> {
        records
            .iter()
            .enumerate()
            .filter(|(_, leg)| leg.origin == leg.destination)
            .map(|(row, _)| RuleViolation::new(row, "Origin and Destination cannot be same"))
            .collect()
    }
}
