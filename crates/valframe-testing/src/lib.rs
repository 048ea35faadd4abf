mod route_leg;
mod test_workspace;

pub use route_leg::{RouteLeg, SameEndpointsValidator, ROUTE_LEG_HEADER};
pub use test_workspace::TestWorkspace;

use valframe_csvs::CsvConfig;
use valframe_entities::{Shipment, ShipmentRulesValidator, STATION_CODES};
use valframe_sdk::{FileProcessor, ValidatorRegistry};

/// Header of a complete shipment file.
pub const SHIPMENT_HEADER: &str =
    "ShipmentOrigin,ShipmentDestination,PickupDate,Weight,Cube,ServiceType";

/// `count` shipment rows that pass every stage.
///
/// Origins and destinations rotate through the station codes and never
/// coincide.
pub fn valid_shipment_rows(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let origin = STATION_CODES[i % STATION_CODES.len()];
            let destination = STATION_CODES[(i + 1) % STATION_CODES.len()];
            format!(
                "{origin},{destination},2024-05-{:02} 09:30:00,{},{},Standard",
                i % 28 + 1,
                100 + i,
                i % 7 + 1
            )
        })
        .collect()
}

/// Processor with the built-in file/format validators and shipment rules.
pub fn shipment_processor() -> FileProcessor<Shipment> {
    FileProcessor::new(
        ValidatorRegistry::with_defaults()
            .business(ShipmentRulesValidator)
            .build(),
        CsvConfig::default(),
    )
}

/// Processor for [`RouteLeg`] files with the built-in validators and the
/// same-endpoints rule.
pub fn route_leg_processor() -> FileProcessor<RouteLeg> {
    FileProcessor::new(
        ValidatorRegistry::with_defaults()
            .business(SameEndpointsValidator)
            .build(),
        CsvConfig::default(),
    )
}
