pub mod archive;
pub mod reprocess;
pub mod validate;

use valframe_csvs::CsvConfig;
use valframe_entities::{Shipment, ShipmentRulesValidator};
use valframe_sdk::{FileProcessor, ValidatorRegistry};

/// Shipment processor with the built-in checks and shipment rules.
pub fn shipment_processor(config: CsvConfig) -> FileProcessor<Shipment> {
    FileProcessor::new(
        ValidatorRegistry::with_defaults()
            .business(ShipmentRulesValidator)
            .build(),
        config,
    )
}
