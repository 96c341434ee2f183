mod service;

pub use service::{parse_reading, IngestError, IngestionGateway, ValidationError};
