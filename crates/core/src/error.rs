#[derive(Debug, thiserror::Error)]
pub enum HealthMdError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid reference date '{value}': expected YYYY-MM-DD or RFC 3339")]
    InvalidReferenceDate { value: String },
    #[error("failed to serialize record: {0}")]
    Serialization(serde_json::Error),
    #[error("FHIR export error: {0}")]
    Fhir(#[from] fhir::FhirError),
}

pub type HealthMdResult<T> = std::result::Result<T, HealthMdError>;
