use thiserror::Error;

#[derive(Error, Debug)]
pub enum PricingError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("No elasticity for model '{model}' (sku {sku_id})")]
    MissingElasticity { sku_id: String, model: String },

    #[error("No unit cost for sku {sku_id}")]
    MissingCost { sku_id: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    InputData,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl PricingError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PricingError::ConfigValidationError { .. }
            | PricingError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            PricingError::CsvError(_)
            | PricingError::MissingElasticity { .. }
            | PricingError::MissingCost { .. }
            | PricingError::ProcessingError { .. } => ErrorCategory::InputData,
            PricingError::ZipError(_) | PricingError::SerializationError(_) => {
                ErrorCategory::Output
            }
            PricingError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::InputData => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            PricingError::ConfigValidationError { field, .. }
            | PricingError::InvalidConfigValueError { field, .. } => {
                format!("Check the '{}' setting in the TOML file or CLI flags", field)
            }
            PricingError::MissingElasticity { model, .. } => {
                format!("Add a row for model '{}' to the elasticity table", model)
            }
            PricingError::MissingCost { sku_id } => {
                format!("Add a unit_cost row for sku '{}' to the cost table", sku_id)
            }
            PricingError::CsvError(_) => {
                "Verify the CSV headers and that numeric columns contain numbers".to_string()
            }
            PricingError::ProcessingError { .. } => "Inspect the input tables".to_string(),
            PricingError::IoError(_) => {
                "Make sure the input files exist and the output directory is writable".to_string()
            }
            PricingError::ZipError(_) | PricingError::SerializationError(_) => {
                "Retry, or disable the bundle/calibration output in [load]".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::InputData => format!("Input data problem: {}", self),
            ErrorCategory::Output => format!("Could not write results: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, PricingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_errors_are_high_severity() {
        let err = PricingError::MissingCost {
            sku_id: "SKU-1".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::InputData);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("SKU-1"));
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err = PricingError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().starts_with("System error"));
    }
}
