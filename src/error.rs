use thiserror::Error;

pub type FleetResult<T> = Result<T, FleetError>;

#[derive(Error, Debug)]
pub enum FleetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook error: {0}. Vérifiez le format Excel.")]
    Workbook(String),

    #[error("Feuille '{0}' manquante")]
    MissingSheet(String),

    #[error("Aucune direction sélectionnée valide")]
    NoVehicles,

    #[error("Véhicule inconnu: {0}")]
    UnknownVehicle(String),

    #[error("Unknown file id: {0}")]
    UnknownFile(String),

    #[error("Unknown chart: {0}")]
    UnknownChart(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Chart rendering error: {0}")]
    Chart(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<calamine::XlsxError> for FleetError {
    fn from(e: calamine::XlsxError) -> Self {
        FleetError::Workbook(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for FleetError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        FleetError::Export(e.to_string())
    }
}
