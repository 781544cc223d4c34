pub mod cep;
pub mod patient;
pub mod points;

pub use cep::CepService;
pub use patient::PatientService;
pub use points::PointsLedger;
