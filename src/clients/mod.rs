pub mod lab_api;

pub use lab_api::LabApiClient;
