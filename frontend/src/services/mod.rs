pub mod api;
pub mod masking;
pub mod normalize;
pub mod rest_client;
pub mod sheet_client;
