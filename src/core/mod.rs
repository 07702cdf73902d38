//! Core client, models and cross-cutting helpers.

pub mod api;
pub mod blob;
pub mod files;
pub mod http;
pub mod logging;
pub mod models;
pub mod pagination;
pub mod region;
pub mod selector;
pub mod token;

pub use api::{ApiClient, base_url_for};
pub use blob::{BlobUploader, UploadReport, UploadSettings};
pub use models::{Metadata, RobotOutput};
pub use pagination::{PageSource, collect_pages};
pub use region::AzureRegion;
pub use selector::{BuildListSelector, BuildRef, RegionSelection};
pub use token::{CachedToken, Freshness, TokenCache};
