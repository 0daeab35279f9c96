#![warn(missing_docs)]
//! faledit - batch image editing via the fal.ai flux-2 edit API.
//!
//! Uploads a list of local images to fal.ai storage, submits each to the
//! flux-2 klein edit endpoint with a shared prompt (and optional LoRA style
//! adapter), and downloads the edited results. Processing is strictly
//! sequential with a fixed delay between items.
//!
//! # Quick Start
//!
//! ```no_run
//! use faledit::{BatchRunner, EditClient, Settings, SourceImage, UploadClient};
//!
//! #[tokio::main]
//! async fn main() -> faledit::Result<()> {
//!     let settings = Settings {
//!         api_key: "fal-key".into(),
//!         prompt: "make it watercolor".into(),
//!         lora: String::new(),
//!     };
//!     let files = vec![SourceImage::open("photo.jpg")?];
//!     let runner = BatchRunner::new(
//!         UploadClient::new(&settings.api_key),
//!         EditClient::new(&settings.api_key),
//!     );
//!     let outcome = runner
//!         .process_all(&files, &settings, |p| println!("{p}"))
//!         .await;
//!     for result in &outcome.results {
//!         println!("{} -> {}", result.filename, result.url);
//!     }
//!     Ok(())
//! }
//! ```

mod batch;
mod download;
mod edit;
mod error;
mod settings;
mod types;
mod upload;

pub use batch::{BatchOutcome, BatchRunner, ITEM_DELAY};
pub use download::{DownloadOutcome, Downloader};
pub use edit::{
    EditClient, EditImage, EditOutput, EditRequest, Editor, EDIT_ENDPOINT, EDIT_LORA_ENDPOINT,
};
pub use error::{sanitize_error_message, FalEditError, Result};
pub use settings::{Settings, SettingsStore, CACHE_FILE};
pub use types::{derive_output_filename, GenerationResult, SourceImage, GENERATED_SUFFIX};
pub use upload::{UploadClient, Uploader, UPLOAD_ENDPOINT};
