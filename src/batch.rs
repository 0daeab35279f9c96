//! Sequential batch orchestration: upload then edit, one file at a time.

use crate::edit::{EditRequest, Editor};
use crate::settings::Settings;
use crate::types::{derive_output_filename, GenerationResult, SourceImage};
use crate::upload::Uploader;
use std::time::Duration;

/// Fixed wall-clock suspension between consecutive items, a crude mitigation
/// for the service's rate limits.
pub const ITEM_DELAY: Duration = Duration::from_secs(2);

/// State accumulated by one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Successfully edited images, in input order.
    pub results: Vec<GenerationResult>,
    /// Last progress string emitted ("Processing complete!" or "Error: ...").
    pub progress: String,
}

/// Drives the upload and edit clients over a file list, strictly one file at
/// a time.
pub struct BatchRunner<U, E> {
    uploader: U,
    editor: E,
    delay: Duration,
}

impl<U: Uploader, E: Editor> BatchRunner<U, E> {
    /// Creates a runner with the standard inter-item delay.
    pub fn new(uploader: U, editor: E) -> Self {
        Self {
            uploader,
            editor,
            delay: ITEM_DELAY,
        }
    }

    /// Processes every file in order, reporting each phase transition through
    /// `on_progress`.
    ///
    /// The first upload or edit failure aborts the remaining files; results
    /// accumulated up to that point are retained and the error's message is
    /// surfaced verbatim in the progress string. An empty file list or empty
    /// API key is a silent no-op performing zero network calls.
    pub async fn process_all(
        &self,
        files: &[SourceImage],
        settings: &Settings,
        mut on_progress: impl FnMut(&str) + Send,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        if files.is_empty() || settings.api_key.is_empty() {
            return outcome;
        }

        let total = files.len();
        for (index, file) in files.iter().enumerate() {
            let step = async {
                self.set_progress(
                    &mut outcome,
                    &mut on_progress,
                    format!("Uploading {} ({}/{})", file.name, index + 1, total),
                );
                let source_url = self.uploader.upload(file).await?;

                self.set_progress(
                    &mut outcome,
                    &mut on_progress,
                    format!("Processing {} ({}/{})", file.name, index + 1, total),
                );
                let request = EditRequest::new(source_url, &settings.prompt, file.width, file.height)
                    .with_lora(&settings.lora);
                self.editor.edit(&request).await
            };

            let step_result = step.await;
            match step_result {
                Ok(output) => {
                    if let Some(image) = output.images.into_iter().next() {
                        outcome.results.push(GenerationResult {
                            filename: derive_output_filename(&file.name),
                            url: image.url,
                            seed: output.seed.unwrap_or(0),
                        });
                    } else {
                        tracing::warn!(file = %file.name, "edit returned no images, skipping");
                    }
                }
                Err(e) => {
                    self.set_progress(&mut outcome, &mut on_progress, format!("Error: {e}"));
                    return outcome;
                }
            }

            if index + 1 < total {
                tokio::time::sleep(self.delay).await;
            }
        }

        self.set_progress(&mut outcome, &mut on_progress, "Processing complete!".into());
        outcome
    }

    fn set_progress(
        &self,
        outcome: &mut BatchOutcome,
        on_progress: &mut impl FnMut(&str),
        message: String,
    ) {
        on_progress(&message);
        outcome.progress = message;
    }
}
