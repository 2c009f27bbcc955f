use std::sync::Arc;

use bytes::Bytes;
use metrics::counter;
use tokio::task;
use tracing::{debug, info, warn};

use crate::application::metrics::{VARIANT_FAILED, VARIANT_UPLOADED};
use crate::application::repos::{AssetStore, FetchedImage, ImageFetcher};
use crate::domain::assets::{AssetName, ImageEncoding, Variant, VariantSize};
use crate::domain::document::DocumentId;

use super::transcode::{self, DecodedImage, TranscodeError};

const SOURCE: &str = "docweave::application::assets::variants";

/// Produces the large/small/tiny variants of one inline image.
///
/// Generation is fail-soft: any variant that cannot be fetched, encoded or
/// uploaded is logged and left out of the result.
#[derive(Clone)]
pub struct VariantGenerator {
    store: Arc<dyn AssetStore>,
    fetcher: Arc<dyn ImageFetcher>,
}

impl VariantGenerator {
    pub fn new(store: Arc<dyn AssetStore>, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self { store, fetcher }
    }

    pub async fn generate(
        &self,
        document_id: &DocumentId,
        object_id: &str,
        source_uri: &str,
    ) -> Vec<Variant> {
        let image = match self.fetcher.fetch(source_uri).await {
            Ok(image) => image,
            Err(err) => {
                warn!(
                    target = SOURCE,
                    document_id = %document_id,
                    object_id,
                    error = %err,
                    "failed to fetch inline image"
                );
                counter!(VARIANT_FAILED, "stage" => "fetch").increment(1);
                return Vec::new();
            }
        };

        let encoding =
            transcode::output_encoding(image.content_type.as_deref(), image.data.as_ref());

        let terminal = AssetName::new(document_id, object_id, VariantSize::terminal(), encoding);
        match self.store.exists(&terminal.path()).await {
            Ok(true) => {
                debug!(
                    target = SOURCE,
                    document_id = %document_id,
                    object_id,
                    "variants already materialized"
                );
                return self.deterministic_variants(document_id, object_id, encoding);
            }
            Ok(false) => {}
            Err(err) => {
                warn!(
                    target = SOURCE,
                    document_id = %document_id,
                    object_id,
                    error = %err,
                    "failed to check terminal variant; regenerating"
                );
            }
        }

        let decoded = match decode(image, encoding).await {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!(
                    target = SOURCE,
                    document_id = %document_id,
                    object_id,
                    error = %err,
                    "failed to decode inline image"
                );
                counter!(VARIANT_FAILED, "stage" => "decode").increment(1);
                return Vec::new();
            }
        };

        let mut variants = Vec::with_capacity(VariantSize::ALL.len());
        for size in VariantSize::ALL {
            let name = AssetName::new(document_id, object_id, size, encoding);
            let encoded = match encode(Arc::clone(&decoded), size.width()).await {
                Ok(encoded) => encoded,
                Err(err) => {
                    warn!(
                        target = SOURCE,
                        asset = %name,
                        error = %err,
                        "failed to encode variant"
                    );
                    counter!(VARIANT_FAILED, "stage" => "encode").increment(1);
                    continue;
                }
            };

            match self
                .store
                .put(&name.path(), Bytes::from(encoded), encoding.content_type())
                .await
            {
                Ok(url) => {
                    counter!(VARIANT_UPLOADED).increment(1);
                    variants.push(Variant {
                        width: size.width(),
                        url,
                    });
                }
                Err(err) => {
                    warn!(
                        target = SOURCE,
                        asset = %name,
                        error = %err,
                        "failed to upload variant"
                    );
                    counter!(VARIANT_FAILED, "stage" => "upload").increment(1);
                }
            }
        }

        info!(
            target = SOURCE,
            document_id = %document_id,
            object_id,
            generated = variants.len(),
            "generated image variants"
        );
        variants
    }

    fn deterministic_variants(
        &self,
        document_id: &DocumentId,
        object_id: &str,
        encoding: ImageEncoding,
    ) -> Vec<Variant> {
        VariantSize::ALL
            .into_iter()
            .map(|size| Variant {
                width: size.width(),
                url: self
                    .store
                    .public_url(&AssetName::new(document_id, object_id, size, encoding).path()),
            })
            .collect()
    }
}

async fn decode(
    image: FetchedImage,
    encoding: ImageEncoding,
) -> Result<Arc<DecodedImage>, TranscodeError> {
    task::spawn_blocking(move || DecodedImage::decode(&image.data, encoding))
        .await
        .map_err(|err| TranscodeError::Task(err.to_string()))?
        .map(Arc::new)
}

async fn encode(image: Arc<DecodedImage>, bound: u32) -> Result<Vec<u8>, TranscodeError> {
    task::spawn_blocking(move || image.encode_variant(bound))
        .await
        .map_err(|err| TranscodeError::Task(err.to_string()))?
}
