//! Image asset materialization: reconciling the store against a document and
//! generating responsive variants for inline images.

mod reconcile;
mod transcode;
mod variants;

pub use reconcile::{AssetReconciler, KnownVariants, Reconciliation};
pub use transcode::{DecodedImage, TranscodeError, fit_within, output_encoding};
pub use variants::VariantGenerator;
