//! The export/share boundary.
//!
//! The creation flow hands an owned snapshot of the finished bouquet to a
//! [`ShareController`], which talks to three collaborators:
//!
//! ```text
//!                 ┌────────────────────┐
//!  layout ──────▶ │ SurfaceRasterizer  │ ──▶ ImageArtifact ──▶ DeliveryTarget
//!                 └────────────────────┘                        (share | download)
//!                 ┌────────────────────┐
//!  composition ─▶ │ BouquetPersistence │ ──▶ ShareId  (or OfferDownload on failure)
//!                 └────────────────────┘
//! ```
//!
//! At most one request is in flight per controller. Requests are never
//! cancelled; calling [`ShareController::supersede`] makes results that
//! arrive afterwards resolve to [`ExportOutcome::Discarded`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use base64::Engine;
use bouquet_core::{BouquetLayout, Composition, Language, ShareId, SharePayload};

use crate::error::{ExportError, ExportResult};
use crate::export::{BouquetExporter, ExportFormat};

/// Filename offered for downloaded cards.
pub const DOWNLOAD_FILENAME: &str = "my-digibouquet.png";

/// An encoded card image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArtifact {
    /// Encoded bytes.
    pub bytes: Vec<u8>,
    /// Encoding of `bytes`.
    pub format: ExportFormat,
}

impl ImageArtifact {
    /// Wrap encoded bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>, format: ExportFormat) -> Self {
        Self { bytes, format }
    }

    /// The image as a base64 `data:` URL.
    #[must_use]
    pub fn data_url(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{encoded}", self.format.mime_type())
    }

    /// Filename to offer when downloading.
    #[must_use]
    pub fn filename(&self) -> String {
        match self.format {
            ExportFormat::Png => DOWNLOAD_FILENAME.to_string(),
            other => format!("my-digibouquet.{}", other.extension()),
        }
    }
}

/// Turns a render plan into an encoded image.
#[async_trait]
pub trait SurfaceRasterizer: Send + Sync {
    /// Render `layout` to an image.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be produced.
    async fn rasterize(&self, layout: &BouquetLayout) -> ExportResult<ImageArtifact>;
}

#[async_trait]
impl SurfaceRasterizer for BouquetExporter {
    /// Renders on the blocking pool; resvg is CPU-bound.
    async fn rasterize(&self, layout: &BouquetLayout) -> ExportResult<ImageArtifact> {
        let exporter = self.clone();
        let layout = layout.clone();
        let bytes = tokio::task::spawn_blocking(move || exporter.render_to_png(&layout))
            .await
            .map_err(|e| ExportError::ImageGeneration(e.to_string()))??;
        Ok(ImageArtifact::new(bytes, ExportFormat::Png))
    }
}

/// Stores shared bouquets and hands out identifiers for them.
#[async_trait]
pub trait BouquetPersistence: Send + Sync {
    /// Store a share record.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Persistence`] if the record cannot be stored.
    async fn insert(&self, payload: SharePayload) -> ExportResult<ShareId>;

    /// Fetch a share record by id.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Persistence`] if the store cannot be read.
    async fn fetch(&self, id: &ShareId) -> ExportResult<Option<SharePayload>>;
}

/// Platform hand-off for a finished image.
#[async_trait]
pub trait DeliveryTarget: Send + Sync {
    /// Whether the platform offers a native share mechanism.
    fn supports_share(&self) -> bool;

    /// Hand the image to the platform share mechanism.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Delivery`] if the share fails.
    async fn share(&self, artifact: &ImageArtifact) -> ExportResult<()>;

    /// Save the image as a file download.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Delivery`] if the download fails.
    async fn download(&self, artifact: &ImageArtifact, filename: &str) -> ExportResult<()>;
}

/// Result of a request that may have been superseded while pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome<T> {
    /// The request finished and its result is still wanted.
    Completed(T),
    /// The user navigated away before the request finished.
    Discarded,
}

impl<T> ExportOutcome<T> {
    /// The completed value, if any.
    #[must_use]
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Discarded => None,
        }
    }
}

/// What the share action resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareResolution {
    /// The bouquet was stored and can be linked to.
    Link(ShareId),
    /// Sharing is unavailable; the download path remains.
    OfferDownload,
}

/// How an image reached the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Through the platform share mechanism.
    Shared,
    /// As a file download.
    Downloaded,
}

/// Coordinates export and share requests for one creation session.
pub struct ShareController<R, P> {
    rasterizer: R,
    persistence: P,
    in_flight: AtomicBool,
    epoch: AtomicU64,
}

/// Clears the in-flight flag when dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<R: SurfaceRasterizer, P: BouquetPersistence> ShareController<R, P> {
    /// Create a controller over the given collaborators.
    #[must_use]
    pub fn new(rasterizer: R, persistence: P) -> Self {
        Self {
            rasterizer,
            persistence,
            in_flight: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
        }
    }

    /// The rasterizer collaborator.
    #[must_use]
    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// The persistence collaborator.
    #[must_use]
    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Whether a request is pending. UIs disable their controls while true.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Mark pending results as unwanted (the user left the share stage).
    pub fn supersede(&self) {
        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!("Share requests superseded (epoch {epoch})");
    }

    /// Render the card image.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Busy`] if another request is pending, or
    /// [`ExportError::ImageGeneration`] if rendering fails. Failures are not
    /// retried.
    pub async fn request_image(
        &self,
        layout: &BouquetLayout,
    ) -> ExportResult<ExportOutcome<ImageArtifact>> {
        let (_guard, epoch) = self.begin()?;

        let result = self.rasterizer.rasterize(layout).await;
        if self.is_superseded(epoch) {
            return Ok(ExportOutcome::Discarded);
        }

        match result {
            Ok(artifact) => {
                tracing::info!("Rendered card image ({} bytes)", artifact.bytes.len());
                Ok(ExportOutcome::Completed(artifact))
            }
            Err(e) => {
                tracing::warn!("Card image generation failed: {e}");
                Err(match e {
                    ExportError::ImageGeneration(_) => e,
                    other => ExportError::ImageGeneration(other.to_string()),
                })
            }
        }
    }

    /// Persist the bouquet and obtain a share identifier.
    ///
    /// Persistence failures resolve to [`ShareResolution::OfferDownload`]
    /// rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Busy`] if another request is pending.
    pub async fn request_share_identifier(
        &self,
        composition: &Composition,
        language: Language,
    ) -> ExportResult<ExportOutcome<ShareResolution>> {
        let (_guard, epoch) = self.begin()?;

        let payload = SharePayload::new(composition, language);
        let result = self.persistence.insert(payload).await;
        if self.is_superseded(epoch) {
            return Ok(ExportOutcome::Discarded);
        }

        let resolution = match result {
            Ok(id) => {
                tracing::info!("Bouquet shared as {id}");
                ShareResolution::Link(id)
            }
            Err(e) => {
                tracing::warn!("Sharing unavailable, offering download: {e}");
                ShareResolution::OfferDownload
            }
        };
        Ok(ExportOutcome::Completed(resolution))
    }

    /// Hand a finished image to the user.
    ///
    /// Uses the platform share mechanism when available and falls back to a
    /// download named [`DOWNLOAD_FILENAME`] otherwise or if sharing fails.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Delivery`] if the download also fails.
    pub async fn deliver(
        &self,
        artifact: &ImageArtifact,
        target: &dyn DeliveryTarget,
    ) -> ExportResult<Delivery> {
        if target.supports_share() {
            match target.share(artifact).await {
                Ok(()) => return Ok(Delivery::Shared),
                Err(e) => tracing::warn!("Platform share failed, downloading instead: {e}"),
            }
        }
        target.download(artifact, &artifact.filename()).await?;
        Ok(Delivery::Downloaded)
    }

    /// Claim the in-flight slot. The epoch is read first so a `supersede`
    /// racing with the claim still discards this request's result.
    fn begin(&self) -> ExportResult<(InFlight<'_>, u64)> {
        let epoch = self.epoch.load(Ordering::Acquire);
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::Busy)?;
        Ok((InFlight(&self.in_flight), epoch))
    }

    fn is_superseded(&self, epoch: u64) -> bool {
        let current = self.epoch.load(Ordering::Acquire);
        if current != epoch {
            tracing::debug!("Discarding result from epoch {epoch} (now {current})");
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use bouquet_core::{FlowerCatalog, FlowerId};

    struct FixedRasterizer;

    #[async_trait]
    impl SurfaceRasterizer for FixedRasterizer {
        async fn rasterize(&self, _layout: &BouquetLayout) -> ExportResult<ImageArtifact> {
            Ok(ImageArtifact::new(vec![1, 2, 3], ExportFormat::Png))
        }
    }

    struct FailingRasterizer;

    #[async_trait]
    impl SurfaceRasterizer for FailingRasterizer {
        async fn rasterize(&self, _layout: &BouquetLayout) -> ExportResult<ImageArtifact> {
            Err(ExportError::Encode("boom".to_string()))
        }
    }

    #[derive(Default)]
    struct MemoryPersistence {
        records: Mutex<Vec<SharePayload>>,
        offline: bool,
    }

    #[async_trait]
    impl BouquetPersistence for MemoryPersistence {
        async fn insert(&self, payload: SharePayload) -> ExportResult<ShareId> {
            if self.offline {
                return Err(ExportError::Persistence("offline".to_string()));
            }
            self.records.lock().expect("lock").push(payload);
            Ok(ShareId::generate())
        }

        async fn fetch(&self, _id: &ShareId) -> ExportResult<Option<SharePayload>> {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct RecordingTarget {
        can_share: bool,
        share_fails: bool,
        downloads: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DeliveryTarget for RecordingTarget {
        fn supports_share(&self) -> bool {
            self.can_share
        }

        async fn share(&self, _artifact: &ImageArtifact) -> ExportResult<()> {
            if self.share_fails {
                Err(ExportError::Delivery("cancelled".to_string()))
            } else {
                Ok(())
            }
        }

        async fn download(&self, _artifact: &ImageArtifact, filename: &str) -> ExportResult<()> {
            self.downloads.lock().expect("lock").push(filename.to_string());
            Ok(())
        }
    }

    fn composition() -> Composition {
        let catalog = FlowerCatalog::builtin();
        let entry = catalog.get(FlowerId(1)).expect("builtin flower");
        (0..6).fold(Composition::new("mono"), |c, _| c.with_flower_added(entry))
    }

    fn layout() -> BouquetLayout {
        BouquetLayout::compose(&composition(), &FlowerCatalog::builtin(), Language::Arabic)
    }

    #[test]
    fn test_supersede_after_claim_discards() {
        let controller = ShareController::new(FixedRasterizer, MemoryPersistence::default());
        let (guard, epoch) = controller.begin().expect("idle");
        assert!(controller.is_busy());
        controller.supersede();
        assert!(controller.is_superseded(epoch));
        drop(guard);
        assert!(!controller.is_busy());

        let (_guard, epoch) = controller.begin().expect("idle again");
        assert!(!controller.is_superseded(epoch));
    }

    #[test]
    fn test_artifact_data_url_and_filename() {
        let artifact = ImageArtifact::new(b"abc".to_vec(), ExportFormat::Png);
        assert_eq!(artifact.data_url(), "data:image/png;base64,YWJj");
        assert_eq!(artifact.filename(), "my-digibouquet.png");
        let jpeg = ImageArtifact::new(Vec::new(), ExportFormat::Jpeg);
        assert_eq!(jpeg.filename(), "my-digibouquet.jpg");
    }

    #[tokio::test]
    async fn test_image_request_completes() {
        let controller = ShareController::new(FixedRasterizer, MemoryPersistence::default());
        let outcome = controller.request_image(&layout()).await.expect("image");
        assert_eq!(
            outcome.completed().map(|a| a.bytes),
            Some(vec![1, 2, 3])
        );
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_image_failure_is_reported_as_generation_error() {
        let controller = ShareController::new(FailingRasterizer, MemoryPersistence::default());
        let result = controller.request_image(&layout()).await;
        assert!(matches!(result, Err(ExportError::ImageGeneration(_))));
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_share_stores_tagged_record() {
        let controller = ShareController::new(FixedRasterizer, MemoryPersistence::default());
        let outcome = controller
            .request_share_identifier(&composition(), Language::English)
            .await
            .expect("share");
        assert!(matches!(
            outcome,
            ExportOutcome::Completed(ShareResolution::Link(_))
        ));

        let records = controller.persistence().records.lock().expect("lock");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record().mode(), "mono&lang=en");
    }

    #[tokio::test]
    async fn test_share_failure_offers_download() {
        let persistence = MemoryPersistence {
            offline: true,
            ..Default::default()
        };
        let controller = ShareController::new(FixedRasterizer, persistence);
        let outcome = controller
            .request_share_identifier(&composition(), Language::Arabic)
            .await
            .expect("share");
        assert_eq!(
            outcome,
            ExportOutcome::Completed(ShareResolution::OfferDownload)
        );
    }

    #[tokio::test]
    async fn test_deliver_prefers_share() {
        let controller = ShareController::new(FixedRasterizer, MemoryPersistence::default());
        let artifact = ImageArtifact::new(vec![0], ExportFormat::Png);
        let target = RecordingTarget {
            can_share: true,
            ..Default::default()
        };
        let delivery = controller.deliver(&artifact, &target).await.expect("deliver");
        assert_eq!(delivery, Delivery::Shared);
        assert!(target.downloads.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn test_deliver_falls_back_to_download() {
        let controller = ShareController::new(FixedRasterizer, MemoryPersistence::default());
        let artifact = ImageArtifact::new(vec![0], ExportFormat::Png);

        for target in [
            RecordingTarget::default(),
            RecordingTarget {
                can_share: true,
                share_fails: true,
                ..Default::default()
            },
        ] {
            let delivery = controller.deliver(&artifact, &target).await.expect("deliver");
            assert_eq!(delivery, Delivery::Downloaded);
            assert_eq!(
                *target.downloads.lock().expect("lock"),
                vec![DOWNLOAD_FILENAME.to_string()]
            );
        }
    }
}
