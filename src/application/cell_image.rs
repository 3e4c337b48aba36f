//! Per-cell image requests.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::domain::entities::{ImageLoadedEvent, MetadataRecord};
use crate::domain::ports::ImageFetchPort;

/// Loads the image for a visible cell and reports the result as an event.
#[derive(Clone)]
pub struct CellImageLoader {
    images: Arc<dyn ImageFetchPort>,
    events: mpsc::UnboundedSender<ImageLoadedEvent>,
}

impl CellImageLoader {
    #[must_use]
    pub fn new(
        images: Arc<dyn ImageFetchPort>,
        events: mpsc::UnboundedSender<ImageLoadedEvent>,
    ) -> Self {
        Self { images, events }
    }

    /// Starts loading `record`'s small image. The outcome arrives on the event channel.
    pub fn request(&self, record: &MetadataRecord) {
        let images = Arc::clone(&self.images);
        let events = self.events.clone();
        let photo_id = record.id();
        let author = record.author().to_string();
        let url = record.small_url().to_string();

        tokio::spawn(async move {
            let result = images.fetch_image(&url).await;
            match &result {
                Ok(loaded) => trace!(%photo_id, source = %loaded.source, "Cell image ready"),
                Err(e) => debug!(%photo_id, error = %e, "Cell image failed"),
            }

            let event = ImageLoadedEvent {
                photo_id,
                author,
                result,
            };
            if events.send(event).is_err() {
                trace!(%photo_id, "Image event receiver dropped");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ImageSource, LoadedImage};
    use crate::domain::errors::FetchError;
    use crate::domain::ports::mocks::{MockImageFetchPort, records};
    use bytes::Bytes;

    #[tokio::test]
    async fn test_success_is_reported_with_photo_id() {
        let record = records(1).remove(0);
        let mut images = MockImageFetchPort::new();
        images
            .expect_fetch_image()
            .withf(|url: &str| url.ends_with("photo-0?w=400"))
            .times(1)
            .returning(|url| {
                Ok(LoadedImage {
                    url: url.to_string(),
                    image: Arc::new(image::DynamicImage::new_rgb8(1, 1)),
                    bytes: Bytes::new(),
                    source: ImageSource::Cache,
                })
            });
        let (tx, mut rx) = mpsc::unbounded_channel();
        let loader = CellImageLoader::new(Arc::new(images), tx);

        loader.request(&record);
        let event = rx.recv().await.unwrap();

        assert_eq!(event.photo_id, record.id());
        assert_eq!(event.author, "author 0");
        assert_eq!(event.result.unwrap().source, ImageSource::Cache);
    }

    #[tokio::test]
    async fn test_failure_is_reported() {
        let record = records(1).remove(0);
        let mut images = MockImageFetchPort::new();
        images
            .expect_fetch_image()
            .returning(|_| Err(FetchError::Timeout { seconds: 10 }));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let loader = CellImageLoader::new(Arc::new(images), tx);

        loader.request(&record);
        let event = rx.recv().await.unwrap();

        assert_eq!(event.result.unwrap_err(), FetchError::Timeout { seconds: 10 });
    }
}
