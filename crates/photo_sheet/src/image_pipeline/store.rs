use std::sync::Arc;

use image::{DynamicImage, GenericImageView};

/// Shared reference to one decoded image.
///
/// Cloning a handle never copies pixel data.
#[derive(Clone, Debug)]
pub struct ImageHandle {
    label: Arc<str>,
    image: Arc<DynamicImage>,
}

impl ImageHandle {
    pub fn new(label: impl Into<Arc<str>>, image: DynamicImage) -> Self {
        Self { label: label.into(), image: Arc::new(image) }
    }

    /// Name the image was submitted under.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Two handles are equal when they point at the same decoded image.
impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
    }
}

impl Eq for ImageHandle {}

/// Ordered collection of every image loaded so far.
#[derive(Clone, Debug, Default)]
pub struct ImageStore {
    images: Vec<ImageHandle>,
}

impl ImageStore {
    /// Appends a whole batch, keeping the batch order.
    pub fn append<I>(&mut self, batch: I)
    where
        I: IntoIterator<Item = ImageHandle>,
    {
        self.images.extend(batch);
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }

    pub fn snapshot(&self) -> &[ImageHandle] {
        &self.images
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(label: &str) -> ImageHandle {
        ImageHandle::new(label, DynamicImage::new_rgb8(2, 3))
    }

    #[test]
    fn append_keeps_order_and_duplicates() {
        let mut store = ImageStore::default();
        let a = handle("a.png");
        store.append([a.clone()]);
        store.append([handle("b.png"), a]);

        let labels: Vec<_> = store.snapshot().iter().map(ImageHandle::label).collect();
        assert_eq!(labels, vec!["a.png", "b.png", "a.png"]);
    }

    #[test]
    fn clear_empties_the_store() {
        let mut store = ImageStore::default();
        store.append([handle("a.png"), handle("b.png")]);
        assert_eq!(store.snapshot().len(), 2);

        store.clear();
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn handles_share_pixels() {
        let a = handle("a.png");
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, handle("a.png"));
        assert_eq!(b.dimensions(), (2, 3));
    }
}
