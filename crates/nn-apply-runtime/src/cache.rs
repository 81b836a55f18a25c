use crate::annotation::Annotation;

/// Ground-truth annotation of the image currently being worked on.
///
/// Holds at most one image. Moving to another image evicts the previous one, which is what the
/// UI's rollback list reflects.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AnnotationCache {
    #[default]
    Empty,
    Holding {
        image_id: u64,
        annotation: Annotation,
    },
}

impl AnnotationCache {
    /// Fetch the ground truth of `image_id` and keep it as the single resident entry.
    ///
    /// A different resident image is evicted before `fetch` runs. The annotation is always
    /// re-fetched, so the returned value reflects what is stored on the platform right now. If
    /// `fetch` fails the cache is left empty for a new image and untouched for the resident one.
    pub fn get_or_fetch<E>(
        &mut self,
        image_id: u64,
        fetch: impl FnOnce(u64) -> Result<Annotation, E>,
    ) -> Result<Annotation, E> {
        if self.image_id() != Some(image_id) {
            if let Some(evicted) = self.image_id() {
                log::debug!("Evicting cached annotation of image {evicted}");
            }
            *self = AnnotationCache::Empty;
        }

        let annotation = fetch(image_id)?;
        *self = AnnotationCache::Holding {
            image_id,
            annotation: annotation.clone(),
        };

        Ok(annotation)
    }

    pub fn image_id(&self) -> Option<u64> {
        match self {
            AnnotationCache::Empty => None,
            AnnotationCache::Holding { image_id, .. } => Some(*image_id),
        }
    }

    pub fn current(&self) -> Option<&Annotation> {
        match self {
            AnnotationCache::Empty => None,
            AnnotationCache::Holding { annotation, .. } => Some(annotation),
        }
    }

    /// Image ids that can be rolled back, as shown in the UI.
    pub fn keys(&self) -> Vec<u64> {
        self.image_id().into_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, AnnotationCache::Empty)
    }
}
