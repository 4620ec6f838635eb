use crate::{Result, backend::SliceBackend, log_debug, log_info, log_warn};
use serde::{Deserialize, Serialize};

/// A backend-managed base disk image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: u64,
    pub name: String,
}

impl Image {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Read-only list of images fetched from the backend at startup.
#[derive(Debug, Clone, Default)]
pub struct ImageCatalog {
    images: Vec<Image>,
}

impl ImageCatalog {
    pub fn new(images: Vec<Image>) -> Self {
        Self { images }
    }

    /// Fetch the catalog once. On success the list is replaced wholesale; on
    /// failure it is left empty and the error is handed back to the caller
    /// for reporting. No retry.
    pub async fn load<B: SliceBackend + ?Sized>(&mut self, backend: &B) -> Result<usize> {
        match backend.fetch_images().await {
            Ok(images) => {
                log_info!("Loaded {} image(s) from the backend", images.len());
                log_debug!("Images: {:?}", images);
                self.images = images;
                Ok(self.images.len())
            }
            Err(err) => {
                log_warn!("Failed to load images: {}", err);
                self.images.clear();
                Err(err)
            }
        }
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn get(&self, id: u64) -> Option<&Image> {
        self.images.iter().find(|img| img.id == id)
    }

    /// 1-based menu pick, as shown by [`ImageCatalog::menu`].
    pub fn by_choice(&self, choice: usize) -> Option<&Image> {
        choice.checked_sub(1).and_then(|idx| self.images.get(idx))
    }

    /// Look up by numeric id first, then by case-insensitive name.
    pub fn resolve(&self, reference: &str) -> Option<&Image> {
        let reference = reference.trim();
        if let Ok(id) = reference.parse::<u64>() {
            if let Some(image) = self.get(id) {
                return Some(image);
            }
        }
        self.images
            .iter()
            .find(|img| img.name.eq_ignore_ascii_case(reference))
    }

    pub fn menu(&self) -> String {
        let mut menu = String::from("Select the base image:\n");
        for (idx, image) in self.images.iter().enumerate() {
            menu.push_str(&format!("  {}) {}\n", idx + 1, image.name));
        }
        menu
    }
}
