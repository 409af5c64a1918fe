//! COCO format data structures and the per-split assembler
//!
//! This module owns the records written to `annotations/<split>.json` and the
//! ID counters that number them.

use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;

/// The single category every annotation belongs to
pub const CATEGORY_ID: u32 = 0;
pub const CATEGORY_NAME: &str = "component";

/// COCO category information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
}

impl Default for Category {
    fn default() -> Self {
        Self {
            id: CATEGORY_ID,
            name: CATEGORY_NAME.to_string(),
        }
    }
}

/// COCO image information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: u32,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

impl Image {
    pub fn new(id: u32, file_name: String, width: u32, height: u32) -> Self {
        Self {
            id,
            file_name,
            width,
            height,
        }
    }
}

/// COCO annotation information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: u32,
    pub image_id: u32,
    pub category_id: u32,
    pub bbox: BoundingBox, // [x, y, width, height]
    pub area: f64,
    pub iscrowd: u32,
}

impl Annotation {
    pub fn new(id: u32, image_id: u32, bbox: BoundingBox) -> Self {
        Self {
            id,
            image_id,
            category_id: CATEGORY_ID,
            bbox,
            area: bbox.area(),
            iscrowd: 0,
        }
    }
}

/// Complete document of one split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CocoFile {
    pub images: Vec<Image>,
    pub annotations: Vec<Annotation>,
    pub categories: Vec<Category>,
}

impl Default for CocoFile {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            annotations: Vec::new(),
            categories: vec![Category::default()],
        }
    }
}

impl CocoFile {
    /// File name of the image with the given ID
    pub fn file_name_of(&self, image_id: u32) -> Option<&str> {
        self.images
            .iter()
            .find(|image| image.id == image_id)
            .map(|image| image.file_name.as_str())
    }

    /// Annotations belonging to the given image, in document order
    pub fn annotations_of(&self, image_id: u32) -> impl Iterator<Item = &Annotation> {
        self.annotations
            .iter()
            .filter(move |ann| ann.image_id == image_id)
    }
}

/// Next IDs to hand out. Passed from one assembler to the next when IDs
/// must stay unique across splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdCursor {
    pub next_image_id: u32,
    pub next_annotation_id: u32,
}

impl Default for IdCursor {
    fn default() -> Self {
        Self {
            next_image_id: 1,
            next_annotation_id: 1,
        }
    }
}

/// Accumulates the records of one split
#[derive(Debug, Clone, Default)]
pub struct CocoAssembler {
    cursor: IdCursor,
    images: Vec<Image>,
    annotations: Vec<Annotation>,
}

impl CocoAssembler {
    /// Create an assembler numbering images and annotations from 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an assembler continuing the sequences of `cursor`
    pub fn starting_at(cursor: IdCursor) -> Self {
        Self {
            cursor,
            images: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// IDs the next `add_image` / `add_annotation` calls will return
    pub fn cursor(&self) -> IdCursor {
        self.cursor
    }

    /// Add an image and return its ID
    pub fn add_image(&mut self, file_name: String, width: u32, height: u32) -> u32 {
        let image_id = self.cursor.next_image_id;
        self.cursor.next_image_id += 1;
        self.images
            .push(Image::new(image_id, file_name, width, height));
        image_id
    }

    /// Add an annotation of an already added image and return its ID
    pub fn add_annotation(&mut self, image_id: u32, bbox: BoundingBox) -> u32 {
        debug_assert!(
            self.images.iter().any(|image| image.id == image_id),
            "annotation references unknown image {}",
            image_id
        );
        let annotation_id = self.cursor.next_annotation_id;
        self.cursor.next_annotation_id += 1;
        self.annotations
            .push(Annotation::new(annotation_id, image_id, bbox));
        annotation_id
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Build the complete document of this split
    pub fn serialize(&self) -> CocoFile {
        CocoFile {
            images: self.images.clone(),
            annotations: self.annotations.clone(),
            categories: vec![Category::default()],
        }
    }
}
