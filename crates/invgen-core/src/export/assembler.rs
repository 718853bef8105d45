//! PDF assembly with lopdf.

use std::rc::Rc;

use image::RgbaImage;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use tracing::{debug, trace};

use super::{PageSize, PdfAssembler, Placement, Result};
use crate::error::ExportError;

const POINTS_PER_MM: f64 = 72.0 / 25.4;

/// Portrait, millimetre-unit PDF assembler.
///
/// Each image is embedded once as an RGB XObject and referenced from every
/// page that draws it. Images are matched by `Rc` identity; the assembler
/// keeps them alive until it is finished.
pub struct LopdfAssembler {
    document: Document,
    page_size: PageSize,
    pages: Vec<PageContent>,
    images: Vec<(Rc<RgbaImage>, ObjectId)>,
}

#[derive(Default)]
struct PageContent {
    operations: Vec<Operation>,
    xobjects: Vec<(String, ObjectId)>,
}

impl LopdfAssembler {
    /// Create an assembler for A4 portrait pages.
    pub fn a4() -> Self {
        Self::new(PageSize::A4)
    }

    pub fn new(page_size: PageSize) -> Self {
        Self {
            document: Document::with_version("1.5"),
            page_size,
            pages: vec![PageContent::default()],
            images: Vec::new(),
        }
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn embed(&mut self, image: &Rc<RgbaImage>) -> Result<ObjectId> {
        if let Some((_, id)) = self.images.iter().find(|(seen, _)| Rc::ptr_eq(seen, image)) {
            return Ok(*id);
        }

        let (width, height) = image.dimensions();
        let mut stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8_i64,
            },
            flatten_on_white(image),
        );
        stream
            .compress()
            .map_err(|e| ExportError::Assemble(format!("failed to compress image: {}", e)))?;

        let id = self.document.add_object(stream);
        debug!("Embedded {}x{} image as object {:?}", width, height, id);
        self.images.push((Rc::clone(image), id));
        Ok(id)
    }
}

impl Default for LopdfAssembler {
    fn default() -> Self {
        Self::a4()
    }
}

impl PdfAssembler for LopdfAssembler {
    fn add_image(&mut self, image: &Rc<RgbaImage>, placement: Placement) -> Result<()> {
        let image_id = self.embed(image)?;
        let page_height_pt = self.page_size.height_mm * POINTS_PER_MM;

        let page = self
            .pages
            .last_mut()
            .ok_or_else(|| ExportError::Assemble("document has no pages".to_string()))?;
        let name = format!("Im{}", page.xobjects.len() + 1);

        // PDF space has its origin at the bottom-left corner, in points.
        let width = placement.width * POINTS_PER_MM;
        let height = placement.height * POINTS_PER_MM;
        let x = placement.x * POINTS_PER_MM;
        let y = page_height_pt - (placement.y * POINTS_PER_MM) - height;
        trace!("Placing {} at ({:.2}, {:.2}) size {:.2}x{:.2}pt", name, x, y, width, height);

        page.operations.push(Operation::new("q", vec![]));
        page.operations.push(Operation::new(
            "cm",
            vec![
                Object::Real(width as f32),
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(height as f32),
                Object::Real(x as f32),
                Object::Real(y as f32),
            ],
        ));
        page.operations
            .push(Operation::new("Do", vec![Object::Name(name.clone().into_bytes())]));
        page.operations.push(Operation::new("Q", vec![]));
        page.xobjects.push((name, image_id));
        Ok(())
    }

    fn add_page(&mut self) {
        self.pages.push(PageContent::default());
    }

    fn page_height(&self) -> f64 {
        self.page_size.height_mm
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        let pages_id = self.document.new_object_id();
        let media_box = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real((self.page_size.width_mm * POINTS_PER_MM) as f32),
            Object::Real((self.page_size.height_mm * POINTS_PER_MM) as f32),
        ];

        let mut kids = Vec::with_capacity(self.pages.len());
        for page in std::mem::take(&mut self.pages) {
            let content = Content {
                operations: page.operations,
            };
            let content_id = self
                .document
                .add_object(Stream::new(Dictionary::new(), content.encode()?));

            let mut xobjects = Dictionary::new();
            for (name, id) in page.xobjects {
                xobjects.set(name.into_bytes(), Object::Reference(id));
            }

            let page_id = self.document.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box.clone(),
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "XObject" => xobjects,
                },
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        self.document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        self.document.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        self.document
            .save_to(&mut bytes)
            .map_err(|e| ExportError::Assemble(format!("failed to write PDF: {}", e)))?;
        debug!("Assembled PDF: {} pages, {} bytes", count, bytes.len());
        Ok(bytes)
    }
}

/// Drop the alpha channel, compositing onto a white background.
fn flatten_on_white(image: &RgbaImage) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(image.width() as usize * image.height() as usize * 3);
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u16::from(a);
        for channel in [r, g, b] {
            let blended = (u16::from(channel) * alpha + 255 * (255 - alpha)) / 255;
            rgb.push(blended as u8);
        }
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn image(width: u32, height: u32) -> Rc<RgbaImage> {
        Rc::new(RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255])))
    }

    fn placement(height: f64) -> Placement {
        Placement {
            x: 0.0,
            y: 0.0,
            width: 210.0,
            height,
        }
    }

    fn count_images(doc: &Document) -> usize {
        doc.objects
            .values()
            .filter(|obj| match obj {
                Object::Stream(stream) => stream
                    .dict
                    .get(b"Subtype")
                    .and_then(|s| s.as_name())
                    .map(|name| name == b"Image")
                    .unwrap_or(false),
                _ => false,
            })
            .count()
    }

    #[test]
    fn test_single_page_document() {
        let mut assembler = LopdfAssembler::a4();
        assembler.add_image(&image(4, 4), placement(210.0)).unwrap();
        let bytes = assembler.finish().unwrap();

        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        assert_eq!(count_images(&doc), 1);
    }

    #[test]
    fn test_image_shared_across_pages() {
        let img = image(4, 8);
        let mut assembler = LopdfAssembler::a4();
        assembler.add_image(&img, placement(420.0)).unwrap();
        assembler.add_page();
        let lower = Placement {
            y: -297.0,
            ..placement(420.0)
        };
        assembler.add_image(&img, lower).unwrap();
        assert_eq!(assembler.page_count(), 2);

        let doc = Document::load_mem(&assembler.finish().unwrap()).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
        assert_eq!(count_images(&doc), 1);
    }

    #[test]
    fn test_equal_pixels_in_distinct_images_are_embedded_separately() {
        let mut assembler = LopdfAssembler::a4();
        assembler.add_image(&image(4, 4), placement(210.0)).unwrap();
        assembler.add_page();
        assembler.add_image(&image(4, 4), placement(210.0)).unwrap();

        let doc = Document::load_mem(&assembler.finish().unwrap()).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
        assert_eq!(count_images(&doc), 2);
    }

    #[test]
    fn test_empty_document_has_one_page() {
        let doc = Document::load_mem(&LopdfAssembler::a4().finish().unwrap()).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_flatten_on_white() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        img.put_pixel(1, 0, Rgba([0, 100, 200, 255]));
        assert_eq!(flatten_on_white(&img), vec![255, 255, 255, 0, 100, 200]);
    }

    #[test]
    fn test_page_height() {
        assert_eq!(LopdfAssembler::a4().page_height(), 297.0);
    }
}
