//! Mount points and the shared canvas that gets attached to them.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use image::RgbaImage;

/// A drawing surface shared between the engine that paints it and the view that shows it.
///
/// Clones point at the same pixels, so a canvas attached once keeps showing whatever the
/// engine draws afterwards.
#[derive(Clone, Debug)]
pub struct Canvas {
    pixels: Rc<RefCell<RgbaImage>>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: Rc::new(RefCell::new(RgbaImage::new(width, height))),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.borrow().dimensions()
    }

    /// Borrows the current pixels.
    pub fn pixels(&self) -> Ref<'_, RgbaImage> {
        self.pixels.borrow()
    }

    /// Copies the current pixels out.
    pub fn snapshot(&self) -> RgbaImage {
        self.pixels.borrow().clone()
    }

    /// Swaps in a freshly painted frame.
    pub fn present(&self, frame: RgbaImage) {
        *self.pixels.borrow_mut() = frame;
    }

    /// Whether both handles refer to the same surface.
    pub fn same_surface(&self, other: &Canvas) -> bool {
        Rc::ptr_eq(&self.pixels, &other.pixels)
    }
}

/// Somewhere rendered output can be shown.
pub trait MountPoint {
    /// Removes everything currently shown.
    fn clear(&mut self);

    fn append(&mut self, canvas: Canvas);

    fn children(&self) -> &[Canvas];
}

/// In-memory mount point used for previews and tests.
#[derive(Debug, Default)]
pub struct PreviewPane {
    children: Vec<Canvas>,
}

impl PreviewPane {
    pub fn new() -> Self {
        Self::default()
    }

    /// The canvas currently on display, if any.
    pub fn current(&self) -> Option<&Canvas> {
        self.children.last()
    }
}

impl MountPoint for PreviewPane {
    fn clear(&mut self) {
        self.children.clear();
    }

    fn append(&mut self, canvas: Canvas) {
        self.children.push(canvas);
    }

    fn children(&self) -> &[Canvas] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn attached_canvas_sees_later_frames() {
        let canvas = Canvas::new(2, 2);
        let mut pane = PreviewPane::new();
        pane.append(canvas.clone());

        canvas.present(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255])));
        let shown = pane.current().unwrap();
        assert!(shown.same_surface(&canvas));
        assert_eq!(shown.dimensions(), (4, 4));
        assert_eq!(shown.pixels().get_pixel(0, 0), &Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn clear_removes_children() {
        let mut pane = PreviewPane::new();
        pane.append(Canvas::new(1, 1));
        pane.append(Canvas::new(1, 1));
        assert_eq!(pane.children().len(), 2);
        pane.clear();
        assert!(pane.children().is_empty());
        assert!(pane.current().is_none());
    }
}
