use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::shared::constants::{ANNOTATION_COLOR, ANNOTATION_THICKNESS};
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Draws a solid rectangle outline around each region.
///
/// The stroke is centered on the box edge, so a 5 px stroke extends two
/// pixels outside the box and two inside. Strokes are clipped at the
/// frame border.
pub struct BoxAnnotator {
    color: [u8; 3],
    thickness: u32,
}

impl BoxAnnotator {
    pub fn new(color: [u8; 3], thickness: u32) -> Self {
        Self {
            color,
            thickness: thickness.max(1),
        }
    }

    /// Paints the rectangle `[x1, x2) × [y1, y2)`, clipped to the frame.
    fn fill(&self, frame: &mut Frame, x1: i32, y1: i32, x2: i32, y2: i32) {
        let Some(bar) = Region::new(x1, y1, x2 - x1, y2 - y1, 0.0)
            .clamped(frame.width(), frame.height())
        else {
            return;
        };
        let fw = frame.width() as usize;
        let channels = frame.channels() as usize;
        let data = frame.data_mut();
        for y in bar.y..bar.y + bar.height {
            for x in bar.x..bar.x + bar.width {
                let idx = (y as usize * fw + x as usize) * channels;
                for (c, value) in self.color.iter().enumerate().take(channels) {
                    data[idx + c] = *value;
                }
            }
        }
    }
}

impl Default for BoxAnnotator {
    fn default() -> Self {
        Self::new(ANNOTATION_COLOR, ANNOTATION_THICKNESS)
    }
}

impl FrameAnnotator for BoxAnnotator {
    fn annotate(
        &self,
        frame: &mut Frame,
        regions: &[Region],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let t = self.thickness as i32;
        let before = t / 2;
        let after = t - before;

        for r in regions {
            if r.width <= 0 || r.height <= 0 {
                continue;
            }
            let left = r.x;
            let top = r.y;
            let right = r.x + r.width;
            let bottom = r.y + r.height;

            let outer_x1 = left - before;
            let outer_x2 = right + after;
            // top and bottom bars span the full outer width
            self.fill(frame, outer_x1, top - before, outer_x2, top + after);
            self.fill(frame, outer_x1, bottom - before, outer_x2, bottom + after);
            self.fill(frame, left - before, top - before, left + after, bottom + after);
            self.fill(frame, right - before, top - before, right + after, bottom + after);
        }
        Ok(())
    }
}
