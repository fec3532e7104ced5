use ndarray::ArrayView3;

/// A decoded still image: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only; detectors and
/// annotators treat pixel data as opaque.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Single-channel luma plane, row-major, one byte per pixel.
    ///
    /// Cascade classifiers work on intensity only, so this is the color
    /// conversion step in front of them.
    pub fn grayscale(&self) -> Vec<u8> {
        if self.channels == 1 {
            return self.data.clone();
        }
        match image::RgbImage::from_raw(self.width, self.height, self.rgb_bytes()) {
            Some(rgb) => image::imageops::grayscale(&rgb).into_raw(),
            None => Vec::new(),
        }
    }

    fn rgb_bytes(&self) -> Vec<u8> {
        if self.channels == 3 {
            return self.data.clone();
        }
        let c = self.channels as usize;
        self.data
            .chunks_exact(c)
            .flat_map(|px| [px[0], px[1.min(c - 1)], px[2.min(c - 1)]])
            .collect()
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
