use {
    crate::*,
    chrono::NaiveDateTime,
    crates_image::Rgb,
    sensor::SensorReading,
    video::Frame,
};

/// Size of the label box, measured from the top-left corner of the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayLayout {
    /// Box width in pixels (the rightmost column is `width - 1`).
    pub width: u32,
    pub height: u32,
    /// Top offset of each line relative to the image.
    pub line_tops: Vec<u32>,
}

/// Draws the capture time and the latest reading onto JPEG frames.
#[derive(Debug, Clone)]
pub struct Overlay {
    font: Font,
    margin: u32,
    line_spacing: u32,
    quality: u8,
    background: Rgb<u8>,
    foreground: Rgb<u8>,
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new(Font::load_or_builtin(
            font::DEFAULT_FONT_PATH,
            font::DEFAULT_FONT_SIZE,
        ))
    }
}

impl Overlay {
    pub fn new(font: Font) -> Self {
        Self {
            font,
            margin: 8,
            line_spacing: 6,
            quality: 80,
            background: Rgb([0, 0, 0]),
            foreground: Rgb([255, 255, 255]),
        }
    }

    pub fn with_margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_line_spacing(mut self, spacing: u32) -> Self {
        self.line_spacing = spacing;
        self
    }

    /// Set the JPEG quality of the re-encoded frame.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    pub fn margin(&self) -> u32 {
        self.margin
    }

    pub fn line_spacing(&self) -> u32 {
        self.line_spacing
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Label text: timestamp, temperature, humidity.
    pub fn lines(reading: Option<&SensorReading>, at: NaiveDateTime) -> Vec<String> {
        let (temperature, humidity) = match reading {
            Some(reading) => (
                format!("Temp: {:.1}°C", reading.temperature),
                format!("Humidity: {:.1}%", reading.humidity),
            ),
            None => ("Temp: N/A".to_string(), "Humidity: N/A".to_string()),
        };
        vec![base::format_display(at), temperature, humidity]
    }

    /// Measure the lines and compute the box that exactly encloses them.
    pub fn layout(&self, lines: &[String]) -> OverlayLayout {
        let sizes: Vec<TextSize> = lines.iter().map(|line| self.font.measure(line)).collect();
        let text_width = sizes.iter().map(|size| size.width).max().unwrap_or(0);

        let mut line_tops = Vec::with_capacity(sizes.len());
        let mut y = self.margin;
        for (i, size) in sizes.iter().enumerate() {
            if i > 0 {
                y += self.line_spacing;
            }
            line_tops.push(y);
            y += size.height;
        }

        // box corners are inclusive: [0, 0] .. [text + 2 * margin]
        OverlayLayout {
            width: text_width + 2 * self.margin + 1,
            height: y + self.margin + 1,
            line_tops,
        }
    }

    /// Draw the label onto `frame`.
    ///
    /// Never fails; on any decode, draw or encode problem the original frame
    /// is returned.
    pub fn render(&self, frame: &Frame, reading: Option<&SensorReading>, at: NaiveDateTime) -> Frame {
        match self.try_render(frame, reading, at) {
            Ok(frame) => frame,
            Err(error) => {
                log::warn!("overlay: {error}, using frame as captured");
                frame.clone()
            }
        }
    }

    pub fn try_render(
        &self,
        frame: &Frame,
        reading: Option<&SensorReading>,
        at: NaiveDateTime,
    ) -> Result<Frame, ImageError> {
        let mut canvas = decode_rgb(frame.as_bytes())?;

        let lines = Self::lines(reading, at);
        let layout = self.layout(&lines);
        font::fill_rect(&mut canvas, 0, 0, layout.width, layout.height, self.background);
        for (line, top) in lines.iter().zip(&layout.line_tops) {
            self.font
                .draw(&mut canvas, self.margin as i32, *top as i32, line, self.foreground);
        }

        let encoded = encode_rgb(&canvas, self.quality)?;
        Ok(Frame::from(encoded))
    }
}
