/// What the viewer shows at a given zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ViewLevel {
    /// Whole-sequence overview.
    Summary,
    /// Coverage histogram.
    Coverage,
    /// Read outlines.
    Reads,
    /// Individual bases.
    Bases,
}

impl ViewLevel {
    /// Discrete zoom step for a zoom `scale`, where each step multiplies the
    /// scale by `zoom_level_change`.
    pub fn scale_level(scale: f64, zoom_level_change: f64) -> i32 {
        (scale.ln() / zoom_level_change.ln() + 0.1).floor() as i32
    }

    pub fn from_scale_level(level: i32) -> Self {
        match level {
            i32::MIN..=1 => ViewLevel::Summary,
            2..=3 => ViewLevel::Coverage,
            4..=5 => ViewLevel::Reads,
            _ => ViewLevel::Bases,
        }
    }

    pub fn from_scale(scale: f64, zoom_level_change: f64) -> Self {
        Self::from_scale_level(Self::scale_level(scale, zoom_level_change))
    }

    /// Whether reads and variants are fetched at this level.
    pub fn wants_reads(&self) -> bool {
        matches!(self, ViewLevel::Reads | ViewLevel::Bases)
    }

    /// Whether per-base detail is cached at this level.
    pub fn wants_bases(&self) -> bool {
        matches!(self, ViewLevel::Bases)
    }
}
