/// Policy knobs for sector regeneration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecalcConfig {
    /// Recompute the optional EDC of Mode 2 Form 2 sectors. When disabled, those sectors are
    /// left exactly as they are.
    pub form2_edc: bool,
}

impl Default for RecalcConfig {
    fn default() -> Self {
        Self { form2_edc: true }
    }
}
