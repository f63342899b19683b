use threadline_context::{DEFAULT_SUMMARY_TEMPERATURE, DEFAULT_TITLE_TEMPERATURE};

/// Message count between rolling-summary regenerations
pub const DEFAULT_SUMMARY_CADENCE: usize = 10;

/// Finalization knobs, fixed at startup
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Regenerate the summary whenever the thread's message count is a multiple
    /// of this value. Zero disables summaries.
    pub summary_cadence: usize,
    pub title_temperature: f32,
    pub summary_temperature: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            summary_cadence: DEFAULT_SUMMARY_CADENCE,
            title_temperature: DEFAULT_TITLE_TEMPERATURE,
            summary_temperature: DEFAULT_SUMMARY_TEMPERATURE,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary_cadence(mut self, cadence: usize) -> Self {
        self.summary_cadence = cadence;
        self
    }

    pub fn title_temperature(mut self, temp: f32) -> Self {
        self.title_temperature = temp;
        self
    }

    pub fn summary_temperature(mut self, temp: f32) -> Self {
        self.summary_temperature = temp;
        self
    }

    /// Whether a thread holding `message_count` messages is due for a new summary
    pub fn summary_due(&self, message_count: usize) -> bool {
        self.summary_cadence > 0 && message_count > 0 && message_count % self.summary_cadence == 0
    }
}
