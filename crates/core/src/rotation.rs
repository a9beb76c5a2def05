use crate::settings::RotationSettings;

/// Auto-rotation switch and speed. Survives loads and clears.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationState {
    pub enabled: bool,
    speed: f32,
    min_speed: f32,
    max_speed: f32,
    segments: usize,
}

impl RotationState {
    pub fn new(settings: &RotationSettings) -> Self {
        let min_speed = settings.min_speed.min(settings.max_speed);
        let max_speed = settings.max_speed.max(settings.min_speed);
        Self {
            enabled: settings.enabled,
            speed: settings.speed,
            min_speed,
            max_speed,
            segments: settings.gauge_segments.max(2),
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) -> f32 {
        if speed.is_finite() {
            self.speed = speed.clamp(self.min_speed, self.max_speed);
        }
        self.speed
    }

    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    pub fn segment_count(&self) -> usize {
        self.segments
    }

    /// Speeds represented by each gauge segment, evenly spaced from min to max.
    pub fn segment_values(&self) -> Vec<f32> {
        let step = self.segment_step();
        (0..self.segments)
            .map(|idx| self.min_speed + step * idx as f32)
            .collect()
    }

    pub fn active_segment_index(&self) -> usize {
        let index = ((self.speed - self.min_speed) / self.segment_step()).round();
        (index.max(0.0) as usize).min(self.segments - 1)
    }

    /// Maps a pointer position along the gauge (0 = left edge) to a speed.
    pub fn speed_from_fraction(&self, fraction: f32) -> f32 {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.min_speed + fraction * (self.max_speed - self.min_speed)
    }

    pub fn gauge_interactive(&self, model_loaded: bool) -> bool {
        model_loaded && self.enabled
    }

    fn segment_step(&self) -> f32 {
        (self.max_speed - self.min_speed) / (self.segments - 1) as f32
    }
}
