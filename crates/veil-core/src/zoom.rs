//! Discrete zoom levels

pub const DEFAULT_ZOOM_STEPS: [u32; 17] = [
    25, 33, 50, 67, 75, 80, 90, 100, 110, 125, 150, 175, 200, 250, 300, 400, 500,
];

const DEFAULT_ZOOM: u32 = 100;

/// Walks an ascending list of zoom percentages one step at a time.
#[derive(Debug, Clone)]
pub struct ZoomStepper {
    steps: Vec<u32>,
    index: usize,
    reset_index: usize,
}

impl ZoomStepper {
    /// Steps are sorted and deduplicated; an empty list means the defaults.
    pub fn new(steps: impl Into<Vec<u32>>, initial: Option<u32>) -> Self {
        let mut steps = steps.into();
        steps.sort_unstable();
        steps.dedup();
        if steps.is_empty() {
            steps = DEFAULT_ZOOM_STEPS.to_vec();
        }

        let mut stepper = Self {
            steps,
            index: 0,
            reset_index: 0,
        };
        stepper.initialize(initial.unwrap_or(DEFAULT_ZOOM));
        stepper
    }

    /// Jump to the step closest to `value` and make it the reset point.
    ///
    /// When `value` sits exactly between two steps the lower one is chosen.
    pub fn initialize(&mut self, value: u32) -> u32 {
        let index = match self.steps.binary_search(&value) {
            Ok(found) => found,
            Err(0) => 0,
            Err(above) if above == self.steps.len() => above - 1,
            Err(above) => {
                let below = above - 1;
                if value - self.steps[below] <= self.steps[above] - value {
                    below
                } else {
                    above
                }
            }
        };

        self.index = index;
        self.reset_index = index;
        self.current()
    }

    pub fn up(&mut self) -> u32 {
        self.index = (self.index + 1).min(self.steps.len() - 1);
        self.current()
    }

    pub fn down(&mut self) -> u32 {
        self.index = self.index.saturating_sub(1);
        self.current()
    }

    pub fn reset(&mut self) -> u32 {
        self.index = self.reset_index;
        self.current()
    }

    pub fn current(&self) -> u32 {
        self.steps[self.index]
    }

    pub fn steps(&self) -> &[u32] {
        &self.steps
    }
}

impl Default for ZoomStepper {
    fn default() -> Self {
        Self::new(DEFAULT_ZOOM_STEPS, None)
    }
}
