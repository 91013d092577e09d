/// Minimum horizontal displacement in pixels for a swipe to register.
pub const MIN_SWIPE_DISTANCE: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapSide {
    Left,
    Right,
}

impl TapSide {
    #[must_use]
    pub fn of(x: f32, screen_width: f32) -> Self {
        if x > screen_width / 2.0 {
            TapSide::Right
        } else {
            TapSide::Left
        }
    }
}

/// Tracks the horizontal positions of an ongoing touch gesture.
#[derive(Debug, Default, Clone, Copy)]
pub struct SwipeTracker {
    start: Option<f32>,
    end: Option<f32>,
}

impl SwipeTracker {
    pub fn touch_start(&mut self, x: f32) {
        self.start = Some(x);
        self.end = None;
    }

    pub fn touch_move(&mut self, x: f32) {
        self.end = Some(x);
    }

    /// Classify the finished gesture. An incomplete gesture yields `None`.
    pub fn touch_end(&mut self) -> Option<Swipe> {
        let start = self.start.take();
        let end = self.end.take();
        let distance = start? - end?;
        if distance > MIN_SWIPE_DISTANCE {
            Some(Swipe::Left)
        } else if distance < -MIN_SWIPE_DISTANCE {
            Some(Swipe::Right)
        } else {
            None
        }
    }
}
