// Step-by-step playback of one recorded stroke.
// The runtime pulls one segment per timer tick and stops the timer on `None`.
use super::{Point, Stroke};

#[derive(Clone, Debug)]
pub struct Replay {
    path: Vec<Point>,
    step: usize,
}

impl Replay {
    pub fn new(stroke: &Stroke) -> Self {
        Self {
            path: stroke.points().to_vec(),
            step: 0,
        }
    }

    pub fn next_segment(&mut self) -> Option<(Point, Point)> {
        if self.step + 1 >= self.path.len() {
            return None;
        }
        let seg = (self.path[self.step], self.path[self.step + 1]);
        self.step += 1;
        Some(seg)
    }

    pub fn is_finished(&self) -> bool {
        self.step + 1 >= self.path.len()
    }
}
