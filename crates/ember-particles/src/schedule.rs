//! Batch emission timing shared by continuously-emitting systems

/// Emits `batch_size` particles whenever the timer reads zero, then rewinds
/// the timer to `interval`. Interval 0 means a batch every frame, interval 1
/// every other frame, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSchedule {
    batch_size: usize,
    interval: u32,
    timer: u32,
}

impl BatchSchedule {
    pub fn new(batch_size: usize, interval: u32) -> Self {
        Self {
            batch_size,
            interval,
            timer: 0,
        }
    }

    /// One batch of `batch_size` every frame
    pub fn every_frame(batch_size: usize) -> Self {
        Self::new(batch_size, 0)
    }

    /// Hold off the first batch for `frames` frames
    pub fn with_delay(mut self, frames: u32) -> Self {
        self.timer = frames;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Advance one frame; returns how many particles are due now
    pub fn due(&mut self) -> usize {
        if self.timer == 0 {
            self.timer = self.interval;
            self.batch_size
        } else {
            self.timer -= 1;
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(schedule: &mut BatchSchedule, frames: usize) -> Vec<usize> {
        (0..frames).map(|_| schedule.due()).collect()
    }

    #[test]
    fn every_frame() {
        let mut s = BatchSchedule::every_frame(3);
        assert_eq!(run(&mut s, 4), vec![3, 3, 3, 3]);
    }

    #[test]
    fn interval_one_is_every_other_frame() {
        let mut s = BatchSchedule::new(20, 1);
        assert_eq!(run(&mut s, 5), vec![20, 0, 20, 0, 20]);
    }

    #[test]
    fn delay_postpones_first_batch() {
        let mut s = BatchSchedule::new(2, 2).with_delay(1);
        assert_eq!(run(&mut s, 6), vec![0, 2, 0, 0, 2, 0]);
    }
}
