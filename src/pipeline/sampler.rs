use crossbeam_channel::Sender;
use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;

/// Endless shuffled epochs over `0..len`
///
/// Every epoch visits each index exactly once in a fresh random order.
pub struct EpochSampler<R: Rng> {
    order: Vec<usize>,
    pos: usize,
    epoch: u64,
    rng: R,
}

impl<R: Rng> EpochSampler<R> {
    /// Sampler over `len` indices
    pub fn new(len: usize, rng: R) -> Self {
        EpochSampler {
            order: (0..len).collect(),
            pos: len,
            epoch: 0,
            rng,
        }
    }

    /// Completed-or-current epoch count
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl<R: Rng> Iterator for EpochSampler<R> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.order.is_empty() {
            return None;
        }
        if self.pos == self.order.len() {
            self.order.shuffle(&mut self.rng);
            self.pos = 0;
            self.epoch += 1;
            debug!("starting epoch {}", self.epoch);
        }
        let index = self.order[self.pos];
        self.pos += 1;
        Some(index)
    }
}

/// Feed shuffled indices into `tx` until every receiver is gone
///
/// Returns the number of indices sent.
pub fn looped_samples<R: Rng>(len: usize, rng: R, tx: Sender<usize>) -> u64 {
    let mut sent = 0u64;
    for index in EpochSampler::new(len, rng) {
        if tx.send(index).is_err() {
            break;
        }
        sent += 1;
    }
    sent
}
