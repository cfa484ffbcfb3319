//! Timed interpolation jobs driven from the UI loop.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

pub type OnFinish<K> = Box<dyn FnOnce(&K)>;

struct Job<K> {
    from: f32,
    to: f32,
    start: Instant,
    duration: Duration,
    on_finish: Option<OnFinish<K>>,
}

/// Interpolated value for one key at one `advance` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Step<K> {
    pub key: K,
    pub value: f32,
    pub finished: bool,
}

/// Scalar animations keyed by `K`, at most one per key.
pub struct Timeline<K> {
    jobs: BTreeMap<K, Job<K>>,
}

impl<K> Default for Timeline<K> {
    fn default() -> Self {
        Self {
            jobs: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone> Timeline<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start animating `key` from `from` to `to`, replacing any running job
    /// for the same key. The replaced job's callback is dropped uncalled.
    pub fn schedule(
        &mut self,
        key: K,
        from: f32,
        to: f32,
        start: Instant,
        duration: Duration,
        on_finish: Option<OnFinish<K>>,
    ) {
        self.jobs.insert(
            key,
            Job {
                from,
                to,
                start,
                duration,
                on_finish,
            },
        );
    }

    pub fn cancel(&mut self, key: &K) -> bool {
        self.jobs.remove(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Evaluate every job at `now`; finished jobs run their callback and are
    /// removed.
    pub fn advance(&mut self, now: Instant) -> Vec<Step<K>> {
        let mut steps = Vec::with_capacity(self.jobs.len());
        let mut done = Vec::new();
        for (key, job) in &self.jobs {
            let elapsed = now.saturating_duration_since(job.start);
            let t = if job.duration.is_zero() {
                1.0
            } else {
                (elapsed.as_secs_f32() / job.duration.as_secs_f32()).min(1.0)
            };
            let finished = t >= 1.0;
            let value = if finished {
                job.to
            } else {
                job.from + (job.to - job.from) * ease_out_cubic(t)
            };
            steps.push(Step {
                key: key.clone(),
                value,
                finished,
            });
            if finished {
                done.push(key.clone());
            }
        }
        for key in done {
            if let Some(job) = self.jobs.remove(&key)
                && let Some(callback) = job.on_finish
            {
                callback(&key);
            }
        }
        steps
    }
}

pub fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn easing_hits_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!(ease_out_cubic(0.5) > 0.5);
    }

    #[test]
    fn job_reaches_target_and_calls_back_once() {
        let fired = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&fired);
        let mut tl = Timeline::new();
        let t0 = Instant::now();
        tl.schedule(
            "w1",
            0.0,
            0.8,
            t0,
            200 * MS,
            Some(Box::new(move |k: &&str| sink.borrow_mut().push(k.to_string()))),
        );

        let mid = tl.advance(t0 + 100 * MS);
        assert_eq!(mid.len(), 1);
        assert!(!mid[0].finished);
        assert!(mid[0].value > 0.4 && mid[0].value < 0.8);

        let end = tl.advance(t0 + 250 * MS);
        assert_eq!(end[0].value, 0.8);
        assert!(end[0].finished);
        assert!(tl.is_empty());
        assert!(tl.advance(t0 + 300 * MS).is_empty());
        assert_eq!(*fired.borrow(), vec!["w1".to_string()]);
    }

    #[test]
    fn cancel_drops_callback() {
        let fired = Rc::new(RefCell::new(false));
        let sink = Rc::clone(&fired);
        let mut tl = Timeline::new();
        let t0 = Instant::now();
        tl.schedule(
            1u32,
            0.0,
            1.0,
            t0,
            MS,
            Some(Box::new(move |_: &u32| *sink.borrow_mut() = true)),
        );
        assert!(tl.cancel(&1));
        tl.advance(t0 + 10 * MS);
        assert!(!*fired.borrow());
    }
}
