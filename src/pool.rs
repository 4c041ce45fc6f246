use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

/// Upper bound used when the degree is derived from the machine.
pub const MAX_DEFAULT_WORKERS: usize = 24;

pub fn default_concurrency() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        .min(MAX_DEFAULT_WORKERS)
}

/// Runs `task` over `items` on at most `workers` scoped threads.
///
/// Results come back in input order regardless of completion order. Workers
/// pull the next index from a shared counter.
pub fn run_bounded<T, R, F>(items: &[T], workers: usize, task: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    if items.is_empty() {
        return Vec::new();
    }
    let workers = workers.clamp(1, items.len());
    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            let task = &task;
            scope.spawn(move || {
                loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(item) = items.get(index) else {
                        break;
                    };
                    if tx.send((index, task(item))).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(tx);

    let mut slots: Vec<Option<R>> = (0..items.len()).map(|_| None).collect();
    for (index, result) in rx {
        slots[index] = Some(result);
    }
    slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    #[test]
    fn results_keep_input_order() {
        let items: Vec<u64> = (0..24).collect();
        let results = run_bounded(&items, 6, |value| {
            thread::sleep(Duration::from_millis(24 - value));
            value * 2
        });
        assert_eq!(results, items.iter().map(|v| v * 2).collect::<Vec<_>>());
    }

    #[test]
    fn never_exceeds_worker_bound() {
        let active = AtomicUsize::new(0);
        let peak = Mutex::new(0usize);
        let items: Vec<usize> = (0..32).collect();
        run_bounded(&items, 3, |_| {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            {
                let mut guard = peak.lock().unwrap();
                *guard = (*guard).max(now);
            }
            thread::sleep(Duration::from_millis(2));
            active.fetch_sub(1, Ordering::SeqCst);
        });
        assert!(*peak.lock().unwrap() <= 3);
    }

    #[test]
    fn zero_workers_still_runs() {
        let results = run_bounded(&[1, 2, 3], 0, |v| v + 1);
        assert_eq!(results, vec![2, 3, 4]);
    }

    #[test]
    fn default_concurrency_is_bounded() {
        let value = default_concurrency();
        assert!((1..=MAX_DEFAULT_WORKERS).contains(&value));
    }
}
