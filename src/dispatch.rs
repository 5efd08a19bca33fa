use crossbeam_channel::bounded;
use std::thread;

/// Hard cap on auto-sized worker counts
const MAX_AUTO_WORKERS: usize = 16;

/// Pick a worker count for a batch of `n` items.
///
/// A non-zero `requested` wins outright. Otherwise small batches get one
/// worker per item, larger ones get twice the core count capped at
/// [`MAX_AUTO_WORKERS`] so memory stays bounded at one buffer per worker
/// rather than one per file.
pub fn auto_workers(n: usize, requested: usize) -> usize {
    if requested > 0 {
        return requested;
    }

    let cores = thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);

    if n < cores {
        return n.max(1);
    }

    let cap = (cores * 2).min(MAX_AUTO_WORKERS);
    n.min(cap)
}

/// Run `process` over the indices `[0, n)` across `workers` threads.
///
/// Indices fan out over a bounded channel; each completed item comes back
/// tagged with its index and is written into a pre-sized slot, so the
/// returned vector is ordered by input index no matter which worker
/// finished first. Every index is processed exactly once.
///
/// `setup` runs once per worker to build its private state (typically a
/// pooled read buffer). `process` must be total: failures belong inside
/// the item result, never as a panic. `on_item` runs on the calling
/// thread after each completion and is where progress reporting lives.
pub fn run_indexed<T, R, S, P, F>(
    n: usize,
    workers: usize,
    setup: S,
    process: P,
    mut on_item: F,
) -> Vec<R>
where
    R: Send,
    S: Fn() -> T + Sync,
    P: Fn(&mut T, usize) -> R + Sync,
    F: FnMut(usize, &R),
{
    if n == 0 {
        return Vec::new();
    }
    let workers = workers.clamp(1, n);

    let (index_tx, index_rx) = bounded::<usize>(workers);
    let (result_tx, result_rx) = bounded::<(usize, R)>(workers * 2);

    let mut slots: Vec<Option<R>> = Vec::with_capacity(n);
    slots.resize_with(n, || None);

    let setup = &setup;
    let process = &process;

    thread::scope(|scope| {
        for _ in 0..workers {
            let index_rx = index_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                let mut state = setup();
                for index in index_rx.iter() {
                    let item = process(&mut state, index);
                    if result_tx.send((index, item)).is_err() {
                        break;
                    }
                }
            });
        }
        // Workers hold their own clones; dropping ours lets the result
        // channel close once the last worker exits.
        drop(result_tx);
        drop(index_rx);

        scope.spawn(move || {
            for index in 0..n {
                if index_tx.send(index).is_err() {
                    break;
                }
            }
        });

        // Collection loop stays on the calling thread so result order and
        // progress updates need no extra synchronization.
        for (index, item) in result_rx.iter() {
            on_item(index, &item);
            slots[index] = Some(item);
        }
    });

    slots
        .into_iter()
        .map(|slot| slot.expect("dispatcher delivered every index"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_auto_workers_requested_wins() {
        assert_eq!(auto_workers(100, 3), 3);
        assert_eq!(auto_workers(1, 8), 8);
    }

    #[test]
    fn test_auto_workers_small_batch() {
        let cores = thread::available_parallelism().map(|p| p.get()).unwrap_or(1);
        if cores > 1 {
            assert_eq!(auto_workers(1, 0), 1);
        }
        assert!(auto_workers(10_000, 0) <= MAX_AUTO_WORKERS);
        assert!(auto_workers(2, 0) >= 1);
    }

    #[test]
    fn test_empty_input() {
        let out: Vec<u32> = run_indexed(0, 4, || (), |_, _| 7, |_, _| {});
        assert!(out.is_empty());
    }

    #[test]
    fn test_results_are_index_aligned() {
        for workers in [1, 2, 8] {
            let out = run_indexed(500, workers, || (), |_, i| i * 2, |_, _| {});
            let expected: Vec<usize> = (0..500).map(|i| i * 2).collect();
            assert_eq!(out, expected, "workers={workers}");
        }
    }

    #[test]
    fn test_each_index_processed_once() {
        let calls = AtomicUsize::new(0);
        let out = run_indexed(
            97,
            4,
            || (),
            |_, i| {
                calls.fetch_add(1, Ordering::SeqCst);
                i
            },
            |_, _| {},
        );
        assert_eq!(calls.load(Ordering::SeqCst), 97);
        assert_eq!(out.len(), 97);
    }

    #[test]
    fn test_on_item_sees_every_completion() {
        let mut seen = 0usize;
        let _ = run_indexed(64, 3, || (), |_, i| i, |_, _| seen += 1);
        assert_eq!(seen, 64);
    }

    #[test]
    fn test_per_worker_state_is_private() {
        // Each worker counts its own items; the totals must add up even
        // though no state is shared between workers.
        let total = AtomicUsize::new(0);
        let _ = run_indexed(
            200,
            4,
            || 0usize,
            |count, i| {
                *count += 1;
                total.fetch_add(1, Ordering::SeqCst);
                i
            },
            |_, _| {},
        );
        assert_eq!(total.load(Ordering::SeqCst), 200);
    }
}
