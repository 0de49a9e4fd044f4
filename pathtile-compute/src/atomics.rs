use std::sync::atomic::{AtomicU32, Ordering};

/// Atomically add to an f32 stored as bits in an `AtomicU32`.
///
/// Returns the previous value.
pub fn atomic_add_f32(cell: &AtomicU32, value: f32) -> f32 {
    let mut current = cell.load(Ordering::Relaxed);
    loop {
        let new = (f32::from_bits(current) + value).to_bits();
        match cell.compare_exchange_weak(current, new, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(previous) => return f32::from_bits(previous),
            Err(actual) => current = actual,
        }
    }
}

/// Atomically load an f32 stored as bits.
pub fn atomic_load_f32(cell: &AtomicU32) -> f32 {
    f32::from_bits(cell.load(Ordering::Relaxed))
}

/// Atomically store an f32 as bits.
pub fn atomic_store_f32(cell: &AtomicU32, value: f32) {
    cell.store(value.to_bits(), Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn add_returns_previous_value() {
        let cell = AtomicU32::new(1.5f32.to_bits());
        assert_eq!(atomic_add_f32(&cell, 2.0), 1.5);
        assert_eq!(atomic_load_f32(&cell), 3.5);
    }

    #[test]
    fn store_then_load() {
        let cell = AtomicU32::new(0);
        atomic_store_f32(&cell, -0.25);
        assert_eq!(atomic_load_f32(&cell), -0.25);
    }

    #[test]
    fn concurrent_adds_are_not_lost() {
        let cell = AtomicU32::new(0);

        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        atomic_add_f32(&cell, 1.0);
                    }
                });
            }
        });

        // Integers up to 2^24 are exact in f32.
        assert_eq!(atomic_load_f32(&cell), 8000.0);
    }
}
