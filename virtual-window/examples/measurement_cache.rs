// Example: carry measurements over to a fresh virtualizer.
use virtual_window::{Virtualizer, VirtualizerOptions};

fn main() {
    // A remounted list can start from the sizes measured by its previous instance instead of
    // estimates, so positions do not jump while items are measured again.
    let mut v1 = Virtualizer::new(VirtualizerOptions::new(10, |_| 1));
    v1.resize_item(2, 10);
    v1.resize_item(5, 42);

    let snapshot = v1.measurements_snapshot();
    println!(
        "snapshot_len={} cached_sizes={}",
        snapshot.len(),
        v1.measurement_cache_len()
    );

    let mut v2 = Virtualizer::new(VirtualizerOptions::new(10, |_| 1));
    println!("without cache: total={}", v2.get_total_size());

    let mut v3 =
        Virtualizer::new(VirtualizerOptions::new(10, |_| 1).with_initial_measurements_cache(snapshot));
    println!(
        "with cache: total={} size2={:?} size5={:?}",
        v3.get_total_size(),
        v3.cached_item_size(&2),
        v3.cached_item_size(&5)
    );
}
