// Example: measurements follow keys after reorder.
use std::sync::Arc;

use virtual_window::{Virtualizer, VirtualizerOptions};

fn main() {
    let ids: Arc<[u64]> = Arc::from([100u64, 200]);
    let mut v = Virtualizer::new(VirtualizerOptions::new_with_key(2, |_| 1, {
        let ids = Arc::clone(&ids);
        move |i| ids[i]
    }));
    v.resize_item(0, 10);
    println!(
        "before reorder: sizes={:?}",
        v.get_measurements().iter().map(|m| m.size).collect::<Vec<_>>()
    );

    // Simulate a data reorder by swapping the key mapping.
    let reordered: Arc<[u64]> = Arc::from([200u64, 100]);
    v.update_options(|o| o.get_item_key = Arc::new(move |i: usize| reordered[i]));

    println!(
        "after reorder: sizes={:?}",
        v.get_measurements().iter().map(|m| m.size).collect::<Vec<_>>()
    );
}
