// Example: pinned/sticky rows via range_extractor + IndexEmitter.
use std::sync::Arc;

use virtual_window::{IndexEmitter, Range, Rect, Virtualizer, VirtualizerOptions};

fn main() {
    let pinned: Arc<[usize]> = Arc::from([0usize, 10, 20, 30, 40, 999]);
    let opts = VirtualizerOptions::new(1_000, |_| 1)
        .with_overscan(2)
        .with_initial_rect(Some(Rect::new(80, 10)))
        .with_range_extractor(Some({
            let pinned = Arc::clone(&pinned);
            move |r: Range, emit: &mut dyn FnMut(usize)| {
                let mut e = IndexEmitter::new(r, emit);
                // Indexes must be emitted in ascending order: pinned rows before the overscanned
                // window, the window, then pinned rows after it.
                let start = r.start_index.saturating_sub(r.overscan);
                let end = r.end_index.saturating_add(r.overscan);

                for &idx in pinned.iter().filter(|&&i| i < start) {
                    e.emit(idx);
                }
                e.emit_overscanned();
                for &idx in pinned.iter().filter(|&&i| i > end) {
                    e.emit(idx);
                }
            }
        }));

    let mut v = Virtualizer::new(opts);
    v.attach();
    v.on_offset(500, false);

    println!("visible_range={:?}", v.calculate_range());
    let indexes = v.get_virtual_indexes().to_vec();
    println!("indexes_len={} indexes={indexes:?}", indexes.len());

    let headers = v
        .get_virtual_items()
        .iter()
        .filter(|it| pinned.binary_search(&it.index).is_ok())
        .count();
    println!("pinned_headers_in_output={headers}");
}
