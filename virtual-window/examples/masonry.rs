// Example: a three-column masonry layout.
use virtual_window::{Rect, Virtualizer, VirtualizerOptions};

fn main() {
    let mut v = Virtualizer::new(
        VirtualizerOptions::new(30, |i| 40 + (i as u32 * 37) % 80)
            .with_lanes(3)
            .with_gap(4)
            .with_initial_rect(Some(Rect::new(300, 200))),
    );
    v.attach();

    for item in v.get_measurements().iter().take(9) {
        println!(
            "item={} lane={} start={} end={}",
            item.index, item.lane, item.start, item.end
        );
    }
    println!("total_size={}", v.get_total_size());

    v.on_offset(300, false);
    println!("range_at_300={:?}", v.calculate_range());
}
