// Example: minimal usage and scroll-to helpers.
use virtual_window::{Align, Rect, ScrollToIndexOptions, Virtualizer, VirtualizerOptions};

fn main() {
    let mut v = Virtualizer::new(
        VirtualizerOptions::new(1_000_000, |_| 20).with_initial_rect(Some(Rect::new(80, 400))),
    );
    // No scroll executor: requests are applied to the virtualizer's own offset.
    v.attach();
    v.on_offset(123_456, false);

    println!("total_size={}", v.get_total_size());
    println!("visible_range={:?}", v.calculate_range());
    println!("first_item={:?}", v.get_virtual_items().first());

    v.scroll_to_index(999_999, ScrollToIndexOptions::align(Align::End));
    println!("after scroll_to_index: offset={}", v.scroll_offset());
}
