// Example: element measurement and scroll jump prevention.
use virtual_window::{
    Align, ItemElement, Rect, ScrollToIndexOptions, Virtualizer, VirtualizerOptions,
};

/// A rendered row as a host would expose it.
struct Row {
    index: String,
    height: u32,
}

impl ItemElement for Row {
    fn attribute(&self, name: &str) -> Option<&str> {
        (name == "data-index").then_some(self.index.as_str())
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn size(&self, _horizontal: bool) -> u32 {
        self.height
    }
}

fn row(index: usize, height: u32) -> Row {
    Row {
        index: index.to_string(),
        height,
    }
}

fn main() {
    let mut v = Virtualizer::new(
        VirtualizerOptions::new(100, |_| 10).with_initial_rect(Some(Rect::new(80, 30))),
    );
    v.attach();
    v.on_offset(200, false);

    println!(
        "before: off={} total={} range={:?}",
        v.scroll_offset(),
        v.get_total_size(),
        v.calculate_range()
    );

    // Row 0 sits above the viewport: growing it shifts everything below, so the offset is
    // compensated by the same amount.
    v.measure_element(&row(0, 30));
    println!(
        "measure_element(0): off={} total={}",
        v.scroll_offset(),
        v.get_total_size()
    );

    // Row 25 is inside the viewport: no compensation.
    v.measure_element(&row(25, 50));
    println!(
        "measure_element(25): off={} total={}",
        v.scroll_offset(),
        v.get_total_size()
    );

    // With live elements, scroll_to_index re-checks its target on the next tick.
    v.scroll_to_index(60, ScrollToIndexOptions::align(Align::Start));
    v.measure_element(&row(60, 10));
    v.tick(16);
    println!(
        "scroll_to_index(60): off={} pending={} range={:?}",
        v.scroll_offset(),
        v.has_pending_scroll(),
        v.calculate_range()
    );
}
