use std::sync::{Arc, Mutex};

use virtual_window::{
    Align, Rect, ScrollBehavior, ScrollToIndexOptions, Virtualizer, VirtualizerOptions,
};
use virtual_window_adapter::{AdapterOptions, Controller, ScrollElement};

/// A stand-in for a host scroll container.
struct Viewport {
    rect: Rect,
    position: Mutex<i64>,
}

impl ScrollElement for Viewport {
    fn client_rect(&self) -> Rect {
        self.rect
    }

    fn scroll_position(&self, _horizontal: bool) -> i64 {
        *self.position.lock().unwrap()
    }

    fn scroll_to(&self, position: i64, _horizontal: bool, _behavior: Option<ScrollBehavior>) {
        *self.position.lock().unwrap() = position;
    }
}

fn main() {
    // An adapter would:
    // - call sync_scroll_element() after mounting (and whenever the container may have changed)
    // - report scroll/resize events through the sink
    // - call pump(now_ms) in its frame loop, then render from the virtualizer state
    let viewport = Arc::new(Viewport {
        rect: Rect::new(80, 20),
        position: Mutex::new(0),
    });
    let element: Arc<dyn ScrollElement> = viewport.clone();
    let mut c = Controller::new(
        VirtualizerOptions::new(10_000, |_| 1).with_on_change(Some(
            |v: &Virtualizer, sync: bool| {
                println!("on_change(sync={sync}) offset={}", v.scroll_offset());
            },
        )),
        AdapterOptions::new(move || Some(Arc::clone(&element))),
    );
    c.sync_scroll_element();
    c.pump(0);

    c.virtualizer_mut()
        .scroll_to_index(2_000, ScrollToIndexOptions::align(Align::Center));
    let sink = c.sink();
    // The one-shot observers leave scroll events to the host.
    sink.offset(viewport.scroll_position(false) as u64, true)
        .expect("controller alive");

    let mut now_ms = 0u64;
    while now_ms <= 320 {
        c.pump(now_ms);
        now_ms += 80;
    }
    let v = c.virtualizer_mut();
    println!(
        "offset={} scrolling={} range={:?}",
        v.scroll_offset(),
        v.is_scrolling(),
        v.calculate_range()
    );
}
