#![allow(dead_code)]

pub mod fixtures;
pub mod pdf_assertions;

use formmark::core::{FormSession, PageMetrics, Point, SessionEvent, Size};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Display height of a US Letter page rendered 800 px wide.
pub const LETTER_AT_800: f32 = 800.0 * 792.0 / 612.0;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A session over the default template, rendered as US Letter at 800 px.
pub fn rendered_session() -> FormSession {
    let mut session = FormSession::default();
    let metrics = PageMetrics::fit_width(1, Size::new(612.0, 792.0), 800.0);
    session
        .dispatch(SessionEvent::RenderComplete(metrics))
        .expect("default template builds a grid");
    session
}

pub fn click(session: &mut FormSession, x: f32, y: f32) -> bool {
    session
        .dispatch(SessionEvent::Click(Point::new(x, y)))
        .expect("clicks never fail")
}
