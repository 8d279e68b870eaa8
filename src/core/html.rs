// src/core/html.rs
use scraper::ElementRef;

/// Text content of an element with runs of whitespace collapsed to one space.
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
