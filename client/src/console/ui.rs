//! DOM output for the console.

use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use super::connection::LogSink;
use super::history::History;
use super::render::{Line, LogEntry};

/// Build the element for a structured entry. Attaching it is up to the caller.
pub fn entry_element(doc: &Document, entry: &LogEntry) -> Result<Element, JsValue> {
    let div = doc.create_element("div")?;
    div.set_class_name(&entry.class_name());
    div.set_inner_html(&entry.inner_html());
    Ok(div)
}

fn text_element(doc: &Document, text: &str) -> Result<Element, JsValue> {
    let div = doc.create_element("div")?;
    div.set_class_name("log-line");
    div.set_text_content(Some(text));
    Ok(div)
}

/// Appends lines to the `log-output` container, keeps at most
/// `capacity` of them and scrolls to the newest.
pub struct DomSink {
    doc: Document,
    container: Element,
    lines: History<Element>,
}

impl DomSink {
    pub fn new(doc: Document, container: Element, capacity: usize) -> Self {
        Self {
            doc,
            container,
            lines: History::new(capacity),
        }
    }

    fn render(&self, line: &Line) -> Result<Element, JsValue> {
        match line {
            Line::Text(text) => text_element(&self.doc, text),
            Line::Entry(entry) => entry_element(&self.doc, entry),
        }
    }
}

impl LogSink for DomSink {
    fn append(&mut self, line: Line) {
        let element = match self.render(&line) {
            Ok(el) => el,
            Err(e) => {
                log::error!("Failed to render log line: {:?}", e);
                return;
            }
        };
        if let Err(e) = self.container.append_child(&element) {
            log::error!("Failed to append log line: {:?}", e);
            return;
        }
        if let Some(oldest) = self.lines.push(element) {
            oldest.remove();
        }
        // Auto-scroll to bottom
        self.container.set_scroll_top(self.container.scroll_height());
    }
}
