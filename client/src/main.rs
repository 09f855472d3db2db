// Only the browser build wires everything together; native builds exist for tests.
#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

mod config;
mod console;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Event, HtmlInputElement};

    use crate::config::{CMD_FORM_ID, CMD_INPUT_ID, ConsoleConfig, LOG_OUTPUT_ID};
    use crate::console::{
        Console, ConnectionManager, DomSink, EventQueue, TransportEvent, WebTransport,
        page_endpoint, pump,
    };

    type WebConsole = Console<WebTransport, DomSink>;

    fn page_config(window: &web_sys::Window) -> ConsoleConfig {
        let query = window.location().search().unwrap_or_default();
        ConsoleConfig::default()
            .with_query(&query)
            .unwrap_or_else(|e| {
                log::warn!("Ignoring page settings: {}", e);
                ConsoleConfig::default()
            })
    }

    pub fn run() -> Result<(), JsValue> {
        std::panic::set_hook(Box::new(|info| {
            web_sys::console::error_1(&info.to_string().into())
        }));
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let window = web_sys::window().ok_or("No window")?;
        let doc = window.document().ok_or("No document")?;
        let config = page_config(&window);

        let output = doc
            .get_element_by_id(LOG_OUTPUT_ID)
            .ok_or("Missing #log-output")?;
        let input: HtmlInputElement = doc
            .get_element_by_id(CMD_INPUT_ID)
            .ok_or("Missing #cmd-input")?
            .dyn_into()?;
        let form = doc.get_element_by_id(CMD_FORM_ID).ok_or("Missing #cmd-form")?;

        let url = page_endpoint(&config.endpoint_path);
        let sink = DomSink::new(doc.clone(), output, config.history_capacity);
        let events: Rc<EventQueue<TransportEvent>> = Rc::new(EventQueue::new());

        let console = Rc::new_cyclic(|weak: &Weak<RefCell<WebConsole>>| {
            let weak = weak.clone();
            let queue = events.clone();
            let wake: Rc<dyn Fn()> = Rc::new(move || {
                if let Some(console) = weak.upgrade() {
                    pump(&console, &queue);
                }
            });
            let transport = WebTransport::new(events.clone(), wake);
            let manager = ConnectionManager::new(transport, url, config.reconnect);
            RefCell::new(Console::new(manager, sink))
        });

        let submit_console = console.clone();
        let submit_input = input.clone();
        let onsubmit = Closure::wrap(Box::new(move |ev: Event| {
            ev.prevent_default();
            let Ok(mut console) = submit_console.try_borrow_mut() else {
                log::warn!("Console busy, command dropped");
                return;
            };
            // Keep the text around if it didn't go out.
            if let Ok(true) = console.submit(&submit_input.value()) {
                submit_input.set_value("");
            }
        }) as Box<dyn FnMut(Event)>);
        form.add_event_listener_with_callback("submit", onsubmit.as_ref().unchecked_ref())?;
        onsubmit.forget();

        console.borrow_mut().connect();
        input.focus()?;
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    if let Err(e) = web::run() {
        web_sys::console::error_1(&e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("devconsole-client runs in the browser; build it for wasm32-unknown-unknown");
}
