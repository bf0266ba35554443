//! Example: a counter component on the fOS document host
//!
//! Run with `RUST_LOG=debug` to see registration and binding decisions.

use fos_components::{
    Component, ElementContext, Event, Handler, HandlerSet, MutationRecord, Runtime, import,
};
use fos_dom::Document;
use tracing_subscriber::EnvFilter;

#[derive(Default)]
struct CounterApplication {
    count: u32,
}

impl Component for CounterApplication {
    const STYLES: Option<&'static str> = Some(
        r#"
        :app {
            display: inline-block;
            font-family: "Fira Sans",   sans-serif;
        }
        :app .value { font-weight: bold; }
        "#,
    );
    const TEMPLATE: Option<&'static str> = Some(r#"<span class="value">0</span>"#);
    const HANDLERS: HandlerSet = HandlerSet::of(&[Handler::Click, Handler::KeyDown]);

    fn on_connect(&mut self, cx: &mut ElementContext<'_>) {
        tracing::info!("counter {} connected, on screen: {}", cx.node(), cx.is_on_screen());
    }

    fn on_click(&mut self, cx: &mut ElementContext<'_>, _event: &mut Event) {
        self.count += 1;
        if let Err(err) = cx.set_attribute("data-count", &self.count.to_string()) {
            tracing::warn!("could not update counter: {}", err);
        }
    }

    fn on_key_down(&mut self, cx: &mut ElementContext<'_>, event: &mut Event) {
        self.count = 0;
        event.prevent_default();
        let _ = cx.remove_attribute("data-count");
    }
}

#[derive(Default)]
struct LogApplication;

impl Component for LogApplication {
    const SELECTOR: Option<&'static str> = Some("event-log");
    const WATCH_MUTATIONS: bool = true;

    fn on_mutation(&mut self, _cx: &mut ElementContext<'_>, record: &MutationRecord) {
        tracing::info!("log mutated: {:?} on {}", record.mutation_type, record.target);
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut document = Document::new();
    let body = document.body();
    document.set_inner_html(body, "<app-counter></app-counter><event-log></event-log>")?;

    let mut runtime = Runtime::new(document);
    let selectors = import!(runtime, CounterApplication, LogApplication)?;
    println!("Registered: {}", selectors.join(", "));

    let counter = runtime
        .host()
        .query_selector(body, "app-counter")?
        .ok_or_else(|| anyhow::anyhow!("counter missing"))?;
    let log = runtime
        .host()
        .query_selector(body, "event-log")?
        .ok_or_else(|| anyhow::anyhow!("log missing"))?;

    for _ in 0..3 {
        runtime.dispatch_event(counter, "click")?;
    }
    let count = runtime
        .instance::<CounterApplication>(counter)
        .map_or(0, |c| c.count);
    println!(
        "Counter at {} (data-count={:?})",
        count,
        runtime.host().get_attribute(counter, "data-count")
    );

    let entry = runtime.host_mut().create_text("three clicks");
    runtime.host_mut().append_child(log, entry)?;
    runtime.process()?;

    for style in runtime.host().styles() {
        println!("<style> {}", runtime.host().tree().text_content(style));
    }
    Ok(())
}
