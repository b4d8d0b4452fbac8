//! Forwards selected `tracing` spans to Micromegas thread-local scopes.
//!
//! Bevy's `trace` feature opens a `tracing` span for every schedule run and
//! every system. The layer picks spans by name and replays them as named
//! scopes so they show up on the Micromegas timeline.

use micromegas_tracing::dispatch::{on_begin_named_scope, on_end_named_scope};
use micromegas_tracing::intern_string::intern_string;
use tracing::Subscriber;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

micromegas_tracing::static_span_location!(BRIDGE_LOCATION);

/// Span names forwarded by default: one scope per schedule run.
pub const SCHEDULE_SPANS: &[&str] = &["schedule"];

/// Label stored on a bridged span.
struct BridgedSpan {
    label: &'static str,
}

/// Reads the `name` field, falling back to the span's own name.
#[derive(Default)]
struct LabelVisitor {
    label: Option<String>,
}

impl Visit for LabelVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "name" {
            self.label = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "name" && self.label.is_none() {
            self.label = Some(format!("{:?}", value));
        }
    }
}

pub struct MicromegasBridgeLayer {
    span_names: &'static [&'static str],
}

impl MicromegasBridgeLayer {
    pub fn new(span_names: &'static [&'static str]) -> Self {
        Self { span_names }
    }

    pub fn bridges(&self, span_name: &str) -> bool {
        self.span_names.contains(&span_name)
    }
}

impl Default for MicromegasBridgeLayer {
    fn default() -> Self {
        Self::new(SCHEDULE_SPANS)
    }
}

impl<S> Layer<S> for MicromegasBridgeLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let span_name = attrs.metadata().name();
        if !self.bridges(span_name) {
            return;
        }

        let mut visitor = LabelVisitor::default();
        attrs.record(&mut visitor);
        let label = intern_string(&visitor.label.unwrap_or_else(|| span_name.to_string()));

        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(BridgedSpan { label });
        }
    }

    fn on_enter(&self, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let extensions = span.extensions();
        if let Some(data) = extensions.get::<BridgedSpan>() {
            on_begin_named_scope(&BRIDGE_LOCATION, data.label);
        }
    }

    fn on_exit(&self, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let extensions = span.extensions();
        if let Some(data) = extensions.get::<BridgedSpan>() {
            on_end_named_scope(&BRIDGE_LOCATION, data.label);
        }
    }
}
