use colored::*;
use sweepr_common::log::{ERROR_TARGET, INFO_TARGET, PRINT_TARGET, SUCCESS_TARGET, WARN_TARGET};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::{FmtContext, FormatEvent};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_FILTER: &str =
    "warn,sweepr::print=info,sweepr::success=info,sweepr::info=info,sweepr_cli=info";

pub struct SweeprFormatter;

impl<S, N> FormatEvent<S, N> for SweeprFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        if meta.target() == PRINT_TARGET {
            let mut visitor = RawMessage::default();
            event.record(&mut visitor);
            return writeln!(writer, "{}", visitor.0);
        }

        let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) =
            match (meta.target(), *meta.level()) {
                (SUCCESS_TARGET, _) => ("[+]", |s| s.green().bold()),
                (INFO_TARGET, _) | (_, Level::INFO) => ("[*]", |s| s.blue().bold()),
                (WARN_TARGET, _) | (_, Level::WARN) => ("[!]", |s| s.yellow().bold()),
                (ERROR_TARGET, _) | (_, Level::ERROR) => ("[-]", |s| s.red().bold()),
                (_, Level::DEBUG) => ("[?]", |s| s.blue()),
                (_, Level::TRACE) => ("[ ]", |s| s.dimmed()),
            };

        write!(writer, "{} ", color_func(symbol.into()))?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Pulls the pre-rendered line out of a print event.
#[derive(Default)]
struct RawMessage(String);

impl Visit for RawMessage {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "raw_msg" {
            self.0 = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "raw_msg" {
            self.0 = format!("{value:?}");
        }
    }
}

/// Installs the global subscriber. Log lines are routed through the progress
/// bar layer so they never tear a bar in half.
///
/// In JSON mode everything goes to stderr, leaving stdout to the report.
pub fn init_logging(json: bool) {
    let indicatif_layer = IndicatifLayer::new();

    let writer: BoxMakeWriter = if json {
        BoxMakeWriter::new(indicatif_layer.get_stderr_writer())
    } else {
        BoxMakeWriter::new(indicatif_layer.get_stdout_writer())
    };

    let filter: EnvFilter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(SweeprFormatter)
                .with_writer(writer),
        )
        .with(indicatif_layer)
        .init();
}
