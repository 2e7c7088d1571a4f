use colored::*;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Target for discovery events (live hosts, valid logins), printed as `[+]`.
pub const FOUND: &str = "ssh_check_rs::found";

/// One line per event: a colored status symbol followed by the fields.
pub struct CheckerFormatter;

impl<S, N> FormatEvent<S, N> for CheckerFormatter
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

        let symbol = if meta.target() == FOUND {
            "[+]".green().bold()
        } else {
            match *meta.level() {
                Level::TRACE => "[ ]".dimmed(),
                Level::DEBUG => "[-]".blue(),
                Level::INFO => "[*]".cyan(),
                Level::WARN => "[!]".yellow().bold(),
                Level::ERROR => "[!]".red().bold(),
            }
        };

        write!(writer, "{symbol} ")?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default level.
pub fn init(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(CheckerFormatter)
        .try_init();
}
