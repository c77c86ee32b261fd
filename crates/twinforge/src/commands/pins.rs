//! Pin board command handler.

use tabled::Tabled;

use twinforge_core::{PinDisplay, PinState, Workbench};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PinRow {
    #[tabled(rename = "Pin")]
    pin: u8,
    #[tabled(rename = "State")]
    state: &'static str,
}

fn state_label(display: PinDisplay) -> &'static str {
    match display {
        PinDisplay::Unused => "unused",
        PinDisplay::Working => "working",
        PinDisplay::Error => "error",
    }
}

impl From<&PinState> for PinRow {
    fn from(pin: &PinState) -> Self {
        Self {
            pin: pin.pin,
            state: state_label(pin.display()),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(workbench: &Workbench, global: &GlobalOpts) -> Result<(), CliError> {
    let board = workbench.refresh_pins().await?;

    let rendered = output::render_list(
        &global.output,
        board.pins(),
        |p| PinRow::from(p),
        |p| format!("{} {}", p.pin, state_label(p.display())),
    );
    output::print_output(&rendered, global.quiet);

    if matches!(global.output, crate::cli::OutputFormat::Table) {
        let legend = board.legend();
        output::print_output(
            &format!(
                "{} working / {} error / {} unused",
                legend.working, legend.error, legend.unused
            ),
            global.quiet,
        );
    }
    Ok(())
}
