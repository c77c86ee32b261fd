//! Device status command handler.

use owo_colors::OwoColorize;

use twinforge_core::{Device, Workbench};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn detail(device: &Device, color: bool) -> String {
    let state = if device.online { "online" } else { "offline" };
    let state = if color {
        if device.online {
            state.green().to_string()
        } else {
            state.red().to_string()
        }
    } else {
        state.to_owned()
    };

    let last_seen = device
        .last_seen
        .map_or_else(|| "never".into(), |ts| ts.to_rfc3339());

    [
        format!("Device:     {}", device.id),
        format!("State:      {state}"),
        format!("Last seen:  {last_seen}"),
        format!(
            "Wi-Fi:      {}",
            if device.network_confirmed {
                "confirmed"
            } else {
                "unconfirmed"
            }
        ),
    ]
    .join("\n")
}

pub async fn handle(workbench: &Workbench, global: &GlobalOpts) -> Result<(), CliError> {
    let device = workbench.refresh_device().await?;

    let color = output::should_color(&global.color);
    let rendered = output::render_single(
        &global.output,
        &device,
        |d| detail(d, color),
        |d| d.id.clone(),
    );
    output::print_output(&rendered, global.quiet);
    Ok(())
}
