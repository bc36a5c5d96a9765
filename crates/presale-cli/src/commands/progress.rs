use serde::Serialize;

use presale_core::display::render_allocation;
use presale_core::{AllocationSnapshot, CampaignCountdown, MemorySurface, UtcDateTime};

use crate::cli::ProgressArgs;
use crate::error::CliError;

use super::{CommandResult, Runtime};

#[derive(Debug, Serialize)]
struct ProgressResponseData {
    at: UtcDateTime,
    snapshot: AllocationSnapshot,
    total_units: u64,
    countdown: CampaignCountdown,
    ends_at: UtcDateTime,
}

pub fn run(args: &ProgressArgs, runtime: &Runtime) -> Result<CommandResult, CliError> {
    let at = match &args.at {
        Some(raw) => UtcDateTime::parse(raw)?,
        None => UtcDateTime::now(),
    };
    let model = &runtime.config.allocation.model;

    let mut display = MemorySurface::new();
    render_allocation(&mut display, model, at);

    let data = serde_json::to_value(ProgressResponseData {
        at,
        snapshot: model.snapshot(at),
        total_units: model.total_units,
        countdown: model.time_remaining(at),
        ends_at: model.end_time(),
    })?;

    Ok(CommandResult::new("progress", data, display))
}
