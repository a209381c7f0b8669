use std::time::Duration;

use csboard::{ControlBoard, Telemetry};

use crate::cli::SimulateArgs;
use crate::decode::Schedule;
use crate::sim::SimBus;

/// Apply each schedule row in turn, sample, and print telemetry.
///
/// Timestamps are taken as milliseconds from the start of the schedule.
pub(crate) fn action(args: SimulateArgs) -> anyhow::Result<()> {
    let schedule = Schedule::decode(&args.schedule)?;
    let config = args.board.config();
    let mut board = ControlBoard::new(SimBus::new(&config, args.load_kohm), config);
    board.begin()?;

    for (time, row) in schedule.entries() {
        for (channel, &current) in (0u8..).zip(row) {
            board.set_current(channel, current)?;
        }
        board.update_all()?;
        let elapsed = Duration::from_millis(u64::from(time));
        let line = Telemetry {
            power_on: elapsed,
            program: elapsed,
            measurements: board.measurements(),
            mute_threshold_v: board.config().mute_threshold_v,
        };
        println!("{line}");
    }
    Ok(())
}
