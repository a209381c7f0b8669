use std::io::{BufRead, BufReader, Write};
use std::time::Duration;

use anyhow::{Context, bail};
use csboard::schedule::encode_command;
use csboard::telemetry::ParsedTelemetry;

use crate::cli::SendArgs;
use crate::decode::Schedule;

pub(crate) fn action(args: SendArgs) -> anyhow::Result<()> {
    // Never put a command on the wire that the board would reject.
    let schedule = Schedule::decode(&args.schedule)?;

    let port_name = args.port.to_string_lossy();
    let mut port = serialport::new(port_name.as_ref(), args.baud)
        .timeout(Duration::from_secs(args.timeout))
        .open()
        .with_context(|| format!("opening {port_name}"))?;
    writeln!(port, "{}", encode_command(&schedule.times, &schedule.rows))?;
    port.flush()?;
    tracing::info!(port = %port_name, entries = schedule.times.len(), "schedule sent");

    let mut reader = BufReader::new(port);
    let mut line = String::new();
    let mut printed = 0;
    while printed < args.lines {
        line.clear();
        if reader.read_line(&mut line).context("reading telemetry")? == 0 {
            bail!("port closed after {printed} telemetry lines");
        }
        match line.parse::<ParsedTelemetry>() {
            Ok(telemetry) => {
                print_telemetry(&telemetry);
                printed += 1;
            }
            Err(e) => tracing::debug!(line = line.trim_end(), error = %e, "skipping line"),
        }
    }
    Ok(())
}

fn print_telemetry(t: &ParsedTelemetry) {
    println!("t = {:.1} s, program = {:.1} s", t.power_on_s, t.program_s);
    for (ch, (v, i)) in t.voltages.iter().zip(&t.currents).enumerate() {
        println!("  CH{ch} {v:>8.3} V {i:>8.3} mA");
    }
}
