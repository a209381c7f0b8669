use anyhow::Context;
use csboard::schedule::{SetpointRow, decode_command};

use crate::cli::{DecodeArgs, ScheduleArgs};

/// A schedule decoded into storage sized like the receiver's.
pub(crate) struct Schedule {
    pub(crate) times: Vec<u32>,
    pub(crate) rows: Vec<SetpointRow>,
}

impl Schedule {
    pub(crate) fn decode(args: &ScheduleArgs) -> anyhow::Result<Self> {
        let mut times = vec![0; args.capacity];
        let mut rows = vec![[0.0; 8]; args.capacity];
        let n = decode_command(args.command.trim_end(), &mut times, &mut rows)
            .context("schedule command rejected")?;
        times.truncate(n);
        rows.truncate(n);
        tracing::debug!(entries = n, capacity = args.capacity, "schedule decoded");
        Ok(Self { times, rows })
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (u32, &SetpointRow)> {
        self.times.iter().copied().zip(&self.rows)
    }
}

pub(crate) fn action(args: DecodeArgs) -> anyhow::Result<()> {
    let schedule = Schedule::decode(&args.schedule)?;
    print!("{:>4} {:>10}", "row", "time");
    for ch in 0..8 {
        print!(" {:>8}", format!("CH{ch}"));
    }
    println!();
    for (i, (time, row)) in schedule.entries().enumerate() {
        print!("{i:>4} {time:>10}");
        for current in row {
            print!(" {current:>8.3}");
        }
        println!();
    }
    Ok(())
}
