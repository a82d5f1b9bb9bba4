// Interactive terminal front end
use crate::application::trip_log_store::TripLogStore;
use crate::infrastructure::csv_export::{
    format_difference, format_locale_timestamp, format_miles, write_export,
};
use crate::presentation::form::{Field, FormState};
use chrono::Local;
use std::io::{BufRead, Write};
use std::path::PathBuf;

const CLEAR_CONFIRMATION: &str = "Are you sure you want to clear all data? This cannot be undone.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    NewLeg,
    Export,
    Clear,
    Menu,
    Quit,
}

impl Command {
    fn parse(input: &str) -> Option<Self> {
        match input {
            "/new" => Some(Command::NewLeg),
            "/export" => Some(Command::Export),
            "/clear" => Some(Command::Clear),
            "/menu" => Some(Command::Menu),
            "/quit" | "/exit" => Some(Command::Quit),
            _ => None,
        }
    }
}

pub struct ConsoleApp<R, W> {
    store: TripLogStore,
    export_dir: PathBuf,
    input: R,
    output: W,
    form: FormState,
}

impl<R: BufRead, W: Write> ConsoleApp<R, W> {
    pub fn new(store: TripLogStore, export_dir: PathBuf, input: R, output: W) -> Self {
        Self {
            store,
            export_dir,
            input,
            output,
            form: FormState::default(),
        }
    }

    /// Runs the form until `/quit` or end of input.
    pub fn run(&mut self) -> anyhow::Result<()> {
        self.print_header()?;
        let mut field = Field::Maps;

        loop {
            let Some(line) = self.prompt(field.label())? else {
                break;
            };

            if line.starts_with('/') {
                match Command::parse(&line) {
                    Some(Command::Quit) => break,
                    Some(command) => self.run_command(command)?,
                    None => writeln!(
                        self.output,
                        "Unknown command {}. Try /new, /export, /clear, /menu or /quit.",
                        line
                    )?,
                }
                continue;
            }

            if !self.form.enter(field, &line) {
                writeln!(self.output, "Only digits and a single decimal point are allowed.")?;
                continue;
            }

            field = match field {
                Field::Maps => Field::Ev,
                Field::Ev => {
                    self.submit()?;
                    Field::Maps
                }
            };
        }

        self.output.flush()?;
        Ok(())
    }

    fn submit(&mut self) -> anyhow::Result<()> {
        let result = self.store.record_data_point(&self.form.maps, &self.form.ev);
        self.form.clear();

        match result {
            Ok(_) => self.print_current_leg(),
            Err(e) => {
                writeln!(self.output, "! {}", e)?;
                Ok(())
            }
        }
    }

    fn run_command(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::NewLeg => {
                let leg = self.store.start_new_leg();
                writeln!(self.output, "Current: {}", leg.name)?;
            }
            Command::Export => {
                let csv = self.store.export_csv();
                let path = write_export(&self.export_dir, self.store.export_date(), &csv)?;
                tracing::info!("Exported trip log to {}", path.display());
                writeln!(self.output, "Exported {}", path.display())?;
            }
            Command::Clear => {
                let answer = self.prompt(&format!("{} [y/N]", CLEAR_CONFIRMATION))?;
                if matches!(answer.as_deref(), Some("y" | "Y" | "yes")) {
                    self.store.clear_all();
                    writeln!(self.output, "All data cleared. Current: {}", self.store.log().current_leg().name)?;
                } else {
                    writeln!(self.output, "Nothing cleared.")?;
                }
            }
            Command::Menu => self.print_menu()?,
            Command::Quit => {}
        }
        Ok(())
    }

    fn print_header(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "EV Range Tracker")?;
        writeln!(self.output, "Current: {}", self.store.log().current_leg().name)?;
        writeln!(self.output, "Commands: /new /export /clear /menu /quit")?;
        Ok(())
    }

    fn print_current_leg(&mut self) -> anyhow::Result<()> {
        let leg = self.store.log().current_leg();
        writeln!(self.output, "{} - {} Data Points", leg.name, leg.data_points.len())?;
        for point in leg.data_points.iter().rev() {
            writeln!(
                self.output,
                "  Maps: {} mi  EV: {} mi  Diff: {} mi",
                format_miles(point.maps_estimate),
                format_miles(point.ev_estimate),
                format_difference(point.difference)
            )?;
            writeln!(self.output, "    {}", format_locale_timestamp(&point.timestamp, &Local))?;
        }
        Ok(())
    }

    fn print_menu(&mut self) -> anyhow::Result<()> {
        let summary = self.store.summary();
        writeln!(
            self.output,
            "Current: {} ({} data points)",
            summary.current_leg_name, summary.current_leg_points
        )?;
        writeln!(self.output, "Total Legs: {}", summary.total_legs)?;
        writeln!(self.output, "Total Data Points: {}", summary.total_data_points)?;
        for stats in self.store.leg_stats() {
            match stats.difference {
                Some(range) => writeln!(
                    self.output,
                    "  {}: {} points, diff avg {:.2} (min {:.2}, max {:.2})",
                    stats.name, stats.count, range.mean, range.min, range.max
                )?,
                None => writeln!(self.output, "  {}: no data points", stats.name)?,
            }
        }
        Ok(())
    }

    /// Prints `label: ` and reads one trimmed line; `None` at end of input.
    fn prompt(&mut self, label: &str) -> anyhow::Result<Option<String>> {
        write!(self.output, "{}: ", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
