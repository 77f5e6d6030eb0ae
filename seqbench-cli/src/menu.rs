//! Interactive menu
//!
//! Line-oriented and generic over its input and output so it can be driven by
//! stdin/stdout or by a test script. End of input always exits cleanly.

use crate::output::{OutputFormat, render};
use crate::session::Session;
use indicatif::{ProgressBar, ProgressStyle};
use seqbench_core::{Action, ContainerKind};
use std::io::{self, BufRead, Write};

const MAIN_MENU: &str = "\
0 - SHOW current configuration (test cycles, list parameters, list types and data)
1 - update number of TEST CYCLES
2 - update list PARAMETERS
3 - update list TYPES and list DATA
4 - test and show average time of ACCESSING all the elements of the lists
5 - test and show average time of ADDING new elements to the lists
9 - exit";

const LIST_MENU: &str =
    "1|2|3|4 - choose CopyOnWriteVec | SynchronizedVec | UnsyncVec | LinkedSeq (0 - SHOW configuration)";

/// Menu state over a [`Session`]
pub struct Menu<R, W> {
    input: R,
    out: W,
    session: Session,
    format: OutputFormat,
    progress: bool,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    /// Human output, no progress bar
    pub fn new(input: R, out: W, session: Session) -> Self {
        Self {
            input,
            out,
            session,
            format: OutputFormat::Human,
            progress: false,
        }
    }

    /// Render results as `format`
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Show a spinner on stderr while cycles run
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Consume the menu, returning the session and the output sink
    pub fn into_parts(self) -> (Session, W) {
        (self.session, self.out)
    }

    /// Run until `9` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(
            self.out,
            "~~~~~ Concurrent Sequence Latency Comparator [v.{}] ~~~~~",
            env!("CARGO_PKG_VERSION")
        )?;
        writeln!(self.out, "{}", MAIN_MENU)?;

        while let Some(choice) = self.read_int()? {
            match choice {
                0 => self.show()?,
                1 => {
                    write!(self.out, "Enter number of testing cycles of the lists. ")?;
                    let Some(cycles) = self.read_int()? else { break };
                    if let Err(e) = self.session.set_cycles(cycles) {
                        self.warn(&e)?;
                    }
                }
                2 => {
                    if !self.update_size_params()? {
                        break;
                    }
                }
                3 => {
                    let Some((first, second)) = self.pick_lists()? else { break };
                    match self.session.select_lists(first, second) {
                        Ok(true) => {}
                        Ok(false) => self.warn(
                            &"The lists stay empty until valid list parameters are set",
                        )?,
                        Err(e) => self.warn(&e)?,
                    }
                    writeln!(self.out, "{}", MAIN_MENU)?;
                }
                4 => self.compare(Action::ReadByIndex)?,
                5 => self.compare(Action::Append)?,
                9 => break,
                _ => {
                    writeln!(self.out, "Expected: ")?;
                    writeln!(self.out, "{}", MAIN_MENU)?;
                }
            }
        }
        self.out.flush()
    }

    /// Prompt and parse one integer. `None` on end of input.
    fn read_int(&mut self) -> io::Result<Option<i64>> {
        let mut line = String::new();
        loop {
            write!(self.out, "Enter your choice : ")?;
            self.out.flush()?;
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            match line.trim().parse::<i64>() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => writeln!(self.out, "Not a number: {:?}", line.trim())?,
            }
        }
    }

    fn warn(&mut self, message: &dyn std::fmt::Display) -> io::Result<()> {
        writeln!(self.out, "WARNING - {}", message)
    }

    fn show(&mut self) -> io::Result<()> {
        write!(self.out, "{}", self.session.describe())
    }

    /// Returns `false` if input ended mid-prompt.
    fn update_size_params(&mut self) -> io::Result<bool> {
        let prompts = [
            "The NUMBER of elements in the lists. ",
            "The LOWEST limit of random value integers to add to the lists. ",
            "The HIGHEST limit of random value integers to add to the lists. ",
        ];
        let mut components = Vec::with_capacity(prompts.len());
        for prompt in prompts {
            write!(self.out, "{}", prompt)?;
            let Some(value) = self.read_int()? else {
                return Ok(false);
            };
            components.push(value);
        }
        if let Err(e) = self.session.set_size_params(components) {
            self.warn(&e)?;
        }
        Ok(true)
    }

    fn pick_lists(&mut self) -> io::Result<Option<(ContainerKind, ContainerKind)>> {
        writeln!(self.out, "{}", LIST_MENU)?;
        let mut picked = Vec::with_capacity(2);
        while picked.len() < 2 {
            let Some(choice) = self.read_int()? else {
                return Ok(None);
            };
            match choice {
                0 => self.show()?,
                1..=4 => picked.push(ContainerKind::ALL[(choice - 1) as usize]),
                _ => {
                    writeln!(self.out, "Expected: ")?;
                    writeln!(self.out, "{}", LIST_MENU)?;
                }
            }
        }
        Ok(Some((picked[0], picked[1])))
    }

    fn compare(&mut self, action: Action) -> io::Result<()> {
        let cycles = u64::try_from(self.session.cycles()).unwrap_or(0);
        let pb = if self.progress {
            let pb = ProgressBar::new(cycles.saturating_mul(2));
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] {pos}/{len} cycles {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let result = self.session.run(action, |slot, cycle| {
            pb.set_message(format!("{} list, cycle {}", slot, cycle));
            pb.inc(1);
        });
        pb.finish_and_clear();

        match result {
            Ok(comparison) => match render(&comparison, self.format) {
                Ok(text) => write!(self.out, "{}", text),
                Err(e) => self.warn(&e),
            },
            Err(e) => self.warn(&e),
        }
    }
}
