use std::fmt;
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};
use std::str::FromStr;

use log::warn;

use crate::error::CategoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Abort,
}

/// Decides whether a run continues after one or more categories failed.
pub trait FailureDecider: Send {
    fn decide(&mut self, failures: &[CategoryError]) -> Decision;
}

pub struct AbortOnFailure;

impl FailureDecider for AbortOnFailure {
    fn decide(&mut self, _failures: &[CategoryError]) -> Decision {
        Decision::Abort
    }
}

pub struct ProceedOnFailure;

impl FailureDecider for ProceedOnFailure {
    fn decide(&mut self, _failures: &[CategoryError]) -> Decision {
        Decision::Proceed
    }
}

/// Shows the operator each failure and asks whether to continue.
/// Any answer not starting with `y`/`Y` aborts, as does a closed input.
pub struct PromptDecider<R, W> {
    input: R,
    output: W,
}

impl<R, W> PromptDecider<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl PromptDecider<BufReader<Stdin>, Stdout> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> PromptDecider<R, W> {
    fn ask(&mut self, failures: &[CategoryError]) -> io::Result<Decision> {
        let n = failures.len();
        writeln!(
            self.output,
            "encountered {} error(s) when querying for assets",
            n
        )?;

        for (i, failure) in failures.iter().enumerate() {
            writeln!(self.output, "{}/{}:", i + 1, n)?;
            writeln!(self.output, "{}", failure)?;
            writeln!(self.output, "Would you like to continue? (y/n)")?;
            self.output.flush()?;

            let mut answer = String::new();
            if self.input.read_line(&mut answer)? == 0 {
                return Ok(Decision::Abort);
            }
            if !answer.trim_start().starts_with(&['y', 'Y'][..]) {
                return Ok(Decision::Abort);
            }
        }
        Ok(Decision::Proceed)
    }
}

impl<R: BufRead + Send, W: Write + Send> FailureDecider for PromptDecider<R, W> {
    fn decide(&mut self, failures: &[CategoryError]) -> Decision {
        self.ask(failures).unwrap_or_else(|e| {
            warn!("prompt failed, aborting: {}", e);
            Decision::Abort
        })
    }
}

/// How category failures are resolved when the run is configured up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnCategoryFailure {
    #[default]
    Prompt,
    Abort,
    Proceed,
}

impl OnCategoryFailure {
    pub fn decider(self) -> Box<dyn FailureDecider> {
        match self {
            OnCategoryFailure::Prompt => Box::new(PromptDecider::stdin()),
            OnCategoryFailure::Abort => Box::new(AbortOnFailure),
            OnCategoryFailure::Proceed => Box::new(ProceedOnFailure),
        }
    }
}

impl fmt::Display for OnCategoryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OnCategoryFailure::Prompt => "prompt",
            OnCategoryFailure::Abort => "abort",
            OnCategoryFailure::Proceed => "proceed",
        })
    }
}

impl FromStr for OnCategoryFailure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prompt" => Ok(OnCategoryFailure::Prompt),
            "abort" => Ok(OnCategoryFailure::Abort),
            "proceed" => Ok(OnCategoryFailure::Proceed),
            other => Err(format!(
                "unknown failure policy '{other}' (expected prompt, abort or proceed)"
            )),
        }
    }
}
