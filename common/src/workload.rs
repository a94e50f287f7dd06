//! The operation under test.
//!
//! The harness never looks inside the timed operation: it hands over a
//! category index and a seed, and gets back a written length or a fault.
//! Key, signature and scratch buffers belong to the workload.

use core::fmt;

/// One timed step of a workload round (e.g. keygen, sign, verify).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Phase {
    /// Name used in error lines (`ERR keygen`).
    pub name: &'static str,
    /// Short column label used in reports (`kg`).
    pub label: &'static str,
    /// Minimum column width for the phase's figures.
    pub width: u32,
    /// Track restarts (samples > 1.5x the previous one) for this phase.
    pub detect_restarts: bool,
}

/// Failure reported by the operation under test.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// The library reported an internal failure.
    Internal,
    /// A check performed by the operation failed (e.g. a signature did not verify).
    Rejected,
    /// A phase ran before the phase that produces its input.
    MissingInput,
}

impl fmt::Display for Fault {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Internal => f.write_str("internal failure"),
            Self::Rejected => f.write_str("rejected"),
            Self::MissingInput => f.write_str("missing input"),
        }
    }
}

/// A benchmarked operation with `C` categories and `P` phases per round.
///
/// Phases run in order for each category; later phases may consume what
/// earlier ones produced.
pub trait Workload<const C: usize, const P: usize> {
    /// Name printed at the start of every report line.
    const NAME: &'static str;
    /// Name of the category parameter (e.g. `n` for the ring degree).
    const PARAM: &'static str;
    /// Category parameter values, in category order.
    const CATEGORIES: [u32; C];
    /// Phases of one round, in execution order.
    const PHASES: [Phase; P];
    /// One-shot operation timed only in the startup pass, after the phases.
    const STARTUP_EXTRA: Option<Phase> = None;

    /// Byte identifying `category` at the head of every seed.
    fn category_tag(
        &self,
        category: usize,
    ) -> u8 {
        category as u8
    }

    /// Fixed seed for the startup pass.
    fn reference_seed(
        &self,
        category: usize,
    ) -> [u8; 2] {
        [self.category_tag(category), 0]
    }

    /// Output length a successful `phase` must report, if it is fixed.
    fn expected_len(
        &self,
        _phase: usize,
        _category: usize,
    ) -> Option<usize> {
        None
    }

    /// Run the [`Self::STARTUP_EXTRA`] operation on what the phases of
    /// `category` just produced.
    fn run_startup_extra(
        &mut self,
        _category: usize,
    ) -> Result<usize, Fault> {
        Ok(0)
    }

    /// Run one phase. Returns the number of output bytes written.
    fn run(
        &mut self,
        phase: usize,
        category: usize,
        seed: &[u8],
    ) -> Result<usize, Fault>;
}
