//! Benchmark driver: timed rounds, statistics and periodic reports.
//!
//! The driver owns the output channel, the cycle timer and the workload.
//! Each call to [`Driver::run_one_iteration`] runs every phase of the
//! workload once per category with a fresh deterministic seed, feeds the
//! elapsed cycles to the per-phase statistics and renders either a full
//! report or a single progress marker.
//!
//! A workload fault or a wrong output length is terminal: the error line is
//! rendered once and every later call returns the same [`Halt`] without
//! touching the workload again. On hardware the caller loops forever; host
//! tests simply stop calling.

use core::fmt;

use crate::channel::OutputChannel;
use crate::config::{DriverConfig, PROGRESS_MARKER};
use crate::report::{Report, send_number, send_row_label};
use crate::render;
use crate::stats::Statistics;
use crate::timer::{CycleTimer, measure};
use crate::workload::{Fault, Phase, Workload};

/// Seed length for long-run rounds: category tag + iteration (LE).
pub const SEED_LEN: usize = 5;

/// Why the driver stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HaltReason {
    /// The workload reported a fault.
    Fault(Fault),
    /// The workload succeeded but wrote an unexpected number of bytes.
    UnexpectedLength(usize),
}

/// Terminal failure of the benchmark loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Halt {
    /// Name of the failing phase.
    pub phase: &'static str,
    /// Category being measured.
    pub category: usize,
    pub reason: HaltReason,
}

impl fmt::Display for Halt {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self.reason {
            HaltReason::Fault(fault) => write!(f, "{} failed in category {}: {}", self.phase, self.category, fault),
            HaltReason::UnexpectedLength(len) => {
                write!(f, "{} wrote {} bytes in category {}", self.phase, len, self.category)
            }
        }
    }
}

/// Outcome of one long-run iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Iteration<const C: usize, const P: usize> {
    /// A full report was rendered.
    Report(Report<C, P>),
    /// Only a progress marker was rendered; carries the iteration number.
    Progress(u32),
}

/// Long-run benchmark loop as a step function.
pub struct Driver<O, T, W, const C: usize, const P: usize> {
    out: O,
    timer: T,
    workload: W,
    config: DriverConfig,
    stats: [Statistics<C>; P],
    iteration: u32,
    halted: Option<Halt>,
}

impl<O, T, W, const C: usize, const P: usize> Driver<O, T, W, C, P>
where
    O: OutputChannel,
    T: CycleTimer,
    W: Workload<C, P>,
{
    /// Create a driver with empty statistics.
    pub fn new(
        out: O,
        timer: T,
        workload: W,
        config: DriverConfig,
    ) -> Self {
        Self {
            out,
            timer,
            workload,
            config,
            stats: core::array::from_fn(|p| Statistics::new(W::PHASES[p].detect_restarts)),
            iteration: 0,
            halted: None,
        }
    }

    /// Render the start-of-run banner.
    pub fn banner(&mut self) {
        let out = &mut self.out;
        render!(out, "-----------------------------------------\n");
        render!(out, "%s: %u categories, %u phases\n", W::NAME, C, P);
        render!(out, "timer overhead: %u cycles\n", self.config.overhead);
        render!(out, "-----------------------------------------\n");
    }

    /// Startup pass with each category's fixed reference seed.
    ///
    /// Renders one line of single-shot figures per category and seeds the
    /// restart baselines. The samples are not counted in the averages. A
    /// workload's startup-only operation, if any, gets one extra column.
    pub fn prime(&mut self) -> Result<[[u32; P]; C], Halt> {
        if let Some(halt) = self.halted {
            return Err(halt);
        }

        let mut all = [[0u32; P]; C];
        for (c, row) in all.iter_mut().enumerate() {
            let seed = self.workload.reference_seed(c);
            *row = self.measure_round(c, &seed)?;
            let extra = match W::STARTUP_EXTRA {
                Some(phase) => Some((phase, self.measure_startup_extra(phase, c)?)),
                None => None,
            };

            send_row_label::<W, C, P, O>(&mut self.out, c);
            for (p, (phase, &ticks)) in W::PHASES.iter().zip(row.iter()).enumerate() {
                self.stats[p].prime(c, ticks);
                render!(&mut self.out, "  %s: ", phase.name);
                send_number(&mut self.out, u64::from(ticks), phase.width);
            }
            if let Some((phase, ticks)) = extra {
                render!(&mut self.out, "  %s: ", phase.name);
                send_number(&mut self.out, u64::from(ticks), phase.width);
            }
            render!(&mut self.out, "\n");
        }
        Ok(all)
    }

    /// Run one round over every category and render its output.
    pub fn run_one_iteration(&mut self) -> Result<Iteration<C, P>, Halt> {
        if let Some(halt) = self.halted {
            return Err(halt);
        }

        let n = self.iteration.saturating_add(1);
        self.iteration = n;

        for c in 0..C {
            let mut seed = [0u8; SEED_LEN];
            seed[0] = self.workload.category_tag(c);
            seed[1..].copy_from_slice(&n.to_le_bytes());

            let samples = self.measure_round(c, &seed)?;
            for (stats, ticks) in self.stats.iter_mut().zip(samples) {
                stats.record(c, ticks);
            }
        }

        if self.config.is_report_iteration(n) {
            let report = Report::collect(n, &self.stats);
            report.render::<W, O>(&mut self.out);
            Ok(Iteration::Report(report))
        } else {
            render!(&mut self.out, PROGRESS_MARKER);
            Ok(Iteration::Progress(n))
        }
    }

    /// Time every phase of one category. Halts on the first failure.
    fn measure_round(
        &mut self,
        category: usize,
        seed: &[u8],
    ) -> Result<[u32; P], Halt> {
        let mut samples = [0u32; P];
        for (p, sample) in samples.iter_mut().enumerate() {
            let (result, ticks) = measure(&mut self.timer, || self.workload.run(p, category, seed));
            let reason = match result {
                Err(fault) => Some(HaltReason::Fault(fault)),
                Ok(len) => match self.workload.expected_len(p, category) {
                    Some(expected) if expected != len => Some(HaltReason::UnexpectedLength(len)),
                    _ => None,
                },
            };
            if let Some(reason) = reason {
                return Err(self.halt(Halt {
                    phase: W::PHASES[p].name,
                    category,
                    reason,
                }));
            }
            *sample = ticks.saturating_sub(self.config.overhead);
        }
        Ok(samples)
    }

    /// Time the startup-only operation of one category.
    fn measure_startup_extra(
        &mut self,
        phase: Phase,
        category: usize,
    ) -> Result<u32, Halt> {
        let (result, ticks) = measure(&mut self.timer, || self.workload.run_startup_extra(category));
        match result {
            Ok(_) => Ok(ticks.saturating_sub(self.config.overhead)),
            Err(fault) => Err(self.halt(Halt {
                phase: phase.name,
                category,
                reason: HaltReason::Fault(fault),
            })),
        }
    }

    /// Enter the terminal state, rendering the error line once.
    fn halt(
        &mut self,
        halt: Halt,
    ) -> Halt {
        match halt.reason {
            HaltReason::Fault(_) => render!(&mut self.out, "ERR %s\n", halt.phase),
            HaltReason::UnexpectedLength(len) => render!(&mut self.out, "ERR %s: %u\n", halt.phase, len),
        }
        self.halted = Some(halt);
        halt
    }
}

impl<O, T, W, const C: usize, const P: usize> Driver<O, T, W, C, P> {
    /// Statistics of one phase.
    pub fn statistics(
        &self,
        phase: usize,
    ) -> Option<&Statistics<C>> {
        self.stats.get(phase)
    }

    /// Number of iterations started so far.
    #[inline]
    pub const fn iteration(&self) -> u32 { self.iteration }

    /// The terminal failure, if the driver has halted.
    #[inline]
    pub const fn halted(&self) -> Option<Halt> { self.halted }

    /// The output channel.
    #[inline]
    pub const fn output(&self) -> &O { &self.out }

    /// Mutable access to the output channel.
    #[inline]
    pub fn output_mut(&mut self) -> &mut O { &mut self.out }

    /// The workload under test.
    #[inline]
    pub const fn workload(&self) -> &W { &self.workload }

    /// Take the driver apart.
    pub fn into_parts(self) -> (O, T, W) { (self.out, self.timer, self.workload) }
}
