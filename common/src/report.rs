//! Report snapshots and their text rendering.
//!
//! A report is computed on demand from the live statistics and rendered
//! through the format engine, one line per category:
//!
//! ```text
//! num = 100
//! Ed25519(len =   64)  kg:    812345  sg:   901234  (  901234)  vf:  2012345  rs=0
//! ```

use crate::channel::OutputChannel;
use crate::format::{Arg, Conversion, FormatSpec};
use crate::render;
use crate::stats::{Statistics, Summary};
use crate::workload::Workload;

/// Figures of every phase for every category after one iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Report<const C: usize, const P: usize> {
    /// Iteration (1-based) the report was taken after.
    pub iteration: u32,
    rows: [[Option<Summary>; P]; C],
}

impl<const C: usize, const P: usize> Report<C, P> {
    /// Snapshot the statistics of every phase.
    pub fn collect(
        iteration: u32,
        stats: &[Statistics<C>; P],
    ) -> Self {
        Self {
            iteration,
            rows: core::array::from_fn(|c| core::array::from_fn(|p| stats[p].summary(c))),
        }
    }

    /// Figures of one phase in one category.
    pub fn summary(
        &self,
        category: usize,
        phase: usize,
    ) -> Option<Summary> {
        self.rows.get(category)?.get(phase).copied().flatten()
    }

    /// Render the report: a `num = N` header, then one line per category.
    pub fn render<W: Workload<C, P>, O: OutputChannel + ?Sized>(
        &self,
        out: &mut O,
    ) {
        render!(out, "\nnum = %u\n", self.iteration);
        for (c, row) in self.rows.iter().enumerate() {
            send_row_label::<W, C, P, O>(out, c);
            for (phase, summary) in W::PHASES.iter().zip(row) {
                let summary = summary.unwrap_or_default();
                render!(out, "  %s: ", phase.label);
                send_number(out, summary.raw_average, phase.width);
                if phase.detect_restarts {
                    render!(out, "  (");
                    send_number(out, summary.clean_average, phase.width);
                    render!(out, ")");
                }
            }
            for (phase, summary) in W::PHASES.iter().zip(row) {
                if phase.detect_restarts {
                    render!(out, "  rs=%u", summary.map_or(0, |s| s.restarts));
                }
            }
            render!(out, "\n");
        }
    }
}

/// `Name(param = value)` prefix of a category line.
pub(crate) fn send_row_label<W: Workload<C, P>, const C: usize, const P: usize, O: OutputChannel + ?Sized>(
    out: &mut O,
    category: usize,
) {
    render!(out, "%s(%s = %4u)", W::NAME, W::PARAM, W::CATEGORIES[category]);
}

/// Unsigned decimal right-aligned to `width`.
pub(crate) fn send_number<O: OutputChannel + ?Sized>(
    out: &mut O,
    value: u64,
    width: u32,
) {
    let spec = FormatSpec {
        left_align: false,
        zero_pad: false,
        wide: true,
        width,
        conversion: Conversion::UnsignedDecimal,
    };
    spec.render(out, Arg::U64(value));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::BufferChannel;
    use crate::workload::{Fault, Phase};

    struct Toy;

    impl Workload<2, 2> for Toy {
        const NAME: &'static str = "Toy";
        const PARAM: &'static str = "n";
        const CATEGORIES: [u32; 2] = [8, 16];
        const PHASES: [Phase; 2] = [
            Phase {
                name: "keygen",
                label: "kg",
                width: 5,
                detect_restarts: false,
            },
            Phase {
                name: "sign",
                label: "sg",
                width: 4,
                detect_restarts: true,
            },
        ];

        fn run(
            &mut self,
            _phase: usize,
            _category: usize,
            _seed: &[u8],
        ) -> Result<usize, Fault> {
            Ok(0)
        }
    }

    fn toy_stats() -> [Statistics<2>; 2] {
        let mut kg: Statistics<2> = Statistics::new(false);
        let mut sg: Statistics<2> = Statistics::new(true);
        for (k, s) in [(10, 100), (12, 100), (11, 300)] {
            kg.record(0, k);
            sg.record(0, s);
        }
        kg.record(1, 7);
        sg.record(1, 9);
        [kg, sg]
    }

    #[test]
    fn test_collect_snapshots_every_phase() {
        let report: Report<2, 2> = Report::collect(3, &toy_stats());
        assert_eq!(report.iteration, 3);
        assert_eq!(report.summary(0, 0).unwrap().raw_average, 11);
        let sign = report.summary(0, 1).unwrap();
        assert_eq!(sign.restarts, 1);
        // raw = (500 + 1) / 3, clean = (200 + 1) / 3
        assert_eq!(sign.raw_average, 167);
        assert_eq!(sign.clean_average, 67);
        assert!(report.summary(2, 0).is_none());
        assert!(report.summary(0, 2).is_none());
    }

    #[test]
    fn test_render_layout() {
        let report: Report<2, 2> = Report::collect(3, &toy_stats());
        let mut ch: BufferChannel<256> = BufferChannel::new();
        report.render::<Toy, _>(&mut ch);
        assert_eq!(
            ch.as_str().unwrap(),
            "\nnum = 3\n\
             Toy(n =    8)  kg:    11  sg:  167  (  67)  rs=1\n\
             Toy(n =   16)  kg:     7  sg:    9  (   9)  rs=0\n"
        );
    }

    #[test]
    fn test_render_empty_statistics() {
        let stats = [Statistics::<2>::new(false), Statistics::<2>::new(true)];
        let report: Report<2, 2> = Report::collect(0, &stats);
        let mut ch: BufferChannel<256> = BufferChannel::new();
        report.render::<Toy, _>(&mut ch);
        assert!(ch.as_str().unwrap().contains("Toy(n =   16)  kg:     0  sg:    0  (   0)  rs=0\n"));
    }
}
