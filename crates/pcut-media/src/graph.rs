//! Filter-graph compilation for trim/concat edits.
//!
//! Each retained segment becomes an independent video and audio trim of the
//! single input stream, with presentation timestamps reset to zero so the
//! final concatenation does not inherit offset gaps from the source.

use pcut_models::ResolvedSegment;

/// Stream label carrying the concatenated video.
pub const VIDEO_OUT_LABEL: &str = "[vout]";
/// Stream label carrying the concatenated audio.
pub const AUDIO_OUT_LABEL: &str = "[aout]";

/// Compiled trim/concat instruction graph.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterGraph {
    filter_complex: String,
    segment_count: usize,
}

impl FilterGraph {
    /// Compile an ordered segment list into an FFmpeg filter graph.
    ///
    /// Compilation is deterministic: the same segments always produce an
    /// identical instruction string. Timestamps are rendered with fixed
    /// millisecond precision.
    pub fn compile(segments: &[ResolvedSegment]) -> Self {
        let mut chains = Vec::with_capacity(segments.len() * 2 + 1);

        for (i, seg) in segments.iter().enumerate() {
            chains.push(format!(
                "[0:v]trim=start={:.3}:end={:.3},setpts=PTS-STARTPTS[v{i}]",
                seg.start_secs, seg.end_secs
            ));
            chains.push(format!(
                "[0:a]atrim=start={:.3}:end={:.3},asetpts=PTS-STARTPTS[a{i}]",
                seg.start_secs, seg.end_secs
            ));
        }

        let inputs: String = (0..segments.len())
            .map(|i| format!("[v{i}][a{i}]"))
            .collect();
        chains.push(format!(
            "{inputs}concat=n={}:v=1:a=1{VIDEO_OUT_LABEL}{AUDIO_OUT_LABEL}",
            segments.len()
        ));

        Self {
            filter_complex: chains.join(";"),
            segment_count: segments.len(),
        }
    }

    /// The `-filter_complex` expression.
    pub fn filter_complex(&self) -> &str {
        &self.filter_complex
    }

    /// Number of segments joined by the final concat.
    pub fn segment_count(&self) -> usize {
        self.segment_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64) -> ResolvedSegment {
        ResolvedSegment {
            start_secs: start,
            end_secs: end,
        }
    }

    #[test]
    fn single_segment_graph() {
        let graph = FilterGraph::compile(&[seg(10.0, 25.0)]);
        assert_eq!(
            graph.filter_complex(),
            "[0:v]trim=start=10.000:end=25.000,setpts=PTS-STARTPTS[v0];\
             [0:a]atrim=start=10.000:end=25.000,asetpts=PTS-STARTPTS[a0];\
             [v0][a0]concat=n=1:v=1:a=1[vout][aout]"
        );
        assert_eq!(graph.segment_count(), 1);
    }

    #[test]
    fn segments_appear_in_given_order() {
        let graph = FilterGraph::compile(&[seg(60.0, 90.0), seg(10.0, 25.0)]);
        let fc = graph.filter_complex();

        let first = fc.find("trim=start=60.000").unwrap();
        let second = fc.find("trim=start=10.000").unwrap();
        assert!(first < second);
        assert!(fc.contains("concat=n=2:v=1:a=1[vout][aout]"));
        assert!(fc.contains("[v0][a0][v1][a1]concat"));
    }

    #[test]
    fn every_segment_gets_audio_and_video_chains() {
        let segments = vec![seg(0.0, 1.0), seg(2.0, 3.0), seg(4.0, 5.0)];
        let graph = FilterGraph::compile(&segments);
        let fc = graph.filter_complex();

        assert_eq!(fc.matches("[0:v]trim=").count(), 3);
        assert_eq!(fc.matches("[0:a]atrim=").count(), 3);
        assert_eq!(fc.matches("setpts=PTS-STARTPTS").count(), 6);
    }

    #[test]
    fn compilation_is_deterministic() {
        let segments = vec![seg(1.5, 2.25), seg(10.0, 20.0)];
        let a = FilterGraph::compile(&segments);
        let b = FilterGraph::compile(&segments);
        assert_eq!(a, b);
    }

    #[test]
    fn fractional_boundaries_render_with_millisecond_precision() {
        let graph = FilterGraph::compile(&[seg(1.5, 2.0)]);
        assert!(graph.filter_complex().contains("trim=start=1.500:end=2.000"));
    }
}
