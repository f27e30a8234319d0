/// Maps byte offsets of a template source to 1-based line numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineIndex {
    /// Offset of the first byte of every line after the first.
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        Self {
            line_starts: source.match_indices('\n').map(|(i, _)| i + 1).collect(),
        }
    }

    pub fn line_number_at(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset) + 1
    }
}
