//! Per-iteration context
//!
//! Every per-dataset step receives the dataset it works on explicitly.
//! Nothing about "the current dataset" outlives one iteration.

use uuid::Uuid;

use crate::dataset::DatasetName;

#[derive(Debug, Clone, Copy)]
pub struct DatasetContext<'a> {
    pub run_id: Uuid,
    pub dataset: &'a DatasetName,
    /// 1-based position in the configured order
    pub position: usize,
    pub total: usize,
}

impl<'a> DatasetContext<'a> {
    /// One context per configured dataset, in configured order
    pub fn sequence(run_id: Uuid, datasets: &'a [DatasetName]) -> Vec<DatasetContext<'a>> {
        let total = datasets.len();
        datasets
            .iter()
            .enumerate()
            .map(|(i, dataset)| DatasetContext {
                run_id,
                dataset,
                position: i + 1,
                total,
            })
            .collect()
    }

    /// `n/total`, for log lines
    pub fn progress(&self) -> String {
        format!("{}/{}", self.position, self.total)
    }
}
