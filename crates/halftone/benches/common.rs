use std::time::Duration;

use criterion::{Criterion, Throughput};
use halftone::grid::GridLayout;

pub const SAMPLE_SIZE: usize = 30;
pub const WARM_UP: Duration = Duration::from_millis(500);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(3);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Throughput in grid cells for a resolved layout.
#[allow(dead_code)]
pub fn cells_throughput(layout: &GridLayout) -> Throughput {
    elements_throughput(layout.cell_count())
}
