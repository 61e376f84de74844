mod summary;
pub mod views;

pub(crate) use summary::{
    build_dashboard, build_division_report, build_outlet_report, build_range_report,
    build_visit_report, ResponseIndex,
};
