mod assembler;
mod render;
mod sections;

pub use assembler::{ReportPackAssembler, ReportPackOutcome, ReportWarning};
pub use render::{ReportPack, ReportPage};
pub use sections::{ReportSection, SectionRow};

pub(crate) use render::{format_amount, format_date};
