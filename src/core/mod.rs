pub mod daily;
pub mod etl;
pub mod monthly;
pub mod normalizer;
pub mod pipeline;
pub mod report;
pub mod summary;
pub mod timeline;

pub use crate::domain::model::{RawRow, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
