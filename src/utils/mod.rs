//! 工具模块：Header转换、文件名清理、版本排序
pub mod header_converter;
pub mod path_name;
pub mod version_order;

pub use self::header_converter::HeaderConverter;
pub use self::path_name::{clean_path_name, derive_file_name, shorten_path_name};
pub use self::version_order::compare_versions;
