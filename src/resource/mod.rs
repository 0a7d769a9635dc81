//! 资源模块：获取、缓存、落盘
pub mod response;
pub mod fetcher;
pub mod cache;
pub mod resource;
pub mod persistor;

pub use self::response::FetchedResponse;
pub use self::fetcher::{HttpFetcher, ReqwestFetcher};
pub use self::cache::ResponseCache;
pub use self::resource::{Resource, ResourceRecord, RetrievalState};
pub use self::persistor::Persistor;
