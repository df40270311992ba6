//! 与具体提供商无关的数据模型。
//!
//! 所有实体都是一次请求内临时构造的，返回给调用方之后不再修改。

pub mod audio;
pub mod media;
pub mod pin;
pub mod post;
pub mod video;

pub use audio::{
    AudioRecord, AudioStreamResult, ItemKind, SearchResponse, SearchResult, TrackInfo,
    TrackSource,
};
pub use media::{MediaKind, MediaSource, index_sources};
pub use pin::{PinRecord, PinStreamResult};
pub use post::{PostRecord, PostStreamResult};
pub use video::{VideoRecord, VideoStreamResult};
