pub mod dom;
pub mod patterns;
pub mod playlist;

pub use dom::select_attribute;
pub use patterns::{
    extract_iframe_loader_target, extract_json_assignment, extract_player_manifest,
};
pub use playlist::{EmbeddedPage, PlaylistData, PlaylistSource, QualityOption};
