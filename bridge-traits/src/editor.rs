//! Engine Callback Contract
//!
//! Operations the document engine exposes to the bridge. Each call is a
//! one-way, side-effecting request; the only result is whether the engine
//! accepted it.

use crate::error::Result;

/// Engine-assigned document identifier.
pub type DocumentId = u64;

/// Engine-assigned layer identifier. A sequence of them addresses a nested layer.
pub type LayerId = u64;

/// Engine-assigned node identifier inside a document graph.
pub type NodeId = u64;

/// Column-major 2D affine transform `[a, b, c, d, e, f]`.
pub type Transform = [f64; 6];

/// Calls the bridge makes back into the engine.
pub trait EditorInstance: Send + Sync {
    /// Open `content` as a new document titled `filename`.
    fn open_document_file(&self, filename: &str, content: &str) -> Result<()>;

    /// Paste straight-alpha RGBA8 pixels into the active document.
    fn paste_image(&self, data: &[u8], width: u32, height: u32) -> Result<()>;

    /// Show a user-facing error dialog.
    fn error_dialog(&self, title: &str, description: &str) -> Result<()>;

    /// Extension used for saved documents, without the dot.
    fn file_save_suffix(&self) -> String;

    /// Tell the engine where a decoded image can be addressed.
    #[allow(clippy::too_many_arguments)]
    fn set_image_blob_url(
        &self,
        document_id: DocumentId,
        layer_path: &[LayerId],
        node_id: Option<NodeId>,
        blob_url: &str,
        width: u32,
        height: u32,
        transform: Option<Transform>,
    ) -> Result<()>;

    /// Hand back the rasterized pixels below a layer so the engine can render
    /// its node graph on top of them.
    fn render_graph_using_rasterized_region_below_layer(
        &self,
        document_id: DocumentId,
        layer_path: &[LayerId],
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<()>;
}
