//! # Engine Message Vocabulary
//!
//! Typed messages the document engine emits towards the host.
//!
//! ## Wire format
//!
//! Messages are adjacently tagged JSON objects with camelCase payload fields:
//!
//! ```json
//! { "type": "UpdateActiveDocument", "payload": { "documentId": 42 } }
//! { "type": "TriggerImport" }
//! ```
//!
//! [`MessageType`] is the fieldless tag used when subscribing to a message
//! kind; [`MessageType::ALL`] lists every kind the bridge handles.

use bridge_traits::{DocumentId, LayerId, NodeId, Transform};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Summary of one open document, as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDetails {
    pub id: DocumentId,
    pub name: String,
    pub is_saved: bool,
    pub is_auto_saved: bool,
}

impl DocumentDetails {
    pub fn new(id: DocumentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_saved: true,
            is_auto_saved: true,
        }
    }
}

/// Two-component size in document pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub x: f64,
    pub y: f64,
}

impl Size {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// True when both components are at least one pixel.
    ///
    /// NaN components never qualify.
    pub fn has_area(&self) -> bool {
        self.x >= 1.0 && self.y >= 1.0
    }

    /// Integer canvas dimensions, truncating fractional pixels.
    pub fn pixel_dimensions(&self) -> (u32, u32) {
        (self.x as u32, self.y as u32)
    }
}

/// One image the engine wants the host to decode and address by URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDataEntry {
    /// Layer path of the layer holding the image.
    pub path: Vec<LayerId>,
    pub node_id: Option<NodeId>,
    pub mime: String,
    pub image_data: Vec<u8>,
    pub transform: Option<Transform>,
}

/// Messages emitted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all_fields = "camelCase")]
pub enum FrontendMessage {
    UpdateOpenDocumentsList {
        open_documents: Vec<DocumentDetails>,
    },
    UpdateActiveDocument {
        document_id: DocumentId,
    },
    TriggerFetchAndOpenDocument {
        url: String,
    },
    TriggerOpenDocument,
    TriggerImport,
    TriggerDownloadTextFile {
        name: String,
        document: String,
    },
    TriggerDownloadBlobUrl {
        layer_name: String,
        blob_url: String,
    },
    TriggerCopyToClipboardBlobUrl {
        blob_url: String,
    },
    TriggerDownloadRaster {
        svg: String,
        name: String,
        mime: String,
        size: Size,
    },
    UpdateImageData {
        document_id: DocumentId,
        image_data: Vec<ImageDataEntry>,
    },
    TriggerRasterizeRegionBelowLayer {
        document_id: DocumentId,
        layer_path: Vec<LayerId>,
        svg: String,
        size: Size,
    },
    TriggerRevokeBlobUrl {
        url: String,
    },
}

impl FrontendMessage {
    /// Returns the subscription tag of this message.
    pub fn message_type(&self) -> MessageType {
        match self {
            FrontendMessage::UpdateOpenDocumentsList { .. } => MessageType::UpdateOpenDocumentsList,
            FrontendMessage::UpdateActiveDocument { .. } => MessageType::UpdateActiveDocument,
            FrontendMessage::TriggerFetchAndOpenDocument { .. } => {
                MessageType::TriggerFetchAndOpenDocument
            }
            FrontendMessage::TriggerOpenDocument => MessageType::TriggerOpenDocument,
            FrontendMessage::TriggerImport => MessageType::TriggerImport,
            FrontendMessage::TriggerDownloadTextFile { .. } => MessageType::TriggerDownloadTextFile,
            FrontendMessage::TriggerDownloadBlobUrl { .. } => MessageType::TriggerDownloadBlobUrl,
            FrontendMessage::TriggerCopyToClipboardBlobUrl { .. } => {
                MessageType::TriggerCopyToClipboardBlobUrl
            }
            FrontendMessage::TriggerDownloadRaster { .. } => MessageType::TriggerDownloadRaster,
            FrontendMessage::UpdateImageData { .. } => MessageType::UpdateImageData,
            FrontendMessage::TriggerRasterizeRegionBelowLayer { .. } => {
                MessageType::TriggerRasterizeRegionBelowLayer
            }
            FrontendMessage::TriggerRevokeBlobUrl { .. } => MessageType::TriggerRevokeBlobUrl,
        }
    }

    /// Returns a human-readable description of the message.
    pub fn description(&self) -> &'static str {
        self.message_type().description()
    }
}

/// Fieldless tag identifying a [`FrontendMessage`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MessageType {
    UpdateOpenDocumentsList,
    UpdateActiveDocument,
    TriggerFetchAndOpenDocument,
    TriggerOpenDocument,
    TriggerImport,
    TriggerDownloadTextFile,
    TriggerDownloadBlobUrl,
    TriggerCopyToClipboardBlobUrl,
    TriggerDownloadRaster,
    UpdateImageData,
    TriggerRasterizeRegionBelowLayer,
    TriggerRevokeBlobUrl,
}

impl MessageType {
    /// Every message kind, in registration order.
    pub const ALL: [MessageType; 12] = [
        MessageType::UpdateOpenDocumentsList,
        MessageType::UpdateActiveDocument,
        MessageType::TriggerFetchAndOpenDocument,
        MessageType::TriggerOpenDocument,
        MessageType::TriggerImport,
        MessageType::TriggerDownloadTextFile,
        MessageType::TriggerDownloadBlobUrl,
        MessageType::TriggerCopyToClipboardBlobUrl,
        MessageType::TriggerDownloadRaster,
        MessageType::UpdateImageData,
        MessageType::TriggerRasterizeRegionBelowLayer,
        MessageType::TriggerRevokeBlobUrl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::UpdateOpenDocumentsList => "UpdateOpenDocumentsList",
            MessageType::UpdateActiveDocument => "UpdateActiveDocument",
            MessageType::TriggerFetchAndOpenDocument => "TriggerFetchAndOpenDocument",
            MessageType::TriggerOpenDocument => "TriggerOpenDocument",
            MessageType::TriggerImport => "TriggerImport",
            MessageType::TriggerDownloadTextFile => "TriggerDownloadTextFile",
            MessageType::TriggerDownloadBlobUrl => "TriggerDownloadBlobUrl",
            MessageType::TriggerCopyToClipboardBlobUrl => "TriggerCopyToClipboardBlobUrl",
            MessageType::TriggerDownloadRaster => "TriggerDownloadRaster",
            MessageType::UpdateImageData => "UpdateImageData",
            MessageType::TriggerRasterizeRegionBelowLayer => "TriggerRasterizeRegionBelowLayer",
            MessageType::TriggerRevokeBlobUrl => "TriggerRevokeBlobUrl",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MessageType::UpdateOpenDocumentsList => "Open documents list changed",
            MessageType::UpdateActiveDocument => "Active document changed",
            MessageType::TriggerFetchAndOpenDocument => "Fetch a document by URL and open it",
            MessageType::TriggerOpenDocument => "Open a document from a local file",
            MessageType::TriggerImport => "Import an image from a local file",
            MessageType::TriggerDownloadTextFile => "Save a text file",
            MessageType::TriggerDownloadBlobUrl => "Save a layer image as PNG",
            MessageType::TriggerCopyToClipboardBlobUrl => "Copy a layer image to the clipboard",
            MessageType::TriggerDownloadRaster => "Rasterize an SVG export and save it",
            MessageType::UpdateImageData => "Decode images and report their URLs",
            MessageType::TriggerRasterizeRegionBelowLayer => {
                "Rasterize the region below a layer"
            }
            MessageType::TriggerRevokeBlobUrl => "Release an object URL",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_types_are_unique() {
        let mut all = MessageType::ALL.to_vec();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), MessageType::ALL.len());
    }

    #[test]
    fn test_deserialize_wire_message() {
        let raw = json!({
            "type": "UpdateOpenDocumentsList",
            "payload": {
                "openDocuments": [
                    { "id": 1, "name": "Untitled Document", "isSaved": false, "isAutoSaved": true }
                ]
            }
        });

        let message: FrontendMessage = serde_json::from_value(raw).unwrap();
        assert_eq!(message.message_type(), MessageType::UpdateOpenDocumentsList);

        match message {
            FrontendMessage::UpdateOpenDocumentsList { open_documents } => {
                assert_eq!(open_documents.len(), 1);
                assert_eq!(open_documents[0].name, "Untitled Document");
                assert!(!open_documents[0].is_saved);
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_unit_variant_has_no_payload() {
        let value = serde_json::to_value(FrontendMessage::TriggerImport).unwrap();
        assert_eq!(value, json!({ "type": "TriggerImport" }));
    }

    #[test]
    fn test_image_data_entry_wire_fields() {
        let raw = json!({
            "type": "UpdateImageData",
            "payload": {
                "documentId": 9,
                "imageData": [{
                    "path": [3, 4],
                    "nodeId": null,
                    "mime": "image/png",
                    "imageData": [137, 80, 78, 71],
                    "transform": [1.0, 0.0, 0.0, 1.0, 10.0, 20.0]
                }]
            }
        });

        let message: FrontendMessage = serde_json::from_value(raw).unwrap();
        let FrontendMessage::UpdateImageData {
            document_id,
            image_data,
        } = message
        else {
            panic!("expected UpdateImageData");
        };
        assert_eq!(document_id, 9);
        assert_eq!(image_data[0].path, vec![3, 4]);
        assert_eq!(image_data[0].node_id, None);
        assert_eq!(image_data[0].transform, Some([1.0, 0.0, 0.0, 1.0, 10.0, 20.0]));
    }

    #[test]
    fn test_size_helpers() {
        assert!(Size::new(1.0, 1.0).has_area());
        assert!(!Size::new(0.5, 10.0).has_area());
        assert!(!Size::new(10.0, f64::NAN).has_area());
        assert_eq!(Size::new(12.9, 3.0).pixel_dimensions(), (12, 3));
    }

    #[test]
    fn test_display_and_description() {
        assert_eq!(MessageType::TriggerImport.to_string(), "TriggerImport");
        assert_eq!(
            FrontendMessage::TriggerRevokeBlobUrl { url: "blob:x".into() }.description(),
            "Release an object URL"
        );
    }
}
