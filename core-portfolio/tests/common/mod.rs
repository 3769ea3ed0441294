//! Shared fakes for the bridge integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_desktop::InMemoryBlobStore;
use bridge_traits::{
    error::Result as BridgeResult, AcceptFilter, Blob, ClipboardAccess, DecodedImage, DocumentId,
    EditorInstance, FileDownloader, FileUploader, HttpClient, HttpRequest, HttpResponse,
    ImageCodec, LayerId, NodeId, PixelData, RasterCanvas, ReadMode, Rgba8, SvgRasterizer,
    Transform, UploadedFile,
};
use bytes::Bytes;
use core_portfolio::{
    BridgeContext, FrontendMessage, MessageCallback, MessageSubscriptions, MessageType,
    PortfolioBridge, PortfolioStore,
};
use core_runtime::{BridgeConfig, BridgeConfigBuilder};
use mockall::mock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

mock! {
    pub Http {}

    #[async_trait]
    impl HttpClient for Http {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
    }
}

mock! {
    pub Uploader {}

    #[async_trait]
    impl FileUploader for Uploader {
        async fn upload(&self, accept: AcceptFilter, mode: ReadMode) -> BridgeResult<UploadedFile>;
    }
}

mock! {
    pub Downloader {}

    #[async_trait]
    impl FileDownloader for Downloader {
        async fn download_text(&self, name: &str, text: &str) -> BridgeResult<()>;
        async fn download_blob(&self, name: &str, blob: Blob) -> BridgeResult<()>;
    }
}

mock! {
    pub Clipboard {}

    #[async_trait]
    impl ClipboardAccess for Clipboard {
        async fn copy_file_url(&self, url: &str) -> BridgeResult<()>;
    }
}

mock! {
    pub Codec {}

    #[async_trait]
    impl ImageCodec for Codec {
        async fn extract_pixel_data(&self, blob: Blob) -> BridgeResult<PixelData>;
        async fn image_to_png(&self, blob: Blob) -> BridgeResult<Blob>;
        async fn decode(&self, blob: &Blob) -> BridgeResult<DecodedImage>;
    }
}

mock! {
    pub Rasterizer {}

    #[async_trait]
    impl SvgRasterizer for Rasterizer {
        async fn rasterize_svg(
            &self,
            svg: &str,
            width: u32,
            height: u32,
            mime: &str,
            background: Option<Rgba8>,
        ) -> BridgeResult<Blob>;
        async fn rasterize_svg_canvas(
            &self,
            svg: &str,
            width: u32,
            height: u32,
        ) -> BridgeResult<RasterCanvas>;
    }
}

/// Engine call observed by [`RecordingEditor`].
#[derive(Debug, Clone, PartialEq)]
pub enum EditorCall {
    OpenDocumentFile {
        filename: String,
        content: String,
    },
    PasteImage {
        bytes: usize,
        width: u32,
        height: u32,
    },
    ErrorDialog {
        title: String,
        description: String,
    },
    SetImageBlobUrl {
        document_id: DocumentId,
        layer_path: Vec<LayerId>,
        node_id: Option<NodeId>,
        blob_url: String,
        width: u32,
        height: u32,
        transform: Option<Transform>,
    },
    RenderRegion {
        document_id: DocumentId,
        layer_path: Vec<LayerId>,
        bytes: usize,
        width: u32,
        height: u32,
    },
}

/// Engine stand-in that records every callback.
pub struct RecordingEditor {
    calls: Mutex<Vec<EditorCall>>,
}

impl RecordingEditor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<EditorCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn dialogs(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EditorCall::ErrorDialog { title, description } => Some((title, description)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: EditorCall) -> BridgeResult<()> {
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl EditorInstance for RecordingEditor {
    fn open_document_file(&self, filename: &str, content: &str) -> BridgeResult<()> {
        self.record(EditorCall::OpenDocumentFile {
            filename: filename.to_string(),
            content: content.to_string(),
        })
    }

    fn paste_image(&self, data: &[u8], width: u32, height: u32) -> BridgeResult<()> {
        self.record(EditorCall::PasteImage {
            bytes: data.len(),
            width,
            height,
        })
    }

    fn error_dialog(&self, title: &str, description: &str) -> BridgeResult<()> {
        self.record(EditorCall::ErrorDialog {
            title: title.to_string(),
            description: description.to_string(),
        })
    }

    fn file_save_suffix(&self) -> String {
        "graphite".to_string()
    }

    fn set_image_blob_url(
        &self,
        document_id: DocumentId,
        layer_path: &[LayerId],
        node_id: Option<NodeId>,
        blob_url: &str,
        width: u32,
        height: u32,
        transform: Option<Transform>,
    ) -> BridgeResult<()> {
        self.record(EditorCall::SetImageBlobUrl {
            document_id,
            layer_path: layer_path.to_vec(),
            node_id,
            blob_url: blob_url.to_string(),
            width,
            height,
            transform,
        })
    }

    fn render_graph_using_rasterized_region_below_layer(
        &self,
        document_id: DocumentId,
        layer_path: &[LayerId],
        data: &[u8],
        width: u32,
        height: u32,
    ) -> BridgeResult<()> {
        self.record(EditorCall::RenderRegion {
            document_id,
            layer_path: layer_path.to_vec(),
            bytes: data.len(),
            width,
            height,
        })
    }
}

/// Engine subscription facility that lets tests emit messages.
#[derive(Default)]
pub struct FakeSubscriptions {
    callbacks: Mutex<HashMap<MessageType, MessageCallback>>,
}

impl FakeSubscriptions {
    pub fn subscribed(&self) -> usize {
        self.callbacks.lock().unwrap().len()
    }

    pub fn emit(&self, message: FrontendMessage) {
        let callbacks = self.callbacks.lock().unwrap();
        let callback = callbacks
            .get(&message.message_type())
            .expect("message type was not subscribed");
        callback(message);
    }

    /// Drop every callback, which lets the dispatcher's run loop finish.
    pub fn close(&self) {
        self.callbacks.lock().unwrap().clear();
    }
}

impl MessageSubscriptions for FakeSubscriptions {
    fn subscribe_message(&self, message_type: MessageType, callback: MessageCallback) {
        self.callbacks.lock().unwrap().insert(message_type, callback);
    }
}

/// Mock adapters with no expectations; tests add the ones they need.
pub struct Adapters {
    pub http: MockHttp,
    pub uploader: MockUploader,
    pub downloader: MockDownloader,
    pub clipboard: MockClipboard,
    pub codec: MockCodec,
    pub rasterizer: MockRasterizer,
    pub blobs: Arc<InMemoryBlobStore>,
}

impl Adapters {
    pub fn new() -> Self {
        Self {
            http: MockHttp::new(),
            uploader: MockUploader::new(),
            downloader: MockDownloader::new(),
            clipboard: MockClipboard::new(),
            codec: MockCodec::new(),
            rasterizer: MockRasterizer::new(),
            blobs: Arc::new(InMemoryBlobStore::new()),
        }
    }

    pub fn builder(self) -> BridgeConfigBuilder {
        BridgeConfig::builder()
            .http_client(Arc::new(self.http))
            .file_uploader(Arc::new(self.uploader))
            .file_downloader(Arc::new(self.downloader))
            .clipboard(Arc::new(self.clipboard))
            .image_codec(Arc::new(self.codec))
            .svg_rasterizer(Arc::new(self.rasterizer))
            .blob_store(self.blobs)
    }

    pub fn bridge(self, editor: Arc<RecordingEditor>) -> PortfolioBridge {
        PortfolioBridge::bootstrap(self.builder(), editor).unwrap()
    }

    /// Context for driving a single handler directly in the test task.
    pub fn context(self, editor: Arc<RecordingEditor>) -> BridgeContext {
        BridgeContext::new(self.builder().build().unwrap(), editor, PortfolioStore::new())
    }
}

pub fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: HashMap::new(),
        body: Bytes::from(body.to_string()),
    }
}
