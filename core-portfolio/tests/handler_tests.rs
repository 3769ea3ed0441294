//! Handler behaviour against mocked host adapters.
//!
//! Handlers are driven directly in the test task so a mock panic fails the
//! test instead of disappearing inside a spawned task.

mod common;

use bridge_traits::{
    AcceptFilter, Blob, BlobStore, BridgeError, DecodedImage, HttpMethod, HttpRequest,
    HttpResponse, PixelData, RasterCanvas, ReadMode, Rgba8, UploadContent, UploadedFile,
};
use bytes::Bytes;
use common::{response, Adapters, EditorCall, RecordingEditor};
use core_portfolio::handlers::handler_for;
use core_portfolio::{BridgeContext, FrontendMessage, ImageDataEntry, Size};
use core_runtime::UploadCancelPolicy;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

async fn run(ctx: &BridgeContext, message: FrontendMessage) {
    handler_for(message.message_type()).run(ctx, message).await;
}

const FETCH_DIALOG: (&str, &str) = (
    "Failed to open document",
    "The file could not be reached over the internet. You may be offline, or it may be missing.",
);

fn dialog(pair: (&str, &str)) -> (String, String) {
    (pair.0.to_string(), pair.1.to_string())
}

#[tokio::test]
async fn test_fetch_and_open_document() {
    let mut adapters = Adapters::new();
    adapters
        .http
        .expect_execute()
        .withf(|request: &HttpRequest| {
            request.method == HttpMethod::Get
                && request.url == "https://example.com/files/poster.graphite"
        })
        .times(1)
        .returning(|_| Ok(response(200, "{\"document\":true}")));

    let editor = RecordingEditor::new();
    let ctx = adapters.context(editor.clone());
    run(
        &ctx,
        FrontendMessage::TriggerFetchAndOpenDocument {
            url: "https://example.com/files/poster.graphite".to_string(),
        },
    )
    .await;

    assert_eq!(
        editor.calls(),
        vec![EditorCall::OpenDocumentFile {
            filename: "poster.graphite".to_string(),
            content: "{\"document\":true}".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_fetch_unreachable_shows_exactly_one_dialog() {
    let mut adapters = Adapters::new();
    adapters
        .http
        .expect_execute()
        .times(1)
        .returning(|_| Err(BridgeError::OperationFailed("connection refused".to_string())));

    let editor = RecordingEditor::new();
    let ctx = adapters.context(editor.clone());
    run(
        &ctx,
        FrontendMessage::TriggerFetchAndOpenDocument {
            url: "https://offline.invalid/doc.graphite".to_string(),
        },
    )
    .await;

    assert_eq!(editor.dialogs(), vec![dialog(FETCH_DIALOG)]);
    assert_eq!(editor.calls().len(), 1);
}

#[tokio::test]
async fn test_fetch_http_error_status_is_a_failure() {
    let mut adapters = Adapters::new();
    adapters
        .http
        .expect_execute()
        .times(1)
        .returning(|_| Ok(response(404, "not found")));

    let editor = RecordingEditor::new();
    let ctx = adapters.context(editor.clone());
    run(
        &ctx,
        FrontendMessage::TriggerFetchAndOpenDocument {
            url: "https://example.com/missing.graphite".to_string(),
        },
    )
    .await;

    assert_eq!(editor.dialogs(), vec![dialog(FETCH_DIALOG)]);
    assert_eq!(editor.calls().len(), 1);
}

#[tokio::test]
async fn test_fetch_invalid_url_never_reaches_network() {
    let adapters = Adapters::new();
    let editor = RecordingEditor::new();
    let ctx = adapters.context(editor.clone());

    run(
        &ctx,
        FrontendMessage::TriggerFetchAndOpenDocument {
            url: "not a url".to_string(),
        },
    )
    .await;

    assert_eq!(editor.dialogs(), vec![dialog(FETCH_DIALOG)]);
}

#[tokio::test]
async fn test_fetch_uses_fallback_name_for_empty_segment() {
    let mut adapters = Adapters::new();
    adapters
        .http
        .expect_execute()
        .returning(|_| Ok(response(200, "content")));

    let editor = RecordingEditor::new();
    let ctx = adapters.context(editor.clone());
    run(
        &ctx,
        FrontendMessage::TriggerFetchAndOpenDocument {
            url: "https://example.com/shared/".to_string(),
        },
    )
    .await;

    assert_eq!(
        editor.calls(),
        vec![EditorCall::OpenDocumentFile {
            filename: "Untitled".to_string(),
            content: "content".to_string(),
        }]
    );
}

struct SlowHttp;

#[async_trait::async_trait]
impl bridge_traits::HttpClient for SlowHttp {
    async fn execute(&self, _request: HttpRequest) -> bridge_traits::error::Result<HttpResponse> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(response(200, "too late"))
    }
}

#[tokio::test(start_paused = true)]
async fn test_io_timeout_resolves_through_failure_policy() {
    let editor = RecordingEditor::new();
    let config = Adapters::new()
        .builder()
        .http_client(Arc::new(SlowHttp))
        .io_timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let ctx = BridgeContext::new(config, editor.clone(), core_portfolio::PortfolioStore::new());

    run(
        &ctx,
        FrontendMessage::TriggerFetchAndOpenDocument {
            url: "https://example.com/slow.graphite".to_string(),
        },
    )
    .await;

    assert_eq!(editor.dialogs(), vec![dialog(FETCH_DIALOG)]);
}

#[tokio::test]
async fn test_open_document_filters_by_save_suffix() {
    let mut adapters = Adapters::new();
    adapters
        .uploader
        .expect_upload()
        .withf(|accept: &AcceptFilter, mode: &ReadMode| {
            *accept == AcceptFilter::Extension("graphite".to_string()) && *mode == ReadMode::Text
        })
        .times(1)
        .returning(|_, _| {
            Ok(UploadedFile {
                filename: "sketch.graphite".to_string(),
                content: UploadContent::Text("layers".to_string()),
                mime: String::new(),
            })
        });

    let editor = RecordingEditor::new();
    let ctx = adapters.context(editor.clone());
    run(&ctx, FrontendMessage::TriggerOpenDocument).await;

    assert_eq!(
        editor.calls(),
        vec![EditorCall::OpenDocumentFile {
            filename: "sketch.graphite".to_string(),
            content: "layers".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_open_document_cancel_is_silent_by_default() {
    let mut adapters = Adapters::new();
    adapters
        .uploader
        .expect_upload()
        .returning(|_, _| Err(BridgeError::Cancelled));

    let editor = RecordingEditor::new();
    let ctx = adapters.context(editor.clone());
    run(&ctx, FrontendMessage::TriggerOpenDocument).await;

    assert!(editor.calls().is_empty());
}

#[tokio::test]
async fn test_open_document_cancel_can_show_dialog() {
    let mut adapters = Adapters::new();
    adapters
        .uploader
        .expect_upload()
        .returning(|_, _| Err(BridgeError::Cancelled));

    let editor = RecordingEditor::new();
    let config = adapters
        .builder()
        .upload_cancel_policy(UploadCancelPolicy::ErrorDialog)
        .build()
        .unwrap();
    let ctx = BridgeContext::new(config, editor.clone(), core_portfolio::PortfolioStore::new());
    run(&ctx, FrontendMessage::TriggerOpenDocument).await;

    assert_eq!(
        editor.dialogs(),
        vec![dialog((
            "Failed to open document",
            "The selected file could not be read."
        ))]
    );
}

#[tokio::test]
async fn test_open_document_read_failure_shows_dialog() {
    let mut adapters = Adapters::new();
    adapters
        .uploader
        .expect_upload()
        .returning(|_, _| Err(BridgeError::OperationFailed("permission denied".to_string())));

    let editor = RecordingEditor::new();
    let ctx = adapters.context(editor.clone());
    run(&ctx, FrontendMessage::TriggerOpenDocument).await;

    assert_eq!(editor.dialogs().len(), 1);
    assert!(!editor
        .calls()
        .iter()
        .any(|call| matches!(call, EditorCall::OpenDocumentFile { .. })));
}

#[tokio::test]
async fn test_import_pastes_extracted_pixels() {
    let mut adapters = Adapters::new();
    adapters
        .uploader
        .expect_upload()
        .withf(|accept: &AcceptFilter, mode: &ReadMode| {
            *accept == AcceptFilter::Mime("image/*".to_string()) && *mode == ReadMode::Binary
        })
        .returning(|_, _| {
            Ok(UploadedFile {
                filename: "photo.png".to_string(),
                content: UploadContent::Binary(Bytes::from_static(b"\x89PNG")),
                mime: "image/png".to_string(),
            })
        });
    adapters
        .codec
        .expect_extract_pixel_data()
        .withf(|blob: &Blob| blob.mime == "image/png" && blob.data.as_ref() == b"\x89PNG")
        .returning(|_| PixelData::new(vec![0; 2 * 3 * 4], 2, 3));

    let editor = RecordingEditor::new();
    let ctx = adapters.context(editor.clone());
    run(&ctx, FrontendMessage::TriggerImport).await;

    assert_eq!(
        editor.calls(),
        vec![EditorCall::PasteImage {
            bytes: 24,
            width: 2,
            height: 3,
        }]
    );
}

#[tokio::test]
async fn test_import_decode_failure_shows_dialog() {
    let mut adapters = Adapters::new();
    adapters.uploader.expect_upload().returning(|_, _| {
        Ok(UploadedFile {
            filename: "notes.txt".to_string(),
            content: UploadContent::Binary(Bytes::from_static(b"hello")),
            mime: "image/png".to_string(),
        })
    });
    adapters
        .codec
        .expect_extract_pixel_data()
        .returning(|_| Err(BridgeError::UnsupportedFormat("not an image".to_string())));

    let editor = RecordingEditor::new();
    let ctx = adapters.context(editor.clone());
    run(&ctx, FrontendMessage::TriggerImport).await;

    assert_eq!(
        editor.dialogs(),
        vec![dialog((
            "Failed to import image",
            "The selected file could not be decoded as an image."
        ))]
    );
}

#[tokio::test]
async fn test_download_text_file() {
    let mut adapters = Adapters::new();
    adapters
        .downloader
        .expect_download_text()
        .withf(|name: &str, text: &str| name == "art.graphite" && text == "serialized")
        .times(1)
        .returning(|_, _| Ok(()));

    let editor = RecordingEditor::new();
    let ctx = adapters.context(editor.clone());
    run(
        &ctx,
        FrontendMessage::TriggerDownloadTextFile {
            name: "art.graphite".to_string(),
            document: "serialized".to_string(),
        },
    )
    .await;

    assert!(editor.calls().is_empty());
}

#[tokio::test]
async fn test_download_blob_url_reencodes_as_png() {
    let mut adapters = Adapters::new();
    let url = adapters
        .blobs
        .create_object_url(Blob::new(Bytes::from_static(b"webp"), "image/webp"));
    adapters
        .codec
        .expect_image_to_png()
        .withf(|blob: &Blob| blob.mime == "image/webp")
        .returning(|_| Ok(Blob::new(Bytes::from_static(b"png"), "image/png")));
    adapters
        .downloader
        .expect_download_blob()
        .withf(|name: &str, blob: &Blob| name == "Layer 1" && blob.mime == "image/png")
        .times(1)
        .returning(|_, _| Ok(()));

    let editor = RecordingEditor::new();
    let ctx = adapters.context(editor.clone());
    run(
        &ctx,
        FrontendMessage::TriggerDownloadBlobUrl {
            layer_name: "Layer 1".to_string(),
            blob_url: url,
        },
    )
    .await;

    assert!(editor.calls().is_empty());
}

#[tokio::test]
async fn test_download_blob_url_unknown_url_is_logged_only() {
    let adapters = Adapters::new();
    let editor = RecordingEditor::new();
    let ctx = adapters.context(editor.clone());

    run(
        &ctx,
        FrontendMessage::TriggerDownloadBlobUrl {
            layer_name: "Layer 1".to_string(),
            blob_url: "blob:editor-bridge/gone".to_string(),
        },
    )
    .await;

    assert!(editor.calls().is_empty());
}

#[tokio::test]
async fn test_copy_to_clipboard() {
    let mut adapters = Adapters::new();
    adapters
        .clipboard
        .expect_copy_file_url()
        .withf(|url: &str| url == "blob:editor-bridge/1")
        .times(1)
        .returning(|_| Ok(()));

    let editor = RecordingEditor::new();
    let ctx = adapters.context(editor.clone());
    run(
        &ctx,
        FrontendMessage::TriggerCopyToClipboardBlobUrl {
            blob_url: "blob:editor-bridge/1".to_string(),
        },
    )
    .await;

    assert!(editor.calls().is_empty());
}

fn raster_message(mime: &str) -> FrontendMessage {
    FrontendMessage::TriggerDownloadRaster {
        svg: "<svg/>".to_string(),
        name: "export".to_string(),
        mime: mime.to_string(),
        size: Size::new(64.0, 32.0),
    }
}

#[tokio::test]
async fn test_download_raster_jpeg_gets_white_background() {
    let mut adapters = Adapters::new();
    adapters
        .rasterizer
        .expect_rasterize_svg()
        .withf(|_svg, width, height, mime, background| {
            *width == 64 && *height == 32 && mime == "image/jpeg" && *background == Some(Rgba8::WHITE)
        })
        .times(1)
        .returning(|_, _, _, mime, _| Ok(Blob::new(Bytes::from_static(b"jpg"), mime)));
    adapters
        .downloader
        .expect_download_blob()
        .withf(|name: &str, blob: &Blob| name == "export" && blob.mime == "image/jpeg")
        .times(1)
        .returning(|_, _| Ok(()));

    let ctx = adapters.context(RecordingEditor::new());
    run(&ctx, raster_message("image/jpeg")).await;
}

#[tokio::test]
async fn test_download_raster_png_keeps_transparency() {
    let mut adapters = Adapters::new();
    adapters
        .rasterizer
        .expect_rasterize_svg()
        .withf(|_svg, _width, _height, _mime, background| background.is_none())
        .times(1)
        .returning(|_, _, _, mime, _| Ok(Blob::new(Bytes::from_static(b"png"), mime)));
    adapters
        .downloader
        .expect_download_blob()
        .times(1)
        .returning(|_, _| Ok(()));

    let ctx = adapters.context(RecordingEditor::new());
    run(&ctx, raster_message("image/png")).await;
}

#[tokio::test]
async fn test_download_raster_failure_is_silent() {
    let mut adapters = Adapters::new();
    adapters
        .rasterizer
        .expect_rasterize_svg()
        .returning(|_, _, _, _, _| Err(BridgeError::OperationFailed("bad svg".to_string())));

    let editor = RecordingEditor::new();
    let ctx = adapters.context(editor.clone());
    run(&ctx, raster_message("image/png")).await;

    assert!(editor.calls().is_empty());
}

fn region_message(size: Size) -> FrontendMessage {
    FrontendMessage::TriggerRasterizeRegionBelowLayer {
        document_id: 5,
        layer_path: vec![1, 2],
        svg: "<svg/>".to_string(),
        size,
    }
}

#[tokio::test]
async fn test_rasterize_region_guard_skips_empty_sizes() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut adapters = Adapters::new();
    let counter = Arc::clone(&calls);
    adapters
        .rasterizer
        .expect_rasterize_svg_canvas()
        .returning(move |_, width, height| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(RasterCanvas::new(width, height, None))
        });

    let editor = RecordingEditor::new();
    let ctx = adapters.context(editor.clone());
    for size in [Size::new(0.0, 10.0), Size::new(10.0, 0.5), Size::new(0.0, 0.0)] {
        run(&ctx, region_message(size)).await;
    }

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(editor.calls().is_empty());
}

#[tokio::test]
async fn test_rasterize_region_hands_pixels_to_engine() {
    let mut adapters = Adapters::new();
    adapters
        .rasterizer
        .expect_rasterize_svg_canvas()
        .withf(|_svg, width, height| *width == 3 && *height == 2)
        .times(1)
        .returning(|_, width, height| {
            Ok(RasterCanvas::new(
                width,
                height,
                Some(vec![255; (width * height * 4) as usize]),
            ))
        });

    let editor = RecordingEditor::new();
    let ctx = adapters.context(editor.clone());
    run(&ctx, region_message(Size::new(3.0, 2.0))).await;

    assert_eq!(
        editor.calls(),
        vec![EditorCall::RenderRegion {
            document_id: 5,
            layer_path: vec![1, 2],
            bytes: 24,
            width: 3,
            height: 2,
        }]
    );
}

#[tokio::test]
async fn test_rasterize_region_without_image_data_returns_quietly() {
    let mut adapters = Adapters::new();
    adapters
        .rasterizer
        .expect_rasterize_svg_canvas()
        .returning(|_, width, height| Ok(RasterCanvas::new(width, height, None)));

    let editor = RecordingEditor::new();
    let ctx = adapters.context(editor.clone());
    run(&ctx, region_message(Size::new(8.0, 8.0))).await;

    assert!(editor.calls().is_empty());
}

fn entry(path: Vec<u64>, mime: &str) -> ImageDataEntry {
    ImageDataEntry {
        path,
        node_id: Some(11),
        mime: mime.to_string(),
        image_data: vec![1, 2, 3],
        transform: None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_image_data_entries_all_reach_the_engine() {
    let mut adapters = Adapters::new();
    let blobs = Arc::clone(&adapters.blobs);
    adapters.codec.expect_decode().times(2).returning(|blob: &Blob| {
        Ok(DecodedImage {
            natural_width: if blob.mime == "image/png" { 10 } else { 20 },
            natural_height: 5,
        })
    });

    let editor = RecordingEditor::new();
    let ctx = adapters.context(editor.clone());
    run(
        &ctx,
        FrontendMessage::UpdateImageData {
            document_id: 3,
            image_data: vec![entry(vec![1], "image/png"), entry(vec![2], "image/jpeg")],
        },
    )
    .await;

    let mut widths: Vec<_> = editor
        .calls()
        .into_iter()
        .map(|call| match call {
            EditorCall::SetImageBlobUrl {
                document_id,
                node_id,
                width,
                blob_url,
                ..
            } => {
                assert_eq!(document_id, 3);
                assert_eq!(node_id, Some(11));
                assert!(blob_url.starts_with("blob:"));
                width
            }
            other => panic!("unexpected engine call {:?}", other),
        })
        .collect();
    widths.sort();

    assert_eq!(widths, vec![10, 20]);
    assert_eq!(blobs.live_urls(), 2);
}

#[tokio::test]
async fn test_image_data_failed_entry_does_not_block_others() {
    let mut adapters = Adapters::new();
    let blobs = Arc::clone(&adapters.blobs);
    adapters.codec.expect_decode().returning(|blob: &Blob| {
        if blob.mime == "image/broken" {
            Err(BridgeError::UnsupportedFormat("broken".to_string()))
        } else {
            Ok(DecodedImage {
                natural_width: 4,
                natural_height: 4,
            })
        }
    });

    let editor = RecordingEditor::new();
    let ctx = adapters.context(editor.clone());
    run(
        &ctx,
        FrontendMessage::UpdateImageData {
            document_id: 1,
            image_data: vec![entry(vec![1], "image/broken"), entry(vec![2], "image/png")],
        },
    )
    .await;

    let calls = editor.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(
        &calls[0],
        EditorCall::SetImageBlobUrl { layer_path, .. } if layer_path == &vec![2]
    ));
    // The broken entry's URL was released again.
    assert_eq!(blobs.live_urls(), 1);
}

#[tokio::test]
async fn test_image_data_respects_concurrency_limit() {
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    struct CountingCodec {
        active: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl bridge_traits::ImageCodec for CountingCodec {
        async fn extract_pixel_data(&self, _blob: Blob) -> bridge_traits::error::Result<PixelData> {
            unimplemented!()
        }

        async fn image_to_png(&self, blob: Blob) -> bridge_traits::error::Result<Blob> {
            Ok(blob)
        }

        async fn decode(&self, _blob: &Blob) -> bridge_traits::error::Result<DecodedImage> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::task::yield_now().await;
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(DecodedImage {
                natural_width: 1,
                natural_height: 1,
            })
        }
    }

    let editor = RecordingEditor::new();
    let config = Adapters::new()
        .builder()
        .image_codec(Arc::new(CountingCodec {
            active: Arc::clone(&active),
            peak: Arc::clone(&peak),
        }))
        .image_decode_concurrency(2)
        .build()
        .unwrap();
    let ctx = BridgeContext::new(config, editor.clone(), core_portfolio::PortfolioStore::new());

    let entries = (0..6).map(|n| entry(vec![n], "image/png")).collect();
    run(
        &ctx,
        FrontendMessage::UpdateImageData {
            document_id: 1,
            image_data: entries,
        },
    )
    .await;

    assert_eq!(editor.calls().len(), 6);
    assert!(peak.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn test_revoke_blob_url() {
    let adapters = Adapters::new();
    let blobs = Arc::clone(&adapters.blobs);
    let url = blobs.create_object_url(Blob::new(Bytes::from_static(b"x"), "image/png"));

    let editor = RecordingEditor::new();
    let ctx = adapters.context(editor.clone());
    run(&ctx, FrontendMessage::TriggerRevokeBlobUrl { url: url.clone() }).await;
    assert_eq!(blobs.live_urls(), 0);

    // Unknown URLs are only logged.
    run(&ctx, FrontendMessage::TriggerRevokeBlobUrl { url }).await;
    assert!(editor.calls().is_empty());
}
