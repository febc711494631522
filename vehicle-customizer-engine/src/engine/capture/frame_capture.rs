use base64::Engine as _;
use bevy::prelude::*;
use bevy::render::render_resource::TextureFormat;
use bevy::render::view::screenshot::{Screenshot, ScreenshotCaptured};
use bevy::tasks::futures_lite::future;
use bevy::tasks::{AsyncComputeTaskPool, Task, block_on};
use bevy::window::PrimaryWindow;
use constants::render_settings::{CAPTURE_JPEG_QUALITY, CAPTURE_MAX_DIMENSION};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use crate::error::StudioError;
use crate::rpc::studio_rpc::StudioRpcInterface;

/// Ask for a still image of the current frame. Resolution happens over the
/// following frames; the render loop never blocks on it.
#[derive(Event, Default)]
pub struct CaptureRequest;

#[derive(Event)]
pub struct CaptureComplete {
    pub image: CapturedImage,
}

#[derive(Event)]
pub struct CaptureFailed {
    pub error: StudioError,
}

/// Encoded preview payload. Bounded: the longest side never exceeds the
/// configured cap regardless of source framebuffer size.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

impl CapturedImage {
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:image/jpeg;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.jpeg)
        )
    }
}

/// Most recent successful capture, picked up by `save_configuration`.
#[derive(Resource, Default)]
pub struct CurrentPreview {
    pub image: Option<CapturedImage>,
}

/// Raw framebuffer copy delivered by the screenshot observer. Everything
/// downstream works on this snapshot; the render loop's state is not shared.
struct RawFrame {
    width: u32,
    height: u32,
    format: TextureFormat,
    data: Vec<u8>,
}

#[derive(Resource, Default)]
struct PendingFrames {
    frames: Vec<RawFrame>,
    failures: Vec<StudioError>,
}

#[derive(Resource, Default)]
struct EncodeTasks {
    tasks: Vec<Task<Result<CapturedImage, StudioError>>>,
}

pub struct FrameCapturePlugin;

impl Plugin for FrameCapturePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CurrentPreview>()
            .init_resource::<PendingFrames>()
            .init_resource::<EncodeTasks>()
            .add_event::<CaptureRequest>()
            .add_event::<CaptureComplete>()
            .add_event::<CaptureFailed>()
            .add_systems(
                Update,
                (start_requested_captures, spawn_encode_tasks, poll_encode_tasks).chain(),
            );
    }
}

/// Longest-side cap while preserving aspect ratio. Never upscales.
pub fn bounded_dimensions(width: u32, height: u32, cap: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= cap || longest == 0 {
        return (width, height);
    }
    let scale = cap as f64 / longest as f64;
    let scaled_w = ((width as f64 * scale).round() as u32).max(1);
    let scaled_h = ((height as f64 * scale).round() as u32).max(1);
    (scaled_w, scaled_h)
}

/// CPU-side encode: swizzle to RGBA, resample under the cap, JPEG-encode.
/// Runs on the async compute pool, touching nothing the render loop owns.
fn encode_frame(frame: RawFrame, cap: u32, quality: u8) -> Result<CapturedImage, StudioError> {
    let rgba = match frame.format {
        TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb => frame.data,
        TextureFormat::Bgra8Unorm | TextureFormat::Bgra8UnormSrgb => {
            let mut data = frame.data;
            for texel in data.chunks_exact_mut(4) {
                texel.swap(0, 2);
            }
            data
        }
        other => {
            return Err(StudioError::CaptureFailure {
                reason: format!("unsupported framebuffer format {other:?}"),
            });
        }
    };

    let source = image::RgbaImage::from_raw(frame.width, frame.height, rgba).ok_or_else(|| {
        StudioError::CaptureFailure {
            reason: "framebuffer byte length does not match its dimensions".to_string(),
        }
    })?;

    let (width, height) = bounded_dimensions(frame.width, frame.height, cap);
    let resized = if (width, height) == (frame.width, frame.height) {
        source
    } else {
        image::imageops::resize(&source, width, height, FilterType::Triangle)
    };

    let rgb = image::DynamicImage::ImageRgba8(resized).to_rgb8();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality)
        .encode_image(&rgb)
        .map_err(|e| StudioError::CaptureFailure {
            reason: format!("jpeg encoding failed: {e}"),
        })?;

    if jpeg.is_empty() {
        return Err(StudioError::CaptureFailure {
            reason: "jpeg encoder produced an empty payload".to_string(),
        });
    }

    Ok(CapturedImage {
        width,
        height,
        jpeg,
    })
}

/// Turn capture requests into screenshot readbacks. The observer copies the
/// framebuffer snapshot into `PendingFrames` when the GPU readback lands.
fn start_requested_captures(
    mut requests: EventReader<CaptureRequest>,
    windows: Query<Entity, With<PrimaryWindow>>,
    mut pending: ResMut<PendingFrames>,
    mut commands: Commands,
) {
    for _ in requests.read() {
        if windows.is_empty() {
            pending.failures.push(StudioError::CaptureFailure {
                reason: "no active render surface".to_string(),
            });
            continue;
        }

        commands.spawn(Screenshot::primary_window()).observe(
            |trigger: Trigger<ScreenshotCaptured>, mut pending: ResMut<PendingFrames>| {
                let image = &trigger.event().0;
                match image.data.clone() {
                    Some(data) => pending.frames.push(RawFrame {
                        width: image.width(),
                        height: image.height(),
                        format: image.texture_descriptor.format,
                        data,
                    }),
                    None => pending.failures.push(StudioError::CaptureFailure {
                        reason: "screenshot carried no pixel data".to_string(),
                    }),
                }
            },
        );
    }
}

/// Hand raw frames to the async compute pool for bounded resize + encode.
fn spawn_encode_tasks(mut pending: ResMut<PendingFrames>, mut tasks: ResMut<EncodeTasks>) {
    for frame in pending.frames.drain(..) {
        let task = AsyncComputeTaskPool::get().spawn(async move {
            encode_frame(frame, CAPTURE_MAX_DIMENSION, CAPTURE_JPEG_QUALITY)
        });
        tasks.tasks.push(task);
    }
}

/// Collect finished encodes: publish the preview, notify the frontend, and
/// surface failures as retryable outcomes.
fn poll_encode_tasks(
    mut tasks: ResMut<EncodeTasks>,
    mut pending: ResMut<PendingFrames>,
    mut preview: ResMut<CurrentPreview>,
    mut completed: EventWriter<CaptureComplete>,
    mut failed: EventWriter<CaptureFailed>,
    mut rpc: ResMut<StudioRpcInterface>,
) {
    for error in pending.failures.drain(..) {
        error!("{error}");
        rpc.send_notification(
            "preview_failed",
            serde_json::json!({ "reason": error.to_string() }),
        );
        failed.write(CaptureFailed { error });
    }

    tasks.tasks.retain_mut(|task| {
        let Some(result) = block_on(future::poll_once(task)) else {
            return true;
        };
        match result {
            Ok(image) => {
                info!(
                    "✓ Preview captured: {}x{}, {} bytes",
                    image.width,
                    image.height,
                    image.jpeg.len()
                );
                rpc.send_notification(
                    "preview_captured",
                    serde_json::json!({
                        "width": image.width,
                        "height": image.height,
                        "image": image.to_data_uri(),
                    }),
                );
                preview.image = Some(image.clone());
                completed.write(CaptureComplete { image });
            }
            Err(error) => {
                error!("{error}");
                rpc.send_notification(
                    "preview_failed",
                    serde_json::json!({ "reason": error.to_string() }),
                );
                failed.write(CaptureFailed { error });
            }
        }
        false
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_side_never_exceeds_the_cap() {
        for (w, h) in [
            (1920, 1080),
            (1080, 1920),
            (800, 800),
            (801, 10),
            (4096, 4096),
            (640, 480),
        ] {
            let (bw, bh) = bounded_dimensions(w, h, 800);
            assert!(bw.max(bh) <= 800, "{w}x{h} -> {bw}x{bh}");
            assert!(bw >= 1 && bh >= 1);
        }
    }

    #[test]
    fn small_frames_are_not_upscaled() {
        assert_eq!(bounded_dimensions(640, 480, 800), (640, 480));
        assert_eq!(bounded_dimensions(800, 600, 800), (800, 600));
    }

    #[test]
    fn aspect_ratio_is_preserved() {
        let (w, h) = bounded_dimensions(1920, 1080, 800);
        assert_eq!((w, h), (800, 450));
        let (w, h) = bounded_dimensions(1080, 1920, 800);
        assert_eq!((w, h), (450, 800));
    }

    #[test]
    fn encode_produces_a_bounded_nonempty_jpeg() {
        let frame = RawFrame {
            width: 1024,
            height: 512,
            format: TextureFormat::Rgba8UnormSrgb,
            data: vec![0x80; 1024 * 512 * 4],
        };
        let image = encode_frame(frame, 800, 80).unwrap();
        assert_eq!((image.width, image.height), (800, 400));
        assert!(!image.jpeg.is_empty());
        // JPEG magic bytes.
        assert_eq!(&image.jpeg[..2], &[0xFF, 0xD8]);
        assert!(image.to_data_uri().starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn bgra_frames_are_swizzled_before_encode() {
        // A pure-red BGRA frame: blue channel first.
        let mut data = Vec::with_capacity(16 * 16 * 4);
        for _ in 0..16 * 16 {
            data.extend_from_slice(&[0x00, 0x00, 0xFF, 0xFF]);
        }
        let frame = RawFrame {
            width: 16,
            height: 16,
            format: TextureFormat::Bgra8UnormSrgb,
            data,
        };
        assert!(encode_frame(frame, 800, 80).is_ok());
    }

    #[test]
    fn unsupported_formats_fail_as_capture_errors() {
        let frame = RawFrame {
            width: 4,
            height: 4,
            format: TextureFormat::R32Float,
            data: vec![0; 4 * 4 * 4],
        };
        let err = encode_frame(frame, 800, 80).unwrap_err();
        assert!(matches!(err, StudioError::CaptureFailure { .. }));
    }

    #[test]
    fn truncated_buffers_fail_as_capture_errors() {
        let frame = RawFrame {
            width: 64,
            height: 64,
            format: TextureFormat::Rgba8UnormSrgb,
            data: vec![0; 16],
        };
        let err = encode_frame(frame, 800, 80).unwrap_err();
        assert!(matches!(err, StudioError::CaptureFailure { .. }));
    }
}
