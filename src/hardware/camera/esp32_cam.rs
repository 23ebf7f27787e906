use esp_idf_svc::sys::{self, camera, esp, EspError};
use log::info;

use super::profile::{CaptureProfile, FrameSize};
use super::CameraDevice;
use crate::hardware::pins::{CameraPins, CAMERA_XCLK_FREQ_HZ};

#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("カメラの初期化に失敗しました: {0}")]
    Init(EspError),
}

/// PSRAM が利用可能か
pub fn psram_available() -> bool {
    unsafe { sys::heap_caps_get_total_size(sys::MALLOC_CAP_SPIRAM) > 0 }
}

/// ドライバから借りたフレームバッファ。ドロップで返却する
pub struct FrameBuffer {
    fb: *mut camera::camera_fb_t,
}

impl FrameBuffer {
    pub fn len(&self) -> usize {
        unsafe { (*self.fb).len }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AsRef<[u8]> for FrameBuffer {
    fn as_ref(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts((*self.fb).buf, (*self.fb).len) }
    }
}

impl Drop for FrameBuffer {
    fn drop(&mut self) {
        unsafe { camera::esp_camera_fb_return(self.fb) }
    }
}

/// esp32-camera ドライバを使う OV2640 カメラ
///
/// ドライバはグローバルな状態を持つため、`init` で生成したインスタンスは1つだけにすること。
pub struct Esp32Cam {
    _driver: (),
}

impl Esp32Cam {
    pub fn init(pins: &CameraPins, profile: CaptureProfile) -> Result<Self, CameraError> {
        let frame_size = match profile.frame_size {
            FrameSize::Uxga => camera::framesize_t_FRAMESIZE_UXGA,
            FrameSize::Svga => camera::framesize_t_FRAMESIZE_SVGA,
        };
        let fb_location = if profile.fb_in_psram {
            camera::camera_fb_location_t_CAMERA_FB_IN_PSRAM
        } else {
            camera::camera_fb_location_t_CAMERA_FB_IN_DRAM
        };

        let config = camera::camera_config_t {
            pin_pwdn: pins.pwdn,
            pin_reset: pins.reset,
            pin_xclk: pins.xclk,
            __bindgen_anon_1: camera::camera_config_t__bindgen_ty_1 {
                pin_sccb_sda: pins.sccb_sda,
            },
            __bindgen_anon_2: camera::camera_config_t__bindgen_ty_2 {
                pin_sccb_scl: pins.sccb_scl,
            },
            pin_d0: pins.data[0],
            pin_d1: pins.data[1],
            pin_d2: pins.data[2],
            pin_d3: pins.data[3],
            pin_d4: pins.data[4],
            pin_d5: pins.data[5],
            pin_d6: pins.data[6],
            pin_d7: pins.data[7],
            pin_vsync: pins.vsync,
            pin_href: pins.href,
            pin_pclk: pins.pclk,
            xclk_freq_hz: CAMERA_XCLK_FREQ_HZ,
            ledc_timer: sys::ledc_timer_t_LEDC_TIMER_0,
            ledc_channel: sys::ledc_channel_t_LEDC_CHANNEL_0,
            pixel_format: camera::pixformat_t_PIXFORMAT_JPEG,
            frame_size,
            jpeg_quality: profile.jpeg_quality,
            fb_count: profile.fb_count,
            fb_location,
            grab_mode: camera::camera_grab_mode_t_CAMERA_GRAB_WHEN_EMPTY,
            ..Default::default()
        };

        esp!(unsafe { camera::esp_camera_init(&config) }).map_err(CameraError::Init)?;
        info!(
            "カメラを初期化しました: {:?} 品質{} バッファ{} ({})",
            profile.frame_size,
            profile.jpeg_quality,
            profile.fb_count,
            if profile.fb_in_psram { "PSRAM" } else { "DRAM" }
        );

        Ok(Self { _driver: () })
    }
}

impl CameraDevice for Esp32Cam {
    type Frame = FrameBuffer;

    fn capture(&mut self) -> Option<FrameBuffer> {
        let fb = unsafe { camera::esp_camera_fb_get() };
        if fb.is_null() {
            None
        } else {
            Some(FrameBuffer { fb })
        }
    }
}

impl Drop for Esp32Cam {
    fn drop(&mut self) {
        unsafe {
            camera::esp_camera_deinit();
        }
    }
}
