//! A lenient decoder for XPM images, such as the button glyphs and icons of desktop
//! themes.
//!
//! Images can be decoded directly into ARGB pixels:
//!
//! ```rust,no_run
//! let file = std::io::BufReader::new(std::fs::File::open("close.xpm").unwrap());
//! let image = xpm_glyphs::xpm::decode(&mut xpm_glyphs::xpm::XpmSource::new(file)).unwrap();
//! println!("{}x{}, {} pixels", image.width, image.height, image.pixels.len());
//! ```
//!
//! Or the decoder can be registered with the image crate at program startup:
//!
//!  ```rust,no_run
//! xpm_glyphs::register();
//!
//! // Now you can use the image crate as normal
//! let img = image::open("path/to/image.xpm").unwrap();
//! ```

#![forbid(unsafe_code)]

pub mod xpm;

pub use xpm::{decode, load, DecodedImage, XpmDecodeError, XpmDecoder};

use image::hooks::{register_decoding_hook, register_format_detection_hook};

static REGISTER: std::sync::Once = std::sync::Once::new();

/// Register the XPM decoder with the image crate.
pub fn register() {
    REGISTER.call_once(|| {
        if register_decoding_hook(
            "xpm".into(),
            Box::new(|r| Ok(Box::new(xpm::XpmDecoder::new(r)?))),
        ) {
            register_format_detection_hook("xpm".into(), b"/* XPM */", None);
        }
    });
}
