//! WASM bindings for avatar-core.
//!
//! Thin adapter for a browser paint host: it declares the registration name
//! and the properties the renderer reads, turns the host's property map into
//! a `RenderConfig`, and returns RGBA pixels ready for `ImageData`.

use wasm_bindgen::prelude::*;
use avatar_core::{
    input_properties, render_image_with_report, AvatarProps, RenderConfig, PAINT_NAME,
};

#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Name to register the painter under.
#[wasm_bindgen(js_name = paintName)]
pub fn paint_name() -> String {
    PAINT_NAME.to_string()
}

/// Property names the painter reads, seed first, then color slots 1..8.
#[wasm_bindgen(js_name = inputProperties)]
pub fn input_properties_js() -> js_sys::Array {
    input_properties()
        .into_iter()
        .map(|name| JsValue::from_str(&name))
        .collect()
}

/// Read a property from a JS `Map`, stringifying non-string values.
fn lookup(props: &js_sys::Map, name: &str) -> Option<String> {
    let value = props.get(&JsValue::from_str(name));
    if value.is_undefined() || value.is_null() {
        return None;
    }
    value.as_string().or_else(|| value.as_f64().map(|n| n.to_string()))
}

/// One painted avatar.
/// Pixel data is exposed as a flat typed array for `ImageData`.
#[wasm_bindgen]
pub struct AvatarFrame {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    point_count: usize,
}

#[wasm_bindgen]
impl AvatarFrame {
    /// RGBA pixels, row-major (length = width*height*4)
    #[wasm_bindgen(getter)]
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of Voronoi cells painted
    #[wasm_bindgen(getter)]
    pub fn point_count(&self) -> usize {
        self.point_count
    }
}

/// Stateless painter; every call seeds its own stream.
#[wasm_bindgen]
#[derive(Default)]
pub struct VoronoiAvatar {}

#[wasm_bindgen]
impl VoronoiAvatar {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {}
    }

    /// Paint an avatar for a `width` x `height` region from the host's property map.
    pub fn paint(&self, width: f64, height: f64, props: &js_sys::Map) -> Result<AvatarFrame, JsValue> {
        let config = AvatarProps::from_lookup(|name| lookup(props, name))
            .to_config(width, height)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        paint_config(&config)
    }

    /// Paint from explicit values instead of a property map.
    pub fn paint_with(
        &self,
        width: f64,
        height: f64,
        seed: Option<String>,
        colors: js_sys::Array,
    ) -> Result<AvatarFrame, JsValue> {
        let colors: Vec<String> = colors.iter().map(|c| c.as_string().unwrap_or_default()).collect();
        let config = AvatarProps::with_colors(seed.as_deref(), &colors)
            .and_then(|props| props.to_config(width, height))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        paint_config(&config)
    }
}

fn paint_config(config: &RenderConfig) -> Result<AvatarFrame, JsValue> {
    let (image, report) = render_image_with_report(config)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(AvatarFrame {
        width: image.width(),
        height: image.height(),
        pixels: image.into_raw(),
        point_count: report.points.len(),
    })
}
