use js_sys::Function;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use site_motion_core::{ExitReason, MotionConfig};
use site_orchestrator::{HostEvent, Orchestrator, SiteLayout};

#[wasm_bindgen]
pub struct WasmSite {
    inner: Orchestrator,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

/// Accept either a JS object or a JSON string.
fn from_js<T: serde::de::DeserializeOwned>(v: JsValue, what: &str) -> Result<T, JsError> {
    if let Some(s) = v.as_string() {
        return serde_json::from_str(&s).map_err(|e| JsError::new(&format!("{what} parse error: {e}")));
    }
    swb::from_value(v).map_err(|e| JsError::new(&format!("{what} error: {e}")))
}

fn to_js<T: serde::Serialize>(v: &T) -> Result<JsValue, JsError> {
    swb::to_value(v).map_err(|e| JsError::new(&format!("serialize error: {e}")))
}

fn exit_reason_str(reason: ExitReason) -> &'static str {
    match reason {
        ExitReason::Finished => "finished",
        ExitReason::Skipped => "skipped",
        ExitReason::Watchdog => "watchdog",
    }
}

#[wasm_bindgen]
impl WasmSite {
    /// Create a site. `config` and `layout` may be objects, JSON strings, or
    /// undefined/null for defaults.
    ///   new WasmSite({ nav: { hide_threshold_px: 400 } }, { viewport: [1440, 900] })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, layout: JsValue) -> Result<WasmSite, JsError> {
        #[cfg(feature = "console_error")]
        console_error_panic_hook::set_once();

        let cfg: MotionConfig = if jsvalue_is_undefined_or_null(&config) {
            MotionConfig::default()
        } else {
            from_js(config, "config")?
        };
        let layout: SiteLayout = if jsvalue_is_undefined_or_null(&layout) {
            SiteLayout::default()
        } else {
            from_js(layout, "layout")?
        };
        let inner = Orchestrator::new(cfg)
            .and_then(|o| o.with_layout(&layout))
            .map_err(|e| JsError::new(&format!("{e:#}")))?;
        Ok(WasmSite { inner })
    }

    /// Queue a host event, e.g. `{ type: "scroll", y: 640 }`.
    #[wasm_bindgen(js_name = push_event)]
    pub fn push_event(&mut self, event: JsValue) -> Result<(), JsError> {
        let event: HostEvent = from_js(event, "event")?;
        self.inner.push_event(event);
        Ok(())
    }

    /// Advance by `dt_ms` and return the frame `{ epoch, now_ms, dt_ms, changes, events, key_outcomes }`.
    /// Fractional milliseconds carry over to the next call.
    #[wasm_bindgen]
    pub fn step(&mut self, dt_ms: f64) -> Result<JsValue, JsError> {
        let frame = self
            .inner
            .step_host(dt_ms)
            .map_err(|e| JsError::new(&format!("step: {e:#}")))?;
        to_js(&frame)
    }

    #[wasm_bindgen]
    pub fn skip(&mut self) {
        self.inner.skip();
    }

    /// `callback(reason)` with reason "finished" | "skipped" | "watchdog".
    #[wasm_bindgen(js_name = on_preloader_complete)]
    pub fn on_preloader_complete(&mut self, callback: Function) {
        self.inner.on_preloader_complete(move |reason| {
            let arg = JsValue::from_str(exit_reason_str(reason));
            if let Err(err) = callback.call1(&JsValue::UNDEFINED, &arg) {
                log::warn!("preloader completion callback threw: {err:?}");
            }
        });
    }

    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        to_js(&self.inner.snapshot())
    }

    /// Release timers and the scroll lock; returns the final frame.
    #[wasm_bindgen]
    pub fn dispose(&mut self) -> Result<JsValue, JsError> {
        to_js(&self.inner.dispose())
    }
}

#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
