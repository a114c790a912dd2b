use mpda_core::{Decoded, ModemConfig, ModemError, Receiver, Transmitter};
use wasm_bindgen::prelude::*;

fn to_js(err: ModemError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn config_for(tracks: usize, speed: u32, sample_rate: Option<u32>) -> Result<ModemConfig, JsValue> {
    let config = ModemConfig::new(tracks, speed).map_err(to_js)?;
    match sample_rate {
        Some(rate) => config.with_sample_rate(rate).map_err(to_js),
        None => Ok(config),
    }
}

#[wasm_bindgen]
pub struct WasmTransmitter {
    inner: Transmitter,
}

#[wasm_bindgen]
impl WasmTransmitter {
    /// `sample_rate` defaults to 44100 when omitted
    #[wasm_bindgen(constructor)]
    pub fn new(tracks: usize, speed: u32, sample_rate: Option<u32>) -> Result<WasmTransmitter, JsValue> {
        Ok(WasmTransmitter {
            inner: Transmitter::new(config_for(tracks, speed, sample_rate)?),
        })
    }

    /// Encode text into a Float32Array ready for playback
    #[wasm_bindgen]
    pub fn generate(&self, text: &str) -> Vec<f32> {
        self.inner.generate(text)
    }

    #[wasm_bindgen(js_name = durationSecs)]
    pub fn duration_secs(&self, text: &str) -> f32 {
        self.inner.signal_duration_secs(text)
    }
}

#[wasm_bindgen]
pub struct WasmReceiver {
    inner: Receiver,
}

#[wasm_bindgen]
impl WasmReceiver {
    /// Pass the AudioContext sample rate so windows match the capture stream
    #[wasm_bindgen(constructor)]
    pub fn new(tracks: usize, speed: u32, sample_rate: Option<u32>) -> Result<WasmReceiver, JsValue> {
        Ok(WasmReceiver {
            inner: Receiver::with_config(config_for(tracks, speed, sample_rate)?),
        })
    }

    /// Push one captured Float32Array block. Returns the next decoded
    /// character, `"<EOT>"` at the end of a transmission, or `undefined`.
    #[wasm_bindgen(js_name = processAudio)]
    pub fn process_audio(&mut self, chunk: &[f32]) -> Option<String> {
        self.inner.process_audio(chunk).as_ref().map(Decoded::to_string)
    }

    /// Next unit already decoded by earlier blocks
    #[wasm_bindgen]
    pub fn poll(&mut self) -> Option<String> {
        self.inner.poll().as_ref().map(Decoded::to_string)
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Switch track layout and speed, keeping the sample rate
    #[wasm_bindgen]
    pub fn configure(&mut self, tracks: usize, speed: u32) -> Result<(), JsValue> {
        self.inner.configure(tracks, speed).map_err(to_js)
    }

    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        format!("{:?}", self.inner.state())
    }
}
