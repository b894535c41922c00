//! WebAssembly bindings for bouquet-core.
//!
//! This module exposes the creation session to the browser front end when
//! compiled to WASM. Structured values cross the boundary as JSON strings.

use wasm_bindgen::prelude::*;

use crate::{
    BouquetLayout, CreationFlow, EntryParams, FlowerCatalog, FlowerId, Language, LetterField,
    SessionHost, SharePayload,
};

/// Initialize the bouquet WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();
}

/// A creation session plus its flow, driven from JavaScript.
#[wasm_bindgen]
pub struct WasmBouquet {
    host: SessionHost,
    flow: CreationFlow,
    catalog: FlowerCatalog,
}

#[wasm_bindgen]
impl WasmBouquet {
    /// Begin a session from entry-point query values.
    ///
    /// # Errors
    ///
    /// Returns an error string if `catalog_json` is given but malformed.
    #[wasm_bindgen(constructor)]
    pub fn new(
        mode: Option<String>,
        lang: Option<String>,
        catalog_json: Option<String>,
    ) -> Result<WasmBouquet, String> {
        let catalog = match catalog_json {
            Some(json) => FlowerCatalog::from_json(&json).map_err(|e| e.to_string())?,
            None => FlowerCatalog::builtin(),
        };
        let mut host = SessionHost::new();
        host.begin(EntryParams::from_query(mode.as_deref(), lang.as_deref()));
        Ok(Self {
            host,
            flow: CreationFlow::new(),
            catalog,
        })
    }

    /// Add one unit of a catalog flower. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error string if the session has ended.
    #[wasm_bindgen(js_name = addFlower)]
    pub fn add_flower(&mut self, id: u32) -> Result<(), String> {
        let store = self.host.store_mut().map_err(|e| e.to_string())?;
        if let Some(entry) = self.catalog.get(FlowerId(id)) {
            store.add_flower(entry);
        }
        Ok(())
    }

    /// Remove one unit of a flower.
    ///
    /// # Errors
    ///
    /// Returns an error string if the session has ended.
    #[wasm_bindgen(js_name = removeFlower)]
    pub fn remove_flower(&mut self, id: u32) -> Result<(), String> {
        let store = self.host.store_mut().map_err(|e| e.to_string())?;
        store.remove_flower(FlowerId(id));
        Ok(())
    }

    /// Cycle the greenery variant.
    ///
    /// # Errors
    ///
    /// Returns an error string if the session has ended.
    #[wasm_bindgen(js_name = changeGreenery)]
    pub fn change_greenery(&mut self) -> Result<(), String> {
        let store = self.host.store_mut().map_err(|e| e.to_string())?;
        store.change_greenery();
        Ok(())
    }

    /// Shuffle the arrangement.
    ///
    /// # Errors
    ///
    /// Returns an error string if the session has ended.
    #[wasm_bindgen(js_name = randomizeArrangement)]
    pub fn randomize_arrangement(&mut self) -> Result<(), String> {
        let store = self.host.store_mut().map_err(|e| e.to_string())?;
        store.randomize_arrangement();
        Ok(())
    }

    /// Set `"recipient"`, `"sender"` or `"message"`.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown field or an ended session.
    #[wasm_bindgen(js_name = setLetterField)]
    pub fn set_letter_field(&mut self, field: &str, value: &str) -> Result<(), String> {
        let field: LetterField = field.parse().map_err(|e: crate::BouquetError| e.to_string())?;
        let store = self.host.store_mut().map_err(|e| e.to_string())?;
        store.set_letter_field(field, value);
        Ok(())
    }

    /// Switch the display language.
    ///
    /// # Errors
    ///
    /// Returns an error string if the session has ended.
    #[wasm_bindgen(js_name = setLanguage)]
    pub fn set_language(&mut self, code: &str) -> Result<(), String> {
        let store = self.host.store_mut().map_err(|e| e.to_string())?;
        store.set_language(Language::from_code(code));
        Ok(())
    }

    /// Total flower units, or 0 after the session ended.
    #[wasm_bindgen(js_name = totalFlowers)]
    #[must_use]
    pub fn total_flowers(&self) -> usize {
        self.host.store().map_or(0, crate::SessionStore::total_flowers)
    }

    /// Whether the current stage allows moving forward.
    #[wasm_bindgen(js_name = canAdvance)]
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.host
            .store()
            .is_ok_and(|store| self.flow.can_advance(store))
    }

    /// Current stage index (0-3).
    #[wasm_bindgen(js_name = stage)]
    #[must_use]
    pub fn stage(&self) -> usize {
        self.flow.stage().index()
    }

    /// Move forward if allowed; returns the stage index.
    ///
    /// # Errors
    ///
    /// Returns an error string if the session has ended.
    #[wasm_bindgen(js_name = next)]
    pub fn next(&mut self) -> Result<usize, String> {
        let store = self.host.store().map_err(|e| e.to_string())?;
        Ok(self.flow.next(store).index())
    }

    /// Move back; returns the stage index.
    #[wasm_bindgen(js_name = back)]
    pub fn back(&mut self) -> usize {
        self.flow.back().index()
    }

    /// The composition as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if the session has ended.
    #[wasm_bindgen(js_name = compositionJson)]
    pub fn composition_json(&self) -> Result<String, String> {
        let store = self.host.store().map_err(|e| e.to_string())?;
        serde_json::to_string(store.composition()).map_err(|e| e.to_string())
    }

    /// The render plan as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if the session has ended.
    #[wasm_bindgen(js_name = layoutJson)]
    pub fn layout_json(&self) -> Result<String, String> {
        let store = self.host.store().map_err(|e| e.to_string())?;
        let layout = BouquetLayout::compose(store.composition(), &self.catalog, store.language());
        serde_json::to_string(&layout).map_err(|e| e.to_string())
    }

    /// The record to hand to the persistence service, as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if the session has ended.
    #[wasm_bindgen(js_name = sharePayloadJson)]
    pub fn share_payload_json(&self) -> Result<String, String> {
        let store = self.host.store().map_err(|e| e.to_string())?;
        let payload = SharePayload::new(store.composition(), store.language());
        serde_json::to_string(&payload).map_err(|e| e.to_string())
    }

    /// End the session; returns the final composition as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if no session is active.
    #[wasm_bindgen(js_name = end)]
    pub fn end(&mut self) -> Result<String, String> {
        let composition = self
            .host
            .end()
            .ok_or_else(|| crate::BouquetError::NoActiveSession.to_string())?;
        serde_json::to_string(&composition).map_err(|e| e.to_string())
    }
}
