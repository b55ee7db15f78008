//! Browser facade.
//!
//! `PropView` wraps a [`ProposalEditor`] backed by `localStorage`. Values
//! cross the boundary as plain JS objects with the same shape as the JSON
//! wire format.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{Local, Utc};
use js_sys::{Object, Promise, Reflect, Uint8Array};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use crate::config::EditorConfig;
use crate::editor::{CellEdit, Command, ProposalEditor};
use crate::error::{AssetLoadError, PropviewError};
use crate::export::{export_grid, SheetFormat};
use crate::persistence::LocalStorage;
use crate::projection::{
    mime_for, project_itemized_quote, project_system_proposal, Asset, AssetBundle, ContentPlan,
};
use crate::render::{DocumentRenderer, PdfRenderer};
use crate::types::{CollectionRef, ProposalSnapshot, SectionRef};

fn js_err(e: impl Into<PropviewError>) -> JsValue {
    JsValue::from(e.into())
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

/// `{ fileName, <key>: value }`
fn file_object(file_name: &str, key: &str, value: &JsValue) -> Result<JsValue, JsValue> {
    let object = Object::new();
    Reflect::set(&object, &"fileName".into(), &file_name.into())?;
    Reflect::set(&object, &key.into(), value)?;
    Ok(object.into())
}

#[wasm_bindgen]
pub struct PropView {
    editor: Rc<RefCell<ProposalEditor<LocalStorage>>>,
}

#[wasm_bindgen]
impl PropView {
    /// Open the editor. `config` is an optional `EditorConfig` object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<PropView, JsValue> {
        console_error_panic_hook::set_once();
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        config.validate()?;
        let storage = LocalStorage::new().map_err(js_err)?;
        Ok(Self {
            editor: Rc::new(RefCell::new(ProposalEditor::open(storage, config))),
        })
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js(&*self.editor.borrow().snapshot())
    }

    /// Apply a `{ command, payload }` object; returns the outcome.
    pub fn dispatch(&self, command: JsValue) -> Result<JsValue, JsValue> {
        let command: Command = serde_wasm_bindgen::from_value(command)?;
        let outcome = self.editor.borrow_mut().dispatch(command).map_err(js_err)?;
        to_js(&outcome)
    }

    /// Apply a grid `{ collection, id, field, value }` edit.
    #[wasm_bindgen(js_name = "cellEdit")]
    pub fn cell_edit(&self, edit: JsValue) -> Result<JsValue, JsValue> {
        let edit: CellEdit = serde_wasm_bindgen::from_value(edit)?;
        let outcome = self
            .editor
            .borrow_mut()
            .apply_cell_edit(edit)
            .map_err(js_err)?;
        to_js(&outcome)
    }

    pub fn metrics(&self) -> Result<JsValue, JsValue> {
        let metrics = self.editor.borrow().metrics().map_err(js_err)?;
        to_js(&metrics)
    }

    pub fn totals(&self, section: JsValue) -> Result<JsValue, JsValue> {
        let section: SectionRef = serde_wasm_bindgen::from_value(section)?;
        to_js(&self.editor.borrow().section_totals(section))
    }

    pub fn save(&self) -> bool {
        self.editor.borrow_mut().save(Utc::now())
    }

    #[wasm_bindgen(js_name = "isDirty")]
    pub fn is_dirty(&self) -> bool {
        self.editor.borrow().is_dirty()
    }

    /// ISO timestamp of the last explicit save, if any.
    #[wasm_bindgen(js_name = "lastSaved")]
    pub fn last_saved(&self) -> Option<String> {
        self.editor.borrow().last_saved().map(|t| t.to_rfc3339())
    }

    pub fn reset(&self) -> Result<JsValue, JsValue> {
        let snapshot = self.editor.borrow_mut().reset();
        to_js(&*snapshot)
    }

    /// `{ fileName, contents }` of the JSON download.
    #[wasm_bindgen(js_name = "exportSnapshot")]
    pub fn export_snapshot(&self) -> Result<JsValue, JsValue> {
        let export = self
            .editor
            .borrow()
            .export_snapshot(Local::now().date_naive())
            .map_err(js_err)?;
        file_object(&export.file_name, "contents", &export.contents.into())
    }

    #[wasm_bindgen(js_name = "importSnapshot")]
    pub fn import_snapshot(&self, json: &str) -> Result<(), JsValue> {
        self.editor
            .borrow_mut()
            .import_snapshot(json)
            .map_err(js_err)
    }

    /// `{ fileName, bytes }` of a CSV or XLSX grid export.
    #[wasm_bindgen(js_name = "exportGrid")]
    pub fn export_grid(&self, collection: JsValue, format: JsValue) -> Result<JsValue, JsValue> {
        let collection: CollectionRef = serde_wasm_bindgen::from_value(collection)?;
        let format: SheetFormat = serde_wasm_bindgen::from_value(format)?;
        let snapshot = self.editor.borrow().snapshot();
        let export = export_grid(&snapshot, collection, format, Local::now().date_naive())
            .map_err(js_err)?;
        let bytes = Uint8Array::from(export.bytes.as_slice());
        file_object(&export.file_name, "bytes", &bytes.into())
    }

    #[wasm_bindgen(js_name = "isGenerating")]
    pub fn is_generating(&self) -> bool {
        self.editor.borrow().is_generating()
    }

    /// Generate a PDF. `kind` is `"system"` or `"accessControl"`; assets are
    /// fetched from `asset_base`. Resolves to `{ fileName, bytes }`.
    ///
    /// Rejects while another generation is running.
    #[wasm_bindgen(js_name = "generatePdf")]
    pub fn generate_pdf(&self, kind: String, asset_base: String) -> Promise {
        let editor = Rc::clone(&self.editor);
        future_to_promise(async move {
            let snapshot = editor.borrow_mut().begin_generation().map_err(js_err)?;
            let config = editor.borrow().config().clone();
            let result = build_pdf(&snapshot, &config, &kind, &asset_base).await;
            editor.borrow_mut().finish_generation();
            result
        })
    }
}

async fn build_pdf(
    snapshot: &ProposalSnapshot,
    config: &EditorConfig,
    kind: &str,
    asset_base: &str,
) -> Result<JsValue, JsValue> {
    let today = Local::now().date_naive();
    let plan = match kind {
        "accessControl" => ContentPlan::access_control_quote(today),
        _ => ContentPlan::system_proposal(today),
    };

    let mut assets = AssetBundle::new();
    if let Some(ref name) = plan.logo_asset {
        let url = format!("{}/{name}", asset_base.trim_end_matches('/'));
        match fetch_asset(&url, name).await {
            Ok(asset) => assets.insert(name.clone(), asset),
            Err(e) => tracing::warn!("{e}"),
        }
    }

    let document = if kind == "accessControl" {
        project_itemized_quote(snapshot, SectionRef::AccessControl, &plan, &assets, config)
    } else {
        project_system_proposal(snapshot, &plan, &assets, config)
    };
    let bytes = PdfRenderer::new().render(&document).map_err(js_err)?;
    let bytes = Uint8Array::from(bytes.as_slice());
    file_object(&document.file_name, "bytes", &bytes.into())
}

async fn fetch_asset(url: &str, name: &str) -> Result<Asset, AssetLoadError> {
    let fetch_err = |reason: String| AssetLoadError::Fetch {
        name: name.to_string(),
        reason,
    };
    let window = web_sys::window().ok_or_else(|| fetch_err("no window".into()))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| fetch_err(format!("{e:?}")))?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|e| fetch_err(format!("{e:?}")))?;
    if !response.ok() {
        return Err(AssetLoadError::NotFound(name.to_string()));
    }
    let buffer = response
        .array_buffer()
        .map_err(|e| fetch_err(format!("{e:?}")))?;
    let buffer = JsFuture::from(buffer)
        .await
        .map_err(|e| fetch_err(format!("{e:?}")))?;
    Ok(Asset::new(mime_for(name), Uint8Array::new(&buffer).to_vec()))
}
