//! propview - proposal editor core for the web
//!
//! The engine behind a browser-based CCTV and access-control proposal
//! editor, compiled to WebAssembly:
//! - Financial model: line-item totals with tax, camera metrics, ROI
//!   (payback, NPV, bounded Newton IRR)
//! - Persistence: `localStorage` write-through with structural
//!   reconciliation against the bundled default proposal
//! - Document projection: snapshot → content blocks → paginated PDF
//! - CSV and XLSX export of the editable grids
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { PropView } from 'propview';
//! await init();
//! const view = new PropView();
//! view.cellEdit({ collection: 'quotation', id: 1, field: 'cantidad', value: '20' });
//! const { fileName, bytes } = await view.generatePdf('system', '/assets');
//! ```

pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod finance;
pub mod numfmt;
pub mod persistence;
pub mod projection;
pub mod render;
pub mod types;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

use wasm_bindgen::prelude::*;

pub use config::EditorConfig;
pub use editor::{CellEdit, Command, CommandOutcome, ProposalEditor};
pub use error::{PropviewError, Result};
#[cfg(target_arch = "wasm32")]
pub use wasm::PropView;

pub use types::*;

/// Derived metrics of a snapshot given as JSON, returned as JSON.
///
/// Stateless counterpart of `PropView.metrics()`: the input goes through the
/// same reconciliation as stored state.
///
/// # Errors
/// Returns an error if the input is not valid JSON.
#[wasm_bindgen(js_name = "computeMetrics")]
pub fn compute_metrics(snapshot_json: &str) -> std::result::Result<String, JsValue> {
    let snapshot = persistence::load_from_str(snapshot_json)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let metrics = finance::derive_metrics(&snapshot, &config::RoiSettings::default())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&metrics)
        .map_err(|e| JsValue::from_str(&format!("JSON serialization error: {e}")))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
