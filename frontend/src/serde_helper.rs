use js_sys::Reflect;
use serde::{Serialize, de::DeserializeOwned};
use wasm_bindgen::JsValue;

/// Error type for JS interop conversions
#[derive(Debug)]
pub enum Error {
    SerdeWasmBindgen(serde_wasm_bindgen::Error),
    JsSys(JsValue),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::SerdeWasmBindgen(e) => write!(f, "Serde WASM Bindgen Error: {}", e),
            Error::JsSys(v) => write!(f, "JS Sys Error: {}", JsErrorInfo::from_js(v).message),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_wasm_bindgen::Error> for Error {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        Error::SerdeWasmBindgen(e)
    }
}

/// Serialize a Rust value into a plain JS object
///
/// Maps become objects (not `Map`) and `Option::None` becomes `undefined`,
/// which is what JS libraries taking option bags expect.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, Error> {
    let serializer = serde_wasm_bindgen::Serializer::new()
        .serialize_large_number_types_as_bigints(false)
        .serialize_maps_as_objects(true);
    value.serialize(&serializer).map_err(Error::from)
}

/// Deserialize a JsValue into a Rust data structure
pub fn from_value<T: DeserializeOwned>(value: JsValue) -> Result<T, Error> {
    serde_wasm_bindgen::from_value(value).map_err(Error::from)
}

/// Set a property that serde cannot express (functions, class instances)
pub fn set_property(target: &JsValue, key: &str, value: &JsValue) -> Result<(), Error> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(Error::JsSys)
}

// =========================================================
// JS 异常信息提取
// =========================================================

/// 从 JS 抛出的值中提取的错误信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsErrorInfo {
    /// `Error.name`，例如 `TimeoutError`、`InteractionRequiredAuthError`
    pub name: Option<String>,
    /// 库自定义的错误代码（`errorCode` 或 `code`）
    pub code: Option<String>,
    pub message: String,
}

impl JsErrorInfo {
    pub fn from_js(value: &JsValue) -> Self {
        if let Some(text) = value.as_string() {
            return Self {
                message: text,
                ..Default::default()
            };
        }

        let field = |key: &str| {
            Reflect::get(value, &JsValue::from_str(key))
                .ok()
                .and_then(|v| v.as_string())
                .filter(|s| !s.is_empty())
        };

        Self {
            name: field("name"),
            code: field("errorCode").or_else(|| field("code")),
            message: field("message")
                .or_else(|| field("errorMessage"))
                .unwrap_or_else(|| format!("{:?}", value)),
        }
    }
}
