use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::editor::CodeSurface;

#[wasm_bindgen]
extern "C" {
    /// A CodeMirror 5 instance loaded by the page.
    pub type CodeMirror;

    #[wasm_bindgen(js_name = CodeMirror)]
    fn create(host: &Element, options: &JsValue) -> CodeMirror;

    #[wasm_bindgen(method, js_name = getValue)]
    fn get_value(this: &CodeMirror) -> String;

    #[wasm_bindgen(method, js_name = setValue)]
    fn set_value(this: &CodeMirror, value: &str);

    #[wasm_bindgen(method, js_name = setOption)]
    fn set_option(this: &CodeMirror, name: &str, value: &JsValue);

    #[wasm_bindgen(method, js_name = scrollTo)]
    fn scroll_to(this: &CodeMirror, x: f64, y: f64);

    #[wasm_bindgen(method)]
    fn on(this: &CodeMirror, event: &str, handler: &JsValue);
}

pub struct CodeMirrorSurface {
    editor: CodeMirror,
}

impl CodeMirrorSurface {
    pub fn mount(host: &Element, mode: &str) -> Self {
        let options = Object::new();
        let settings: [(&str, JsValue); 7] = [
            ("mode", mode.into()),
            ("theme", "dracula".into()),
            ("lineNumbers", true.into()),
            ("autoCloseBrackets", true.into()),
            ("matchBrackets", true.into()),
            ("indentUnit", JsValue::from_f64(4.0)),
            ("tabSize", JsValue::from_f64(4.0)),
        ];
        for (key, value) in settings {
            let _ = Reflect::set(&options, &key.into(), &value);
        }
        Self {
            editor: create(host, &options),
        }
    }

    /// Calls `handler` after every edit.
    pub fn on_change(&self, handler: impl FnMut() + 'static) {
        let closure = Closure::<dyn FnMut()>::new(handler);
        self.editor.on("change", closure.as_ref());
        closure.forget();
    }
}

impl CodeSurface for CodeMirrorSurface {
    fn code(&self) -> String {
        self.editor.get_value()
    }

    fn set_code(&self, code: &str) {
        self.editor.set_value(code);
        self.editor.scroll_to(0.0, 0.0);
    }

    fn set_syntax(&self, mode: &str) {
        self.editor.set_option("mode", &mode.into());
    }
}
