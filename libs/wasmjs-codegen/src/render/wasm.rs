//! Rust host-side renderer
//!
//! Wrappers expose every included method through `wasm_bindgen`, passing requests
//! and responses as JSON strings so the JS side needs no generated glue.

use super::{comment_lines, mismatch, Renderer, GENERATED_HEADER};
use crate::data::{
    BuildScriptData, MainExampleData, TemplateData, WasmMethodData, WasmServiceData, WasmWrapperData,
};
use crate::planner::{file_types, FileSpec};

#[derive(Debug, Clone, Copy, Default)]
pub struct WasmRenderer;

impl WasmRenderer {
    pub fn new() -> Self {
        Self
    }
}

const FILE_TYPES: &[&str] = &[
    file_types::WASM_WRAPPER,
    file_types::MAIN_EXAMPLE,
    file_types::BUILD_SCRIPT,
];

impl Renderer for WasmRenderer {
    fn file_types(&self) -> &[&'static str] {
        FILE_TYPES
    }

    fn render(&self, spec: &FileSpec, data: &TemplateData) -> anyhow::Result<String> {
        match (spec.file_type.as_str(), data) {
            (file_types::WASM_WRAPPER, TemplateData::WasmWrapper(data)) => Ok(render_wrapper(data)),
            (file_types::MAIN_EXAMPLE, TemplateData::MainExample(data)) => Ok(render_main(data)),
            (file_types::BUILD_SCRIPT, TemplateData::BuildScript(data)) => Ok(render_build(data)),
            _ => Err(mismatch(spec, data)),
        }
    }
}

fn render_wrapper(data: &WasmWrapperData) -> String {
    let mut code = String::new();
    code.push_str(&format!("// {GENERATED_HEADER}\n"));
    code.push_str(&format!("// package: {}\n\n", data.package));
    code.push_str("#![allow(dead_code)]\n\n");
    code.push_str("use std::cell::RefCell;\n");
    code.push_str("use std::rc::Rc;\n");
    code.push_str("use wasm_bindgen::prelude::*;\n\n");

    code.push_str("fn to_js_error(err: impl std::fmt::Display) -> JsValue {\n");
    code.push_str("    JsValue::from_str(&err.to_string())\n");
    code.push_str("}\n\n");

    for service in &data.services {
        render_service(&mut code, service);
    }

    if !data.browser_services.is_empty() {
        code.push_str("#[wasm_bindgen]\n");
        code.push_str("extern \"C\" {\n");
        code.push_str(&format!(
            "    #[wasm_bindgen(js_namespace = [\"{}\", \"browserServices\"], js_name = \"call\")]\n",
            data.namespace
        ));
        code.push_str(
            "    fn call_browser_service(service: &str, method: &str, request: &str) -> js_sys::Promise;\n",
        );
        code.push_str("}\n\n");

        for service in &data.browser_services {
            render_browser_service(&mut code, service);
        }
    }

    code
}

fn render_service(code: &mut String, service: &WasmServiceData) {
    comment_lines(code, "", "/// ", service.comment.as_deref());
    code.push_str(&format!("pub trait {} {{\n", service.trait_name));
    for method in &service.methods {
        comment_lines(code, "    ", "/// ", method.comment.as_deref());
        code.push_str(&format!(
            "    fn {}(&self, request: {}) -> {};\n",
            method.rust_fn,
            method.request_type,
            trait_return(method)
        ));
    }
    code.push_str("}\n\n");

    code.push_str("thread_local! {\n");
    code.push_str(&format!(
        "    static {}: RefCell<Option<Rc<dyn {}>>> = RefCell::new(None);\n",
        service.slot_name, service.trait_name
    ));
    code.push_str("}\n\n");

    code.push_str(&format!(
        "/// Install the implementation backing the exported `{}` calls\n",
        service.exposed_name
    ));
    code.push_str(&format!(
        "pub fn {}(service: impl {} + 'static) {{\n",
        service.register_fn, service.trait_name
    ));
    code.push_str(&format!(
        "    {}.with(|slot| *slot.borrow_mut() = Some(Rc::new(service)));\n",
        service.slot_name
    ));
    code.push_str("}\n\n");

    code.push_str(&format!(
        "fn {}_instance() -> Result<Rc<dyn {}>, JsValue> {{\n",
        service.slot_name.to_lowercase(),
        service.trait_name
    ));
    code.push_str(&format!(
        "    {}.with(|slot| slot.borrow().clone())\n",
        service.slot_name
    ));
    code.push_str(&format!(
        "        .ok_or_else(|| JsValue::from_str(\"{} is not registered\"))\n",
        service.exposed_name
    ));
    code.push_str("}\n\n");

    for method in &service.methods {
        render_export(code, service, method);
    }
}

fn trait_return(method: &WasmMethodData) -> String {
    let response = if method.server_streaming {
        format!("Vec<{}>", method.response_type)
    } else {
        method.response_type.clone()
    };
    if method.is_async {
        format!(
            "std::pin::Pin<Box<dyn std::future::Future<Output = Result<{response}, String>>>>"
        )
    } else {
        format!("Result<{response}, String>")
    }
}

fn render_export(code: &mut String, service: &WasmServiceData, method: &WasmMethodData) {
    if let Some(timeout) = method.timeout_ms {
        code.push_str(&format!(
            "pub const {}_TIMEOUT_MS: u32 = {timeout};\n\n",
            method.export_fn.to_uppercase()
        ));
    }

    code.push_str(&format!("#[wasm_bindgen(js_name = \"{}\")]\n", method.export_name));
    let asyncness = if method.is_async { "async " } else { "" };
    code.push_str(&format!(
        "pub {asyncness}fn {}(request: String) -> Result<String, JsValue> {{\n",
        method.export_fn
    ));
    code.push_str(&format!(
        "    let request: {} = serde_json::from_str(&request).map_err(to_js_error)?;\n",
        method.request_type
    ));
    code.push_str(&format!(
        "    let service = {}_instance()?;\n",
        service.slot_name.to_lowercase()
    ));
    let await_suffix = if method.is_async { ".await" } else { "" };
    code.push_str(&format!(
        "    let response = service.{}(request){await_suffix}.map_err(|e| JsValue::from_str(&e))?;\n",
        method.rust_fn
    ));
    code.push_str("    serde_json::to_string(&response).map_err(to_js_error)\n");
    code.push_str("}\n\n");
}

fn render_browser_service(code: &mut String, service: &WasmServiceData) {
    comment_lines(code, "", "/// ", service.comment.as_deref());
    code.push_str(&format!(
        "/// Calls into the browser-side `{}` implementation\n",
        service.exposed_name
    ));
    code.push_str("#[derive(Debug, Clone, Copy, Default)]\n");
    code.push_str(&format!("pub struct {}Client;\n\n", service.trait_name));
    code.push_str(&format!("impl {}Client {{\n", service.trait_name));

    for (idx, method) in service.methods.iter().enumerate() {
        if idx > 0 {
            code.push('\n');
        }
        comment_lines(code, "    ", "/// ", method.comment.as_deref());
        code.push_str(&format!(
            "    pub async fn {}(&self, request: &{}) -> Result<{}, String> {{\n",
            method.rust_fn, method.request_type, method.response_type
        ));
        code.push_str(
            "        let request = serde_json::to_string(request).map_err(|e| e.to_string())?;\n",
        );
        code.push_str(&format!(
            "        let promise = call_browser_service(\"{}\", \"{}\", &request);\n",
            service.exposed_name, method.exposed_name
        ));
        code.push_str("        let value = wasm_bindgen_futures::JsFuture::from(promise)\n");
        code.push_str("            .await\n");
        code.push_str("            .map_err(|e| format!(\"{e:?}\"))?;\n");
        code.push_str("        let text = value\n");
        code.push_str("            .as_string()\n");
        code.push_str("            .ok_or_else(|| \"browser service returned a non-string\".to_string())?;\n");
        code.push_str("        serde_json::from_str(&text).map_err(|e| e.to_string())\n");
        code.push_str("    }\n");
    }
    code.push_str("}\n\n");
}

fn render_main(data: &MainExampleData) -> String {
    let mut code = String::new();
    code.push_str(&format!("// {GENERATED_HEADER}\n"));
    code.push_str(&format!(
        "// Example entry point for the {} module.\n",
        data.module_name
    ));
    code.push_str("// Rename to main.rs (or lib.rs with crate-type = [\"cdylib\"]) and adapt.\n\n");
    code.push_str("use wasm_bindgen::prelude::*;\n\n");

    let mut modules: Vec<&str> = data.registrations.iter().map(|r| r.module.as_str()).collect();
    modules.sort_unstable();
    modules.dedup();
    if modules.is_empty() {
        code.push_str("// mod my_package_wasm;\n\n");
    } else {
        for module in &modules {
            code.push_str(&format!("// mod {module};\n"));
        }
        code.push('\n');
    }

    code.push_str("#[wasm_bindgen(start)]\n");
    code.push_str("pub fn start() {\n");
    code.push_str("    // Register service implementations here, for example:\n");
    if data.registrations.is_empty() {
        code.push_str("    // my_package_wasm::register_my_service(MyService::default());\n");
    }
    for registration in &data.registrations {
        code.push_str(&format!(
            "    // {}::{}(My{}::default());\n",
            registration.module, registration.register_fn, registration.trait_name
        ));
    }
    code.push_str(&format!(
        "    web_sys_log(\"{} ready under window.{}\");\n",
        data.module_name, data.namespace
    ));
    code.push_str("}\n\n");
    code.push_str("#[wasm_bindgen]\n");
    code.push_str("extern \"C\" {\n");
    code.push_str("    #[wasm_bindgen(js_namespace = console, js_name = log)]\n");
    code.push_str("    fn web_sys_log(message: &str);\n");
    code.push_str("}\n");
    code
}

fn render_build(data: &BuildScriptData) -> String {
    let mut script = String::new();
    script.push_str("#!/usr/bin/env bash\n");
    script.push_str(&format!("# {GENERATED_HEADER}\n"));
    script.push_str("set -euo pipefail\n\n");
    script.push_str(&format!("MODULE_NAME=\"{}\"\n", data.module_name));
    script.push_str(&format!("CRATE_DIR=\"${{CRATE_DIR:-{}}}\"\n", data.wasm_export_path));
    script.push_str(&format!("OUT_DIR=\"${{OUT_DIR:-{}}}\"\n\n", data.ts_export_path));
    script.push_str("if ! command -v wasm-pack >/dev/null 2>&1; then\n");
    script.push_str("  echo \"wasm-pack is required: cargo install wasm-pack\" >&2\n");
    script.push_str("  exit 1\n");
    script.push_str("fi\n\n");
    script.push_str("wasm-pack build \"$CRATE_DIR\" \\\n");
    script.push_str("  --target web \\\n");
    script.push_str("  --out-dir \"$OUT_DIR\" \\\n");
    script.push_str("  --out-name \"$MODULE_NAME\" \\\n");
    script.push_str("  --release\n");
    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MainRegistrationData;

    fn method(exposed: &str, is_async: bool) -> WasmMethodData {
        WasmMethodData {
            name: "FindBooks".to_string(),
            exposed_name: exposed.to_string(),
            export_name: format!("libraryService_{exposed}"),
            export_fn: "library_service_search_books".to_string(),
            rust_fn: "find_books".to_string(),
            request_type: "crate::library_v1::FindBooksRequest".to_string(),
            response_type: "crate::library_v1::FindBooksResponse".to_string(),
            request_type_name: "FindBooksRequest".to_string(),
            response_type_name: "FindBooksResponse".to_string(),
            is_async,
            timeout_ms: is_async.then_some(5000),
            server_streaming: false,
            comment: Some("Search the catalogue".to_string()),
        }
    }

    fn service(methods: Vec<WasmMethodData>) -> WasmServiceData {
        WasmServiceData {
            name: "LibraryService".to_string(),
            exposed_name: "LibraryService".to_string(),
            trait_name: "LibraryService".to_string(),
            slot_name: "LIBRARY_SERVICE".to_string(),
            register_fn: "register_library_service".to_string(),
            comment: None,
            methods,
        }
    }

    #[test]
    fn test_wrapper_exports_renamed_call() {
        let data = WasmWrapperData {
            package: "library.v1".to_string(),
            module: "library_v1".to_string(),
            namespace: "wasmServices".to_string(),
            services: vec![service(vec![method("searchBooks", false)])],
            browser_services: vec![],
        };
        let code = render_wrapper(&data);
        assert!(code.contains("#[wasm_bindgen(js_name = \"libraryService_searchBooks\")]"));
        assert!(code.contains(
            "fn find_books(&self, request: crate::library_v1::FindBooksRequest) -> Result<crate::library_v1::FindBooksResponse, String>;"
        ));
        assert!(code.contains("/// Search the catalogue"));
        assert!(!code.contains("call_browser_service"));
    }

    #[test]
    fn test_async_method_with_timeout() {
        let data = WasmWrapperData {
            package: "library.v1".to_string(),
            module: "library_v1".to_string(),
            namespace: "wasmServices".to_string(),
            services: vec![service(vec![method("searchBooks", true)])],
            browser_services: vec![],
        };
        let code = render_wrapper(&data);
        assert!(code.contains("pub async fn library_service_search_books"));
        assert!(code.contains("pub const LIBRARY_SERVICE_SEARCH_BOOKS_TIMEOUT_MS: u32 = 5000;"));
        assert!(code.contains(".await.map_err"));
    }

    #[test]
    fn test_browser_service_bridge() {
        let data = WasmWrapperData {
            package: "ui.v1".to_string(),
            module: "ui_v1".to_string(),
            namespace: "wasmServices".to_string(),
            services: vec![],
            browser_services: vec![service(vec![method("searchBooks", true)])],
        };
        let code = render_wrapper(&data);
        assert!(code.contains("js_namespace = [\"wasmServices\", \"browserServices\"]"));
        assert!(code.contains("pub struct LibraryServiceClient;"));
        assert!(code.contains("call_browser_service(\"LibraryService\", \"searchBooks\", &request)"));
    }

    #[test]
    fn test_main_example_names_registered_services() {
        let registration = |trait_name: &str, register_fn: &str| MainRegistrationData {
            module: "shop_v2_wasm".to_string(),
            trait_name: trait_name.to_string(),
            register_fn: register_fn.to_string(),
        };
        let code = render_main(&MainExampleData {
            module_name: "shop".to_string(),
            namespace: "shop".to_string(),
            registrations: vec![
                registration("CartService", "register_cart_service"),
                registration("OrderService", "register_order_service"),
            ],
        });
        assert_eq!(code.matches("// mod shop_v2_wasm;").count(), 1);
        assert!(code.contains("// shop_v2_wasm::register_cart_service(MyCartService::default());"));
        assert!(code.contains("// shop_v2_wasm::register_order_service(MyOrderService::default());"));
        assert!(!code.contains("library"));
    }

    #[test]
    fn test_main_example_without_host_services() {
        let code = render_main(&MainExampleData {
            module_name: "ui".to_string(),
            namespace: "ui".to_string(),
            registrations: vec![],
        });
        assert!(code.contains("// my_package_wasm::register_my_service(MyService::default());"));
        assert!(!code.contains("library"));
    }

    #[test]
    fn test_build_script() {
        let script = render_build(&BuildScriptData {
            module_name: "wasm_services".to_string(),
            wasm_export_path: "host".to_string(),
            ts_export_path: "web/gen".to_string(),
        });
        assert!(script.starts_with("#!/usr/bin/env bash\n"));
        assert!(script.contains("CRATE_DIR=\"${CRATE_DIR:-host}\""));
        assert!(script.contains("--out-name \"$MODULE_NAME\""));
    }
}
