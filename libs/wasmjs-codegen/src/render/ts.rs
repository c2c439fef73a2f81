//! TypeScript client-side renderer

use super::{comment_lines, mismatch, Renderer, GENERATED_HEADER};
use crate::data::{
    model_name, BundleData, ClientData, ClientMethodData, EnumData, FactoryData, FieldData,
    MessageData, PackageIndexData, TemplateData, TsImport, TypesData,
};
use crate::naming::{to_lower_camel, to_upper_camel};
use crate::planner::{file_types, FileSpec};

#[derive(Debug, Clone, Copy, Default)]
pub struct TsRenderer;

impl TsRenderer {
    pub fn new() -> Self {
        Self
    }
}

const FILE_TYPES: &[&str] = &[
    file_types::SERVICE_CLIENT,
    file_types::BROWSER_SERVICE,
    file_types::INTERFACES,
    file_types::MODELS,
    file_types::SCHEMAS,
    file_types::PACKAGE_INDEX,
    file_types::FACTORY,
    file_types::BUNDLE,
];

impl Renderer for TsRenderer {
    fn file_types(&self) -> &[&'static str] {
        FILE_TYPES
    }

    fn render(&self, spec: &FileSpec, data: &TemplateData) -> anyhow::Result<String> {
        let text = match (spec.file_type.as_str(), data) {
            (file_types::SERVICE_CLIENT, TemplateData::Client(data)) if !data.is_browser => {
                render_client(data)
            }
            (file_types::BROWSER_SERVICE, TemplateData::Client(data)) if data.is_browser => {
                render_browser_service(data)
            }
            (file_types::INTERFACES, TemplateData::Types(data)) => render_interfaces(data),
            (file_types::MODELS, TemplateData::Types(data)) => render_models(data),
            (file_types::SCHEMAS, TemplateData::Types(data)) => render_schemas(data),
            (file_types::PACKAGE_INDEX, TemplateData::PackageIndex(data)) => render_index(data),
            (file_types::FACTORY, TemplateData::Factory(data)) => render_factory(data),
            (file_types::BUNDLE, TemplateData::Bundle(data)) => render_bundle(data),
            _ => return Err(mismatch(spec, data)),
        };
        Ok(text)
    }
}

fn header(out: &mut String, source: &str) {
    out.push_str(&format!("// {GENERATED_HEADER}\n"));
    out.push_str(&format!("// source: {source}\n\n"));
}

fn imports(out: &mut String, imports: &[TsImport]) {
    for import in imports {
        let keyword = if import.type_only { "import type" } else { "import" };
        out.push_str(&format!(
            "{keyword} {{ {} }} from \"{}\";\n",
            import.names.join(", "),
            import.from
        ));
    }
    if !imports.is_empty() {
        out.push('\n');
    }
}

fn js_doc(out: &mut String, indent: &str, comment: Option<&str>) {
    if comment.is_some() {
        out.push_str(&format!("{indent}/**\n"));
        comment_lines(out, indent, " * ", comment);
        out.push_str(&format!("{indent} */\n"));
    }
}

fn response_type(method: &ClientMethodData) -> String {
    if method.server_streaming {
        format!("{}[]", method.response_type)
    } else {
        method.response_type.clone()
    }
}

fn render_client(data: &ClientData) -> String {
    let mut out = String::new();
    header(&mut out, &data.full_name);

    let mut bridge = Vec::new();
    if data.methods.iter().any(|m| m.is_async) {
        bridge.push("callAsync");
    }
    if data.methods.iter().any(|m| !m.is_async) {
        bridge.push("callSync");
    }
    if !bridge.is_empty() {
        out.push_str(&format!(
            "import {{ {} }} from \"{}\";\n",
            bridge.join(", "),
            data.bundle_import
        ));
    }
    imports(&mut out, &data.imports);
    if data.imports.is_empty() && !bridge.is_empty() {
        out.push('\n');
    }

    let class_name = format!("{}Client", to_upper_camel(&data.exposed_name));
    js_doc(&mut out, "", data.comment.as_deref());
    out.push_str(&format!("export class {class_name} {{\n"));
    for (idx, method) in data.methods.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        js_doc(&mut out, "  ", method.comment.as_deref());
        let response = response_type(method);
        if method.is_async {
            out.push_str(&format!(
                "  async {}(request: {}): Promise<{response}> {{\n",
                method.exposed_name, method.request_type
            ));
            let timeout = method
                .timeout_ms
                .map(|t| format!(", {t}"))
                .unwrap_or_default();
            out.push_str(&format!(
                "    return callAsync<{}, {response}>(\"{}\", request{timeout});\n",
                method.request_type, method.export_name
            ));
        } else {
            out.push_str(&format!(
                "  {}(request: {}): {response} {{\n",
                method.exposed_name, method.request_type
            ));
            out.push_str(&format!(
                "    return callSync<{}, {response}>(\"{}\", request);\n",
                method.request_type, method.export_name
            ));
        }
        out.push_str("  }\n");
    }
    out.push_str("}\n\n");

    let instance = to_lower_camel(&data.exposed_name);
    out.push_str(&format!("export const {instance} = new {class_name}();\n"));
    out
}

fn render_browser_service(data: &ClientData) -> String {
    let mut out = String::new();
    header(&mut out, &data.full_name);
    out.push_str(&format!(
        "import {{ registerBrowserService }} from \"{}\";\n",
        data.bundle_import
    ));
    imports(&mut out, &data.imports);
    if data.imports.is_empty() {
        out.push('\n');
    }

    let interface_name = format!("{}Service", to_upper_camel(&data.exposed_name));
    js_doc(&mut out, "", data.comment.as_deref());
    out.push_str(&format!("export interface {interface_name} {{\n"));
    for method in &data.methods {
        js_doc(&mut out, "  ", method.comment.as_deref());
        out.push_str(&format!(
            "  {}(request: {}): Promise<{}>;\n",
            method.exposed_name,
            method.request_type,
            response_type(method)
        ));
    }
    out.push_str("}\n\n");

    out.push_str(&format!(
        "export function register{interface_name}(impl: {interface_name}): void {{\n"
    ));
    out.push_str(&format!(
        "  registerBrowserService(\"{}\", {{\n",
        data.exposed_name
    ));
    for method in &data.methods {
        out.push_str(&format!(
            "    {name}: async (request: string) =>\n      JSON.stringify(await impl.{name}(JSON.parse(request) as {})),\n",
            method.request_type,
            name = method.exposed_name
        ));
    }
    out.push_str("  });\n");
    out.push_str("}\n");
    out
}

fn render_enum(out: &mut String, data: &EnumData) {
    js_doc(out, "", data.comment.as_deref());
    out.push_str(&format!("export enum {} {{\n", data.name));
    for value in &data.values {
        out.push_str(&format!("  {} = {},\n", value.name, value.number));
    }
    out.push_str("}\n\n");
}

fn field_decl(field: &FieldData) -> String {
    let marker = if field.optional { "?" } else { "" };
    format!("{}{marker}: {}", field.name, field.ts_type)
}

fn render_interfaces(data: &TypesData) -> String {
    let mut out = String::new();
    header(&mut out, &format!("{} ({})", data.package, data.directory));
    imports(&mut out, &data.imports);

    for enum_data in &data.enums {
        render_enum(&mut out, enum_data);
    }
    for message in &data.messages {
        js_doc(&mut out, "", message.comment.as_deref());
        out.push_str(&format!("export interface {} {{\n", message.name));
        for field in &message.fields {
            out.push_str(&format!("  {};\n", field_decl(field)));
        }
        out.push_str("}\n\n");
    }
    trim_trailing_blank(out)
}

fn render_models(data: &TypesData) -> String {
    let mut out = String::new();
    header(&mut out, &format!("{} ({})", data.package, data.directory));
    imports(&mut out, &data.imports);

    for message in &data.messages {
        render_model(&mut out, message);
    }
    trim_trailing_blank(out)
}

fn render_model(out: &mut String, message: &MessageData) {
    let class_name = model_name(&message.name);
    js_doc(out, "", message.comment.as_deref());
    out.push_str(&format!(
        "export class {class_name} implements {} {{\n",
        message.name
    ));
    for field in &message.fields {
        match &field.default_value {
            Some(default) => out.push_str(&format!("  {} = {default};\n", field_decl(field))),
            None => out.push_str(&format!("  {};\n", field_decl(field))),
        }
    }
    if !message.fields.is_empty() {
        out.push('\n');
    }
    out.push_str(&format!("  constructor(init?: Partial<{}>) {{\n", message.name));
    out.push_str("    if (init) {\n");
    out.push_str("      Object.assign(this, init);\n");
    out.push_str("    }\n");
    out.push_str("  }\n");
    out.push_str("}\n\n");
}

fn render_schemas(data: &TypesData) -> String {
    let mut out = String::new();
    header(&mut out, &format!("{} ({})", data.package, data.directory));

    for enum_data in &data.enums {
        out.push_str(&format!("export const {}Schema = {{\n", enum_data.name));
        out.push_str(&format!("  name: \"{}\",\n", enum_data.full_name));
        out.push_str("  values: {\n");
        for value in &enum_data.values {
            out.push_str(&format!("    {}: {},\n", value.name, value.number));
        }
        out.push_str("  },\n");
        out.push_str("} as const;\n\n");
    }

    for message in &data.messages {
        out.push_str(&format!("export const {}Schema = {{\n", message.name));
        out.push_str(&format!("  name: \"{}\",\n", message.full_name));
        out.push_str("  fields: [\n");
        for field in &message.fields {
            let mut entry = format!(
                "name: \"{}\", protoName: \"{}\", number: {}, kind: \"{}\"",
                field.name, field.proto_name, field.number, field.kind
            );
            if let Some(scalar) = field.scalar {
                entry.push_str(&format!(", scalar: \"{scalar}\""));
            }
            if let Some(type_ref) = &field.type_ref {
                entry.push_str(&format!(", typeRef: \"{type_ref}\""));
            }
            entry.push_str(&format!(
                ", repeated: {}, optional: {}",
                field.repeated, field.optional
            ));
            if let Some(oneof) = field.oneof_index {
                entry.push_str(&format!(", oneof: {oneof}"));
            }
            out.push_str(&format!("    {{ {entry} }},\n"));
        }
        out.push_str("  ],\n");
        out.push_str("} as const;\n\n");
    }
    trim_trailing_blank(out)
}

fn render_index(data: &PackageIndexData) -> String {
    let mut out = String::new();
    header(&mut out, &data.package);
    for module in &data.exports {
        out.push_str(&format!("export * from \"{module}\";\n"));
    }
    out
}

fn render_factory(data: &FactoryData) -> String {
    let mut out = String::new();
    header(&mut out, &data.source_file);
    imports(&mut out, &data.imports);

    out.push_str(&format!(
        "/** Constructs every message reachable from {} within {} */\n",
        data.source_file, data.package
    ));
    out.push_str(&format!("export class {} {{\n", data.factory_name));
    for message in &data.messages {
        out.push_str(&format!(
            "  create{}(init?: Partial<{model}>): {model} {{\n",
            to_upper_camel(&message.type_name),
            model = message.model_name
        ));
        out.push_str(&format!("    return new {}(init);\n", message.model_name));
        out.push_str("  }\n\n");
    }

    out.push_str("  create(fullName: string): unknown {\n");
    out.push_str("    switch (fullName) {\n");
    for message in &data.messages {
        out.push_str(&format!("      case \"{}\":\n", message.full_name));
        out.push_str(&format!("        return new {}();\n", message.model_name));
    }
    out.push_str("      default:\n");
    out.push_str("        return undefined;\n");
    out.push_str("    }\n");
    out.push_str("  }\n");
    out.push_str("}\n");
    out
}

fn render_bundle(data: &BundleData) -> String {
    let mut out = String::new();
    header(&mut out, &data.module_name);
    out.push_str(&format!("export const MODULE_NAME = \"{}\";\n", data.module_name));
    out.push_str(&format!("export const NAMESPACE = \"{}\";\n", data.namespace));
    out.push_str(&format!("export const STRUCTURE = \"{}\";\n\n", data.structure));
    out.push_str(BUNDLE_RUNTIME);
    out
}

const BUNDLE_RUNTIME: &str = r#"type WasmExports = Record<string, unknown>;
type BrowserHandler = (request: string) => Promise<string>;

let wasmExports: WasmExports | undefined;
const browserServices = new Map<string, Record<string, BrowserHandler>>();

/** Load the compiled module once; later calls are no-ops */
export async function initModule(loader: () => Promise<WasmExports>): Promise<void> {
  if (!wasmExports) {
    wasmExports = await loader();
  }
}

function exported(name: string): (request: string) => unknown {
  if (!wasmExports) {
    throw new Error(`${MODULE_NAME} is not initialized; call initModule first`);
  }
  const fn = wasmExports[name];
  if (typeof fn !== "function") {
    throw new Error(`${MODULE_NAME} does not export ${name}`);
  }
  return fn as (request: string) => unknown;
}

export function callSync<Req, Res>(name: string, request: Req): Res {
  return JSON.parse(exported(name)(JSON.stringify(request)) as string) as Res;
}

export async function callAsync<Req, Res>(name: string, request: Req, timeoutMs?: number): Promise<Res> {
  const call = Promise.resolve(exported(name)(JSON.stringify(request)) as Promise<string> | string);
  if (timeoutMs === undefined) {
    return JSON.parse(await call) as Res;
  }
  let timer: ReturnType<typeof setTimeout> | undefined;
  const timeout = new Promise<never>((_, reject) => {
    timer = setTimeout(() => reject(new Error(`${name} timed out after ${timeoutMs}ms`)), timeoutMs);
  });
  try {
    return JSON.parse(await Promise.race([call, timeout])) as Res;
  } finally {
    clearTimeout(timer);
  }
}

export function registerBrowserService(service: string, handlers: Record<string, BrowserHandler>): void {
  browserServices.set(service, handlers);
}

async function callBrowserService(service: string, method: string, request: string): Promise<string> {
  const handler = browserServices.get(service)?.[method];
  if (!handler) {
    throw new Error(`browser service ${service}.${method} is not registered`);
  }
  return handler(request);
}

(globalThis as Record<string, unknown>)[NAMESPACE] = {
  browserServices: { call: callBrowserService },
};
"#;

fn trim_trailing_blank(mut out: String) -> String {
    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}
