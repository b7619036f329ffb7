//! Canonical forms every recognized boilerplate shape is rewritten into.

pub const CORS_MODULE: &str = "cors-config.ts";
pub const AUTH_MODULE: &str = "auth.ts";
pub const SHARED_DIR: &str = "../_shared";

pub const GET_CORS_HEADERS: &str = "getCorsHeaders";
pub const HANDLE_PREFLIGHT: &str = "handleCorsPreflightRequest";

pub const ORIGIN_LINE: &str = "const origin = req.headers.get('Origin');";

/// Present once the preflight block delegates to the shared helper.
pub const PREFLIGHT_CALL: &str = "handleCorsPreflightRequest(origin)";

/// Present once a handler awaits either authentication helper.
pub const AUTH_CALL_MARKER: &str = "await validateAuth";

pub const JSON_WITH_CORS: &str =
    "{ 'Content-Type': 'application/json', ...getCorsHeaders(origin) }";

pub fn import_line(names: &[&str], module: &str) -> String {
    format!("import {{ {} }} from '{SHARED_DIR}/{module}';", names.join(", "))
}

/// The delegating OPTIONS block. `indent` is the indentation of the line
/// the block starts on; the returned text starts at `if`.
pub fn preflight_block(indent: &str) -> String {
    format!(
        "if (req.method === 'OPTIONS') {{\n{indent}  return {PREFLIGHT_CALL};\n{indent}}}"
    )
}

pub fn response_guard(binding: &str) -> String {
    format!("if ({binding} instanceof Response) return {binding};")
}
