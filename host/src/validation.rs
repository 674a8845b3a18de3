//! WASM module validation: ABI compatibility checks.
//!
//! Validates that a compiled module meets the Gangway ABI before the
//! bridge accepts it. Checks:
//!
//! 1. Both entry points present with the signatures the configured
//!    protocol version requires (PROTOCOL.md §2, §7)
//! 2. All imports come from the `gangway_host` module
//! 3. No WASI imports
//! 4. Memory export present
//!
//! Signature checking is where the V1/V2 divergence bites first: a V1
//! module returns `i32` where a V2 module returns `i64`, and accepting
//! the wrong one would silently misread every offset.

use gangway_protocol::ProtocolVersion;
use wasmtime::{ExternType, Module, ValType};

use crate::error::BridgeError;

/// Allowed import module name.
const ALLOWED_IMPORT_MODULE: &str = "gangway_host";

/// Check if a ValType is i32.
fn is_i32(vt: &ValType) -> bool {
    matches!(vt, ValType::I32)
}

/// Check if a ValType is i64.
fn is_i64(vt: &ValType) -> bool {
    matches!(vt, ValType::I64)
}

/// Required exports for a protocol version: (name, param count).
/// Params are always i32; the result width depends on the version.
const REQUIRED_EXPORTS: [(&str, usize); 2] =
    [("gangway_alloc_request", 1), ("gangway_start_request", 0)];

/// Validate that a module meets Gangway ABI requirements for `version`.
pub fn validate_module(module: &Module, version: ProtocolVersion) -> Result<(), BridgeError> {
    validate_exports(module, version)?;
    validate_imports(module)?;
    Ok(())
}

/// Check that the memory export and both entry points are present with
/// correct signatures.
fn validate_exports(module: &Module, version: ProtocolVersion) -> Result<(), BridgeError> {
    let has_memory = module
        .exports()
        .any(|e| e.name() == "memory" && matches!(e.ty(), ExternType::Memory(_)));
    if !has_memory {
        return Err(BridgeError::ValidationError(
            "module must export 'memory'".into(),
        ));
    }

    // Entry points return a packed i64 in V2 and a bare i32 in V1.
    let result_ok: fn(&ValType) -> bool = if version.packed_results() {
        is_i64
    } else {
        is_i32
    };

    for (name, expected_param_count) in REQUIRED_EXPORTS {
        let export = module.exports().find(|e| e.name() == name).ok_or_else(|| {
            BridgeError::ValidationError(format!("missing required export: {}", name))
        })?;

        let func_ty = match export.ty() {
            ExternType::Func(ft) => ft,
            _ => {
                return Err(BridgeError::ValidationError(format!(
                    "export '{}' must be a function",
                    name
                )));
            }
        };

        let params: Vec<ValType> = func_ty.params().collect();
        let results: Vec<ValType> = func_ty.results().collect();

        if params.len() != expected_param_count || !params.iter().all(is_i32) {
            return Err(BridgeError::ValidationError(format!(
                "export '{}' has wrong param signature: expected {} i32 params, got {} params",
                name,
                expected_param_count,
                params.len()
            )));
        }

        if results.len() != 1 || !result_ok(&results[0]) {
            return Err(BridgeError::ValidationError(format!(
                "export '{}' has wrong result signature for {:?}: got {} results",
                name,
                version,
                results.len()
            )));
        }
    }

    Ok(())
}

/// Check that all imports are from `gangway_host` and none are WASI.
fn validate_imports(module: &Module) -> Result<(), BridgeError> {
    for import in module.imports() {
        let module_name = import.module();

        if module_name.starts_with("wasi") {
            return Err(BridgeError::ValidationError(format!(
                "WASI import not allowed: {}::{}",
                module_name,
                import.name()
            )));
        }

        if module_name != ALLOWED_IMPORT_MODULE {
            return Err(BridgeError::ValidationError(format!(
                "import from unknown module '{}' (only '{}' allowed): {}",
                module_name,
                ALLOWED_IMPORT_MODULE,
                import.name()
            )));
        }

        if !matches!(import.ty(), ExternType::Func(_)) {
            return Err(BridgeError::ValidationError(format!(
                "non-function import not allowed: {}::{}",
                module_name,
                import.name()
            )));
        }
    }

    Ok(())
}
