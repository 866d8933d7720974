// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Read-only model fields for REST remote methods
// Python bindings built with PyO3 behind the `python` feature

// Allow non-local definitions for PyO3 macros (known issue with PyO3 0.20.x)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod read_only;

/// Python module: readonly_mixin
///
/// Strips read-only properties from write payloads before the host
/// framework persists them.
///
/// # Examples
///
/// ```python
/// from readonly_mixin import ReadOnlyFilterRust
///
/// person = ReadOnlyFilterRust("Person", {"status": True, "role": True})
///
/// # Hooks to install on the host framework
/// for method, operation, relation in person.remote_hooks(
///     {"friends": {"type": "hasMany", "model": "Friend"}}
/// ):
///     print(method, operation, relation)
///
/// body = {"name": "Tom (edited)", "status": "active", "role": "admin"}
/// person.strip(body, "updateAttributes")
/// print(body)  # {"name": "Tom (edited)"}
/// ```
#[cfg(feature = "python")]
#[pyo3::pymodule]
fn readonly_mixin(m: &pyo3::Bound<'_, pyo3::types::PyModule>) -> pyo3::PyResult<()> {
    use pyo3::prelude::*;

    m.add_class::<read_only::ReadOnlyFilterRust>()?;
    m.add(
        "ForbiddenError",
        m.py().get_type::<read_only::python::ForbiddenError>(),
    )?;

    // Module metadata
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("__doc__", "Read-only model fields for REST remote methods")?;

    Ok(())
}
