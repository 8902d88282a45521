//! Build script for minic
//!
//! Compiles the embedded C runtime (print_int/print_bool/read_int) into a
//! static library and points `lib.rs`'s `include_bytes!` at it, so the
//! compiler binary can carry its own runtime object and extract it at
//! link time without requiring a sibling C project on disk.

use std::env;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    cc::Build::new()
        .file("runtime/runtime.c")
        .out_dir(&out_dir)
        .warnings(true)
        .compile("minic_runtime");

    let lib_path = out_dir.join("libminic_runtime.a");
    println!("cargo:rustc-env=MINIC_RUNTIME_LIB_PATH={}", lib_path.display());
    println!("cargo:rerun-if-changed=runtime/runtime.c");
}
